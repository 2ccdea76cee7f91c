//! AmberNet: the peer-to-peer wire protocol and pending-transaction
//! admission validator of a permissioned blockchain node.
//!
//! This crate doesn't provide a particular binary; it re-exports the five
//! leaf crates (`ambernet-crypto` through `ambernet-node`) under one
//! namespace, the base layer a node process, an explorer, or a test
//! harness builds on.

#[doc(inline)]
pub use ambernet_crypto as crypto;

#[doc(inline)]
pub use ambernet_tx as tx;

#[doc(inline)]
pub use ambernet_codec as codec;

#[doc(inline)]
pub use ambernet_dispatch as dispatch;

#[doc(inline)]
pub use ambernet_validate as validate;

#[doc(inline)]
pub use ambernet_node as node;
