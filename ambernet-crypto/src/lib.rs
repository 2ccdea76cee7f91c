//! Cryptographic primitives shared by the wire codec and the pending
//! transaction validator.
//!
//! Every hash and every public key on the wire begins with a 1-byte
//! algorithm tag; the tag alone determines the payload length that follows
//! it. [`algorithm`] holds that compile-time table, [`hash`] and [`key`]
//! build on it to offer self-delimiting tagged byte strings, and
//! [`certificate`], [`derive`] and [`nonce`] cover the remaining C1
//! operations named in the protocol.

pub mod algorithm;
pub mod certificate;
pub mod derive;
pub mod hash;
pub mod key;
pub mod nonce;

pub use algorithm::{HashAlgorithm, KeyAlgorithm};
pub use hash::TaggedHash;
pub use key::TaggedPublicKey;

use thiserror::Error;

/// Errors shared across every C1 operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown algorithm tag {0}")]
    UnknownAlgorithm(u8),

    #[error("not enough bytes to read a tagged value: need {needed}, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength { expected: usize, actual: usize },

    #[error("signature verification failed")]
    SignatureVerificationFailed,
}
