//! Bootstrap wiring for a node process: builds the process-wide registers,
//! an in-memory reference implementation of every collaborator trait, and
//! the per-connection task loop that ties the wire codec to the dispatcher
//! and validator.
//!
//! None of the external subsystems this workspace treats as out of scope
//! (mining, replication, ledger, contract execution, storage engine,
//! schedulers, UI/HTTP/CLI/config) are reimplemented here. What's in this
//! crate is enough to bootstrap a process, admit transactions, and answer
//! requests in tests and local development; see `DESIGN.md` for the scope
//! note.

pub mod bootstrap;
pub mod chain_store;
pub mod connection;
pub mod membership;
pub mod mining;
pub mod pools;
pub mod pubsub;
pub mod schedulers;

pub use bootstrap::{BootstrapConfig, NodeContext};
pub use chain_store::InMemoryChainStore;
pub use membership::NodeMembership;
pub use mining::LoggingMiningCoordinator;
pub use pools::InMemoryPools;
pub use pubsub::TransactionAcceptancePubSub;
pub use schedulers::FixedIntervalSchedulers;
