//! Request dispatch: turning one decoded [`ambernet_codec::Frame`] into its
//! response, consulting whatever external state the request names.

pub mod collaborators;
mod process;

pub use collaborators::{ChainStore, Collaborators, MiningCoordinator, PubSub, P2P};
pub use process::process;
