//! The bit-exact wire codec: every request/response frame exchanged between
//! nodes, encoded and decoded with big-endian, self-delimiting rules.

pub mod amount;
pub mod bits;
pub mod cursor;
pub mod frame;
mod node_codec;

pub use frame::{decode, encode, Frame};

use thiserror::Error;

/// Codec errors: always fatal for the current frame, never a panic, never
/// silent over-consumption.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("frame tag {0} is reserved and unknown")]
    UnknownFrame(u8),

    #[error("algorithm tag {0} is unknown")]
    UnknownAlgorithm(u8),

    #[error("need at least {needed} more byte(s) to decode {field}")]
    Incomplete { field: &'static str, needed: usize },

    #[error("malformed frame: {0}")]
    Malformed(String),
}

impl From<ambernet_crypto::Error> for Error {
    fn from(value: ambernet_crypto::Error) -> Self {
        match value {
            ambernet_crypto::Error::UnknownAlgorithm(tag) => Error::UnknownAlgorithm(tag),
            other => Error::Malformed(other.to_string()),
        }
    }
}

impl From<ambernet_tx::Error> for Error {
    fn from(value: ambernet_tx::Error) -> Self {
        match value {
            ambernet_tx::Error::Crypto(inner) => inner.into(),
            other => Error::Malformed(other.to_string()),
        }
    }
}
