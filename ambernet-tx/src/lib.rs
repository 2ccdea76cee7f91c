//! The transaction record: typed fields, canonical serialisation, and
//! address derivation helpers shared by the wire codec and the validator.

pub mod node;
pub mod transaction;
pub mod types;

pub use node::Node;
pub use transaction::{
    Ownership, Transaction, TransactionData, TokenTransfer, TxLedger, UcoTransfer,
};
pub use types::TransactionType;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Crypto(#[from] ambernet_crypto::Error),

    #[error("unexpected end of buffer while decoding {field}")]
    Truncated { field: &'static str },

    #[error("content is not valid utf-8")]
    InvalidUtf8,

    #[error("unknown transaction type tag {0}")]
    UnknownTransactionType(u8),

    #[error("{field} has {count} entries, exceeds the 255-entry maximum its length prefix can encode")]
    TooManyEntries { field: &'static str, count: usize },
}
