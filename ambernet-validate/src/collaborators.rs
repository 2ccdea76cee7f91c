//! The external interfaces the validator consults, and the process-wide
//! registers built once at bootstrap and threaded in by reference.
//!
//! None of these are implemented here: `ambernet-node` supplies concrete,
//! in-memory instances. The validator only ever sees `&dyn Trait`.

use std::collections::HashSet;

use ambernet_crypto::{TaggedHash, TaggedPublicKey};
use ambernet_tx::{Transaction, TransactionType};
use chrono::{DateTime, Utc};

/// Read access to recorded chains, keyed by the address of the chain's
/// first transaction ("genesis address" for singleton chains such as the
/// rewards chain).
pub trait ChainStore: Send + Sync {
    /// The last transaction address recorded on `address`'s chain, and the
    /// timestamp it was recorded at.
    fn get_last_chain_address(&self, address: &TaggedHash) -> Option<(TaggedHash, DateTime<Utc>)>;

    /// Same as [`Self::get_last_chain_address`], but only considering
    /// entries recorded strictly before `before`.
    fn get_last_chain_address_before(
        &self,
        address: &TaggedHash,
        before: DateTime<Utc>,
    ) -> Option<(TaggedHash, DateTime<Utc>)>;

    fn get_transaction(&self, address: &TaggedHash) -> Option<Transaction>;

    /// The earliest transaction recorded on `address`'s chain.
    fn get_first_transaction(&self, address: &TaggedHash) -> Option<Transaction>;

    fn transaction_exists(&self, address: &TaggedHash) -> bool;

    fn get_latest_burned_fees(&self) -> u64;
}

/// Node membership lookups the validator needs: whether a key belongs to a
/// currently-known node, and which origin (hardware/software producer) a
/// key was certified under.
pub trait NodeDirectory: Send + Sync {
    fn is_known_node_first_public_key(&self, key: &TaggedPublicKey) -> bool;

    fn key_origin(&self, key: &TaggedPublicKey) -> Option<String>;

    /// Every public key currently recognised as an origin key, i.e. the tip
    /// of some chain rooted at one of `Registers::origin_genesis_addresses`.
    /// `origin_signature` is valid if it verifies under any of these.
    fn known_origin_public_keys(&self) -> HashSet<TaggedPublicKey>;
}

/// Named sets of public keys, e.g. the technical council pool consulted by
/// `code_approval`.
pub trait PoolsMemTable: Send + Sync {
    fn members(&self, pool: &str) -> HashSet<TaggedPublicKey>;
}

/// Cron-like trigger times for scheduled transaction types. The validator
/// only ever asks for the largest trigger instant at or before `now`.
pub trait Schedulers: Send + Sync {
    fn last_trigger_at(&self, tx_type: TransactionType, now: DateTime<Utc>) -> DateTime<Utc>;
}

/// Process-wide configuration, built once at bootstrap and read by many
/// concurrent validations. Never mutated by the validator itself.
#[derive(Debug, Clone)]
pub struct Registers {
    pub node_shared_secrets_genesis_address: TaggedHash,
    pub origin_genesis_addresses: HashSet<TaggedHash>,
    pub reward_genesis_address: TaggedHash,
    /// Not named in the wire protocol but required by the same
    /// scheduler-window mechanism the reward chain uses; see DESIGN.md.
    pub node_rewards_genesis_address: TaggedHash,
    pub oracle_genesis_address: TaggedHash,
    pub allowed_node_key_origins: HashSet<String>,
    pub content_max_size: usize,
}

/// The full collaborator bundle passed into [`crate::validate`].
pub struct ValidationContext<'a> {
    pub chain_store: &'a dyn ChainStore,
    pub node_directory: &'a dyn NodeDirectory,
    pub pools: &'a dyn PoolsMemTable,
    pub schedulers: &'a dyn Schedulers,
    pub registers: &'a Registers,
}
