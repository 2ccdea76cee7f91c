//! The external interfaces `process` consults and mutates, and the bundle
//! that threads them (plus the validator's own collaborators) into one call.

use ambernet_codec::frame::{ReplicationRoles, ReplicationTree, TokenBalance, TransactionInput, UnspentOutput};
use ambernet_crypto::{TaggedHash, TaggedPublicKey};
use ambernet_tx::{Node, Transaction, TransactionType};

/// Chain-store queries and the one mutation `process` performs directly:
/// admitting a validated transaction.
pub trait ChainStore: Send + Sync {
    fn get_transaction(&self, address: &TaggedHash) -> Option<Transaction>;

    fn get_last_transaction(&self, address: &TaggedHash) -> Option<Transaction>;

    /// Every transaction recorded on `address`'s chain, optionally
    /// restricted to those after the given Unix timestamp.
    fn get_transaction_chain(&self, address: &TaggedHash, after: Option<u32>) -> Vec<Transaction>;

    fn get_unspent_outputs(&self, address: &TaggedHash) -> Vec<UnspentOutput>;

    fn get_transaction_inputs(&self, address: &TaggedHash) -> Vec<TransactionInput>;

    fn get_transaction_chain_length(&self, address: &TaggedHash) -> u32;

    fn get_balance(&self, address: &TaggedHash) -> (u64, Vec<TokenBalance>);

    /// The chain entry recorded after `timestamp`, if any.
    fn get_last_transaction_address(&self, address: &TaggedHash, timestamp: u32) -> Option<(TaggedHash, u32)>;

    fn get_first_public_key(&self, address: &TaggedHash) -> Option<TaggedPublicKey>;

    fn get_transaction_summary(&self, address: &TaggedHash) -> Option<(TransactionType, u32)>;

    fn notify_last_transaction_address(&self, address: &TaggedHash, next_address: &TaggedHash, timestamp: u32);

    /// Record `tx` as pending. Called only after [`ambernet_validate::validate`]
    /// has already accepted it.
    fn submit_transaction(&self, tx: Transaction);
}

/// Node membership and routing, consulted for bootstrapping and P2P view
/// requests.
pub trait P2P: Send + Sync {
    fn list_nodes(&self) -> Vec<Node>;

    fn authorized_nodes(&self) -> Vec<Node>;

    fn nearest_nodes(&self, patch: [u8; 3]) -> Vec<Node>;

    fn get_node_info(&self, key: &TaggedPublicKey) -> Option<Node>;

    fn set_node_globally_available(&self, key: &TaggedPublicKey);

    /// One availability bit per key in `keys`, same order.
    fn nodes_availability_as_bits(&self, keys: &[TaggedPublicKey]) -> Vec<bool>;
}

/// Fire-and-forget hooks into the mining/replication subsystems these
/// requests address. The subsystems themselves are out of scope; the
/// dispatcher only needs somewhere to forward the request.
pub trait MiningCoordinator: Send + Sync {
    fn start_mining(&self, tx: &Transaction, welcome_key: &TaggedPublicKey, validator_keys: &[TaggedPublicKey]);

    fn add_mining_context(
        &self,
        address: &TaggedHash,
        validation_key: &TaggedPublicKey,
        validator_keys: &[TaggedPublicKey],
        chain_storage_nodes_view: &[bool],
        io_storage_nodes_view: &[bool],
        beacon_storage_nodes_view: &[bool],
    );

    fn cross_validate(&self, address: &TaggedHash, stamp: [u8; 32], replication_tree: &ReplicationTree);

    fn cross_validation_done(&self, address: &TaggedHash, stamp: [u8; 32]);

    fn replicate_transaction(&self, tx: &Transaction, roles: ReplicationRoles, ack_storage: bool);

    fn acknowledge_storage(&self, address: &TaggedHash);
}

/// Registration + notification for `NewTransaction`'s acceptance wait. A
/// subscription is a oneshot receiver that resolves once, the moment the
/// matching address is accepted; dropping it deregisters (scoped
/// subscription, released on every exit path).
pub trait PubSub: Send + Sync {
    fn subscribe_transaction_accepted(&self, address: &TaggedHash) -> tokio::sync::oneshot::Receiver<()>;
}

/// Every collaborator `process` needs, including the validator's own bundle
/// (the dispatcher calls `ambernet_validate::validate` before admitting a
/// `NewTransaction`).
pub struct Collaborators<'a> {
    pub chain_store: &'a dyn ChainStore,
    pub p2p: &'a dyn P2P,
    pub mining: &'a dyn MiningCoordinator,
    pub pub_sub: &'a dyn PubSub,
    pub validation: ambernet_validate::ValidationContext<'a>,
    /// Process-wide network seed storage-nonce encryption is keyed on.
    pub network_seed: &'a [u8],
    /// Timeout `NewTransaction` waits on its pub-sub acceptance event.
    pub mining_timeout: std::time::Duration,
}
