//! A logging-only `MiningCoordinator`: the mining/replication pipeline is
//! out of scope here, so every hook does nothing but record that it was
//! called. A real deployment wires these fire-and-forget calls into the
//! actual mining coordinator and replication pipeline.

use ambernet_codec::frame::{ReplicationRoles, ReplicationTree};
use ambernet_crypto::{TaggedHash, TaggedPublicKey};
use ambernet_tx::Transaction;

use ambernet_dispatch::MiningCoordinator;

#[derive(Default)]
pub struct LoggingMiningCoordinator;

impl LoggingMiningCoordinator {
    pub fn new() -> Self {
        Self
    }
}

impl MiningCoordinator for LoggingMiningCoordinator {
    fn start_mining(&self, tx: &Transaction, welcome_key: &TaggedPublicKey, validator_keys: &[TaggedPublicKey]) {
        tracing::debug!(
            address = %tx.address,
            %welcome_key,
            validators = validator_keys.len(),
            "start_mining forwarded"
        );
    }

    fn add_mining_context(
        &self,
        address: &TaggedHash,
        validation_key: &TaggedPublicKey,
        validator_keys: &[TaggedPublicKey],
        chain_storage_nodes_view: &[bool],
        io_storage_nodes_view: &[bool],
        beacon_storage_nodes_view: &[bool],
    ) {
        tracing::debug!(
            %address,
            %validation_key,
            validators = validator_keys.len(),
            chain_view_bits = chain_storage_nodes_view.len(),
            io_view_bits = io_storage_nodes_view.len(),
            beacon_view_bits = beacon_storage_nodes_view.len(),
            "add_mining_context forwarded"
        );
    }

    fn cross_validate(&self, address: &TaggedHash, stamp: [u8; 32], replication_tree: &ReplicationTree) {
        tracing::debug!(
            %address,
            stamp = %hex::encode(stamp),
            rows = replication_tree.row_count,
            cols = replication_tree.row_width,
            "cross_validate forwarded"
        );
    }

    fn cross_validation_done(&self, address: &TaggedHash, stamp: [u8; 32]) {
        tracing::debug!(%address, stamp = %hex::encode(stamp), "cross_validation_done forwarded");
    }

    fn replicate_transaction(&self, tx: &Transaction, roles: ReplicationRoles, ack_storage: bool) {
        tracing::debug!(address = %tx.address, ?roles, ack_storage, "replicate_transaction forwarded");
    }

    fn acknowledge_storage(&self, address: &TaggedHash) {
        tracing::debug!(%address, "acknowledge_storage forwarded");
    }
}
