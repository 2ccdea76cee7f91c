//! Bootstrap: turn an already-resolved configuration into the process-wide
//! registers, the in-memory collaborators, and the borrowed bundle
//! [`ambernet_dispatch::process`] and [`ambernet_validate::validate`]
//! consume. No `clap`, no file parsing — the config loader itself is left
//! to the caller; this struct is `Deserialize` so a loader can just feed
//! it a parsed config file.

use std::collections::HashSet;
use std::time::Duration;

use ambernet_crypto::TaggedHash;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use ambernet_validate::Registers;

use crate::chain_store::InMemoryChainStore;
use crate::membership::NodeMembership;
use crate::mining::LoggingMiningCoordinator;
use crate::pools::InMemoryPools;
use crate::pubsub::TransactionAcceptancePubSub;
use crate::schedulers::FixedIntervalSchedulers;

/// Already-resolved configuration a loader (out of scope) hands to
/// [`bootstrap`].
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    pub node_shared_secrets_genesis_address: TaggedHash,
    pub origin_genesis_addresses: HashSet<TaggedHash>,
    pub reward_genesis_address: TaggedHash,
    pub node_rewards_genesis_address: TaggedHash,
    pub oracle_genesis_address: TaggedHash,
    #[serde(default)]
    pub allowed_node_key_origins: HashSet<String>,
    #[serde(default = "default_content_max_size")]
    pub content_max_size: usize,
    #[serde(default = "default_mining_timeout_secs")]
    pub mining_timeout_secs: u64,
    #[serde(with = "hex::serde")]
    pub network_seed: Vec<u8>,
}

const fn default_content_max_size() -> usize {
    3_500_000
}

const fn default_mining_timeout_secs() -> u64 {
    60
}

/// Every process-wide collaborator, owned for the lifetime of the process.
pub struct NodeContext {
    pub registers: Registers,
    pub membership: NodeMembership,
    pub chain_store: InMemoryChainStore,
    pub pools: InMemoryPools,
    pub schedulers: FixedIntervalSchedulers,
    pub pub_sub: TransactionAcceptancePubSub,
    pub mining: LoggingMiningCoordinator,
    pub network_seed: Vec<u8>,
    pub mining_timeout: Duration,
}

/// Build a [`NodeContext`] from `config`, with schedules anchored at
/// `schedule_epoch` (the instant each scheduler's period is computed from;
/// see [`FixedIntervalSchedulers`]).
pub fn bootstrap(config: BootstrapConfig, schedule_epoch: DateTime<Utc>) -> NodeContext {
    let registers = Registers {
        node_shared_secrets_genesis_address: config.node_shared_secrets_genesis_address,
        origin_genesis_addresses: config.origin_genesis_addresses,
        reward_genesis_address: config.reward_genesis_address,
        node_rewards_genesis_address: config.node_rewards_genesis_address,
        oracle_genesis_address: config.oracle_genesis_address,
        allowed_node_key_origins: config.allowed_node_key_origins,
        content_max_size: config.content_max_size,
    };

    NodeContext {
        registers,
        membership: NodeMembership::new(),
        chain_store: InMemoryChainStore::new(),
        pools: InMemoryPools::new(),
        schedulers: FixedIntervalSchedulers::with_defaults(schedule_epoch),
        pub_sub: TransactionAcceptancePubSub::new(),
        mining: LoggingMiningCoordinator::new(),
        network_seed: config.network_seed,
        mining_timeout: Duration::from_secs(config.mining_timeout_secs),
    }
}

impl NodeContext {
    /// Borrow every collaborator into the bundle [`ambernet_dispatch::process`]
    /// takes. Short-lived by design: callers build this once per request
    /// (or once per connection loop iteration), never store it.
    pub fn collaborators(&self) -> ambernet_dispatch::Collaborators<'_> {
        ambernet_dispatch::Collaborators {
            chain_store: &self.chain_store,
            p2p: &self.membership,
            mining: &self.mining,
            pub_sub: &self.pub_sub,
            validation: ambernet_validate::ValidationContext {
                chain_store: &self.chain_store,
                node_directory: &self.membership,
                pools: &self.pools,
                schedulers: &self.schedulers,
                registers: &self.registers,
            },
            network_seed: &self.network_seed,
            mining_timeout: self.mining_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambernet_crypto::algorithm::HashAlgorithm;

    fn sample_config() -> BootstrapConfig {
        BootstrapConfig {
            node_shared_secrets_genesis_address: TaggedHash::compute(HashAlgorithm::Sha256, b"nss"),
            origin_genesis_addresses: HashSet::from([TaggedHash::compute(HashAlgorithm::Sha256, b"origin")]),
            reward_genesis_address: TaggedHash::compute(HashAlgorithm::Sha256, b"reward"),
            node_rewards_genesis_address: TaggedHash::compute(HashAlgorithm::Sha256, b"node-reward"),
            oracle_genesis_address: TaggedHash::compute(HashAlgorithm::Sha256, b"oracle"),
            allowed_node_key_origins: HashSet::new(),
            content_max_size: 3_500_000,
            mining_timeout_secs: 60,
            network_seed: b"seed".to_vec(),
        }
    }

    #[test]
    fn bootstrap_builds_a_usable_collaborator_bundle() {
        let epoch: DateTime<Utc> = "2022-01-01T00:00:00Z".parse().unwrap();
        let context = bootstrap(sample_config(), epoch);
        let _collaborators = context.collaborators();
        assert_eq!(context.mining_timeout, Duration::from_secs(60));
    }
}
