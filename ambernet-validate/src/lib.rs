//! The pending-transaction admission gate: universal checks that apply
//! to every transaction, followed by the per-type rules in [`rules`].
//!
//! `validate` is pure given its `now` and collaborator arguments: no wall
//! clock reads, no mutation of anything the collaborators expose.

pub mod collaborators;
pub mod content;
pub mod error;
mod rules;

pub use collaborators::{ChainStore, NodeDirectory, PoolsMemTable, Registers, Schedulers, ValidationContext};
pub use error::ValidationError;

use ambernet_tx::Transaction;
use chrono::{DateTime, Utc};

/// Run every admission check over `tx` as of `now`, using `ctx` for every
/// lookup delegated to an external collaborator.
pub fn validate(tx: &Transaction, now: DateTime<Utc>, ctx: &ValidationContext) -> Result<(), ValidationError> {
    verify_previous_signature(tx)?;
    verify_origin_signature(tx, ctx)?;
    check_content_size(tx, ctx)?;
    check_ownerships(tx)?;
    check_key_origin(tx, ctx)?;

    rules::apply(tx, now, ctx)
}

fn verify_previous_signature(tx: &Transaction) -> Result<(), ValidationError> {
    let data = tx.data_bytes().map_err(|_| ValidationError::TooManyEntries {
        type_name: tx.tx_type.wire_name(),
    })?;
    tx.previous_public_key
        .verify(&data, &tx.previous_signature)
        .map_err(|_| ValidationError::InvalidPreviousSignature)
}

fn verify_origin_signature(tx: &Transaction, ctx: &ValidationContext) -> Result<(), ValidationError> {
    let body = tx.body_bytes().map_err(|_| ValidationError::TooManyEntries {
        type_name: tx.tx_type.wire_name(),
    })?;
    let verifies = ctx
        .node_directory
        .known_origin_public_keys()
        .iter()
        .any(|key| key.verify(&body, &tx.origin_signature).is_ok());
    if verifies {
        Ok(())
    } else {
        Err(ValidationError::InvalidOriginSignature)
    }
}

fn check_content_size(tx: &Transaction, ctx: &ValidationContext) -> Result<(), ValidationError> {
    if tx.data.content.len() > ctx.registers.content_max_size {
        return Err(ValidationError::ContentTooLarge {
            type_name: tx.tx_type.wire_name(),
        });
    }
    Ok(())
}

fn check_ownerships(tx: &Transaction) -> Result<(), ValidationError> {
    let type_name = tx.tx_type.wire_name();
    for ownership in &tx.data.ownerships {
        if ownership.secret.is_empty() {
            return Err(ValidationError::EmptyOwnershipSecret { type_name });
        }
        if ownership.authorized_keys.is_empty() {
            return Err(ValidationError::EmptyAuthorizedKeys { type_name });
        }
    }
    Ok(())
}

fn check_key_origin(tx: &Transaction, ctx: &ValidationContext) -> Result<(), ValidationError> {
    if ctx.registers.allowed_node_key_origins.is_empty() {
        return Ok(());
    }
    let origin = ctx.node_directory.key_origin(&tx.previous_public_key);
    let allowed = origin
        .map(|origin| ctx.registers.allowed_node_key_origins.contains(&origin))
        .unwrap_or(false);
    if allowed {
        Ok(())
    } else {
        Err(ValidationError::InvalidKeyOrigin {
            type_name: tx.tx_type.wire_name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambernet_codec::cursor::Writer;
    use ambernet_crypto::algorithm::HashAlgorithm;
    use ambernet_crypto::certificate::get_key_certificate;
    use ambernet_crypto::derive::{derive_address, derive_keypair, sign};
    use ambernet_crypto::{TaggedHash, TaggedPublicKey};
    use ambernet_tx::{Transaction, TransactionData, TransactionType, TxLedger};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeChainStore {
        last_chain_address: Mutex<HashMap<TaggedHash, (TaggedHash, DateTime<Utc>)>>,
        transactions: Mutex<HashMap<TaggedHash, Transaction>>,
        latest_burned_fees: Mutex<u64>,
    }

    impl ChainStore for FakeChainStore {
        fn get_last_chain_address(&self, address: &TaggedHash) -> Option<(TaggedHash, DateTime<Utc>)> {
            self.last_chain_address.lock().unwrap().get(address).cloned()
        }

        fn get_last_chain_address_before(
            &self,
            address: &TaggedHash,
            _before: DateTime<Utc>,
        ) -> Option<(TaggedHash, DateTime<Utc>)> {
            self.get_last_chain_address(address)
        }

        fn get_transaction(&self, address: &TaggedHash) -> Option<Transaction> {
            self.transactions.lock().unwrap().get(address).cloned()
        }

        fn get_first_transaction(&self, address: &TaggedHash) -> Option<Transaction> {
            self.get_transaction(address)
        }

        fn transaction_exists(&self, address: &TaggedHash) -> bool {
            self.transactions.lock().unwrap().contains_key(address)
        }

        fn get_latest_burned_fees(&self) -> u64 {
            *self.latest_burned_fees.lock().unwrap()
        }
    }

    #[derive(Default)]
    struct FakeNodeDirectory {
        known_first_keys: HashSet<TaggedPublicKey>,
        key_origins: HashMap<TaggedPublicKey, String>,
        origin_keys: HashSet<TaggedPublicKey>,
    }

    impl NodeDirectory for FakeNodeDirectory {
        fn is_known_node_first_public_key(&self, key: &TaggedPublicKey) -> bool {
            self.known_first_keys.contains(key)
        }

        fn key_origin(&self, key: &TaggedPublicKey) -> Option<String> {
            self.key_origins.get(key).cloned()
        }

        fn known_origin_public_keys(&self) -> HashSet<TaggedPublicKey> {
            self.origin_keys.clone()
        }
    }

    #[derive(Default)]
    struct FakePools {
        members_by_pool: HashMap<String, HashSet<TaggedPublicKey>>,
    }

    impl PoolsMemTable for FakePools {
        fn members(&self, pool: &str) -> HashSet<TaggedPublicKey> {
            self.members_by_pool.get(pool).cloned().unwrap_or_default()
        }
    }

    struct FakeSchedulers {
        last_trigger: DateTime<Utc>,
    }

    impl Schedulers for FakeSchedulers {
        fn last_trigger_at(&self, _tx_type: TransactionType, _now: DateTime<Utc>) -> DateTime<Utc> {
            self.last_trigger
        }
    }

    fn sample_registers(origin_genesis: TaggedHash) -> Registers {
        Registers {
            node_shared_secrets_genesis_address: derive_address(
                &derive_keypair(b"nss-genesis", 0).0,
                HashAlgorithm::Sha256,
            ),
            origin_genesis_addresses: HashSet::from([origin_genesis]),
            reward_genesis_address: derive_address(&derive_keypair(b"reward-genesis", 0).0, HashAlgorithm::Sha256),
            node_rewards_genesis_address: derive_address(
                &derive_keypair(b"node-reward-genesis", 0).0,
                HashAlgorithm::Sha256,
            ),
            oracle_genesis_address: derive_address(&derive_keypair(b"oracle-genesis", 0).0, HashAlgorithm::Sha256),
            allowed_node_key_origins: HashSet::new(),
            content_max_size: 3_500_000,
        }
    }

    fn far_past_trigger() -> DateTime<Utc> {
        "2000-01-01T00:00:00Z".parse().unwrap()
    }

    fn now() -> DateTime<Utc> {
        "2024-01-01T00:00:00Z".parse().unwrap()
    }

    /// Build a `node` transaction signed by `previous_key` and `origin_key`,
    /// with `content` as its raw payload.
    fn signed_node_tx(
        previous_public: TaggedPublicKey,
        previous_private: &ambernet_crypto::derive::PrivateKey,
        origin_private: &ambernet_crypto::derive::PrivateKey,
        content: Vec<u8>,
    ) -> Transaction {
        let address = derive_address(&derive_keypair(b"node-under-test-next", 0).0, HashAlgorithm::Sha256);
        let data = TransactionData {
            content,
            code: String::new(),
            ownerships: vec![],
            recipients: vec![],
            ledger: TxLedger::default(),
        };

        let mut tx = Transaction {
            address,
            tx_type: TransactionType::Node,
            previous_public_key: previous_public,
            previous_signature: vec![],
            origin_signature: vec![],
            data,
        };
        tx.previous_signature = sign(previous_private, &tx.data_bytes().unwrap());
        tx.origin_signature = sign(origin_private, &tx.body_bytes().unwrap());
        tx
    }

    fn node_content(reward_address: &TaggedHash, origin_public: &TaggedPublicKey, certificate: &[u8]) -> Vec<u8> {
        let mut w = Writer::new();
        w.raw(&[80, 20, 10, 200]);
        w.u16(3000);
        w.u16(4000);
        w.u8(0);
        w.tagged_hash(reward_address);
        w.tagged_key(origin_public);
        w.u16(certificate.len() as u16);
        w.raw(certificate);
        w.into_bytes()
    }

    #[test]
    fn node_transaction_with_well_formed_content_is_admitted() {
        let (origin_public, origin_private) = derive_keypair(b"origin-for-node-test", 0);
        let (node_public, node_private) = derive_keypair(b"node-under-test", 0);
        let (reward_key, _) = derive_keypair(b"node-reward", 0);
        let reward_address = derive_address(&reward_key, HashAlgorithm::Sha256);

        let certificate = get_key_certificate(&node_public, &origin_private);
        let content = node_content(&reward_address, &origin_public, &certificate);

        let tx = signed_node_tx(node_public, &node_private, &origin_private, content);

        let chain_store = FakeChainStore::default();
        let node_directory = FakeNodeDirectory {
            origin_keys: HashSet::from([origin_public.clone()]),
            ..Default::default()
        };
        let pools = FakePools::default();
        let schedulers = FakeSchedulers {
            last_trigger: far_past_trigger(),
        };
        let registers = sample_registers(TaggedHash::compute(HashAlgorithm::Sha256, b"unused-origin-genesis"));

        let ctx = ValidationContext {
            chain_store: &chain_store,
            node_directory: &node_directory,
            pools: &pools,
            schedulers: &schedulers,
            registers: &registers,
        };

        assert_eq!(validate(&tx, now(), &ctx), Ok(()));
    }

    #[test]
    fn node_transaction_with_disallowed_key_origin_is_rejected() {
        let (origin_public, origin_private) = derive_keypair(b"origin-for-node-test-2", 0);
        let (node_public, node_private) = derive_keypair(b"node-under-test-2", 0);
        let (reward_key, _) = derive_keypair(b"node-reward-2", 0);
        let reward_address = derive_address(&reward_key, HashAlgorithm::Sha256);

        let certificate = get_key_certificate(&node_public, &origin_private);
        let content = node_content(&reward_address, &origin_public, &certificate);

        let tx = signed_node_tx(node_public.clone(), &node_private, &origin_private, content);

        let chain_store = FakeChainStore::default();
        let mut node_directory = FakeNodeDirectory {
            origin_keys: HashSet::from([origin_public]),
            ..Default::default()
        };
        node_directory.key_origins.insert(node_public, "untrusted".to_string());
        let pools = FakePools::default();
        let schedulers = FakeSchedulers {
            last_trigger: far_past_trigger(),
        };
        let mut registers = sample_registers(TaggedHash::compute(HashAlgorithm::Sha256, b"unused-origin-genesis"));
        registers.allowed_node_key_origins = HashSet::from(["tpm".to_string()]);

        let ctx = ValidationContext {
            chain_store: &chain_store,
            node_directory: &node_directory,
            pools: &pools,
            schedulers: &schedulers,
            registers: &registers,
        };

        assert_eq!(
            validate(&tx, now(), &ctx),
            Err(ValidationError::InvalidKeyOrigin { type_name: "node" })
        );
    }

    #[test]
    fn node_transaction_with_oversized_content_is_rejected() {
        let (origin_public, origin_private) = derive_keypair(b"origin-for-node-test-3", 0);
        let (node_public, node_private) = derive_keypair(b"node-under-test-3", 0);
        let content = vec![0u8; 4 * 1024 * 1024];

        let tx = signed_node_tx(node_public, &node_private, &origin_private, content);

        let chain_store = FakeChainStore::default();
        let node_directory = FakeNodeDirectory {
            origin_keys: HashSet::from([origin_public]),
            ..Default::default()
        };
        let pools = FakePools::default();
        let schedulers = FakeSchedulers {
            last_trigger: far_past_trigger(),
        };
        let registers = sample_registers(TaggedHash::compute(HashAlgorithm::Sha256, b"unused-origin-genesis"));

        let ctx = ValidationContext {
            chain_store: &chain_store,
            node_directory: &node_directory,
            pools: &pools,
            schedulers: &schedulers,
            registers: &registers,
        };

        assert_eq!(
            validate(&tx, now(), &ctx),
            Err(ValidationError::ContentTooLarge { type_name: "node" })
        );
    }

    #[test]
    fn mint_rewards_supply_mismatch_is_rejected() {
        let (origin_public, origin_private) = derive_keypair(b"origin-for-mint-test", 0);
        let (reward_key, reward_private) = derive_keypair(b"reward-genesis", 0);
        let reward_genesis = derive_address(&reward_key, HashAlgorithm::Sha256);

        let data = TransactionData {
            content: br#"{"supply": 300000000}"#.to_vec(),
            code: String::new(),
            ownerships: vec![],
            recipients: vec![],
            ledger: TxLedger::default(),
        };

        let mut tx = Transaction {
            address: derive_address(&derive_keypair(b"mint-rewards-next", 0).0, HashAlgorithm::Sha256),
            tx_type: TransactionType::MintRewards,
            previous_public_key: reward_key,
            previous_signature: vec![],
            origin_signature: vec![],
            data,
        };
        tx.previous_signature = sign(&reward_private, &tx.data_bytes().unwrap());
        tx.origin_signature = sign(&origin_private, &tx.body_bytes().unwrap());

        let chain_store = FakeChainStore::default();
        *chain_store.latest_burned_fees.lock().unwrap() = 200_000_000;
        let node_directory = FakeNodeDirectory {
            origin_keys: HashSet::from([origin_public]),
            ..Default::default()
        };
        let pools = FakePools::default();
        let schedulers = FakeSchedulers {
            last_trigger: far_past_trigger(),
        };
        let mut registers = sample_registers(TaggedHash::compute(HashAlgorithm::Sha256, b"unused-origin-genesis"));
        registers.reward_genesis_address = reward_genesis;

        let ctx = ValidationContext {
            chain_store: &chain_store,
            node_directory: &node_directory,
            pools: &pools,
            schedulers: &schedulers,
            registers: &registers,
        };

        assert_eq!(validate(&tx, now(), &ctx), Err(ValidationError::SupplyMismatch));
    }

    fn node_shared_secrets_content(daily_nonce: &TaggedHash, network_seed: &TaggedHash) -> Vec<u8> {
        let mut w = Writer::new();
        w.tagged_hash(daily_nonce);
        w.tagged_hash(network_seed);
        w.into_bytes()
    }

    #[test]
    fn node_shared_secrets_with_two_known_authorized_keys_is_admitted() {
        let (origin_public, origin_private) = derive_keypair(b"origin-for-nss-test", 0);
        let (nss_key, nss_private) = derive_keypair(b"nss-genesis", 0);
        let nss_genesis = derive_address(&nss_key, HashAlgorithm::Sha256);

        let (node_a, _) = derive_keypair(b"nss-authorized-node-a", 0);
        let (node_b, _) = derive_keypair(b"nss-authorized-node-b", 0);
        let mut authorized_keys = std::collections::BTreeMap::new();
        authorized_keys.insert(node_a.clone(), vec![1, 2, 3]);
        authorized_keys.insert(node_b.clone(), vec![4, 5, 6]);

        let daily_nonce = TaggedHash::compute(HashAlgorithm::Sha256, b"daily-nonce");
        let network_seed = TaggedHash::compute(HashAlgorithm::Sha256, b"network-seed");
        let content = node_shared_secrets_content(&daily_nonce, &network_seed);

        let data = TransactionData {
            content,
            code: String::new(),
            ownerships: vec![ambernet_tx::Ownership::new(b"shared-secret".to_vec(), authorized_keys)],
            recipients: vec![],
            ledger: TxLedger::default(),
        };

        let mut tx = Transaction {
            address: derive_address(&derive_keypair(b"nss-next", 0).0, HashAlgorithm::Sha256),
            tx_type: TransactionType::NodeSharedSecrets,
            previous_public_key: nss_key,
            previous_signature: vec![],
            origin_signature: vec![],
            data,
        };
        tx.previous_signature = sign(&nss_private, &tx.data_bytes().unwrap());
        tx.origin_signature = sign(&origin_private, &tx.body_bytes().unwrap());

        let chain_store = FakeChainStore::default();
        let node_directory = FakeNodeDirectory {
            origin_keys: HashSet::from([origin_public]),
            known_first_keys: HashSet::from([node_a, node_b]),
            ..Default::default()
        };
        let pools = FakePools::default();
        let schedulers = FakeSchedulers {
            last_trigger: far_past_trigger(),
        };
        let mut registers = sample_registers(TaggedHash::compute(HashAlgorithm::Sha256, b"unused-origin-genesis"));
        registers.node_shared_secrets_genesis_address = nss_genesis;

        let ctx = ValidationContext {
            chain_store: &chain_store,
            node_directory: &node_directory,
            pools: &pools,
            schedulers: &schedulers,
            registers: &registers,
        };

        assert_eq!(validate(&tx, now(), &ctx), Ok(()));
    }

    #[test]
    fn oracle_transaction_after_a_later_trigger_is_rejected() {
        let (origin_public, origin_private) = derive_keypair(b"origin-for-oracle-test", 0);
        let (oracle_key, oracle_private) = derive_keypair(b"oracle-genesis", 0);
        let oracle_genesis = derive_address(&oracle_key, HashAlgorithm::Sha256);

        let data = TransactionData {
            content: br#"{"services": {}}"#.to_vec(),
            code: String::new(),
            ownerships: vec![],
            recipients: vec![],
            ledger: TxLedger::default(),
        };

        let previous_oracle_tx_address = derive_address(&derive_keypair(b"oracle-previous", 0).0, HashAlgorithm::Sha256);
        let mut tx = Transaction {
            address: derive_address(&derive_keypair(b"oracle-next", 0).0, HashAlgorithm::Sha256),
            tx_type: TransactionType::Oracle,
            previous_public_key: oracle_key,
            previous_signature: vec![],
            origin_signature: vec![],
            data,
        };
        tx.previous_signature = sign(&oracle_private, &tx.data_bytes().unwrap());
        tx.origin_signature = sign(&origin_private, &tx.body_bytes().unwrap());

        let chain_store = FakeChainStore::default();
        // An oracle transaction already landed in this scheduler window, so
        // a second one in the same window is stale.
        chain_store.last_chain_address.lock().unwrap().insert(
            oracle_genesis.clone(),
            (previous_oracle_tx_address, "2022-01-01T00:10:01Z".parse().unwrap()),
        );
        let node_directory = FakeNodeDirectory {
            origin_keys: HashSet::from([origin_public]),
            ..Default::default()
        };
        let pools = FakePools::default();
        let schedulers = FakeSchedulers {
            last_trigger: "2022-01-01T00:10:00Z".parse().unwrap(),
        };
        let mut registers = sample_registers(TaggedHash::compute(HashAlgorithm::Sha256, b"unused-origin-genesis"));
        registers.oracle_genesis_address = oracle_genesis;

        let ctx = ValidationContext {
            chain_store: &chain_store,
            node_directory: &node_directory,
            pools: &pools,
            schedulers: &schedulers,
            registers: &registers,
        };

        let submitted_at: DateTime<Utc> = "2022-01-01T00:10:03Z".parse().unwrap();
        assert_eq!(
            validate(&tx, submitted_at, &ctx),
            Err(ValidationError::InvalidOracleTriggerTime)
        );
    }
}
