//! An in-memory stand-in for the storage engine `ChainStore` abstracts over.
//! Sufficient to exercise the dispatcher and validator: transactions are
//! kept in a flat table plus a forward index from each chain's genesis
//! address to its current head, exactly the two shapes both collaborator
//! traits query.
//!
//! The ledger views (`get_balance`, `get_unspent_outputs`,
//! `get_transaction_inputs`) belong to the ledger/account-state subsystem,
//! out of scope here; this store always answers them empty. See
//! `DESIGN.md` for the scope note.

use std::collections::HashMap;
use std::sync::RwLock;

use ambernet_crypto::{TaggedHash, TaggedPublicKey};
use ambernet_tx::{Transaction, TransactionType};
use chrono::{DateTime, TimeZone, Utc};

use ambernet_codec::frame::{TokenBalance, TransactionInput, UnspentOutput};

#[derive(Default)]
pub struct InMemoryChainStore {
    transactions: RwLock<HashMap<TaggedHash, Transaction>>,
    recorded_at: RwLock<HashMap<TaggedHash, DateTime<Utc>>>,
    /// genesis/chain-root address -> (head address, recorded-at).
    chain_heads: RwLock<HashMap<TaggedHash, (TaggedHash, DateTime<Utc>)>>,
    latest_burned_fees: RwLock<u64>,
}

impl InMemoryChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_latest_burned_fees(&self, fees: u64) {
        *self.latest_burned_fees.write().unwrap() = fees;
    }

    /// Seed a chain entry directly, as if `tx_address` had been recorded on
    /// `genesis`'s chain at `at`. Used by bootstrap and tests to establish
    /// prior history the validator's scheduler-window check consults.
    pub fn seed_chain_entry(&self, genesis: TaggedHash, tx_address: TaggedHash, at: DateTime<Utc>) {
        self.chain_heads.write().unwrap().insert(genesis, (tx_address, at));
    }

    /// Record `tx` as pending, at wall-clock time `at`. Advances the head
    /// of the chain rooted at `tx.previous_address()`.
    pub fn insert_transaction(&self, tx: Transaction, at: DateTime<Utc>) {
        let genesis = tx.previous_address();
        let address = tx.address.clone();
        self.chain_heads.write().unwrap().insert(genesis, (address.clone(), at));
        self.recorded_at.write().unwrap().insert(address.clone(), at);
        self.transactions.write().unwrap().insert(address, tx);
    }

    /// Walk backward through `previous_address()` links from `address`
    /// until the chain runs out of recorded predecessors, returning the
    /// oldest transaction found (the chain's first recorded transaction).
    fn first_transaction_locked(&self, address: &TaggedHash) -> Option<Transaction> {
        let transactions = self.transactions.read().unwrap();
        let mut current = transactions.get(address)?.clone();
        loop {
            let previous_address = current.previous_address();
            match transactions.get(&previous_address) {
                Some(previous) => current = previous.clone(),
                None => return Some(current),
            }
        }
    }
}

impl ambernet_dispatch::ChainStore for InMemoryChainStore {
    fn get_transaction(&self, address: &TaggedHash) -> Option<Transaction> {
        self.transactions.read().unwrap().get(address).cloned()
    }

    fn get_last_transaction(&self, address: &TaggedHash) -> Option<Transaction> {
        ambernet_dispatch::ChainStore::get_transaction(self, address)
    }

    fn get_transaction_chain(&self, address: &TaggedHash, after: Option<u32>) -> Vec<Transaction> {
        let Some((head, _)) = self.chain_heads.read().unwrap().get(address).cloned() else {
            return Vec::new();
        };
        let Some(tx) = self.get_transaction(&head) else {
            return Vec::new();
        };
        match after {
            Some(after) => {
                let recorded = self.recorded_at.read().unwrap().get(&head).copied();
                match recorded {
                    Some(at) if at.timestamp() as u32 > after => vec![tx],
                    Some(_) => Vec::new(),
                    None => vec![tx],
                }
            }
            None => vec![tx],
        }
    }

    fn get_unspent_outputs(&self, _address: &TaggedHash) -> Vec<UnspentOutput> {
        Vec::new()
    }

    fn get_transaction_inputs(&self, _address: &TaggedHash) -> Vec<TransactionInput> {
        Vec::new()
    }

    fn get_transaction_chain_length(&self, address: &TaggedHash) -> u32 {
        u32::from(self.chain_heads.read().unwrap().contains_key(address))
    }

    fn get_balance(&self, _address: &TaggedHash) -> (u64, Vec<TokenBalance>) {
        (0, Vec::new())
    }

    fn get_last_transaction_address(&self, address: &TaggedHash, timestamp: u32) -> Option<(TaggedHash, u32)> {
        let (head, at) = self.chain_heads.read().unwrap().get(address).cloned()?;
        if at.timestamp() as u32 >= timestamp {
            Some((head, at.timestamp() as u32))
        } else {
            None
        }
    }

    fn get_first_public_key(&self, address: &TaggedHash) -> Option<TaggedPublicKey> {
        self.first_transaction_locked(address).map(|tx| tx.previous_public_key)
    }

    fn get_transaction_summary(&self, address: &TaggedHash) -> Option<(TransactionType, u32)> {
        let tx = self.get_transaction(address)?;
        let at = self.recorded_at.read().unwrap().get(address).copied().unwrap_or_else(Utc::now);
        Some((tx.tx_type, at.timestamp() as u32))
    }

    fn notify_last_transaction_address(&self, address: &TaggedHash, next_address: &TaggedHash, timestamp: u32) {
        let at = Utc.timestamp_opt(i64::from(timestamp), 0).single().unwrap_or_else(Utc::now);
        self.chain_heads.write().unwrap().insert(address.clone(), (next_address.clone(), at));
    }

    fn submit_transaction(&self, tx: Transaction) {
        self.insert_transaction(tx, Utc::now());
    }
}

impl ambernet_validate::ChainStore for InMemoryChainStore {
    fn get_last_chain_address(&self, address: &TaggedHash) -> Option<(TaggedHash, DateTime<Utc>)> {
        self.chain_heads.read().unwrap().get(address).cloned()
    }

    fn get_last_chain_address_before(
        &self,
        address: &TaggedHash,
        before: DateTime<Utc>,
    ) -> Option<(TaggedHash, DateTime<Utc>)> {
        self.chain_heads
            .read()
            .unwrap()
            .get(address)
            .cloned()
            .filter(|(_, at)| *at < before)
    }

    fn get_transaction(&self, address: &TaggedHash) -> Option<Transaction> {
        ambernet_validate::ChainStore::get_transaction(self, address)
    }

    fn get_first_transaction(&self, address: &TaggedHash) -> Option<Transaction> {
        self.first_transaction_locked(address)
    }

    fn transaction_exists(&self, address: &TaggedHash) -> bool {
        self.transactions.read().unwrap().contains_key(address)
    }

    fn get_latest_burned_fees(&self) -> u64 {
        *self.latest_burned_fees.read().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambernet_crypto::algorithm::HashAlgorithm;
    use ambernet_crypto::derive::{derive_address, derive_keypair, sign};
    use ambernet_tx::{TransactionData, TxLedger};

    fn sample_tx(seed: &[u8], previous_seed: &[u8]) -> Transaction {
        let (previous_public, previous_private) = derive_keypair(previous_seed, 0);
        let (origin_public, origin_private) = derive_keypair(b"origin", 0);
        let _ = origin_public;
        let address = derive_address(&derive_keypair(seed, 0).0, HashAlgorithm::Sha256);
        let mut tx = Transaction {
            address,
            tx_type: TransactionType::Transfer,
            previous_public_key: previous_public,
            previous_signature: vec![],
            origin_signature: vec![],
            data: TransactionData {
                content: vec![],
                code: String::new(),
                ownerships: vec![],
                recipients: vec![],
                ledger: TxLedger::default(),
            },
        };
        tx.previous_signature = sign(&previous_private, &tx.data_bytes().unwrap());
        tx.origin_signature = sign(&origin_private, &tx.body_bytes().unwrap());
        tx
    }

    #[test]
    fn inserted_transaction_is_retrievable_and_becomes_chain_head() {
        let store = InMemoryChainStore::new();
        let tx = sample_tx(b"chain-tx-1", b"chain-genesis-1");
        let genesis = tx.previous_address();
        let address = tx.address.clone();
        let now: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
        store.insert_transaction(tx, now);

        assert!(ambernet_validate::ChainStore::transaction_exists(&store, &address));
        assert_eq!(
            ambernet_validate::ChainStore::get_last_chain_address(&store, &genesis),
            Some((address, now))
        );
    }

    #[test]
    fn first_transaction_walks_back_to_the_chain_root() {
        let store = InMemoryChainStore::new();
        let first = sample_tx(b"chain-tx-first", b"chain-genesis-2");
        let first_address = first.address.clone();
        let now: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
        store.insert_transaction(first, now);

        // second spends from first's key material, chaining forward.
        let (second_public, second_private) = derive_keypair(b"chain-tx-first", 0);
        let (origin_public, origin_private) = derive_keypair(b"origin", 0);
        let _ = origin_public;
        let second_address = derive_address(&derive_keypair(b"chain-tx-second", 0).0, HashAlgorithm::Sha256);
        let mut second = Transaction {
            address: second_address.clone(),
            tx_type: TransactionType::Transfer,
            previous_public_key: second_public,
            previous_signature: vec![],
            origin_signature: vec![],
            data: TransactionData {
                content: vec![],
                code: String::new(),
                ownerships: vec![],
                recipients: vec![],
                ledger: TxLedger::default(),
            },
        };
        second.previous_signature = sign(&second_private, &second.data_bytes().unwrap());
        second.origin_signature = sign(&origin_private, &second.body_bytes().unwrap());
        store.insert_transaction(second, now);

        let first_tx = ambernet_validate::ChainStore::get_first_transaction(&store, &second_address).unwrap();
        assert_eq!(first_tx.address, first_address);
    }
}
