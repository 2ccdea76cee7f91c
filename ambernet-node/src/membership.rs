//! The in-memory node membership table: nodes are registered by a
//! bootstrap step and mutated only via explicit availability/authorisation
//! transitions thereafter.
//!
//! Read-mostly discipline: a single writer during bootstrap/rotation, many
//! concurrent readers, no reader ever observes a partially updated set. A
//! `std::sync::RwLock` gives that directly since every method
//! [`ambernet_validate::NodeDirectory`] and [`ambernet_dispatch::P2P`] name
//! is synchronous.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use ambernet_crypto::TaggedPublicKey;
use ambernet_tx::Node;
use chrono::{DateTime, Utc};

use ambernet_dispatch::P2P;
use ambernet_validate::NodeDirectory;

/// Process-wide node membership and the origin keys currently recognised
/// for `origin_signature` verification.
#[derive(Default)]
pub struct NodeMembership {
    by_first_key: RwLock<HashMap<TaggedPublicKey, Node>>,
    key_origins: RwLock<HashMap<TaggedPublicKey, String>>,
    origin_keys: RwLock<HashSet<TaggedPublicKey>>,
}

impl NodeMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bootstrap-register `node`, attesting its key under `key_origin`
    /// (e.g. `"tpm"`), the value [`ambernet_validate::NodeDirectory::key_origin`]
    /// returns for it.
    pub fn register(&self, node: Node, key_origin: impl Into<String>) {
        let key_origin = key_origin.into();
        self.key_origins
            .write()
            .unwrap()
            .insert(node.first_public_key.clone(), key_origin);
        self.by_first_key.write().unwrap().insert(node.first_public_key.clone(), node);
    }

    /// Recognise `public_key` as a valid origin key, i.e. one
    /// `origin_signature` may verify under.
    pub fn recognize_origin_key(&self, public_key: TaggedPublicKey) {
        self.origin_keys.write().unwrap().insert(public_key);
    }

    pub fn set_available(&self, key: &TaggedPublicKey) {
        if let Some(node) = self.by_first_key.write().unwrap().get_mut(key) {
            node.set_available();
        }
    }

    pub fn set_unavailable(&self, key: &TaggedPublicKey) {
        if let Some(node) = self.by_first_key.write().unwrap().get_mut(key) {
            node.set_unavailable();
        }
    }

    pub fn authorize(&self, key: &TaggedPublicKey, at: DateTime<Utc>) {
        if let Some(node) = self.by_first_key.write().unwrap().get_mut(key) {
            node.authorize(at);
        }
    }
}

impl NodeDirectory for NodeMembership {
    fn is_known_node_first_public_key(&self, key: &TaggedPublicKey) -> bool {
        self.by_first_key.read().unwrap().contains_key(key)
    }

    fn key_origin(&self, key: &TaggedPublicKey) -> Option<String> {
        self.key_origins.read().unwrap().get(key).cloned()
    }

    fn known_origin_public_keys(&self) -> HashSet<TaggedPublicKey> {
        self.origin_keys.read().unwrap().clone()
    }
}

impl P2P for NodeMembership {
    fn list_nodes(&self) -> Vec<Node> {
        self.by_first_key.read().unwrap().values().cloned().collect()
    }

    fn authorized_nodes(&self) -> Vec<Node> {
        self.by_first_key
            .read()
            .unwrap()
            .values()
            .filter(|node| node.authorized)
            .cloned()
            .collect()
    }

    fn nearest_nodes(&self, patch: [u8; 3]) -> Vec<Node> {
        let mut nodes: Vec<Node> = self.by_first_key.read().unwrap().values().cloned().collect();
        nodes.sort_by_key(|node| patch_distance(&node.network_patch, &patch));
        nodes
    }

    fn get_node_info(&self, key: &TaggedPublicKey) -> Option<Node> {
        self.by_first_key.read().unwrap().get(key).cloned()
    }

    fn set_node_globally_available(&self, key: &TaggedPublicKey) {
        self.set_available(key);
    }

    fn nodes_availability_as_bits(&self, keys: &[TaggedPublicKey]) -> Vec<bool> {
        let table = self.by_first_key.read().unwrap();
        keys.iter()
            .map(|key| table.get(key).map(|node| node.available).unwrap_or(false))
            .collect()
    }
}

/// Manhattan distance between two 3-hex-character patches, treating each
/// byte independently. Good enough to rank "nearest" among bootstrap-seeded
/// patches; the real locality metric lives in the routing subsystem out of
/// scope here.
fn patch_distance(a: &[u8; 3], b: &[u8; 3]) -> u32 {
    a.iter().zip(b.iter()).map(|(x, y)| (i32::from(*x) - i32::from(*y)).unsigned_abs()).sum()
}
