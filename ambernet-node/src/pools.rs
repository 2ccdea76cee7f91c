//! In-memory `PoolsMemTable`: named sets of public keys, e.g. the
//! `technical_council` pool `code_approval` consults.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use ambernet_crypto::TaggedPublicKey;
use ambernet_validate::PoolsMemTable;

#[derive(Default)]
pub struct InMemoryPools {
    members_by_pool: RwLock<HashMap<String, HashSet<TaggedPublicKey>>>,
}

impl InMemoryPools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_member(&self, pool: impl Into<String>, member: TaggedPublicKey) {
        self.members_by_pool.write().unwrap().entry(pool.into()).or_default().insert(member);
    }
}

impl PoolsMemTable for InMemoryPools {
    fn members(&self, pool: &str) -> HashSet<TaggedPublicKey> {
        self.members_by_pool.read().unwrap().get(pool).cloned().unwrap_or_default()
    }
}
