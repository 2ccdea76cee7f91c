//! The node record and its membership lifecycle.

use ambernet_crypto::{TaggedHash, TaggedPublicKey};

/// Transport layer a node advertises. TCP is the only one admitted today;
/// the enum exists so decoding an unknown transport fails instead of
/// silently defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Tcp,
}

/// A registered node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub first_public_key: TaggedPublicKey,
    pub last_public_key: TaggedPublicKey,
    pub ip: std::net::Ipv4Addr,
    pub port: u16,
    pub http_port: u16,
    pub transport: Transport,
    pub reward_address: TaggedHash,
    /// 3 hex characters used for nearest-neighbour routing.
    pub network_patch: [u8; 3],
    pub origin_public_key: TaggedPublicKey,
    pub certificate: Vec<u8>,
    pub available: bool,
    pub authorized: bool,
    pub authorization_date: Option<chrono::DateTime<chrono::Utc>>,
    pub geo_patch: [u8; 3],
}

impl Node {
    /// Mark the node as available.
    pub fn set_available(&mut self) {
        self.available = true;
    }

    pub fn set_unavailable(&mut self) {
        self.available = false;
    }

    /// Mark the node as authorized as of `at`.
    pub fn authorize(&mut self, at: chrono::DateTime<chrono::Utc>) {
        self.authorized = true;
        self.authorization_date = Some(at);
    }
}
