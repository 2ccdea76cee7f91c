//! Decoders for the type-specific payloads packed into `Transaction::data.content`.
//!
//! These are plain byte layouts, not wire frames, but they reuse the same
//! cursor the codec uses to stay consistent with the rest of the protocol.

use ambernet_codec::cursor::Reader;
use ambernet_crypto::{TaggedHash, TaggedPublicKey};
use ambernet_tx::node::Transport;
use serde::Deserialize;

use crate::error::ValidationError;

/// `node` transaction content:
/// `ipv4[4] ‖ port:u16 ‖ http_port:u16 ‖ transport:u8 ‖ reward_address ‖
/// origin_public_key ‖ certificate_len:u16 ‖ certificate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeContent {
    pub ip: std::net::Ipv4Addr,
    pub port: u16,
    pub http_port: u16,
    pub transport: Transport,
    pub reward_address: TaggedHash,
    pub origin_public_key: TaggedPublicKey,
    pub certificate: Vec<u8>,
}

pub fn decode_node_content(bytes: &[u8]) -> Result<NodeContent, ValidationError> {
    let mut r = Reader::new(bytes);
    let ip_bytes = r.bytes(4, "content.ip").map_err(|_| ValidationError::InvalidNodeContent)?;
    let ip = std::net::Ipv4Addr::new(ip_bytes[0], ip_bytes[1], ip_bytes[2], ip_bytes[3]);
    let port = r.u16("content.port").map_err(|_| ValidationError::InvalidNodeContent)?;
    let http_port = r.u16("content.http_port").map_err(|_| ValidationError::InvalidNodeContent)?;
    let transport = match r.u8("content.transport").map_err(|_| ValidationError::InvalidNodeContent)? {
        0 => Transport::Tcp,
        _ => return Err(ValidationError::InvalidNodeContent),
    };
    let reward_address = r.tagged_hash().map_err(|_| ValidationError::InvalidNodeContent)?;
    let origin_public_key = r.tagged_key().map_err(|_| ValidationError::InvalidNodeContent)?;
    let cert_len = r.u16("content.certificate.len").map_err(|_| ValidationError::InvalidNodeContent)? as usize;
    let certificate = r
        .bytes(cert_len, "content.certificate")
        .map_err(|_| ValidationError::InvalidNodeContent)?
        .to_vec();

    Ok(NodeContent {
        ip,
        port,
        http_port,
        transport,
        reward_address,
        origin_public_key,
        certificate,
    })
}

/// `node_shared_secrets` content: `daily_nonce ‖ network_seed`, both tagged
/// hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSharedSecretsContent {
    pub daily_nonce: TaggedHash,
    pub network_seed: TaggedHash,
}

pub fn decode_node_shared_secrets_content(
    bytes: &[u8],
) -> Result<NodeSharedSecretsContent, ValidationError> {
    let mut r = Reader::new(bytes);
    let daily_nonce = r
        .tagged_hash()
        .map_err(|_| ValidationError::InvalidNodeSharedSecretsContent)?;
    let network_seed = r
        .tagged_hash()
        .map_err(|_| ValidationError::InvalidNodeSharedSecretsContent)?;
    if !r.is_empty() {
        return Err(ValidationError::InvalidNodeSharedSecretsContent);
    }
    Ok(NodeSharedSecretsContent { daily_nonce, network_seed })
}

/// `origin` content: `pubkey ‖ cert_size:u16 ‖ cert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginContent {
    pub public_key: TaggedPublicKey,
    pub certificate: Vec<u8>,
}

pub fn decode_origin_content(bytes: &[u8]) -> Result<OriginContent, ValidationError> {
    let mut r = Reader::new(bytes);
    let public_key = r.tagged_key().map_err(|_| ValidationError::InvalidOriginContent)?;
    let cert_len = r.u16("content.cert_size").map_err(|_| ValidationError::InvalidOriginContent)? as usize;
    let certificate = r
        .bytes(cert_len, "content.certificate")
        .map_err(|_| ValidationError::InvalidOriginContent)?
        .to_vec();
    Ok(OriginContent { public_key, certificate })
}

/// `mint_rewards` JSON content: `{"supply": <u64>}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MintRewardsContent {
    pub supply: u64,
}

pub fn decode_mint_rewards_content(bytes: &[u8]) -> Result<MintRewardsContent, ValidationError> {
    serde_json::from_slice(bytes).map_err(|_| ValidationError::InvalidMintRewardsContent)
}

/// `token` JSON content.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Fungible,
    NonFungible,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenContent {
    pub supply: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub symbol: String,
    #[serde(default)]
    pub properties: Option<serde_json::Value>,
    #[serde(default)]
    pub collection: Option<Vec<serde_json::Value>>,
}

pub fn decode_token_content(bytes: &[u8]) -> Result<TokenContent, ValidationError> {
    serde_json::from_slice(bytes).map_err(|_| ValidationError::InvalidTokenContent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambernet_codec::cursor::Writer;
    use ambernet_crypto::algorithm::HashAlgorithm;
    use ambernet_crypto::derive::{derive_address, derive_keypair};

    #[test]
    fn node_content_round_trips() {
        let (reward_key, _) = derive_keypair(b"reward", 0);
        let (origin_public_key, _) = derive_keypair(b"origin", 0);
        let reward_address = derive_address(&reward_key, HashAlgorithm::Sha256);

        let mut w = Writer::new();
        w.raw(&[80, 20, 10, 200]);
        w.u16(3000);
        w.u16(4000);
        w.u8(0);
        w.tagged_hash(&reward_address);
        w.tagged_key(&origin_public_key);
        w.u16(2);
        w.raw(&[7, 7]);
        let bytes = w.into_bytes();

        let content = decode_node_content(&bytes).unwrap();
        assert_eq!(content.ip, std::net::Ipv4Addr::new(80, 20, 10, 200));
        assert_eq!(content.port, 3000);
        assert_eq!(content.http_port, 4000);
        assert_eq!(content.certificate, vec![7, 7]);
    }

    #[test]
    fn mint_rewards_content_parses_supply() {
        let content = decode_mint_rewards_content(br#"{"supply": 300000000}"#).unwrap();
        assert_eq!(content.supply, 300_000_000);
    }

    #[test]
    fn token_content_rejects_malformed_json() {
        assert!(decode_token_content(b"not json").is_err());
    }
}
