//! Tagged hashes: a 1-byte algorithm tag followed by the digest it selects.

use std::fmt;

use cryptoxide::digest::Digest as _;
use cryptoxide::{blake2b::Blake2b, sha2::Sha256, sha2::Sha512, sha3::Sha3_256, sha3::Sha3_512};

use crate::algorithm::HashAlgorithm;
use crate::Error;

/// A tagged hash, e.g. a transaction address: `tag ‖ digest`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TaggedHash {
    algorithm: HashAlgorithm,
    digest: Vec<u8>,
}

impl PartialOrd for TaggedHash {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TaggedHash {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl TaggedHash {
    /// Build a tagged hash from an already-computed digest, checking its
    /// length against the algorithm's fixed size.
    pub fn new(algorithm: HashAlgorithm, digest: Vec<u8>) -> Result<Self, Error> {
        if digest.len() != algorithm.size() {
            return Err(Error::Truncated {
                needed: algorithm.size(),
                available: digest.len(),
            });
        }
        Ok(Self { algorithm, digest })
    }

    /// Hash `data` with `algorithm` and tag the result.
    pub fn compute(algorithm: HashAlgorithm, data: &[u8]) -> Self {
        let digest = match algorithm {
            HashAlgorithm::Sha256 => {
                let mut h = Sha256::new();
                h.input(data);
                let mut out = vec![0u8; 32];
                h.result(&mut out);
                out
            }
            HashAlgorithm::Sha512 => {
                let mut h = Sha512::new();
                h.input(data);
                let mut out = vec![0u8; 64];
                h.result(&mut out);
                out
            }
            HashAlgorithm::Sha3_256 => {
                let mut h = Sha3_256::new();
                h.input(data);
                let mut out = vec![0u8; 32];
                h.result(&mut out);
                out
            }
            HashAlgorithm::Sha3_512 => {
                let mut h = Sha3_512::new();
                h.input(data);
                let mut out = vec![0u8; 64];
                h.result(&mut out);
                out
            }
            HashAlgorithm::Blake2b => {
                let mut h = Blake2b::new(32);
                h.input(data);
                let mut out = vec![0u8; 32];
                h.result(&mut out);
                out
            }
        };
        Self { algorithm, digest }
    }

    /// Parse a tagged hash off the front of `bytes`, returning the value and
    /// the unconsumed remainder.
    pub fn parse(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (&tag, rest) = bytes.split_first().ok_or(Error::Truncated {
            needed: 1,
            available: 0,
        })?;
        let algorithm = HashAlgorithm::from_tag(tag)?;
        if rest.len() < algorithm.size() {
            return Err(Error::Truncated {
                needed: algorithm.size(),
                available: rest.len(),
            });
        }
        let (digest, rest) = rest.split_at(algorithm.size());
        Ok((
            Self {
                algorithm,
                digest: digest.to_vec(),
            },
            rest,
        ))
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// `tag ‖ digest`, the on-the-wire representation.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.digest.len());
        out.push(self.algorithm.tag());
        out.extend_from_slice(&self.digest);
        out
    }
}

impl fmt::Debug for TaggedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TaggedHash")
            .field(&self.algorithm)
            .field(&hex::encode(&self.digest))
            .finish()
    }
}

impl fmt::Display for TaggedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}

impl serde::Serialize for TaggedHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&hex::encode(self.to_bytes()))
    }
}

impl<'de> serde::Deserialize<'de> for TaggedHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        let bytes = hex::decode(&hex_str).map_err(serde::de::Error::custom)?;
        let (hash, rest) = TaggedHash::parse(&bytes).map_err(serde::de::Error::custom)?;
        if !rest.is_empty() {
            return Err(serde::de::Error::custom("trailing bytes after tagged hash"));
        }
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_and_parse_round_trip() {
        let hash = TaggedHash::compute(HashAlgorithm::Sha256, b"hello");
        let bytes = hash.to_bytes();
        assert_eq!(bytes.len(), 33);
        let (parsed, rest) = TaggedHash::parse(&bytes).unwrap();
        assert_eq!(parsed, hash);
        assert!(rest.is_empty());
    }

    #[test]
    fn parse_leaves_trailing_bytes_untouched() {
        let hash = TaggedHash::compute(HashAlgorithm::Blake2b, b"data");
        let mut bytes = hash.to_bytes();
        bytes.extend_from_slice(&[1, 2, 3]);
        let (parsed, rest) = TaggedHash::parse(&bytes).unwrap();
        assert_eq!(parsed, hash);
        assert_eq!(rest, &[1, 2, 3]);
    }

    #[test]
    fn unknown_tag_rejected() {
        let bytes = [250u8, 1, 2, 3];
        assert!(TaggedHash::parse(&bytes).is_err());
    }

    #[test]
    fn truncated_digest_rejected() {
        let bytes = [0u8, 1, 2, 3]; // sha256 needs 32 bytes
        assert!(TaggedHash::parse(&bytes).is_err());
    }

    #[test]
    fn serde_round_trips_through_hex() {
        let hash = TaggedHash::compute(HashAlgorithm::Sha3_512, b"serde me");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hex::encode(hash.to_bytes())));
        let parsed: TaggedHash = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, hash);
    }
}
