//! Tagged public keys: a 1-byte algorithm tag followed by the key material
//! it selects, plus signature verification dispatched on that tag.

use std::fmt;

use cryptoxide::ed25519;

use crate::algorithm::KeyAlgorithm;
use crate::Error;

/// A tagged public key, e.g. `tx.previous_public_key`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TaggedPublicKey {
    algorithm: KeyAlgorithm,
    bytes: Vec<u8>,
}

impl PartialOrd for TaggedPublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TaggedPublicKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

impl TaggedPublicKey {
    pub fn new(algorithm: KeyAlgorithm, bytes: Vec<u8>) -> Result<Self, Error> {
        if bytes.len() != algorithm.size() {
            return Err(Error::Truncated {
                needed: algorithm.size(),
                available: bytes.len(),
            });
        }
        Ok(Self { algorithm, bytes })
    }

    /// Parse a tagged public key off the front of `bytes`, returning the
    /// value and the unconsumed remainder.
    pub fn parse(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (&tag, rest) = bytes.split_first().ok_or(Error::Truncated {
            needed: 1,
            available: 0,
        })?;
        let algorithm = KeyAlgorithm::from_tag(tag)?;
        if rest.len() < algorithm.size() {
            return Err(Error::Truncated {
                needed: algorithm.size(),
                available: rest.len(),
            });
        }
        let (key, rest) = rest.split_at(algorithm.size());
        Ok((
            Self {
                algorithm,
                bytes: key.to_vec(),
            },
            rest,
        ))
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn key_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `tag ‖ key`, the on-the-wire representation.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.bytes.len());
        out.push(self.algorithm.tag());
        out.extend_from_slice(&self.bytes);
        out
    }

    /// Verify `signature` over `message` under this key.
    ///
    /// Only Ed25519 is wired to an actual primitive; the secp curves are
    /// recognised by tag (so decoding and size bookkeeping behave correctly)
    /// but verification for them is out of scope and always fails.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), Error> {
        match self.algorithm {
            KeyAlgorithm::Ed25519 => {
                if signature.len() != ed25519::SIGNATURE_LENGTH {
                    return Err(Error::InvalidSignatureLength {
                        expected: ed25519::SIGNATURE_LENGTH,
                        actual: signature.len(),
                    });
                }
                let mut pk = [0u8; ed25519::PUBLIC_KEY_LENGTH];
                pk.copy_from_slice(&self.bytes);
                let mut sig = [0u8; ed25519::SIGNATURE_LENGTH];
                sig.copy_from_slice(signature);
                if ed25519::verify(message, &pk, &sig) {
                    Ok(())
                } else {
                    Err(Error::SignatureVerificationFailed)
                }
            }
            KeyAlgorithm::Secp256k1 | KeyAlgorithm::Secp256r1 => {
                Err(Error::SignatureVerificationFailed)
            }
        }
    }
}

impl fmt::Debug for TaggedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TaggedPublicKey")
            .field(&self.algorithm)
            .field(&hex::encode(&self.bytes))
            .finish()
    }
}

impl fmt::Display for TaggedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}

impl serde::Serialize for TaggedPublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&hex::encode(self.to_bytes()))
    }
}

impl<'de> serde::Deserialize<'de> for TaggedPublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        let bytes = hex::decode(&hex_str).map_err(serde::de::Error::custom)?;
        let (key, rest) = TaggedPublicKey::parse(&bytes).map_err(serde::de::Error::custom)?;
        if !rest.is_empty() {
            return Err(serde::de::Error::custom("trailing bytes after tagged public key"));
        }
        Ok(key)
    }
}
