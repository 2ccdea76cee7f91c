//! Compile-time tag -> size tables for hashes and keys.
//!
//! The tag byte is the single device that makes the wire format
//! self-delimiting for variable-size crypto: once a decoder has
//! read the tag it knows exactly how many bytes follow without any separate
//! length field.

use crate::Error;

/// Hash algorithms addressable by their wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
    Sha3_256,
    Sha3_512,
    Blake2b,
}

impl HashAlgorithm {
    pub const fn tag(self) -> u8 {
        match self {
            HashAlgorithm::Sha256 => 0,
            HashAlgorithm::Sha512 => 1,
            HashAlgorithm::Sha3_256 => 2,
            HashAlgorithm::Sha3_512 => 3,
            HashAlgorithm::Blake2b => 4,
        }
    }

    pub const fn size(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha512 => 64,
            HashAlgorithm::Sha3_256 => 32,
            HashAlgorithm::Sha3_512 => 64,
            HashAlgorithm::Blake2b => 32,
        }
    }

    pub const fn from_tag(tag: u8) -> Result<Self, Error> {
        match tag {
            0 => Ok(HashAlgorithm::Sha256),
            1 => Ok(HashAlgorithm::Sha512),
            2 => Ok(HashAlgorithm::Sha3_256),
            3 => Ok(HashAlgorithm::Sha3_512),
            4 => Ok(HashAlgorithm::Blake2b),
            other => Err(Error::UnknownAlgorithm(other)),
        }
    }
}

/// Public-key algorithms addressable by their wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Ed25519,
    Secp256k1,
    Secp256r1,
}

impl KeyAlgorithm {
    pub const fn tag(self) -> u8 {
        match self {
            KeyAlgorithm::Ed25519 => 0,
            KeyAlgorithm::Secp256k1 => 1,
            KeyAlgorithm::Secp256r1 => 2,
        }
    }

    /// Size of the encoded public key, excluding the tag byte.
    pub const fn size(self) -> usize {
        match self {
            KeyAlgorithm::Ed25519 => 32,
            KeyAlgorithm::Secp256k1 => 33,
            KeyAlgorithm::Secp256r1 => 33,
        }
    }

    pub const fn from_tag(tag: u8) -> Result<Self, Error> {
        match tag {
            0 => Ok(KeyAlgorithm::Ed25519),
            1 => Ok(KeyAlgorithm::Secp256k1),
            2 => Ok(KeyAlgorithm::Secp256r1),
            other => Err(Error::UnknownAlgorithm(other)),
        }
    }
}

/// Payload length (excluding the tag byte) for a hash of the given tag.
pub fn hash_size(tag: u8) -> Result<usize, Error> {
    HashAlgorithm::from_tag(tag).map(HashAlgorithm::size)
}

/// Payload length (excluding the tag byte) for a public key of the given tag.
pub fn key_size(tag: u8) -> Result<usize, Error> {
    KeyAlgorithm::from_tag(tag).map(KeyAlgorithm::size)
}
