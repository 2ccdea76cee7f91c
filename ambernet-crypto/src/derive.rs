//! Deterministic keypair derivation and address derivation.

use cryptoxide::ed25519;
use cryptoxide::{blake2b::Blake2b, digest::Digest as _};

use crate::algorithm::{HashAlgorithm, KeyAlgorithm};
use crate::hash::TaggedHash;
use crate::key::TaggedPublicKey;

/// An Ed25519 private key, kept as raw bytes.
///
/// There is no zeroize-on-drop here: the validator and codec never hold
/// live private keys, only the test fixtures in this crate do.
#[derive(Clone)]
pub struct PrivateKey {
    algorithm: KeyAlgorithm,
    bytes: Vec<u8>,
}

/// Derive an Ed25519 keypair deterministically from a seed and an index,
/// the way a wallet derives successive node/transaction keys from one root
/// secret.
pub fn derive_keypair(seed: &[u8], index: u64) -> (TaggedPublicKey, PrivateKey) {
    let mut hasher = Blake2b::new(32);
    hasher.input(seed);
    hasher.input(&index.to_be_bytes());
    let mut extended_seed = [0u8; 32];
    hasher.result(&mut extended_seed);

    let (_sk, pk) = ed25519::keypair(&extended_seed);

    let public = TaggedPublicKey::new(KeyAlgorithm::Ed25519, pk.to_vec())
        .expect("ed25519 public key is always PUBLIC_KEY_LENGTH bytes");
    let private = PrivateKey {
        algorithm: KeyAlgorithm::Ed25519,
        bytes: extended_seed.to_vec(),
    };
    (public, private)
}

/// Sign `message` with a private key produced by [`derive_keypair`].
pub fn sign(private: &PrivateKey, message: &[u8]) -> Vec<u8> {
    match private.algorithm {
        KeyAlgorithm::Ed25519 => {
            let mut seed = [0u8; 32];
            seed.copy_from_slice(&private.bytes);
            let (sk, _pk) = ed25519::keypair(&seed);
            ed25519::signature(message, &sk).to_vec()
        }
        KeyAlgorithm::Secp256k1 | KeyAlgorithm::Secp256r1 => {
            unimplemented!("secp signing is not part of this protocol's scope")
        }
    }
}

/// `address = H(previous_public_key)`, tagged with the requested hash
/// algorithm.
pub fn derive_address(public_key: &TaggedPublicKey, hash_algorithm: HashAlgorithm) -> TaggedHash {
    TaggedHash::compute(hash_algorithm, &public_key.to_bytes())
}
