//! Storage nonce encryption, served through the `GetStorageNonce` frame.
//!
//! The real key-exchange scheme that produces the plaintext nonce is out
//! of scope here. This is a deterministic placeholder keyed on the
//! requesting public key and a process-wide network seed; see DESIGN.md
//! for the grounding note.

use cryptoxide::{blake2b::Blake2b, digest::Digest as _};

use crate::key::TaggedPublicKey;

/// Encrypt the per-node storage nonce for the node owning `public_key`,
/// given the process-wide `network_seed`.
pub fn encrypt_storage_nonce(public_key: &TaggedPublicKey, network_seed: &[u8]) -> Vec<u8> {
    let mut hasher = Blake2b::new(32);
    hasher.input(network_seed);
    hasher.input(&public_key.to_bytes());
    let mut out = vec![0u8; 32];
    hasher.result(&mut out);
    out
}
