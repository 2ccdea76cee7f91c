//! Node certificate issuance/verification.
//!
//! A node's certificate is an origin key's signature over the node's own
//! public key. `origin` transactions and `node` transactions'
//! `content.certificate` both rely on this same primitive.

use crate::derive::{sign, PrivateKey};
use crate::key::TaggedPublicKey;

/// Produce the certificate that `origin_private_key` issues for `subject`.
pub fn get_key_certificate(subject: &TaggedPublicKey, origin_private_key: &PrivateKey) -> Vec<u8> {
    sign(origin_private_key, &subject.to_bytes())
}

/// Verify that `certificate` is `origin_public_key`'s signature over
/// `subject`.
pub fn verify_certificate(
    subject: &TaggedPublicKey,
    certificate: &[u8],
    origin_public_key: &TaggedPublicKey,
) -> bool {
    origin_public_key
        .verify(&subject.to_bytes(), certificate)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive_keypair;

    #[test]
    fn certificate_verifies_under_the_issuing_origin_key() {
        let (origin_public, origin_private) = derive_keypair(b"origin-root", 0);
        let (node_public, _) = derive_keypair(b"node-root", 0);

        let cert = get_key_certificate(&node_public, &origin_private);
        assert!(verify_certificate(&node_public, &cert, &origin_public));
    }

    #[test]
    fn certificate_from_a_different_origin_is_rejected() {
        let (_origin_public, origin_private) = derive_keypair(b"origin-root", 0);
        let (other_origin_public, _) = derive_keypair(b"other-origin-root", 0);
        let (node_public, _) = derive_keypair(b"node-root", 0);

        let cert = get_key_certificate(&node_public, &origin_private);
        assert!(!verify_certificate(&node_public, &cert, &other_origin_public));
    }
}
