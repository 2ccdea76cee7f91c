//! The accepted-transaction pub-sub: a subscription is a oneshot receiver
//! registered before submission, resolved exactly once when the matching
//! address is accepted, and deregistered on every exit path — including
//! the caller simply dropping the receiver without it ever firing, which
//! [`tokio::sync::oneshot`] already guarantees.

use std::collections::HashMap;
use std::sync::Mutex;

use ambernet_crypto::TaggedHash;
use tokio::sync::oneshot;

use ambernet_dispatch::PubSub;

#[derive(Default)]
pub struct TransactionAcceptancePubSub {
    waiters: Mutex<HashMap<TaggedHash, Vec<oneshot::Sender<()>>>>,
}

impl TransactionAcceptancePubSub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every subscription registered for `address`. Called once the
    /// external mining/replication pipeline has accepted the transaction;
    /// out of scope here, so callers drive this directly in tests and local
    /// bootstrap.
    pub fn publish_accepted(&self, address: &TaggedHash) {
        if let Some(senders) = self.waiters.lock().unwrap().remove(address) {
            for sender in senders {
                let _ = sender.send(());
            }
        }
    }
}

impl PubSub for TransactionAcceptancePubSub {
    fn subscribe_transaction_accepted(&self, address: &TaggedHash) -> oneshot::Receiver<()> {
        let (sender, receiver) = oneshot::channel();
        self.waiters.lock().unwrap().entry(address.clone()).or_default().push(sender);
        receiver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambernet_crypto::algorithm::HashAlgorithm;

    #[tokio::test]
    async fn publishing_resolves_the_matching_subscription() {
        let pub_sub = TransactionAcceptancePubSub::new();
        let address = TaggedHash::compute(HashAlgorithm::Sha256, b"accepted-tx");
        let receiver = pub_sub.subscribe_transaction_accepted(&address);

        pub_sub.publish_accepted(&address);

        assert!(receiver.await.is_ok());
    }

    #[tokio::test]
    async fn dropping_a_subscription_never_panics_a_later_publish() {
        let pub_sub = TransactionAcceptancePubSub::new();
        let address = TaggedHash::compute(HashAlgorithm::Sha256, b"cancelled-tx");
        drop(pub_sub.subscribe_transaction_accepted(&address));

        pub_sub.publish_accepted(&address);
    }
}
