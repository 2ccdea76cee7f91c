//! `process`: the total `request -> response` mapping, pure over its
//! arguments other than the single admitted-transaction mutation and the
//! fire-and-forget forwards to the mining/replication stubs.

use ambernet_codec::frame::ErrorReason;
use ambernet_codec::Frame;
use chrono::{DateTime, Utc};

use crate::collaborators::Collaborators;

/// Dispatch one request frame to its response, per the mapping table.
/// `now` is the only time source; the dispatcher itself never reads the
/// wall clock.
pub async fn process(request: Frame, now: DateTime<Utc>, collaborators: &Collaborators<'_>) -> Frame {
    match request {
        Frame::GetBootstrappingNodes { patch } => Frame::BootstrappingNodes {
            nodes: collaborators.p2p.nearest_nodes(patch),
        },
        Frame::GetStorageNonce { public_key } => Frame::EncryptedStorageNonce {
            nonce: ambernet_crypto::nonce::encrypt_storage_nonce(&public_key, collaborators.network_seed),
        },
        Frame::ListNodes => Frame::NodeList {
            nodes: collaborators.p2p.list_nodes(),
        },
        Frame::GetTransaction { address } => match collaborators.chain_store.get_transaction(&address) {
            Some(tx) => Frame::Transaction { tx },
            None => Frame::NotFound,
        },
        Frame::GetTransactionChain { address, after } => Frame::TransactionList {
            transactions: collaborators.chain_store.get_transaction_chain(&address, after),
        },
        Frame::GetUnspentOutputs { address } => Frame::UnspentOutputList {
            outputs: collaborators.chain_store.get_unspent_outputs(&address),
        },
        Frame::NewTransaction { tx } => handle_new_transaction(tx, now, collaborators).await,
        Frame::StartMining { tx, welcome_key, validator_keys } => {
            collaborators.mining.start_mining(&tx, &welcome_key, &validator_keys);
            Frame::Ok
        }
        Frame::AddMiningContext {
            address,
            validation_key,
            validator_keys,
            chain_storage_nodes_view,
            io_storage_nodes_view,
            beacon_storage_nodes_view,
        } => {
            collaborators.mining.add_mining_context(
                &address,
                &validation_key,
                &validator_keys,
                &chain_storage_nodes_view,
                &io_storage_nodes_view,
                &beacon_storage_nodes_view,
            );
            Frame::Ok
        }
        Frame::CrossValidate { address, stamp, replication_tree } => {
            collaborators.mining.cross_validate(&address, stamp, &replication_tree);
            Frame::Ok
        }
        Frame::CrossValidationDone { address, stamp } => {
            collaborators.mining.cross_validation_done(&address, stamp);
            Frame::Ok
        }
        Frame::ReplicateTransaction { tx, roles, ack_storage } => {
            collaborators.mining.replicate_transaction(&tx, roles, ack_storage);
            Frame::Ok
        }
        Frame::AcknowledgeStorage { address } => {
            collaborators.mining.acknowledge_storage(&address);
            Frame::Ok
        }
        Frame::NotifyEndOfNodeSync { public_key, .. } => {
            collaborators.p2p.set_node_globally_available(&public_key);
            Frame::Ok
        }
        Frame::GetLastTransaction { address } => match collaborators.chain_store.get_last_transaction(&address) {
            Some(tx) => Frame::Transaction { tx },
            None => Frame::NotFound,
        },
        Frame::GetBalance { address } => {
            let (uco, tokens) = collaborators.chain_store.get_balance(&address);
            Frame::Balance { uco, tokens }
        }
        Frame::GetTransactionInputs { address } => Frame::TransactionInputList {
            inputs: collaborators.chain_store.get_transaction_inputs(&address),
        },
        Frame::GetTransactionChainLength { address } => Frame::TransactionChainLength {
            length: collaborators.chain_store.get_transaction_chain_length(&address),
        },
        Frame::GetP2PView { keys } => Frame::P2PView {
            availability: collaborators.p2p.nodes_availability_as_bits(&keys),
        },
        Frame::GetFirstPublicKey { address } => match collaborators.chain_store.get_first_public_key(&address) {
            Some(public_key) => Frame::FirstPublicKey { public_key },
            None => Frame::NotFound,
        },
        Frame::GetLastTransactionAddress { address, timestamp } => {
            // The mapping table names no `NotFound` alternative for this
            // request; when the chain store has nothing later than
            // `timestamp` the address is its own last transaction address.
            let (address, timestamp) = collaborators
                .chain_store
                .get_last_transaction_address(&address, timestamp)
                .unwrap_or((address, timestamp));
            Frame::LastTransactionAddress { address, timestamp }
        }
        Frame::NotifyLastTransactionAddress { address, next_address, timestamp } => {
            collaborators
                .chain_store
                .notify_last_transaction_address(&address, &next_address, timestamp);
            Frame::Ok
        }
        Frame::GetTransactionSummary { address } => {
            match collaborators.chain_store.get_transaction_summary(&address) {
                Some((tx_type, timestamp)) => Frame::TransactionSummary { address, tx_type, timestamp },
                None => Frame::NotFound,
            }
        }
        Frame::NodeAvailability { public_key } => {
            collaborators.p2p.set_node_globally_available(&public_key);
            Frame::Ok
        }
        Frame::Ping => Frame::Ok,

        // Already a response frame: a peer that sends one back is
        // misbehaving, not something this dispatcher has a response for.
        response @ (Frame::Error { .. }
        | Frame::Ok
        | Frame::NotFound
        | Frame::Transaction { .. }
        | Frame::TransactionList { .. }
        | Frame::Balance { .. }
        | Frame::UnspentOutputList { .. }
        | Frame::BootstrappingNodes { .. }
        | Frame::LastTransactionAddress { .. }
        | Frame::FirstPublicKey { .. }
        | Frame::TransactionSummary { .. }
        | Frame::EncryptedStorageNonce { .. }
        | Frame::P2PView { .. }
        | Frame::TransactionInputList { .. }
        | Frame::TransactionChainLength { .. }
        | Frame::NodeList { .. }) => {
            tracing::warn!(?response, "received a response frame as a request; rejecting");
            Frame::Error { reason: ErrorReason::NetworkIssue }
        }
    }
}

async fn handle_new_transaction(
    tx: ambernet_tx::Transaction,
    now: DateTime<Utc>,
    collaborators: &Collaborators<'_>,
) -> Frame {
    if let Err(reason) = ambernet_validate::validate(&tx, now, &collaborators.validation) {
        tracing::debug!(address = %tx.address, %reason, "rejecting pending transaction");
        return Frame::Error { reason: ErrorReason::InvalidTransaction };
    }

    let accepted = collaborators.pub_sub.subscribe_transaction_accepted(&tx.address);
    collaborators.chain_store.submit_transaction(tx.clone());

    match tokio::time::timeout(collaborators.mining_timeout, accepted).await {
        Ok(Ok(())) => Frame::Ok,
        _ => {
            tracing::warn!(address = %tx.address, "transaction acceptance wait timed out");
            Frame::Error { reason: ErrorReason::NetworkIssue }
        }
    }
}
