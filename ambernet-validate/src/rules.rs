//! Per-type admission rules, applied after the universal checks pass.

use ambernet_crypto::certificate::verify_certificate;
use ambernet_tx::{Transaction, TransactionType};
use chrono::{DateTime, Utc};

use crate::collaborators::ValidationContext;
use crate::content::{
    decode_mint_rewards_content, decode_node_content, decode_node_shared_secrets_content,
    decode_origin_content, decode_token_content, TokenKind,
};
use crate::error::ValidationError;

const SUB_UNITS_PER_TOKEN: u64 = 100_000_000;

pub fn apply(tx: &Transaction, now: DateTime<Utc>, ctx: &ValidationContext) -> Result<(), ValidationError> {
    match tx.tx_type {
        TransactionType::Node => node(tx),
        TransactionType::NodeSharedSecrets => node_shared_secrets(tx, now, ctx),
        TransactionType::Origin => origin(tx, ctx),
        TransactionType::CodeApproval => code_approval(tx, ctx),
        TransactionType::MintRewards => mint_rewards(tx, now, ctx),
        TransactionType::NodeRewards => node_rewards(tx, now, ctx),
        TransactionType::Oracle => oracle(tx, now, ctx),
        TransactionType::Token => token(tx),
        TransactionType::Transfer
        | TransactionType::Beacon
        | TransactionType::Hosting
        | TransactionType::Keychain
        | TransactionType::KeychainAccess => Ok(()),
    }
}

fn node(tx: &Transaction) -> Result<(), ValidationError> {
    let content = decode_node_content(&tx.data.content)?;
    if !verify_certificate(&tx.previous_public_key, &content.certificate, &content.origin_public_key) {
        return Err(ValidationError::InvalidNodeCertificate);
    }
    Ok(())
}

fn node_shared_secrets(
    tx: &Transaction,
    now: DateTime<Utc>,
    ctx: &ValidationContext,
) -> Result<(), ValidationError> {
    if tx.previous_address() != ctx.registers.node_shared_secrets_genesis_address {
        return Err(ValidationError::InvalidNodeSharedSecretsGenesis);
    }
    for ownership in &tx.data.ownerships {
        for key in ownership.authorized_keys.keys() {
            if !ctx.node_directory.is_known_node_first_public_key(key) {
                return Err(ValidationError::InvalidNodeSharedSecretsAuthorizedKey);
            }
        }
    }
    decode_node_shared_secrets_content(&tx.data.content)?;
    check_scheduler_window(
        tx,
        now,
        &ctx.registers.node_shared_secrets_genesis_address,
        ctx,
        ValidationError::InvalidNodeSharedSecretsTriggerTime,
    )
}

fn origin(tx: &Transaction, ctx: &ValidationContext) -> Result<(), ValidationError> {
    if !ctx.registers.origin_genesis_addresses.contains(&tx.previous_address()) {
        return Err(ValidationError::InvalidOriginGenesis);
    }
    let content = decode_origin_content(&tx.data.content)?;
    if !verify_certificate(&content.public_key, &content.certificate, &content.public_key) {
        return Err(ValidationError::InvalidOriginCertificate);
    }
    if !tx.data.code.contains("condition inherit: [type: origin, content: true]") {
        return Err(ValidationError::InvalidOriginCodeDeclaration);
    }
    Ok(())
}

fn code_approval(tx: &Transaction, ctx: &ValidationContext) -> Result<(), ValidationError> {
    let proposal_address = match tx.data.recipients.as_slice() {
        [single] => single,
        _ => return Err(ValidationError::InvalidCodeApprovalRecipient),
    };
    if !ctx.chain_store.transaction_exists(proposal_address) {
        return Err(ValidationError::InvalidCodeApprovalProposal);
    }

    let sender_address = tx.previous_address();
    let sender_first_key = ctx
        .chain_store
        .get_first_transaction(&sender_address)
        .map(|first| first.previous_public_key)
        .unwrap_or_else(|| tx.previous_public_key.clone());
    if !ctx.pools.members("technical_council").contains(&sender_first_key) {
        return Err(ValidationError::InvalidCodeApprovalCouncilMembership);
    }

    if let Some(previous) = ctx.chain_store.get_transaction(&sender_address) {
        let already_signed = previous.tx_type == TransactionType::CodeApproval
            && previous.data.recipients.first() == Some(proposal_address);
        if already_signed {
            return Err(ValidationError::InvalidCodeApprovalAlreadySigned);
        }
    }

    Ok(())
}

fn mint_rewards(
    tx: &Transaction,
    now: DateTime<Utc>,
    ctx: &ValidationContext,
) -> Result<(), ValidationError> {
    if tx.previous_address() != ctx.registers.reward_genesis_address {
        return Err(ValidationError::InvalidMintRewardsGenesis);
    }
    let content = decode_mint_rewards_content(&tx.data.content)?;
    if content.supply != ctx.chain_store.get_latest_burned_fees() {
        return Err(ValidationError::SupplyMismatch);
    }
    check_scheduler_window(
        tx,
        now,
        &ctx.registers.reward_genesis_address,
        ctx,
        ValidationError::MintRewardsAlreadyTriggered,
    )
}

fn node_rewards(
    tx: &Transaction,
    now: DateTime<Utc>,
    ctx: &ValidationContext,
) -> Result<(), ValidationError> {
    check_scheduler_window(
        tx,
        now,
        &ctx.registers.node_rewards_genesis_address,
        ctx,
        ValidationError::InvalidNodeRewardsTriggerTime,
    )
}

fn oracle(tx: &Transaction, now: DateTime<Utc>, ctx: &ValidationContext) -> Result<(), ValidationError> {
    check_scheduler_window(
        tx,
        now,
        &ctx.registers.oracle_genesis_address,
        ctx,
        ValidationError::InvalidOracleTriggerTime,
    )
}

fn token(tx: &Transaction) -> Result<(), ValidationError> {
    let content = decode_token_content(&tx.data.content)?;
    if matches!(content.kind, TokenKind::NonFungible) {
        if content.supply % SUB_UNITS_PER_TOKEN != 0 {
            return Err(ValidationError::InvalidTokenCollectionSize);
        }
        if let Some(collection) = &content.collection {
            if collection.len() as u64 != content.supply / SUB_UNITS_PER_TOKEN {
                return Err(ValidationError::InvalidTokenCollectionSize);
            }
        }
    }
    Ok(())
}

/// The scheduler-window check shared by every scheduled type: at most one
/// transaction of this type may be admitted per cron trigger.
fn check_scheduler_window(
    tx: &Transaction,
    now: DateTime<Utc>,
    genesis_address: &ambernet_crypto::TaggedHash,
    ctx: &ValidationContext,
    on_violation: ValidationError,
) -> Result<(), ValidationError> {
    let last_expected_trigger = ctx.schedulers.last_trigger_at(tx.tx_type, now);
    if let Some((last_address, last_timestamp)) = ctx.chain_store.get_last_chain_address(genesis_address) {
        if last_timestamp >= last_expected_trigger && last_address != tx.address {
            return Err(on_violation);
        }
    }
    Ok(())
}
