//! Validator rejection reasons. The message strings are an external
//! contract: clients and tests match on them verbatim, so wording here is
//! never "cleaned up" without checking every literal scenario that pins it.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid previous signature")]
    InvalidPreviousSignature,

    #[error("Invalid origin signature")]
    InvalidOriginSignature,

    // "greaterthan" (no space) is preserved verbatim; it is a known typo in
    // the wire contract this message is matched against, not a mistake here.
    #[error("Invalid {type_name} transaction with content size greaterthan content_max_size")]
    ContentTooLarge { type_name: &'static str },

    #[error("Invalid {type_name} transaction with empty ownership secret")]
    EmptyOwnershipSecret { type_name: &'static str },

    #[error("Invalid {type_name} transaction with empty authorized keys")]
    EmptyAuthorizedKeys { type_name: &'static str },

    #[error("Invalid {type_name} transaction with invalid key origin")]
    InvalidKeyOrigin { type_name: &'static str },

    #[error("Invalid node transaction content")]
    InvalidNodeContent,

    #[error("Invalid node transaction certificate")]
    InvalidNodeCertificate,

    #[error("Invalid node_shared_secrets transaction with unexpected previous address")]
    InvalidNodeSharedSecretsGenesis,

    #[error("Invalid node_shared_secrets transaction with an authorized key that is not a known node")]
    InvalidNodeSharedSecretsAuthorizedKey,

    #[error("Invalid node_shared_secrets transaction content")]
    InvalidNodeSharedSecretsContent,

    #[error("Invalid node shared secrets trigger time")]
    InvalidNodeSharedSecretsTriggerTime,

    #[error("Invalid origin transaction with unexpected previous address")]
    InvalidOriginGenesis,

    #[error("Invalid origin transaction content")]
    InvalidOriginContent,

    #[error("Invalid origin transaction certificate")]
    InvalidOriginCertificate,

    #[error("Invalid origin transaction with missing code declaration")]
    InvalidOriginCodeDeclaration,

    #[error("Invalid code_approval transaction with invalid recipient")]
    InvalidCodeApprovalRecipient,

    #[error("Invalid code_approval transaction referencing an unknown proposal")]
    InvalidCodeApprovalProposal,

    #[error("Invalid code_approval transaction already signed by this key")]
    InvalidCodeApprovalAlreadySigned,

    #[error("Invalid code_approval transaction with signer outside the technical council")]
    InvalidCodeApprovalCouncilMembership,

    #[error("Invalid mint_rewards transaction with unexpected previous address")]
    InvalidMintRewardsGenesis,

    #[error("Invalid mint_rewards transaction content")]
    InvalidMintRewardsContent,

    #[error("The supply do not match burned fees from last summary")]
    SupplyMismatch,

    #[error("There is already a mint rewards transaction since last schedule")]
    MintRewardsAlreadyTriggered,

    #[error("Invalid node rewards trigger time")]
    InvalidNodeRewardsTriggerTime,

    #[error("Invalid oracle trigger time")]
    InvalidOracleTriggerTime,

    #[error("Invalid token transaction content")]
    InvalidTokenContent,

    #[error("Invalid token transaction with malformed collection size")]
    InvalidTokenCollectionSize,

    #[error("Invalid {type_name} transaction with too many ownerships, authorized keys, or recipients to encode")]
    TooManyEntries { type_name: &'static str },
}
