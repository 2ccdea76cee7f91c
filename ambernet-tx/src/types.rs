//! `Transaction::tx_type`, one of the 13 closed variants a transaction can
//! carry.

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransactionType {
    Node,
    NodeSharedSecrets,
    Origin,
    CodeApproval,
    Transfer,
    Token,
    MintRewards,
    NodeRewards,
    Oracle,
    Beacon,
    Hosting,
    Keychain,
    KeychainAccess,
}

impl TransactionType {
    pub const fn tag(self) -> u8 {
        match self {
            TransactionType::Node => 0,
            TransactionType::NodeSharedSecrets => 1,
            TransactionType::Origin => 2,
            TransactionType::CodeApproval => 3,
            TransactionType::Transfer => 4,
            TransactionType::Token => 5,
            TransactionType::MintRewards => 6,
            TransactionType::NodeRewards => 7,
            TransactionType::Oracle => 8,
            TransactionType::Beacon => 9,
            TransactionType::Hosting => 10,
            TransactionType::Keychain => 11,
            TransactionType::KeychainAccess => 12,
        }
    }

    pub const fn from_tag(tag: u8) -> Result<Self, Error> {
        match tag {
            0 => Ok(TransactionType::Node),
            1 => Ok(TransactionType::NodeSharedSecrets),
            2 => Ok(TransactionType::Origin),
            3 => Ok(TransactionType::CodeApproval),
            4 => Ok(TransactionType::Transfer),
            5 => Ok(TransactionType::Token),
            6 => Ok(TransactionType::MintRewards),
            7 => Ok(TransactionType::NodeRewards),
            8 => Ok(TransactionType::Oracle),
            9 => Ok(TransactionType::Beacon),
            10 => Ok(TransactionType::Hosting),
            11 => Ok(TransactionType::Keychain),
            12 => Ok(TransactionType::KeychainAccess),
            other => Err(Error::UnknownTransactionType(other)),
        }
    }

    /// Whether this type is admitted at most once per scheduler window.
    pub const fn is_scheduled(self) -> bool {
        matches!(
            self,
            TransactionType::NodeSharedSecrets
                | TransactionType::MintRewards
                | TransactionType::NodeRewards
                | TransactionType::Oracle
        )
    }

    /// The wire name used in validator error messages, e.g. `"node"`,
    /// `"node_shared_secrets"`.
    pub const fn wire_name(self) -> &'static str {
        match self {
            TransactionType::Node => "node",
            TransactionType::NodeSharedSecrets => "node_shared_secrets",
            TransactionType::Origin => "origin",
            TransactionType::CodeApproval => "code_approval",
            TransactionType::Transfer => "transfer",
            TransactionType::Token => "token",
            TransactionType::MintRewards => "mint_rewards",
            TransactionType::NodeRewards => "node_rewards",
            TransactionType::Oracle => "oracle",
            TransactionType::Beacon => "beacon",
            TransactionType::Hosting => "hosting",
            TransactionType::Keychain => "keychain",
            TransactionType::KeychainAccess => "keychain_access",
        }
    }
}

impl serde::Serialize for TransactionType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de> serde::Deserialize<'de> for TransactionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        for tag in 0..=12u8 {
            let ty = TransactionType::from_tag(tag).expect("0..=12 are all valid tags");
            if ty.wire_name() == name {
                return Ok(ty);
            }
        }
        Err(serde::de::Error::custom(format!("unknown transaction type {name:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_round_trips() {
        for tag in 0..=12u8 {
            let ty = TransactionType::from_tag(tag).unwrap();
            assert_eq!(ty.tag(), tag);
        }
    }

    #[test]
    fn only_the_four_scheduled_types_are_scheduled() {
        let scheduled: Vec<_> = (0..=12u8)
            .map(|tag| TransactionType::from_tag(tag).unwrap())
            .filter(|ty| ty.is_scheduled())
            .collect();
        assert_eq!(
            scheduled,
            vec![
                TransactionType::NodeSharedSecrets,
                TransactionType::MintRewards,
                TransactionType::NodeRewards,
                TransactionType::Oracle,
            ]
        );
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(TransactionType::from_tag(200).is_err());
    }

    #[test]
    fn serde_round_trips_through_the_wire_name() {
        let json = serde_json::to_string(&TransactionType::NodeSharedSecrets).unwrap();
        assert_eq!(json, "\"node_shared_secrets\"");
        let parsed: TransactionType = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, TransactionType::NodeSharedSecrets);
    }
}
