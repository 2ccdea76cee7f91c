//! `Transaction` and its nested `data` record, plus the canonical
//! serialisation that both the wire codec and the signing routines rely on.

use std::collections::BTreeMap;

use ambernet_crypto::algorithm::HashAlgorithm;
use ambernet_crypto::{TaggedHash, TaggedPublicKey};

use crate::types::TransactionType;
use crate::Error;

/// A single UCO transfer inside `data.ledger`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UcoTransfer {
    pub to: TaggedHash,
    /// Amount in the smallest sub-unit (10^-8 UCO), never a float.
    pub amount: u64,
}

/// A single token transfer inside `data.ledger`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TokenTransfer {
    pub to: TaggedHash,
    pub token_address: TaggedHash,
    pub amount: u64,
    pub token_id: u64,
}

/// `data.ledger`: UCO + token transfers.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct TxLedger {
    pub uco: Vec<UcoTransfer>,
    pub token: Vec<TokenTransfer>,
}

/// One entry of `data.ownerships`: a secret plus the set of keys allowed to
/// decrypt it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Ownership {
    #[serde(with = "hex::serde")]
    pub secret: Vec<u8>,
    /// pubkey -> that pubkey's encrypted copy of the key protecting `secret`.
    pub authorized_keys: BTreeMap<TaggedPublicKey, Vec<u8>>,
}

impl Ownership {
    pub fn new(secret: Vec<u8>, authorized_keys: BTreeMap<TaggedPublicKey, Vec<u8>>) -> Self {
        Self {
            secret,
            authorized_keys,
        }
    }
}

/// `Transaction::data`: opaque content plus the structured sub-records.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct TransactionData {
    #[serde(with = "hex::serde")]
    pub content: Vec<u8>,
    pub code: String,
    pub ownerships: Vec<Ownership>,
    pub recipients: Vec<TaggedHash>,
    pub ledger: TxLedger,
}

/// The immutable transaction record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub address: TaggedHash,
    pub tx_type: TransactionType,
    pub previous_public_key: TaggedPublicKey,
    #[serde(with = "hex::serde")]
    pub previous_signature: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub origin_signature: Vec<u8>,
    pub data: TransactionData,
}

impl Transaction {
    /// `previous_address(tx) = derive_address(tx.previous_public_key)`,
    /// using the hash algorithm this transaction's own address is tagged
    /// with.
    pub fn previous_address(&self) -> TaggedHash {
        ambernet_crypto::derive::derive_address(&self.previous_public_key, self.address.algorithm())
    }

    /// Canonical bytes of `data` alone — what `previous_signature` signs.
    ///
    /// Errs if `data` holds more than 255 ownerships, authorized keys on a
    /// single ownership, or recipients — counts that would otherwise
    /// silently truncate mod 256 in the wire length prefix below.
    pub fn data_bytes(&self) -> Result<Vec<u8>, Error> {
        encode_data(&self.data)
    }

    /// Canonical bytes of the transaction body excluding `origin_signature`
    /// — what `origin_signature` signs.
    pub fn body_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.address.to_bytes());
        out.push(self.tx_type.tag());
        out.extend_from_slice(&self.previous_public_key.to_bytes());
        write_len_prefixed_u16(&mut out, &self.previous_signature);
        out.extend_from_slice(&encode_data(&self.data)?);
        Ok(out)
    }

    /// Full canonical serialisation: `body_bytes() ++ origin_signature`.
    /// Stable: two logically equal transactions produce byte-equal output.
    pub fn serialize(&self) -> Result<Vec<u8>, Error> {
        let mut out = self.body_bytes()?;
        write_len_prefixed_u16(&mut out, &self.origin_signature);
        Ok(out)
    }

    /// Inverse of [`Transaction::serialize`]. Returns the transaction and
    /// the unconsumed remainder of `bytes`.
    pub fn deserialize(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (address, rest) = TaggedHash::parse(bytes)?;
        let (&type_tag, rest) = rest.split_first().ok_or(Error::Truncated { field: "type" })?;
        let tx_type = TransactionType::from_tag(type_tag)?;
        let (previous_public_key, rest) = TaggedPublicKey::parse(rest)?;
        let (previous_signature, rest) = read_len_prefixed_u16(rest, "previous_signature")?;
        let (data, rest) = decode_data(rest)?;
        let (origin_signature, rest) = read_len_prefixed_u16(rest, "origin_signature")?;

        Ok((
            Transaction {
                address,
                tx_type,
                previous_public_key,
                previous_signature,
                origin_signature,
                data,
            },
            rest,
        ))
    }
}

fn write_len_prefixed_u16(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
    out.extend_from_slice(bytes);
}

fn write_len_prefixed_u32(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

fn read_len_prefixed_u16<'a>(
    bytes: &'a [u8],
    field: &'static str,
) -> Result<(Vec<u8>, &'a [u8]), Error> {
    if bytes.len() < 2 {
        return Err(Error::Truncated { field });
    }
    let (len, rest) = bytes.split_at(2);
    let len = u16::from_be_bytes([len[0], len[1]]) as usize;
    if rest.len() < len {
        return Err(Error::Truncated { field });
    }
    let (value, rest) = rest.split_at(len);
    Ok((value.to_vec(), rest))
}

fn read_len_prefixed_u32<'a>(
    bytes: &'a [u8],
    field: &'static str,
) -> Result<(Vec<u8>, &'a [u8]), Error> {
    if bytes.len() < 4 {
        return Err(Error::Truncated { field });
    }
    let (len, rest) = bytes.split_at(4);
    let len = u32::from_be_bytes([len[0], len[1], len[2], len[3]]) as usize;
    if rest.len() < len {
        return Err(Error::Truncated { field });
    }
    let (value, rest) = rest.split_at(len);
    Ok((value.to_vec(), rest))
}

/// Checks `count` fits the one-byte wire length prefix `field` is written
/// with; `as u8` would otherwise truncate mod 256 instead of erroring.
fn check_u8_count(field: &'static str, count: usize) -> Result<(), Error> {
    if count > u8::MAX as usize {
        return Err(Error::TooManyEntries { field, count });
    }
    Ok(())
}

fn encode_data(data: &TransactionData) -> Result<Vec<u8>, Error> {
    check_u8_count("ownerships", data.ownerships.len())?;
    for ownership in &data.ownerships {
        check_u8_count("authorized_keys", ownership.authorized_keys.len())?;
    }
    check_u8_count("recipients", data.recipients.len())?;

    let mut out = Vec::new();
    write_len_prefixed_u32(&mut out, &data.content);
    write_len_prefixed_u32(&mut out, data.code.as_bytes());

    out.extend_from_slice(&(data.ownerships.len() as u8).to_be_bytes());
    for ownership in &data.ownerships {
        write_len_prefixed_u16(&mut out, &ownership.secret);
        out.extend_from_slice(&(ownership.authorized_keys.len() as u8).to_be_bytes());
        // BTreeMap iterates in key order already, which is what makes this
        // stable across construction order.
        for (key, encrypted) in &ownership.authorized_keys {
            out.extend_from_slice(&key.to_bytes());
            write_len_prefixed_u16(&mut out, encrypted);
        }
    }

    out.extend_from_slice(&(data.recipients.len() as u8).to_be_bytes());
    for recipient in &data.recipients {
        out.extend_from_slice(&recipient.to_bytes());
    }

    out.extend_from_slice(&(data.ledger.uco.len() as u16).to_be_bytes());
    for transfer in &data.ledger.uco {
        out.extend_from_slice(&transfer.to.to_bytes());
        out.extend_from_slice(&transfer.amount.to_be_bytes());
    }

    out.extend_from_slice(&(data.ledger.token.len() as u16).to_be_bytes());
    for transfer in &data.ledger.token {
        out.extend_from_slice(&transfer.to.to_bytes());
        out.extend_from_slice(&transfer.token_address.to_bytes());
        out.extend_from_slice(&transfer.amount.to_be_bytes());
        out.extend_from_slice(&transfer.token_id.to_be_bytes());
    }

    Ok(out)
}

fn decode_data(bytes: &[u8]) -> Result<(TransactionData, &[u8]), Error> {
    let (content, rest) = read_len_prefixed_u32(bytes, "content")?;
    let (code_bytes, rest) = read_len_prefixed_u32(rest, "code")?;
    let code = String::from_utf8(code_bytes).map_err(|_| Error::InvalidUtf8)?;

    let (&ownership_count, mut rest) =
        rest.split_first().ok_or(Error::Truncated { field: "ownerships.len" })?;
    let mut ownerships = Vec::with_capacity(ownership_count as usize);
    for _ in 0..ownership_count {
        let (secret, r) = read_len_prefixed_u16(rest, "ownership.secret")?;
        let (&key_count, mut r) = r
            .split_first()
            .ok_or(Error::Truncated { field: "authorized_keys.len" })?;
        let mut authorized_keys = BTreeMap::new();
        for _ in 0..key_count {
            let (key, r2) = TaggedPublicKey::parse(r)?;
            let (encrypted, r2) = read_len_prefixed_u16(r2, "authorized_key.encrypted")?;
            authorized_keys.insert(key, encrypted);
            r = r2;
        }
        ownerships.push(Ownership::new(secret, authorized_keys));
        rest = r;
    }

    let (&recipient_count, mut rest) =
        rest.split_first().ok_or(Error::Truncated { field: "recipients.len" })?;
    let mut recipients = Vec::with_capacity(recipient_count as usize);
    for _ in 0..recipient_count {
        let (hash, r) = TaggedHash::parse(rest)?;
        recipients.push(hash);
        rest = r;
    }

    if rest.len() < 2 {
        return Err(Error::Truncated { field: "ledger.uco.len" });
    }
    let (len, mut rest) = rest.split_at(2);
    let uco_count = u16::from_be_bytes([len[0], len[1]]);
    let mut uco = Vec::with_capacity(uco_count as usize);
    for _ in 0..uco_count {
        let (to, r) = TaggedHash::parse(rest)?;
        if r.len() < 8 {
            return Err(Error::Truncated { field: "uco.amount" });
        }
        let (amount_bytes, r) = r.split_at(8);
        let amount = u64::from_be_bytes(amount_bytes.try_into().unwrap());
        uco.push(UcoTransfer { to, amount });
        rest = r;
    }

    if rest.len() < 2 {
        return Err(Error::Truncated { field: "ledger.token.len" });
    }
    let (len, mut rest) = rest.split_at(2);
    let token_count = u16::from_be_bytes([len[0], len[1]]);
    let mut token = Vec::with_capacity(token_count as usize);
    for _ in 0..token_count {
        let (to, r) = TaggedHash::parse(rest)?;
        let (token_address, r) = TaggedHash::parse(r)?;
        if r.len() < 16 {
            return Err(Error::Truncated { field: "token.amount" });
        }
        let (amount_bytes, r) = r.split_at(8);
        let (id_bytes, r) = r.split_at(8);
        token.push(TokenTransfer {
            to,
            token_address,
            amount: u64::from_be_bytes(amount_bytes.try_into().unwrap()),
            token_id: u64::from_be_bytes(id_bytes.try_into().unwrap()),
        });
        rest = r;
    }

    Ok((
        TransactionData {
            content,
            code,
            ownerships,
            recipients,
            ledger: TxLedger { uco, token },
        },
        rest,
    ))
}

/// `derive_address(public_key)` using SHA-256, the algorithm new addresses
/// are minted with by default.
pub fn derive_default_address(public_key: &TaggedPublicKey) -> TaggedHash {
    ambernet_crypto::derive::derive_address(public_key, HashAlgorithm::Sha256)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambernet_crypto::algorithm::KeyAlgorithm;
    use ambernet_crypto::derive::derive_keypair;

    fn sample_tx() -> Transaction {
        let (public, _private) = derive_keypair(b"node-seed", 0);
        let address = derive_default_address(&public);

        let (other_public, _) = derive_keypair(b"other", 0);
        let mut authorized_keys = BTreeMap::new();
        authorized_keys.insert(other_public, vec![9, 9, 9]);

        Transaction {
            address,
            tx_type: TransactionType::Transfer,
            previous_public_key: public,
            previous_signature: vec![1; 64],
            origin_signature: vec![2; 64],
            data: TransactionData {
                content: b"hello world".to_vec(),
                code: "condition inherit: []".to_string(),
                ownerships: vec![Ownership::new(b"s3cr3t".to_vec(), authorized_keys)],
                recipients: vec![address_of(&derive_keypair(b"recipient", 0).0)],
                ledger: TxLedger {
                    uco: vec![UcoTransfer {
                        to: address_of(&derive_keypair(b"uco-to", 0).0),
                        amount: 100_000_000,
                    }],
                    token: vec![],
                },
            },
        }
    }

    fn address_of(pk: &TaggedPublicKey) -> TaggedHash {
        derive_default_address(pk)
    }

    #[test]
    fn serialize_then_deserialize_round_trips() {
        let tx = sample_tx();
        let bytes = tx.serialize().unwrap();
        let (decoded, rest) = Transaction::deserialize(&bytes).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, tx);
    }

    #[test]
    fn equal_transactions_serialize_identically() {
        let a = sample_tx();
        let b = sample_tx();
        assert_eq!(a.serialize().unwrap(), b.serialize().unwrap());
    }

    #[test]
    fn previous_address_uses_the_transactions_own_hash_algorithm() {
        let tx = sample_tx();
        assert_eq!(tx.previous_address().algorithm(), tx.address.algorithm());
    }

    #[test]
    fn truncated_input_is_rejected_not_panicking() {
        let tx = sample_tx();
        let mut bytes = tx.serialize().unwrap();
        bytes.truncate(bytes.len() - 5);
        assert!(Transaction::deserialize(&bytes).is_err());
    }

    #[test]
    fn more_than_255_ownerships_errs_instead_of_truncating() {
        let mut tx = sample_tx();
        tx.data.ownerships = (0..300)
            .map(|i| Ownership::new(vec![i as u8], BTreeMap::new()))
            .collect();
        assert_eq!(
            tx.data_bytes().unwrap_err(),
            Error::TooManyEntries { field: "ownerships", count: 300 }
        );
    }

    #[test]
    fn more_than_255_authorized_keys_on_one_ownership_errs_instead_of_truncating() {
        let mut tx = sample_tx();
        let mut authorized_keys = BTreeMap::new();
        for i in 0..300u32 {
            let (key, _) = derive_keypair(&i.to_be_bytes(), 0);
            authorized_keys.insert(key, vec![]);
        }
        tx.data.ownerships = vec![Ownership::new(b"secret".to_vec(), authorized_keys)];
        assert_eq!(
            tx.data_bytes().unwrap_err(),
            Error::TooManyEntries { field: "authorized_keys", count: 300 }
        );
    }

    #[test]
    fn more_than_255_recipients_errs_instead_of_truncating() {
        let mut tx = sample_tx();
        tx.data.recipients = (0..300u32)
            .map(|i| address_of(&derive_keypair(&i.to_be_bytes(), 0).0))
            .collect();
        assert_eq!(
            tx.data_bytes().unwrap_err(),
            Error::TooManyEntries { field: "recipients", count: 300 }
        );
    }

    #[test]
    fn unknown_key_algorithm_tag_fails_cleanly() {
        assert!(KeyAlgorithm::from_tag(99).is_err());
    }

    #[test]
    fn json_round_trips_through_serde() {
        let tx = sample_tx();
        let json = serde_json::to_string(&tx).unwrap();
        let parsed: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tx);
    }
}
