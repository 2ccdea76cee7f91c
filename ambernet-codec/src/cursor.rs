//! Byte-level reader/writer for the fixed-width big-endian fields that make
//! up every frame. Little-endian is never used.

use byteorder::{BigEndian, ByteOrder};

use crate::Error;

/// A read cursor over a frame's payload.
pub struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn remaining(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], Error> {
        if self.bytes.len() < n {
            return Err(Error::Incomplete {
                field,
                needed: n - self.bytes.len(),
            });
        }
        let (head, tail) = self.bytes.split_at(n);
        self.bytes = tail;
        Ok(head)
    }

    pub fn u8(&mut self, field: &'static str) -> Result<u8, Error> {
        Ok(self.take(1, field)?[0])
    }

    pub fn u16(&mut self, field: &'static str) -> Result<u16, Error> {
        Ok(BigEndian::read_u16(self.take(2, field)?))
    }

    pub fn u32(&mut self, field: &'static str) -> Result<u32, Error> {
        Ok(BigEndian::read_u32(self.take(4, field)?))
    }

    pub fn u64(&mut self, field: &'static str) -> Result<u64, Error> {
        Ok(BigEndian::read_u64(self.take(8, field)?))
    }

    pub fn f64(&mut self, field: &'static str) -> Result<f64, Error> {
        Ok(BigEndian::read_f64(self.take(8, field)?))
    }

    pub fn bytes(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], Error> {
        self.take(n, field)
    }

    pub fn tagged_hash(&mut self) -> Result<ambernet_crypto::TaggedHash, Error> {
        let (hash, rest) = ambernet_crypto::TaggedHash::parse(self.bytes)?;
        self.bytes = rest;
        Ok(hash)
    }

    pub fn tagged_key(&mut self) -> Result<ambernet_crypto::TaggedPublicKey, Error> {
        let (key, rest) = ambernet_crypto::TaggedPublicKey::parse(self.bytes)?;
        self.bytes = rest;
        Ok(key)
    }

    pub fn transaction(&mut self) -> Result<ambernet_tx::Transaction, Error> {
        let (tx, rest) = ambernet_tx::Transaction::deserialize(self.bytes)?;
        self.bytes = rest;
        Ok(tx)
    }
}

/// A write cursor building up a frame's payload.
#[derive(Default)]
pub struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.bytes.push(value);
        self
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn f64(&mut self, value: f64) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn tagged_hash(&mut self, hash: &ambernet_crypto::TaggedHash) -> &mut Self {
        self.raw(&hash.to_bytes())
    }

    pub fn tagged_key(&mut self, key: &ambernet_crypto::TaggedPublicKey) -> &mut Self {
        self.raw(&key.to_bytes())
    }

    pub fn transaction(&mut self, tx: &ambernet_tx::Transaction) -> Result<&mut Self, Error> {
        self.raw(&tx.serialize()?);
        Ok(self)
    }
}
