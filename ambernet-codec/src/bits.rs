//! Packed bit-vectors ("views") and the tightly-packed bit fields that
//! follow a transaction in `ReplicateTransaction` / precede a pair of role
//! matrices in `CrossValidate`.
//!
//! A view is self-delimited by an 8-bit length followed by that many bits,
//! MSB-first, padded to the next byte boundary. Tightly-packed fields (the
//! 3-bit roles + 1-bit ack of `ReplicateTransaction`, and the three
//! back-to-back role matrices of `CrossValidate`) share no such per-field
//! length and must be read as one continuous bitstream instead.

use bitvec::prelude::*;

use crate::Error;

/// One self-delimited bit-vector: `bit_len:u8 ‖ packed bits`.
///
/// Errors rather than panics when `bits` doesn't fit the 8-bit length
/// prefix; a view this is asked to write always comes from either a
/// decoded frame (already bounded by its own `u8`/capped `u16` length
/// field) or a caller-constructed `Frame`, and the latter is not trusted
/// to respect the 255-bit limit.
pub fn write_view(out: &mut Vec<u8>, bits: &[bool]) -> Result<(), Error> {
    if bits.len() > u8::MAX as usize {
        return Err(Error::Malformed(format!(
            "view has {} bits, exceeds the 255-bit maximum a view's length prefix can encode",
            bits.len()
        )));
    }
    out.push(bits.len() as u8);
    let mut acc: BitVec<u8, Msb0> = BitVec::with_capacity(bits.len());
    for &bit in bits {
        acc.push(bit);
    }
    out.extend_from_slice(acc.as_raw_slice());
    Ok(())
}

/// Inverse of [`write_view`]. Returns the bits and the byte-aligned
/// remainder; any padding bits added to reach a byte boundary are
/// discarded, not semantically significant.
pub fn read_view<'a>(bytes: &'a [u8]) -> Result<(Vec<bool>, &'a [u8]), Error> {
    let (&len, rest) = bytes.split_first().ok_or(Error::Incomplete {
        field: "view.bit_len",
        needed: 1,
    })?;
    let len = len as usize;
    let byte_len = len.div_ceil(8);
    if rest.len() < byte_len {
        return Err(Error::Incomplete {
            field: "view.bits",
            needed: byte_len - rest.len(),
        });
    }
    let (packed, rest) = rest.split_at(byte_len);
    let slice = BitSlice::<u8, Msb0>::from_slice(packed);
    let bits = slice[..len].iter().by_vals().collect();
    Ok((bits, rest))
}

/// Accumulates tightly-packed bits (no per-field length) to be flushed as
/// one padded byte run, e.g. the 3-bit roles + 1-bit ack of
/// `ReplicateTransaction`, or the three concatenated role matrices of
/// `CrossValidate`.
#[derive(Default)]
pub struct BitWriter {
    acc: BitVec<u8, Msb0>,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bit: bool) -> &mut Self {
        self.acc.push(bit);
        self
    }

    pub fn push_many(&mut self, bits: &[bool]) -> &mut Self {
        for &bit in bits {
            self.acc.push(bit);
        }
        self
    }

    /// Flush to bytes, MSB-first, zero-padded to the next byte boundary.
    pub fn into_bytes(self) -> Vec<u8> {
        self.acc.into_vec()
    }
}

/// Reads a continuous run of tightly-packed bits from a byte slice,
/// advancing a bit position that is only realigned to a byte boundary once
/// the caller asks for the remaining bytes.
pub struct BitReader<'a> {
    bytes: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, bit_pos: 0 }
    }

    pub fn read_bits(&mut self, n: usize, field: &'static str) -> Result<Vec<bool>, Error> {
        let total_bits = self.bytes.len() * 8;
        if self.bit_pos + n > total_bits {
            let needed_bits = self.bit_pos + n - total_bits;
            return Err(Error::Incomplete {
                field,
                needed: needed_bits.div_ceil(8),
            });
        }
        let slice = BitSlice::<u8, Msb0>::from_slice(self.bytes);
        let bits = slice[self.bit_pos..self.bit_pos + n].iter().by_vals().collect();
        self.bit_pos += n;
        Ok(bits)
    }

    pub fn read_bit(&mut self, field: &'static str) -> Result<bool, Error> {
        Ok(self.read_bits(1, field)?[0])
    }

    /// Round the bit position up to the next byte boundary and return the
    /// remaining, now byte-aligned, bytes.
    pub fn byte_align_remainder(&self) -> &'a [u8] {
        let byte_pos = self.bit_pos.div_ceil(8);
        &self.bytes[byte_pos..]
    }
}
