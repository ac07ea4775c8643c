//! Byte cursor for decoding.

use crate::bcs::uleb::uleb_decode;
use crate::error::{BcsError, BcsResult};
use num_bigint::BigUint;

/// A read cursor over an immutable byte buffer.
///
/// Each reader tracks its own offset; it is not meant to be shared between
/// concurrent decodes.
#[derive(Debug, Clone)]
pub struct BcsReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> BcsReader<'a> {
    /// Creates a reader positioned at the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    /// Current read offset.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    /// Returns true once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Advances the cursor by `n` bytes without reading them.
    pub fn shift(&mut self, n: usize) -> BcsResult<()> {
        self.take(n).map(|_| ())
    }

    /// Reads exactly `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> BcsResult<&'a [u8]> {
        self.take(n)
    }

    pub fn read_u8(&mut self) -> BcsResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> BcsResult<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub fn read_u32(&mut self) -> BcsResult<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn read_u64(&mut self) -> BcsResult<u64> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    /// Reads a 128-bit integer as two little-endian 64-bit halves.
    pub fn read_u128(&mut self) -> BcsResult<u128> {
        let low = self.read_u64()?;
        let high = self.read_u64()?;
        Ok((u128::from(high) << 64) | u128::from(low))
    }

    /// Reads a 256-bit integer as two little-endian 128-bit halves.
    pub fn read_u256(&mut self) -> BcsResult<BigUint> {
        let low = self.read_u128()?;
        let high = self.read_u128()?;
        Ok((BigUint::from(high) << 128u32) | BigUint::from(low))
    }

    /// Reads a ULEB128 integer.
    pub fn read_uleb128(&mut self) -> BcsResult<u64> {
        let start = self.position;
        let (value, len) = uleb_decode(&self.bytes[start..])
            .map_err(|_| BcsError::MalformedUleb128 { offset: start })?;
        self.position += len;
        Ok(value)
    }

    /// Reads a ULEB128 length prefix and checks it against the unread bytes.
    ///
    /// Every element occupies at least `min_element_size` bytes, so a length
    /// that could not possibly fit is rejected before anything is allocated.
    pub fn read_length(&mut self, min_element_size: usize) -> BcsResult<usize> {
        let start = self.position;
        let length = self.read_uleb128()?;
        let length = usize::try_from(length).map_err(|_| BcsError::MalformedUleb128 { offset: start })?;
        let needed = length.saturating_mul(min_element_size);
        if needed > self.remaining() {
            return Err(BcsError::UnexpectedEof {
                offset: self.position,
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(length)
    }

    fn take(&mut self, n: usize) -> BcsResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(BcsError::UnexpectedEof {
                offset: self.position,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.position..self.position + n];
        self.position += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> BcsResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }
}
