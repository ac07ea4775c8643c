//! Growable byte sink for encoding.

use crate::bcs::uleb::uleb_encode;
use crate::error::{BcsError, BcsResult};
use num_bigint::BigUint;

/// Default initial buffer size in bytes.
pub const DEFAULT_INITIAL_SIZE: usize = 1024;
/// Default growth step in bytes.
pub const DEFAULT_ALLOCATE_SIZE: usize = 1024;

/// Sizing options for a [`BcsWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcsWriterOptions {
    /// Bytes reserved up front.
    pub initial_size: usize,
    /// Hard upper bound on the buffer; writes beyond it fail.
    pub max_size: usize,
    /// Minimum growth step when the buffer is full.
    pub allocate_size: usize,
}

impl Default for BcsWriterOptions {
    fn default() -> Self {
        Self {
            initial_size: DEFAULT_INITIAL_SIZE,
            max_size: usize::MAX,
            allocate_size: DEFAULT_ALLOCATE_SIZE,
        }
    }
}

impl BcsWriterOptions {
    /// Sets the initial buffer size.
    #[must_use]
    pub fn initial_size(mut self, size: usize) -> Self {
        self.initial_size = size;
        self
    }

    /// Sets the maximum buffer size.
    #[must_use]
    pub fn max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Sets the growth step.
    #[must_use]
    pub fn allocate_size(mut self, size: usize) -> Self {
        self.allocate_size = size;
        self
    }
}

/// An owned, growable output buffer.
///
/// The buffer doubles when full (at least by `allocate_size`) and never grows
/// past `max_size`.
#[derive(Debug, Clone)]
pub struct BcsWriter {
    bytes: Vec<u8>,
    max_size: usize,
    allocate_size: usize,
}

impl Default for BcsWriter {
    fn default() -> Self {
        Self::new(BcsWriterOptions::default())
    }
}

impl BcsWriter {
    /// Creates a writer with the given sizing options.
    pub fn new(options: BcsWriterOptions) -> Self {
        let initial = options.initial_size.min(options.max_size);
        Self {
            bytes: Vec::with_capacity(initial),
            max_size: options.max_size,
            allocate_size: options.allocate_size.max(1),
        }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Current buffer capacity.
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the writer and returns its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write_u8(&mut self, value: u8) -> BcsResult<()> {
        self.write_bytes(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> BcsResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> BcsResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u64(&mut self, value: u64) -> BcsResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u128(&mut self, value: u128) -> BcsResult<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Writes a 256-bit integer as 32 little-endian bytes.
    ///
    /// Callers are expected to have validated the range.
    pub fn write_u256(&mut self, value: &BigUint) -> BcsResult<()> {
        let mut bytes = value.to_bytes_le();
        if bytes.len() > 32 {
            return Err(BcsError::validation("u256", "value exceeds 256 bits"));
        }
        bytes.resize(32, 0);
        self.write_bytes(&bytes)
    }

    pub fn write_uleb128(&mut self, value: u64) -> BcsResult<()> {
        self.write_bytes(&uleb_encode(value))
    }

    /// Writes a ULEB128 length prefix.
    pub fn write_length(&mut self, length: usize) -> BcsResult<()> {
        self.write_uleb128(length as u64)
    }

    /// Appends raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> BcsResult<()> {
        self.ensure_capacity(bytes.len())?;
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    fn ensure_capacity(&mut self, additional: usize) -> BcsResult<()> {
        let required = self.bytes.len().saturating_add(additional);
        if required > self.max_size {
            return Err(BcsError::SizeLimit {
                required,
                max: self.max_size,
            });
        }
        let capacity = self.bytes.capacity();
        if required > capacity {
            let grown = capacity
                .saturating_mul(2)
                .max(capacity.saturating_add(self.allocate_size))
                .max(required)
                .min(self.max_size);
            self.bytes.reserve_exact(grown - self.bytes.len());
        }
        Ok(())
    }
}
