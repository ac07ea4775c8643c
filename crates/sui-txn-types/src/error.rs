//! Error types for the codec and the canonical value types.

use thiserror::Error;

/// A specialized Result type for codec operations.
pub type BcsResult<T> = Result<T, BcsError>;

/// Errors produced while writing, reading or converting BCS values.
///
/// Variants fall in two groups: validation errors are raised before anything
/// is written for a value whose shape does not match its schema, decode errors
/// are raised while reading and always abort the whole read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BcsError {
    /// A value does not match the shape its schema expects
    #[error("Invalid {schema} value: {message}")]
    Validation {
        /// Name of the schema that rejected the value
        schema: String,
        /// What was wrong with it
        message: String,
    },

    /// The buffer ended before the value was complete
    #[error("Unexpected end of input: needed {needed} bytes at offset {offset}, {remaining} remaining")]
    UnexpectedEof {
        /// Byte offset of the failed read
        offset: usize,
        /// Bytes the read required
        needed: usize,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// An enum tag has no matching variant
    #[error("Unknown variant index {index} for {schema}")]
    UnknownVariant {
        /// Name of the enum schema
        schema: String,
        /// The decoded tag
        index: u64,
    },

    /// A ULEB128 integer is malformed or overflows 64 bits
    #[error("Malformed ULEB128 integer at offset {offset}")]
    MalformedUleb128 {
        /// Byte offset where the integer starts
        offset: usize,
    },

    /// Decoded data is structurally invalid (bad bool byte, bad UTF-8, ...)
    #[error("Invalid encoding for {schema}: {message}")]
    InvalidEncoding {
        /// Name of the schema being read
        schema: String,
        /// What was wrong with the bytes
        message: String,
    },

    /// Bytes were left over after a complete value was read
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// A string is not a valid address or object id
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A string or byte sequence is not a valid 32-byte digest
    #[error("Invalid digest: {0}")]
    InvalidDigest(String),

    /// A type string could not be parsed
    #[error("Invalid type tag: {0}")]
    InvalidTypeTag(String),

    /// The writer would need to grow past its configured maximum
    #[error("Serialized size limit exceeded: {required} bytes required, maximum is {max}")]
    SizeLimit {
        /// Size the write would require
        required: usize,
        /// Configured maximum size
        max: usize,
    },
}

impl BcsError {
    /// Creates a validation error for the named schema.
    pub fn validation(schema: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            schema: schema.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid-encoding error for the named schema.
    pub fn invalid_encoding(schema: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            schema: schema.into(),
            message: message.into(),
        }
    }

    /// Returns true for errors raised while checking a value before writing it.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::InvalidAddress(_)
                | Self::InvalidDigest(_)
                | Self::InvalidTypeTag(_)
        )
    }

    /// Returns true for errors raised while reading bytes.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEof { .. }
                | Self::UnknownVariant { .. }
                | Self::MalformedUleb128 { .. }
                | Self::InvalidEncoding { .. }
                | Self::TrailingBytes(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BcsError::validation("u8", "expected integer, got string");
        assert_eq!(
            err.to_string(),
            "Invalid u8 value: expected integer, got string"
        );
    }

    #[test]
    fn test_classification() {
        assert!(BcsError::validation("u8", "bad").is_validation());
        assert!(!BcsError::validation("u8", "bad").is_decode());
        assert!(BcsError::TrailingBytes(3).is_decode());
        assert!(
            BcsError::UnknownVariant {
                schema: "Argument".into(),
                index: 9
            }
            .is_decode()
        );
        let limit = BcsError::SizeLimit {
            required: 10,
            max: 5,
        };
        assert!(!limit.is_decode());
        assert!(!limit.is_validation());
    }
}
