//! Addresses and object ids.
//!
//! Both are 32-byte values displayed as `0x` followed by 64 lowercase hex
//! characters. Short forms such as `0x2` are zero-padded on the left.

use crate::bcs::{self, BcsType, BcsValue, FromBcsValue, IntoBcsValue};
use crate::error::{BcsError, BcsResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The length of an address in bytes.
pub const SUI_ADDRESS_LENGTH: usize = 32;

/// A 32-byte account address.
///
/// # Example
///
/// ```rust
/// use sui_txn_types::SuiAddress;
///
/// let addr = SuiAddress::from_hex("0x2").unwrap();
/// assert_eq!(
///     addr.to_string(),
///     "0x0000000000000000000000000000000000000000000000000000000000000002"
/// );
/// assert_eq!(addr.to_short_string(), "0x2");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SuiAddress([u8; SUI_ADDRESS_LENGTH]);

/// Object ids share the address representation.
pub type ObjectId = SuiAddress;

impl SuiAddress {
    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; SUI_ADDRESS_LENGTH]);

    /// The Move standard library address (0x1).
    pub const STD: Self = Self::from_u8(1);

    /// The Sui framework address (0x2).
    pub const FRAMEWORK: Self = Self::from_u8(2);

    /// Creates an address from a byte array.
    pub const fn new(bytes: [u8; SUI_ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    const fn from_u8(value: u8) -> Self {
        let mut bytes = [0u8; SUI_ADDRESS_LENGTH];
        bytes[SUI_ADDRESS_LENGTH - 1] = value;
        Self(bytes)
    }

    /// Parses a hex string with or without a `0x` prefix.
    ///
    /// Inputs shorter than 64 hex digits are zero-padded on the left.
    pub fn from_hex<T: AsRef<str>>(hex_str: T) -> BcsResult<Self> {
        let hex_str = hex_str.as_ref();
        let digits = hex_str
            .strip_prefix("0x")
            .or_else(|| hex_str.strip_prefix("0X"))
            .unwrap_or(hex_str);

        if digits.is_empty() {
            return Err(BcsError::InvalidAddress(
                "address must contain at least one hex digit".to_string(),
            ));
        }
        if digits.len() > SUI_ADDRESS_LENGTH * 2 {
            return Err(BcsError::InvalidAddress(format!(
                "address too long: {} characters (max {})",
                digits.len(),
                SUI_ADDRESS_LENGTH * 2
            )));
        }

        let padded = format!("{digits:0>64}");
        let bytes = hex::decode(&padded)
            .map_err(|e| BcsError::InvalidAddress(format!("{hex_str}: {e}")))?;
        Self::from_bytes(bytes)
    }

    /// Creates an address from exactly 32 bytes.
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> BcsResult<Self> {
        let bytes = bytes.as_ref();
        let array: [u8; SUI_ADDRESS_LENGTH] = bytes.try_into().map_err(|_| {
            BcsError::InvalidAddress(format!(
                "expected {SUI_ADDRESS_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Full `0x`-prefixed lowercase hex form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Hex form with leading zeros trimmed, e.g. `0x2`.
    pub fn to_short_string(&self) -> String {
        let hex = hex::encode(self.0);
        let trimmed = hex.trim_start_matches('0');
        if trimmed.is_empty() {
            "0x0".to_string()
        } else {
            format!("0x{trimmed}")
        }
    }

    pub fn is_zero(&self) -> bool {
        self == &Self::ZERO
    }
}

/// Normalizes an address string to its full `0x`-prefixed 64-digit form.
pub fn normalize_sui_address(value: &str) -> BcsResult<String> {
    SuiAddress::from_hex(value).map(|a| a.to_hex())
}

/// Returns true if `value` is a full-length hex address with a `0x` prefix.
pub fn is_valid_sui_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|digits| {
            digits.len() == SUI_ADDRESS_LENGTH * 2 && digits.bytes().all(|b| b.is_ascii_hexdigit())
        })
}

static ADDRESS: Lazy<BcsType<SuiAddress>> = Lazy::new(|| {
    bcs::bytes(SUI_ADDRESS_LENGTH).transform(
        "address",
        |addr: &SuiAddress| Ok(addr.to_vec()),
        SuiAddress::from_bytes,
    )
});

/// Schema for a 32-byte address with no length prefix.
pub fn address() -> BcsType<SuiAddress> {
    ADDRESS.clone()
}

impl Default for SuiAddress {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SuiAddress({})", self.to_short_string())
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for SuiAddress {
    type Err = BcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; SUI_ADDRESS_LENGTH]> for SuiAddress {
    fn from(bytes: [u8; SUI_ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for SuiAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl IntoBcsValue for SuiAddress {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::String(self.to_hex())
    }
}

impl FromBcsValue for SuiAddress {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        match value {
            BcsValue::String(s) => Self::from_hex(s),
            BcsValue::Vector(_) => Self::from_bytes(Vec::<u8>::from_bcs_value(value)?),
            other => Err(BcsError::validation(
                "address",
                format!("expected hex string or bytes, got {}", other.kind()),
            )),
        }
    }
}

impl Serialize for SuiAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            use serde::ser::SerializeTuple;
            let mut tuple = serializer.serialize_tuple(SUI_ADDRESS_LENGTH)?;
            for byte in &self.0 {
                tuple.serialize_element(byte)?;
            }
            tuple.end()
        }
    }
}

impl<'de> Deserialize<'de> for SuiAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <[u8; SUI_ADDRESS_LENGTH]>::deserialize(deserializer)?;
            Ok(Self(bytes))
        }
    }
}
