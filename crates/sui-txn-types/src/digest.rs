//! Object and transaction digests.
//!
//! A digest is 32 bytes, encoded on the wire as a length-prefixed byte vector
//! and displayed in base58.

use crate::bcs::{self, BcsType, BcsValue, FromBcsValue, IntoBcsValue};
use crate::error::{BcsError, BcsResult};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The length of a digest in bytes.
pub const DIGEST_LENGTH: usize = 32;

type Blake2b256 = Blake2b<U32>;

/// Hashes `bytes` under a domain tag: `blake2b256(tag ++ "::" ++ bytes)`.
pub fn hash_typed_data(type_tag: &str, bytes: &[u8]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Blake2b256::new();
    hasher.update(type_tag.as_bytes());
    hasher.update(b"::");
    hasher.update(bytes);
    let mut out = [0u8; DIGEST_LENGTH];
    out.copy_from_slice(&hasher.finalize());
    out
}

macro_rules! digest_type {
    ($(#[$doc:meta])* $name:ident, $schema:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name([u8; DIGEST_LENGTH]);

        impl $name {
            pub const fn new(bytes: [u8; DIGEST_LENGTH]) -> Self {
                Self(bytes)
            }

            /// Creates a digest from exactly 32 bytes.
            pub fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> BcsResult<Self> {
                let bytes = bytes.as_ref();
                let array: [u8; DIGEST_LENGTH] = bytes.try_into().map_err(|_| {
                    BcsError::InvalidDigest(format!(
                        "expected {DIGEST_LENGTH} bytes, got {}",
                        bytes.len()
                    ))
                })?;
                Ok(Self(array))
            }

            /// Parses a base58 string.
            pub fn from_base58(encoded: &str) -> BcsResult<Self> {
                let bytes = bs58::decode(encoded)
                    .into_vec()
                    .map_err(|e| BcsError::InvalidDigest(format!("{encoded}: {e}")))?;
                Self::from_bytes(bytes)
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn to_base58(&self) -> String {
                bs58::encode(self.0).into_string()
            }

            /// Schema: length-prefixed 32-byte vector.
            pub fn schema() -> BcsType<Self> {
                bcs::byte_vector().transform(
                    $schema,
                    |digest: &Self| Ok(digest.0.to_vec()),
                    |bytes: Vec<u8>| {
                        Self::from_bytes(&bytes)
                            .map_err(|e| BcsError::invalid_encoding($schema, e.to_string()))
                    },
                )
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_base58())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_base58())
            }
        }

        impl FromStr for $name {
            type Err = BcsError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_base58(s)
            }
        }

        impl IntoBcsValue for $name {
            fn into_bcs_value(self) -> BcsValue {
                BcsValue::String(self.to_base58())
            }
        }

        impl FromBcsValue for $name {
            fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
                match value {
                    BcsValue::String(s) => Self::from_base58(s),
                    BcsValue::Vector(_) => Self::from_bytes(Vec::<u8>::from_bcs_value(value)?),
                    other => Err(BcsError::validation(
                        $schema,
                        format!("expected base58 string or bytes, got {}", other.kind()),
                    )),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                if serializer.is_human_readable() {
                    serializer.serialize_str(&self.to_base58())
                } else {
                    serializer.serialize_bytes(&self.0)
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                if deserializer.is_human_readable() {
                    let s = String::deserialize(deserializer)?;
                    Self::from_base58(&s).map_err(serde::de::Error::custom)
                } else {
                    let bytes = <Vec<u8>>::deserialize(deserializer)?;
                    Self::from_bytes(bytes).map_err(serde::de::Error::custom)
                }
            }
        }
    };
}

digest_type!(
    /// Digest pinning one version of an object's contents.
    ObjectDigest,
    "ObjectDigest"
);

digest_type!(
    /// Digest identifying a transaction.
    TransactionDigest,
    "TransactionDigest"
);

impl TransactionDigest {
    /// Digest of serialized `TransactionData` bytes.
    pub fn of_transaction_data(bytes: &[u8]) -> Self {
        Self(hash_typed_data("TransactionData", bytes))
    }
}
