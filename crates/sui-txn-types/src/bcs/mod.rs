//! Binary Canonical Serialization built from composable schemas.
//!
//! Schemas are plain values: primitives come from constructor functions
//! ([`u8`], [`u64`], [`string`], ...) and composites wrap their children
//! ([`vector`], [`option`], [`struct_`], [`enum_`], ...).
//!
//! ```
//! use sui_txn_types::bcs::{self, BcsValue};
//!
//! let coin = bcs::struct_(
//!     "Coin",
//!     [("id", bcs::bytes(32).dynamic()), ("value", bcs::u64().dynamic())],
//! );
//! let value = BcsValue::structure([
//!     ("id", BcsValue::Vector(vec![BcsValue::U8(0); 32])),
//!     ("value", BcsValue::U64(1000)),
//! ]);
//! let bytes = coin.serialize(&value).unwrap();
//! assert_eq!(bytes.as_bytes().len(), 40);
//! assert_eq!(coin.parse(bytes.as_bytes()).unwrap(), value);
//! ```

mod reader;
mod schema;
mod uleb;
mod value;
mod writer;

pub use reader::BcsReader;
pub use schema::{
    bool, byte_vector, bytes, enum_, fixed_array, lazy, map, option, string, struct_, tuple2,
    tuple3, u128, u16, u256, u32, u64, u8, uleb128, vector, BcsType, SerializedBcs,
};
pub use uleb::{uleb_decode, uleb_encode, uleb_len, MAX_ULEB128_LEN};
pub use value::{BcsValue, FromBcsValue, IntoBcsValue};
pub use writer::{BcsWriter, BcsWriterOptions, DEFAULT_ALLOCATE_SIZE, DEFAULT_INITIAL_SIZE};
