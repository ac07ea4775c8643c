//! # Sui transaction types
//!
//! A schema-driven BCS codec and the canonical Sui values built on it.
//!
//! The [`bcs`] module describes encodings as composable [`BcsType`] values:
//! primitives, vectors, options, tuples, maps, structs and enums, plus
//! `transform` for layering domain types over an existing encoding and
//! `lazy` for recursive shapes. The remaining modules use it to define the
//! values a programmable transaction is made of:
//!
//! - [`address`] - addresses and object ids
//! - [`digest`] - object and transaction digests
//! - [`type_tag`] - Move type tags and their string form
//! - [`transaction`] - the transaction wire types and their schemas
//! - [`move_type`] - parameter signatures reported by the ledger
//! - [`pure`] - pure argument serialization from JSON values
//!
//! ```rust
//! use sui_txn_types::{bcs, TypeTag};
//!
//! let coin: TypeTag = "0x2::coin::Coin<0x2::sui::SUI>".parse().unwrap();
//! let bytes = sui_txn_types::type_tag::type_tag().serialize(&coin).unwrap();
//! assert_eq!(bytes.as_bytes()[0], 7);
//!
//! let amounts = bcs::vector(bcs::u64()).serialize(&vec![1, 2]).unwrap();
//! assert_eq!(amounts.as_bytes().len(), 17);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms)]

pub mod address;
pub mod bcs;
pub mod digest;
pub mod error;
pub mod move_type;
pub mod pure;
pub mod transaction;
pub mod type_tag;

pub use address::{is_valid_sui_address, normalize_sui_address, ObjectId, SuiAddress};
pub use bcs::{BcsType, BcsValue};
pub use digest::{ObjectDigest, TransactionDigest};
pub use error::{BcsError, BcsResult};
pub use move_type::{MoveRef, OpenMoveTypeSignature, OpenMoveTypeSignatureBody};
pub use pure::{pure_schema_for, serialize_pure_json, PureType};
pub use transaction::{
    Argument, CallArg, Command, GasData, ObjectArg, ObjectRef, ProgrammableMoveCall,
    ProgrammableTransaction, TransactionData, TransactionExpiration, TransactionKind,
};
pub use type_tag::{StructTag, TypeTag};
