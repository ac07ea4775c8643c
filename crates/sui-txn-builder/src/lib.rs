//! # Sui transaction builder
//!
//! Builds programmable transactions for the Sui ledger and resolves
//! everything a caller would otherwise have to look up by hand.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sui_txn_builder::api::SuiClient;
//! use sui_txn_builder::{BuildOptions, SuiConfig, Transaction};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Arc::new(SuiClient::new(SuiConfig::testnet())?);
//!
//!     let mut tx = Transaction::new();
//!     tx.set_sender(sender)?;
//!     let amount = tx.pure_u64(1_000)?;
//!     let coin = tx.split_coins(tx.gas(), vec![amount])?;
//!     let recipient = tx.pure_address(recipient)?;
//!     tx.transfer_objects(vec![coin.nested_result(0)], recipient)?;
//!
//!     // Gas price, budget and payment are filled in from the ledger
//!     let bytes = tx.build(&BuildOptions::new().with_client(client)).await?;
//!     println!("{} bytes ready to sign", bytes.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`transaction`] - the builder, its IR and the resolution pipeline
//! - [`api`] - the ledger client used during resolution
//! - [`config`] - network and connection configuration
//! - [`retry`] - retry with exponential backoff for ledger calls
//! - [`error`] - error types
//!
//! Wire types and the BCS codec live in the `sui_txn_types` crate.

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]

pub mod api;
pub mod config;
pub mod error;
pub mod retry;
pub mod transaction;

pub use api::{LedgerClient, SuiClient};
pub use config::SuiConfig;
pub use error::{BuilderError, BuilderResult, LookupFailure};
pub use transaction::{BuildOptions, ResolveConfig, Transaction, TransactionResult};

/// Re-export of the wire types crate.
pub use sui_txn_types as types;
