//! Programmable transaction construction and resolution.
//!
//! A [`Transaction`] holds a [`TransactionData`] IR. Inputs may be left
//! unresolved: objects known only by id, and pure values that are typed
//! once the Move function consuming them is known. Building runs the
//! resolution pipeline, which asks the ledger for what is missing
//! (object versions, parameter signatures, gas price, budget and
//! payment) and then serializes the result to BCS.
//!
//! # Overview
//!
//! - [`builder`] - the user-facing [`Transaction`] and its helpers
//! - [`data`] - the IR, command rewriting and BCS conversion
//! - [`json`] - the versioned JSON snapshot format
//! - [`plugins`] - the continuation-passing plugin runner
//! - [`resolve`] - the resolution stages
//!
//! # Example: extending resolution
//!
//! ```rust,ignore
//! use sui_txn_builder::transaction::{Next, Plugin, ResolveContext, TransactionData};
//!
//! struct DefaultBudget;
//!
//! #[async_trait::async_trait]
//! impl Plugin<TransactionData, ResolveContext> for DefaultBudget {
//!     fn name(&self) -> &str {
//!         "default-budget"
//!     }
//!
//!     async fn run(
//!         &self,
//!         data: &mut TransactionData,
//!         context: &ResolveContext,
//!         next: Next<'_, TransactionData, ResolveContext>,
//!     ) -> BuilderResult<()> {
//!         data.gas_data.budget.get_or_insert(10_000_000);
//!         next.run(data, context).await
//!     }
//! }
//!
//! tx.add_build_plugin(Arc::new(DefaultBudget));
//! ```

pub mod builder;
pub mod data;
pub mod json;
pub mod plugins;
pub mod resolve;

pub use builder::{BuildOptions, Transaction, TransactionResult, TransactionState};
pub use data::{
    ArgumentKind, BuildDataOptions, Command, GasConfig, Input, IntentArgs, MoveCall,
    TransactionData, TransactionIntent, TransactionOverrides, UnresolvedObject,
};
pub use json::SerializedTransactionDataV2;
pub use plugins::{Next, Plugin, PluginRegistry, PluginRunner};
pub use resolve::{
    compute_gas_budget, resolve_transaction_data, ResolveConfig, ResolveContext,
    TransactionPlugin, TransactionPlugins,
};
