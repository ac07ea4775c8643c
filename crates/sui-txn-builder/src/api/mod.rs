//! Ledger access.
//!
//! The resolution pipeline talks to the ledger only through [`LedgerClient`].
//! [`SuiClient`] implements it over JSON-RPC; tests and alternative
//! transports provide their own implementations.

pub mod response;
pub mod rpc;

pub use response::{
    Coin, CoinPage, DryRunTransactionBlockResponse, ExecutionStatus, GasCostSummary, ObjectOwner,
    SuiMoveNormalizedFunction, SuiMoveNormalizedType, SuiObjectData, SuiObjectResponse,
    TransactionEffects,
};
pub use rpc::SuiClient;

use crate::error::BuilderResult;
use async_trait::async_trait;
use sui_txn_types::{ObjectId, SuiAddress};

/// The ledger queries the resolution pipeline needs.
///
/// Implementations must be safe to share across tasks: the pipeline issues
/// independent lookups concurrently within a stage.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetches the normalized signature of `package::module::function`.
    async fn get_normalized_move_function(
        &self,
        package: &ObjectId,
        module: &str,
        function: &str,
    ) -> BuilderResult<SuiMoveNormalizedFunction>;

    /// Fetches objects by id, one response per id in request order.
    async fn multi_get_objects(&self, object_ids: &[ObjectId])
        -> BuilderResult<Vec<SuiObjectResponse>>;

    async fn get_reference_gas_price(&self) -> BuilderResult<u64>;

    /// Lists coins of `coin_type` owned by `owner`.
    async fn get_coins(&self, owner: &SuiAddress, coin_type: &str) -> BuilderResult<Vec<Coin>>;

    /// Executes serialized transaction data without committing it.
    async fn dry_run_transaction_block(
        &self,
        tx_bytes: &[u8],
    ) -> BuilderResult<DryRunTransactionBlockResponse>;
}
