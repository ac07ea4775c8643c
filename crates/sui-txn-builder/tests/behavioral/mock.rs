//! In-memory ledger.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use sui_txn_builder::api::{
    Coin, DryRunTransactionBlockResponse, GasCostSummary, ObjectOwner, SuiMoveNormalizedFunction,
    SuiObjectData, SuiObjectResponse,
};
use sui_txn_builder::{BuilderError, BuilderResult, LedgerClient};
use sui_txn_types::{ObjectDigest, ObjectId, ObjectRef, SuiAddress};

pub fn id(byte: u8) -> ObjectId {
    ObjectId::new([byte; 32])
}

pub fn reference(byte: u8, version: u64) -> ObjectRef {
    ObjectRef {
        object_id: id(byte),
        version,
        digest: ObjectDigest::new([byte; 32]),
    }
}

#[derive(Debug, Default)]
pub struct MockLedger {
    objects: HashMap<ObjectId, SuiObjectData>,
    functions: HashMap<String, SuiMoveNormalizedFunction>,
    coins: Vec<Coin>,
    gas_price: u64,
    dry_run: Option<DryRunTransactionBlockResponse>,
    hang_on_gas_price: bool,
    pub function_calls: AtomicUsize,
    pub object_calls: AtomicUsize,
    pub price_calls: AtomicUsize,
    pub coin_calls: AtomicUsize,
    pub dry_run_calls: AtomicUsize,
    pub object_batches: Mutex<Vec<usize>>,
    pub dry_run_bytes: Mutex<Vec<Vec<u8>>>,
    pub coin_owners: Mutex<Vec<SuiAddress>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            gas_price: 1000,
            dry_run: Some(DryRunTransactionBlockResponse::success(GasCostSummary::new(
                1_000_000, 500_000, 200_000,
            ))),
            ..Default::default()
        }
    }

    pub fn with_owned_object(mut self, byte: u8, version: u64, owner: SuiAddress) -> Self {
        let object = SuiObjectData::new(
            id(byte),
            version,
            ObjectDigest::new([byte; 32]),
            ObjectOwner::AddressOwner(owner),
        );
        self.objects.insert(id(byte), object);
        self
    }

    pub fn with_shared_object(mut self, byte: u8, version: u64, initial_shared_version: u64) -> Self {
        let object = SuiObjectData::new(
            id(byte),
            version,
            ObjectDigest::new([byte; 32]),
            ObjectOwner::Shared {
                initial_shared_version,
            },
        );
        self.objects.insert(id(byte), object);
        self
    }

    /// Registers `module::function` under any package.
    pub fn with_function(mut self, module: &str, function: &str, f: SuiMoveNormalizedFunction) -> Self {
        self.functions.insert(format!("{module}::{function}"), f);
        self
    }

    pub fn with_coin(mut self, byte: u8, version: u64, balance: u64) -> Self {
        self.coins.push(Coin {
            coin_type: "0x2::sui::SUI".to_string(),
            coin_object_id: id(byte),
            version: version.to_string(),
            digest: ObjectDigest::new([byte; 32]),
            balance: balance.to_string(),
        });
        self
    }

    pub fn with_gas_price(mut self, price: u64) -> Self {
        self.gas_price = price;
        self
    }

    pub fn with_dry_run(mut self, response: DryRunTransactionBlockResponse) -> Self {
        self.dry_run = Some(response);
        self
    }

    pub fn hanging_on_gas_price(mut self) -> Self {
        self.hang_on_gas_price = true;
        self
    }

    pub fn total_calls(&self) -> usize {
        [
            &self.function_calls,
            &self.object_calls,
            &self.price_calls,
            &self.coin_calls,
            &self.dry_run_calls,
        ]
        .iter()
        .map(|counter| counter.load(Ordering::SeqCst))
        .sum()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_normalized_move_function(
        &self,
        _package: &ObjectId,
        module: &str,
        function: &str,
    ) -> BuilderResult<SuiMoveNormalizedFunction> {
        self.function_calls.fetch_add(1, Ordering::SeqCst);
        self.functions
            .get(&format!("{module}::{function}"))
            .cloned()
            .ok_or_else(|| BuilderError::api(404, format!("no function {module}::{function}")))
    }

    async fn multi_get_objects(&self, object_ids: &[ObjectId]) -> BuilderResult<Vec<SuiObjectResponse>> {
        self.object_calls.fetch_add(1, Ordering::SeqCst);
        self.object_batches.lock().unwrap().push(object_ids.len());
        Ok(object_ids
            .iter()
            .map(|object_id| match self.objects.get(object_id) {
                Some(object) => SuiObjectResponse::found(object.clone()),
                None => SuiObjectResponse::missing(*object_id, "notExists"),
            })
            .collect())
    }

    async fn get_reference_gas_price(&self) -> BuilderResult<u64> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_on_gas_price {
            std::future::pending::<()>().await;
        }
        Ok(self.gas_price)
    }

    async fn get_coins(&self, owner: &SuiAddress, coin_type: &str) -> BuilderResult<Vec<Coin>> {
        self.coin_calls.fetch_add(1, Ordering::SeqCst);
        self.coin_owners.lock().unwrap().push(*owner);
        Ok(self
            .coins
            .iter()
            .filter(|coin| coin.coin_type == coin_type)
            .cloned()
            .collect())
    }

    async fn dry_run_transaction_block(
        &self,
        tx_bytes: &[u8],
    ) -> BuilderResult<DryRunTransactionBlockResponse> {
        self.dry_run_calls.fetch_add(1, Ordering::SeqCst);
        self.dry_run_bytes.lock().unwrap().push(tx_bytes.to_vec());
        self.dry_run
            .clone()
            .ok_or_else(|| BuilderError::Internal("no dry run configured".to_string()))
    }
}
