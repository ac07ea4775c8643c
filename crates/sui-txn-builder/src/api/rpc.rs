//! JSON-RPC client for Sui fullnodes.

use crate::api::response::{
    Coin, CoinPage, DryRunTransactionBlockResponse, SuiMoveNormalizedFunction, SuiObjectResponse,
};
use crate::api::LedgerClient;
use crate::config::SuiConfig;
use crate::error::{BuilderError, BuilderResult};
use crate::retry::{RetryConfig, RetryExecutor};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use sui_txn_types::{ObjectId, SuiAddress};
use tracing::debug;
use url::Url;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Client for the Sui fullnode JSON-RPC API.
///
/// Transport failures and retryable HTTP statuses are retried according to
/// [`SuiConfig::with_retry`]. JSON-RPC error objects are returned as
/// [`BuilderError::Rpc`] without retrying.
///
/// ```rust,no_run
/// use sui_txn_builder::api::{LedgerClient, SuiClient};
/// use sui_txn_builder::SuiConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = SuiClient::new(SuiConfig::testnet())?;
///     let price = client.get_reference_gas_price().await?;
///     println!("Reference gas price: {price}");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SuiClient {
    url: Url,
    client: Client,
    retry: RetryExecutor,
    next_id: Arc<AtomicU64>,
}

impl SuiClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC URL is invalid or the HTTP client fails to build.
    pub fn new(config: SuiConfig) -> BuilderResult<Self> {
        let pool = config.pool_config();

        let mut builder = Client::builder()
            .timeout(config.timeout())
            .pool_idle_timeout(pool.idle_timeout)
            .tcp_nodelay(pool.nodelay)
            .tcp_keepalive(pool.keepalive);

        if let Some(limit) = pool.idle_per_host {
            builder = builder.pool_max_idle_per_host(limit);
        }

        let client = builder.build().map_err(BuilderError::Http)?;

        Ok(Self {
            url: config.rpc_url()?,
            client,
            retry: RetryExecutor::new(config.retry_config().clone()),
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn rpc_url(&self) -> &Url {
        &self.url
    }

    pub fn retry_config(&self) -> &RetryConfig {
        self.retry.config()
    }

    /// Calls a JSON-RPC method and decodes its `result`.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> BuilderResult<T> {
        self.retry
            .execute(method, || self.send(method, params.clone()))
            .await
    }

    async fn send<T: DeserializeOwned>(&self, method: &str, params: Value) -> BuilderResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!(method, id, "Sending RPC request");
        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .json(&body)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> BuilderResult<T> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = if text.is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                text
            };
            return Err(BuilderError::api(status.as_u16(), message));
        }

        // Decode through `Value` so numbers survive arbitrary precision.
        let mut body: Value = response.json().await?;
        if let Some(error) = body.get("error") {
            return Err(BuilderError::Rpc {
                code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown error")
                    .to_string(),
            });
        }

        let result = body
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| BuilderError::Rpc {
                code: 0,
                message: "response has neither result nor error".to_string(),
            })?;
        Ok(serde_json::from_value(result)?)
    }
}

fn value_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

#[async_trait]
impl LedgerClient for SuiClient {
    async fn get_normalized_move_function(
        &self,
        package: &ObjectId,
        module: &str,
        function: &str,
    ) -> BuilderResult<SuiMoveNormalizedFunction> {
        self.call(
            "sui_getNormalizedMoveFunction",
            json!([package.to_hex(), module, function]),
        )
        .await
    }

    async fn multi_get_objects(
        &self,
        object_ids: &[ObjectId],
    ) -> BuilderResult<Vec<SuiObjectResponse>> {
        let ids: Vec<String> = object_ids.iter().map(ObjectId::to_hex).collect();
        self.call("sui_multiGetObjects", json!([ids, { "showOwner": true }]))
            .await
    }

    async fn get_reference_gas_price(&self) -> BuilderResult<u64> {
        let value: Value = self.call("suix_getReferenceGasPrice", json!([])).await?;
        value_to_u64(&value).ok_or_else(|| BuilderError::Rpc {
            code: 0,
            message: format!("invalid reference gas price {value}"),
        })
    }

    async fn get_coins(&self, owner: &SuiAddress, coin_type: &str) -> BuilderResult<Vec<Coin>> {
        let page: CoinPage = self
            .call("suix_getCoins", json!([owner.to_hex(), coin_type, null, null]))
            .await?;
        Ok(page.data)
    }

    async fn dry_run_transaction_block(
        &self,
        tx_bytes: &[u8],
    ) -> BuilderResult<DryRunTransactionBlockResponse> {
        self.call("sui_dryRunTransactionBlock", json!([STANDARD.encode(tx_bytes)]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_partial_json, method},
        Mock, MockServer, ResponseTemplate,
    };

    fn create_mock_client(server: &MockServer) -> SuiClient {
        let config = SuiConfig::custom(&server.uri()).unwrap().without_retry();
        SuiClient::new(config).unwrap()
    }

    fn rpc_result(result: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": result,
        }))
    }

    #[test]
    fn test_client_uses_configured_url() {
        let client = SuiClient::new(SuiConfig::localnet()).unwrap();
        assert_eq!(client.rpc_url().as_str(), "http://127.0.0.1:9000/");
        assert_eq!(client.retry_config().max_retries, 5);
    }

    #[tokio::test]
    async fn test_get_reference_gas_price() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "suix_getReferenceGasPrice" })))
            .respond_with(rpc_result(json!("750")))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_mock_client(&server);
        assert_eq!(client.get_reference_gas_price().await.unwrap(), 750);
    }

    #[tokio::test]
    async fn test_multi_get_objects() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": "sui_multiGetObjects",
                "params": [["0x0000000000000000000000000000000000000000000000000000000000000005"]]
            })))
            .respond_with(rpc_result(json!([{
                "data": {
                    "objectId": "0x5",
                    "version": "7",
                    "digest": "11111111111111111111111111111111",
                    "owner": { "AddressOwner": "0x1" }
                }
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_mock_client(&server);
        let id = ObjectId::from_hex("0x5").unwrap();
        let objects = client.multi_get_objects(&[id]).await.unwrap();

        assert_eq!(objects.len(), 1);
        let data = objects[0].data.as_ref().unwrap();
        assert_eq!(data.object_id, id);
        assert_eq!(data.version().unwrap(), 7);
    }

    #[tokio::test]
    async fn test_get_coins() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": "suix_getCoins" })))
            .respond_with(rpc_result(json!({
                "data": [{
                    "coinType": "0x2::sui::SUI",
                    "coinObjectId": "0xc0",
                    "version": "3",
                    "digest": "11111111111111111111111111111111",
                    "balance": "1000000000",
                    "previousTransaction": "11111111111111111111111111111111"
                }],
                "nextCursor": null,
                "hasNextPage": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_mock_client(&server);
        let coins = client
            .get_coins(&SuiAddress::STD, "0x2::sui::SUI")
            .await
            .unwrap();

        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].balance().unwrap(), 1_000_000_000);
        assert_eq!(coins[0].object_ref().unwrap().version, 3);
    }

    #[tokio::test]
    async fn test_dry_run_sends_base64() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": "sui_dryRunTransactionBlock",
                "params": ["AQID"]
            })))
            .respond_with(rpc_result(json!({
                "effects": {
                    "status": { "status": "success" },
                    "gasUsed": {
                        "computationCost": "1000",
                        "storageCost": "500",
                        "storageRebate": "200",
                        "nonRefundableStorageFee": "0"
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_mock_client(&server);
        let response = client.dry_run_transaction_block(&[1, 2, 3]).await.unwrap();

        assert!(response.effects.status.is_success());
        assert_eq!(response.effects.gas_used.storage_cost().unwrap(), 500);
    }

    #[tokio::test]
    async fn test_rpc_error_object() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32602, "message": "Invalid params" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_mock_client(&server);
        let result = client.get_reference_gas_price().await;

        match result {
            Err(BuilderError::Rpc { code, message }) => {
                assert_eq!(code, -32602);
                assert_eq!(message, "Invalid params");
            }
            other => panic!("expected RPC error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_mock_client(&server);
        let result = client.get_reference_gas_price().await;

        assert!(matches!(
            result,
            Err(BuilderError::Api {
                status_code: 503,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_retries_transient_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(rpc_result(json!("1000")))
            .mount(&server)
            .await;

        let retry = RetryConfig::default()
            .with_max_retries(2)
            .with_base_delay(std::time::Duration::from_millis(1))
            .with_jitter_spread(0.0);
        let config = SuiConfig::custom(&server.uri()).unwrap().with_retry(retry);
        let client = SuiClient::new(config).unwrap();

        assert_eq!(client.get_reference_gas_price().await.unwrap(), 1000);
    }
}
