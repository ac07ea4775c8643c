//! Ledger response types.
//!
//! These mirror the JSON-RPC result shapes. Large integers arrive as decimal
//! strings and are kept that way; accessors parse them on demand.

use crate::error::{BuilderError, BuilderResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sui_txn_types::{
    MoveRef, ObjectDigest, ObjectId, ObjectRef, OpenMoveTypeSignature, OpenMoveTypeSignatureBody,
    SuiAddress,
};

fn parse_u64(field: &str, value: &str) -> BuilderResult<u64> {
    value
        .parse()
        .map_err(|_| BuilderError::Internal(format!("ledger returned {field} `{value}`")))
}

/// A function signature from `sui_getNormalizedMoveFunction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiMoveNormalizedFunction {
    #[serde(default)]
    pub is_entry: bool,
    #[serde(default)]
    pub type_parameters: Vec<Value>,
    pub parameters: Vec<SuiMoveNormalizedType>,
    #[serde(default, rename = "return")]
    pub return_types: Vec<SuiMoveNormalizedType>,
}

impl SuiMoveNormalizedFunction {
    pub fn new(parameters: Vec<SuiMoveNormalizedType>) -> Self {
        Self {
            is_entry: false,
            type_parameters: Vec::new(),
            parameters,
            return_types: Vec::new(),
        }
    }

    /// Converts every parameter to an open signature.
    pub fn parameter_signatures(&self) -> BuilderResult<Vec<OpenMoveTypeSignature>> {
        self.parameters
            .iter()
            .map(SuiMoveNormalizedType::to_signature)
            .collect()
    }
}

/// A Move type as the ledger normalizes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuiMoveNormalizedType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    Signer,
    Struct {
        address: String,
        module: String,
        name: String,
        #[serde(default, rename = "typeArguments")]
        type_arguments: Vec<SuiMoveNormalizedType>,
    },
    Vector(Box<SuiMoveNormalizedType>),
    TypeParameter(u16),
    Reference(Box<SuiMoveNormalizedType>),
    MutableReference(Box<SuiMoveNormalizedType>),
}

impl SuiMoveNormalizedType {
    /// Shorthand for a struct type with no type arguments.
    pub fn datatype(address: &str, module: &str, name: &str) -> Self {
        Self::Struct {
            address: address.to_string(),
            module: module.to_string(),
            name: name.to_string(),
            type_arguments: Vec::new(),
        }
    }

    /// Splits an outer reference off and converts the rest to a body.
    pub fn to_signature(&self) -> BuilderResult<OpenMoveTypeSignature> {
        Ok(match self {
            Self::Reference(inner) => {
                OpenMoveTypeSignature::new(Some(MoveRef::Immutable), inner.to_body()?)
            }
            Self::MutableReference(inner) => {
                OpenMoveTypeSignature::new(Some(MoveRef::Mutable), inner.to_body()?)
            }
            other => OpenMoveTypeSignature::new(None, other.to_body()?),
        })
    }

    fn to_body(&self) -> BuilderResult<OpenMoveTypeSignatureBody> {
        use OpenMoveTypeSignatureBody as Body;

        Ok(match self {
            Self::Bool => Body::Bool,
            Self::U8 => Body::U8,
            Self::U16 => Body::U16,
            Self::U32 => Body::U32,
            Self::U64 => Body::U64,
            Self::U128 => Body::U128,
            Self::U256 => Body::U256,
            Self::Address => Body::Address,
            Self::Vector(inner) => Body::Vector(Box::new(inner.to_body()?)),
            Self::TypeParameter(index) => Body::TypeParameter(*index),
            Self::Struct {
                address,
                module,
                name,
                type_arguments,
            } => Body::datatype(
                SuiAddress::from_hex(address)?,
                module.clone(),
                name.clone(),
                type_arguments
                    .iter()
                    .map(Self::to_body)
                    .collect::<BuilderResult<_>>()?,
            ),
            Self::Signer | Self::Reference(_) | Self::MutableReference(_) => {
                return Err(BuilderError::invalid_argument(format!(
                    "unexpected parameter type {self:?}"
                )))
            }
        })
    }
}

/// One entry of a `sui_multiGetObjects` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiObjectResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SuiObjectData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl SuiObjectResponse {
    pub fn found(data: SuiObjectData) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    /// A lookup error in the ledger's `{ "code": ... }` form.
    pub fn missing(object_id: ObjectId, code: &str) -> Self {
        Self {
            data: None,
            error: Some(serde_json::json!({
                "code": code,
                "object_id": object_id.to_hex(),
            })),
        }
    }

    /// Returns the reason this entry has no data, if any.
    pub fn error_reason(&self) -> Option<String> {
        match (&self.error, &self.data) {
            (Some(error), _) => Some(
                error
                    .get("code")
                    .and_then(Value::as_str)
                    .map(ToString::to_string)
                    .unwrap_or_else(|| error.to_string()),
            ),
            (None, None) => Some("no data returned".to_string()),
            (None, Some(_)) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiObjectData {
    pub object_id: ObjectId,
    pub version: String,
    pub digest: ObjectDigest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ObjectOwner>,
}

impl SuiObjectData {
    pub fn new(object_id: ObjectId, version: u64, digest: ObjectDigest, owner: ObjectOwner) -> Self {
        Self {
            object_id,
            version: version.to_string(),
            digest,
            owner: Some(owner),
        }
    }

    pub fn version(&self) -> BuilderResult<u64> {
        parse_u64("object version", &self.version)
    }

    pub fn object_ref(&self) -> BuilderResult<ObjectRef> {
        Ok(ObjectRef {
            object_id: self.object_id,
            version: self.version()?,
            digest: self.digest,
        })
    }

    /// The initial shared version, if the object is shared.
    pub fn initial_shared_version(&self) -> Option<u64> {
        match self.owner {
            Some(ObjectOwner::Shared {
                initial_shared_version,
            }) => Some(initial_shared_version),
            _ => None,
        }
    }
}

/// Who owns an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectOwner {
    AddressOwner(SuiAddress),
    ObjectOwner(SuiAddress),
    Shared { initial_shared_version: u64 },
    Immutable,
}

/// A coin from `suix_getCoins`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub coin_type: String,
    pub coin_object_id: ObjectId,
    pub version: String,
    pub digest: ObjectDigest,
    pub balance: String,
}

impl Coin {
    pub fn version(&self) -> BuilderResult<u64> {
        parse_u64("coin version", &self.version)
    }

    pub fn balance(&self) -> BuilderResult<u64> {
        parse_u64("coin balance", &self.balance)
    }

    pub fn object_ref(&self) -> BuilderResult<ObjectRef> {
        Ok(ObjectRef {
            object_id: self.coin_object_id,
            version: self.version()?,
            digest: self.digest,
        })
    }
}

/// One page of `suix_getCoins`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinPage {
    pub data: Vec<Coin>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// The subset of `sui_dryRunTransactionBlock` the pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DryRunTransactionBlockResponse {
    pub effects: TransactionEffects,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    pub gas_used: GasCostSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    /// `success` or `failure`
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasCostSummary {
    pub computation_cost: String,
    pub storage_cost: String,
    pub storage_rebate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_refundable_storage_fee: Option<String>,
}

impl GasCostSummary {
    pub fn new(computation_cost: u64, storage_cost: u64, storage_rebate: u64) -> Self {
        Self {
            computation_cost: computation_cost.to_string(),
            storage_cost: storage_cost.to_string(),
            storage_rebate: storage_rebate.to_string(),
            non_refundable_storage_fee: None,
        }
    }

    pub fn computation_cost(&self) -> BuilderResult<u64> {
        parse_u64("computation cost", &self.computation_cost)
    }

    pub fn storage_cost(&self) -> BuilderResult<u64> {
        parse_u64("storage cost", &self.storage_cost)
    }

    pub fn storage_rebate(&self) -> BuilderResult<u64> {
        parse_u64("storage rebate", &self.storage_rebate)
    }
}

impl DryRunTransactionBlockResponse {
    pub fn success(gas_used: GasCostSummary) -> Self {
        Self {
            effects: TransactionEffects {
                status: ExecutionStatus {
                    status: "success".to_string(),
                    error: None,
                },
                gas_used,
            },
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            effects: TransactionEffects {
                status: ExecutionStatus {
                    status: "failure".to_string(),
                    error: Some(error.into()),
                },
                gas_used: GasCostSummary::new(0, 0, 0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalized_function_parses() {
        let value = json!({
            "visibility": "Public",
            "isEntry": true,
            "typeParameters": [{ "abilities": [] }],
            "parameters": [
                { "MutableReference": { "Struct": {
                    "address": "0x2", "module": "coin", "name": "Coin",
                    "typeArguments": [{ "TypeParameter": 0 }]
                }}},
                "U64",
                { "Vector": "Address" },
                { "MutableReference": { "Struct": {
                    "address": "0x2", "module": "tx_context", "name": "TxContext",
                    "typeArguments": []
                }}}
            ],
            "return": []
        });
        let function: SuiMoveNormalizedFunction = serde_json::from_value(value).unwrap();
        let signatures = function.parameter_signatures().unwrap();

        assert_eq!(signatures.len(), 4);
        assert_eq!(signatures[0].reference, Some(MoveRef::Mutable));
        assert!(signatures[0]
            .body
            .is_datatype(SuiAddress::FRAMEWORK, "coin", "Coin"));
        assert_eq!(signatures[1].body, OpenMoveTypeSignatureBody::U64);
        assert_eq!(
            signatures[2].body,
            OpenMoveTypeSignatureBody::Vector(Box::new(OpenMoveTypeSignatureBody::Address))
        );
        assert!(signatures[3].is_tx_context());
    }

    #[test]
    fn test_signer_is_rejected() {
        assert!(SuiMoveNormalizedType::Signer.to_signature().is_err());
        let nested = SuiMoveNormalizedType::Vector(Box::new(SuiMoveNormalizedType::Reference(
            Box::new(SuiMoveNormalizedType::U8),
        )));
        assert!(nested.to_signature().is_err());
    }

    #[test]
    fn test_object_response_parses() {
        let value = json!([
            {
                "data": {
                    "objectId": "0x5",
                    "version": "12",
                    "digest": "11111111111111111111111111111111",
                    "owner": { "Shared": { "initial_shared_version": 3 } }
                }
            },
            { "error": { "code": "notExists", "object_id": "0x6" } }
        ]);
        let responses: Vec<SuiObjectResponse> = serde_json::from_value(value).unwrap();
        let data = responses[0].data.as_ref().unwrap();

        assert_eq!(data.version().unwrap(), 12);
        assert_eq!(data.initial_shared_version(), Some(3));
        assert_eq!(responses[0].error_reason(), None);
        assert_eq!(responses[1].error_reason().as_deref(), Some("notExists"));
    }

    #[test]
    fn test_owner_forms() {
        let owners: Vec<ObjectOwner> = serde_json::from_value(json!([
            { "AddressOwner": "0x1" },
            { "ObjectOwner": "0x2" },
            "Immutable"
        ]))
        .unwrap();
        assert_eq!(owners[0], ObjectOwner::AddressOwner(SuiAddress::STD));
        assert_eq!(owners[1], ObjectOwner::ObjectOwner(SuiAddress::FRAMEWORK));
        assert_eq!(owners[2], ObjectOwner::Immutable);
    }

    #[test]
    fn test_gas_summary_accessors() {
        let summary: GasCostSummary = serde_json::from_value(json!({
            "computationCost": "1000",
            "storageCost": "500",
            "storageRebate": "200",
            "nonRefundableStorageFee": "2"
        }))
        .unwrap();
        assert_eq!(summary.computation_cost().unwrap(), 1000);
        assert_eq!(summary.storage_cost().unwrap(), 500);
        assert_eq!(summary.storage_rebate().unwrap(), 200);

        let bad = GasCostSummary {
            computation_cost: "lots".to_string(),
            ..summary
        };
        assert!(bad.computation_cost().is_err());
    }
}
