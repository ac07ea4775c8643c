//! JSON snapshots of the transaction IR.
//!
//! Snapshots are written in the version 2 layout: one externally tagged
//! object per input and command, u64 values as decimal strings and raw bytes
//! as base64. Restoring accepts both version 2 and the older version 1
//! layout, whose inputs carry untyped values and whose commands are tagged
//! by a `kind` field.

use super::data::{
    ArgumentKind, Command, GasConfig, Input, IntentArgs, MoveCall, TransactionData,
    TransactionIntent, UnresolvedObject,
};
use crate::error::{BuilderError, BuilderResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use sui_txn_types::{
    Argument, ObjectArg, ObjectDigest, ObjectId, ObjectRef, OpenMoveTypeSignature, StructTag,
    SuiAddress, TransactionExpiration, TypeTag,
};

fn parse_u64(value: &Value) -> Result<u64, String> {
    match value {
        Value::String(s) => s
            .parse()
            .map_err(|e| format!("invalid u64 string {s:?}: {e}")),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| format!("expected an unsigned 64-bit number, got {n}")),
        other => Err(format!("expected a u64 string or number, got {other}")),
    }
}

mod u64_string {
    use super::*;

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let value = Value::deserialize(deserializer)?;
        parse_u64(&value).map_err(D::Error::custom)
    }
}

mod opt_u64_string {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.collect_str(value),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u64>, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            value => parse_u64(&value).map(Some).map_err(D::Error::custom),
        }
    }
}

/// Version 2 transaction JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedTransactionDataV2 {
    pub version: u8,
    #[serde(default)]
    pub sender: Option<SuiAddress>,
    #[serde(default)]
    pub expiration: Option<ExpirationJson>,
    pub gas_data: GasDataJson,
    pub inputs: Vec<InputJson>,
    pub commands: Vec<CommandJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpirationJson {
    None(bool),
    Epoch(#[serde(with = "u64_string")] u64),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasDataJson {
    #[serde(default, with = "opt_u64_string")]
    pub budget: Option<u64>,
    #[serde(default, with = "opt_u64_string")]
    pub price: Option<u64>,
    #[serde(default)]
    pub owner: Option<SuiAddress>,
    #[serde(default)]
    pub payment: Option<Vec<ObjectRefJson>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRefJson {
    pub object_id: ObjectId,
    #[serde(with = "u64_string")]
    pub version: u64,
    pub digest: ObjectDigest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedObjectJson {
    pub object_id: ObjectId,
    #[serde(with = "u64_string")]
    pub initial_shared_version: u64,
    pub mutable: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectArgJson {
    ImmOrOwnedObject(ObjectRefJson),
    SharedObject(SharedObjectJson),
    Receiving(ObjectRefJson),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedObjectJson {
    pub object_id: ObjectId,
    #[serde(default, with = "opt_u64_string", skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<ObjectDigest>,
    #[serde(default, with = "opt_u64_string", skip_serializing_if = "Option::is_none")]
    pub initial_shared_version: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutable: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InputJson {
    /// Base64 encoded bytes.
    Pure { bytes: String },
    Object(ObjectArgJson),
    UnresolvedPure { value: Value },
    UnresolvedObject(UnresolvedObjectJson),
}

/// A command argument, with the kind of the input it refers to when known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgumentJson {
    pub argument: Argument,
    pub kind: Option<ArgumentKind>,
}

impl ArgumentJson {
    fn to_value(self) -> Value {
        match self.argument {
            Argument::GasCoin => json!({ "GasCoin": true }),
            Argument::Input(index) => {
                let mut map = Map::new();
                map.insert("Input".to_string(), json!(index));
                if let Some(kind) = self.kind {
                    let kind = match kind {
                        ArgumentKind::Pure => "pure",
                        ArgumentKind::Object => "object",
                    };
                    map.insert("type".to_string(), json!(kind));
                }
                Value::Object(map)
            }
            Argument::Result(index) => json!({ "Result": index }),
            Argument::NestedResult(index, result) => json!({ "NestedResult": [index, result] }),
        }
    }

    fn from_value(value: &Value) -> Result<Self, String> {
        let index = |value: &Value| -> Result<u16, String> {
            value
                .as_u64()
                .and_then(|n| u16::try_from(n).ok())
                .ok_or_else(|| format!("invalid argument index {value}"))
        };
        let map = value
            .as_object()
            .ok_or_else(|| format!("expected an argument object, got {value}"))?;

        let argument = if map.contains_key("GasCoin") {
            Argument::GasCoin
        } else if let Some(input) = map.get("Input") {
            Argument::Input(index(input)?)
        } else if let Some(result) = map.get("Result") {
            Argument::Result(index(result)?)
        } else if let Some(Value::Array(pair)) = map.get("NestedResult") {
            match pair.as_slice() {
                [command, result] => Argument::NestedResult(index(command)?, index(result)?),
                _ => return Err(format!("NestedResult needs two indices, got {value}")),
            }
        } else {
            return Err(format!("unknown argument {value}"));
        };

        let kind = match map.get("type").and_then(Value::as_str) {
            Some("pure") => Some(ArgumentKind::Pure),
            Some("object") => Some(ArgumentKind::Object),
            _ => None,
        };
        Ok(Self { argument, kind })
    }
}

impl Serialize for ArgumentJson {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ArgumentJson {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(D::Error::custom)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntentArgsJson {
    One(ArgumentJson),
    Many(Vec<ArgumentJson>),
}

impl Serialize for IntentArgsJson {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::One(argument) => argument.serialize(serializer),
            Self::Many(arguments) => arguments.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for IntentArgsJson {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .iter()
                .map(ArgumentJson::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Many)
                .map_err(D::Error::custom),
            value => ArgumentJson::from_value(&value)
                .map(Self::One)
                .map_err(D::Error::custom),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCallJson {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    #[serde(default)]
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<ArgumentJson>,
    #[serde(rename = "_argumentTypes", default, skip_serializing_if = "Option::is_none")]
    pub argument_types: Option<Vec<OpenMoveTypeSignature>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentJson {
    pub name: String,
    #[serde(default)]
    pub inputs: BTreeMap<String, IntentArgsJson>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CommandJson {
    MoveCall(MoveCallJson),
    TransferObjects {
        objects: Vec<ArgumentJson>,
        address: ArgumentJson,
    },
    SplitCoins {
        coin: ArgumentJson,
        amounts: Vec<ArgumentJson>,
    },
    MergeCoins {
        destination: ArgumentJson,
        sources: Vec<ArgumentJson>,
    },
    /// Modules are base64 encoded.
    Publish {
        modules: Vec<String>,
        dependencies: Vec<ObjectId>,
    },
    MakeMoveVec {
        #[serde(rename = "type", default)]
        element_type: Option<TypeTag>,
        elements: Vec<ArgumentJson>,
    },
    Upgrade {
        modules: Vec<String>,
        dependencies: Vec<ObjectId>,
        package: ObjectId,
        ticket: ArgumentJson,
    },
    #[serde(rename = "$Intent")]
    Intent(IntentJson),
}

impl From<ObjectRef> for ObjectRefJson {
    fn from(object: ObjectRef) -> Self {
        Self {
            object_id: object.object_id,
            version: object.version,
            digest: object.digest,
        }
    }
}

impl From<ObjectRefJson> for ObjectRef {
    fn from(object: ObjectRefJson) -> Self {
        Self {
            object_id: object.object_id,
            version: object.version,
            digest: object.digest,
        }
    }
}

impl From<ObjectArg> for ObjectArgJson {
    fn from(arg: ObjectArg) -> Self {
        match arg {
            ObjectArg::ImmOrOwnedObject(object) => Self::ImmOrOwnedObject(object.into()),
            ObjectArg::SharedObject {
                id,
                initial_shared_version,
                mutable,
            } => Self::SharedObject(SharedObjectJson {
                object_id: id,
                initial_shared_version,
                mutable,
            }),
            ObjectArg::Receiving(object) => Self::Receiving(object.into()),
        }
    }
}

impl From<ObjectArgJson> for ObjectArg {
    fn from(arg: ObjectArgJson) -> Self {
        match arg {
            ObjectArgJson::ImmOrOwnedObject(object) => Self::ImmOrOwnedObject(object.into()),
            ObjectArgJson::SharedObject(shared) => Self::SharedObject {
                id: shared.object_id,
                initial_shared_version: shared.initial_shared_version,
                mutable: shared.mutable,
            },
            ObjectArgJson::Receiving(object) => Self::Receiving(object.into()),
        }
    }
}

impl From<TransactionExpiration> for ExpirationJson {
    fn from(expiration: TransactionExpiration) -> Self {
        match expiration {
            TransactionExpiration::None => Self::None(true),
            TransactionExpiration::Epoch(epoch) => Self::Epoch(epoch),
        }
    }
}

impl From<ExpirationJson> for TransactionExpiration {
    fn from(expiration: ExpirationJson) -> Self {
        match expiration {
            ExpirationJson::None(_) => Self::None,
            ExpirationJson::Epoch(epoch) => Self::Epoch(epoch),
        }
    }
}

fn decode_base64(encoded: &str, what: &str) -> BuilderResult<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|e| BuilderError::invalid_argument(format!("invalid base64 in {what}: {e}")))
}

fn decode_modules(modules: &[String]) -> BuilderResult<Vec<Vec<u8>>> {
    modules
        .iter()
        .map(|module| decode_base64(module, "module bytes"))
        .collect()
}

impl SerializedTransactionDataV2 {
    pub fn from_data(data: &TransactionData) -> Self {
        let arg = |argument: &Argument| {
            let kind = match argument {
                Argument::Input(index) => data
                    .inputs
                    .get(usize::from(*index))
                    .and_then(Input::kind),
                _ => None,
            };
            ArgumentJson {
                argument: *argument,
                kind,
            }
        };
        let args = |arguments: &[Argument]| arguments.iter().map(arg).collect::<Vec<_>>();
        let encode_modules = |modules: &[Vec<u8>]| {
            modules
                .iter()
                .map(|module| STANDARD.encode(module))
                .collect::<Vec<_>>()
        };

        let inputs = data
            .inputs
            .iter()
            .map(|input| match input {
                Input::Pure(bytes) => InputJson::Pure {
                    bytes: STANDARD.encode(bytes),
                },
                Input::Object(object) => InputJson::Object((*object).into()),
                Input::UnresolvedPure(value) => InputJson::UnresolvedPure {
                    value: value.clone(),
                },
                Input::UnresolvedObject(object) => {
                    InputJson::UnresolvedObject(UnresolvedObjectJson {
                        object_id: object.object_id,
                        version: object.version,
                        digest: object.digest,
                        initial_shared_version: object.initial_shared_version,
                        mutable: object.mutable,
                    })
                }
            })
            .collect();

        let commands = data
            .commands
            .iter()
            .map(|command| match command {
                Command::MoveCall(call) => CommandJson::MoveCall(MoveCallJson {
                    package: call.package,
                    module: call.module.clone(),
                    function: call.function.clone(),
                    type_arguments: call.type_arguments.clone(),
                    arguments: args(&call.arguments),
                    argument_types: call.argument_types.clone(),
                }),
                Command::TransferObjects { objects, address } => CommandJson::TransferObjects {
                    objects: args(objects),
                    address: arg(address),
                },
                Command::SplitCoins { coin, amounts } => CommandJson::SplitCoins {
                    coin: arg(coin),
                    amounts: args(amounts),
                },
                Command::MergeCoins {
                    destination,
                    sources,
                } => CommandJson::MergeCoins {
                    destination: arg(destination),
                    sources: args(sources),
                },
                Command::Publish {
                    modules,
                    dependencies,
                } => CommandJson::Publish {
                    modules: encode_modules(modules),
                    dependencies: dependencies.clone(),
                },
                Command::MakeMoveVec {
                    element_type,
                    elements,
                } => CommandJson::MakeMoveVec {
                    element_type: element_type.clone(),
                    elements: args(elements),
                },
                Command::Upgrade {
                    modules,
                    dependencies,
                    package,
                    ticket,
                } => CommandJson::Upgrade {
                    modules: encode_modules(modules),
                    dependencies: dependencies.clone(),
                    package: *package,
                    ticket: arg(ticket),
                },
                Command::Intent(intent) => CommandJson::Intent(IntentJson {
                    name: intent.name.clone(),
                    inputs: intent
                        .inputs
                        .iter()
                        .map(|(name, value)| {
                            let value = match value {
                                IntentArgs::One(argument) => IntentArgsJson::One(arg(argument)),
                                IntentArgs::Many(arguments) => {
                                    IntentArgsJson::Many(args(arguments))
                                }
                            };
                            (name.clone(), value)
                        })
                        .collect(),
                    data: intent.data.clone(),
                }),
            })
            .collect();

        Self {
            version: 2,
            sender: data.sender,
            expiration: data.expiration.map(ExpirationJson::from),
            gas_data: GasDataJson {
                budget: data.gas_data.budget,
                price: data.gas_data.price,
                owner: data.gas_data.owner,
                payment: data
                    .gas_data
                    .payment
                    .as_ref()
                    .map(|payment| payment.iter().copied().map(ObjectRefJson::from).collect()),
            },
            inputs,
            commands,
            digest: None,
        }
    }

    pub fn into_data(self) -> BuilderResult<TransactionData> {
        let args = |arguments: Vec<ArgumentJson>| {
            arguments
                .into_iter()
                .map(|argument| argument.argument)
                .collect::<Vec<_>>()
        };

        let inputs = self
            .inputs
            .into_iter()
            .map(|input| -> BuilderResult<Input> {
                Ok(match input {
                    InputJson::Pure { bytes } => Input::Pure(decode_base64(&bytes, "pure input")?),
                    InputJson::Object(object) => Input::Object(object.into()),
                    InputJson::UnresolvedPure { value } => Input::UnresolvedPure(value),
                    InputJson::UnresolvedObject(object) => {
                        Input::UnresolvedObject(UnresolvedObject {
                            object_id: object.object_id,
                            version: object.version,
                            digest: object.digest,
                            initial_shared_version: object.initial_shared_version,
                            mutable: object.mutable,
                        })
                    }
                })
            })
            .collect::<BuilderResult<Vec<_>>>()?;

        let commands = self
            .commands
            .into_iter()
            .map(|command| -> BuilderResult<Command> {
                Ok(match command {
                    CommandJson::MoveCall(call) => Command::MoveCall(Box::new(MoveCall {
                        package: call.package,
                        module: call.module,
                        function: call.function,
                        type_arguments: call.type_arguments,
                        arguments: args(call.arguments),
                        argument_types: call.argument_types,
                    })),
                    CommandJson::TransferObjects { objects, address } => {
                        Command::TransferObjects {
                            objects: args(objects),
                            address: address.argument,
                        }
                    }
                    CommandJson::SplitCoins { coin, amounts } => Command::SplitCoins {
                        coin: coin.argument,
                        amounts: args(amounts),
                    },
                    CommandJson::MergeCoins {
                        destination,
                        sources,
                    } => Command::MergeCoins {
                        destination: destination.argument,
                        sources: args(sources),
                    },
                    CommandJson::Publish {
                        modules,
                        dependencies,
                    } => Command::Publish {
                        modules: decode_modules(&modules)?,
                        dependencies,
                    },
                    CommandJson::MakeMoveVec {
                        element_type,
                        elements,
                    } => Command::MakeMoveVec {
                        element_type,
                        elements: args(elements),
                    },
                    CommandJson::Upgrade {
                        modules,
                        dependencies,
                        package,
                        ticket,
                    } => Command::Upgrade {
                        modules: decode_modules(&modules)?,
                        dependencies,
                        package,
                        ticket: ticket.argument,
                    },
                    CommandJson::Intent(intent) => Command::Intent(TransactionIntent {
                        name: intent.name,
                        inputs: intent
                            .inputs
                            .into_iter()
                            .map(|(name, value)| {
                                let value = match value {
                                    IntentArgsJson::One(argument) => {
                                        IntentArgs::One(argument.argument)
                                    }
                                    IntentArgsJson::Many(arguments) => {
                                        IntentArgs::Many(args(arguments))
                                    }
                                };
                                (name, value)
                            })
                            .collect(),
                        data: intent.data,
                    }),
                })
            })
            .collect::<BuilderResult<Vec<_>>>()?;

        Ok(TransactionData {
            sender: self.sender,
            expiration: self.expiration.map(TransactionExpiration::from),
            gas_data: GasConfig {
                payment: self
                    .gas_data
                    .payment
                    .map(|payment| payment.into_iter().map(ObjectRef::from).collect()),
                owner: self.gas_data.owner,
                price: self.gas_data.price,
                budget: self.gas_data.budget,
            },
            inputs,
            commands,
        })
    }
}

/// Drops the `$kind` discriminators some writers add next to enum tags.
fn strip_kind_tags(root: &mut Value) {
    fn strip(value: &mut Value) {
        if let Value::Object(map) = value {
            map.remove("$kind");
        }
    }

    if let Some(expiration) = root.get_mut("expiration") {
        strip(expiration);
    }
    if let Some(Value::Array(inputs)) = root.get_mut("inputs") {
        for input in inputs {
            strip(input);
            if let Some(object) = input.get_mut("Object") {
                strip(object);
            }
        }
    }
    if let Some(Value::Array(commands)) = root.get_mut("commands") {
        commands.iter_mut().for_each(strip);
    }
}

impl TransactionData {
    /// Version 2 JSON snapshot of the IR, including unresolved inputs.
    pub fn snapshot(&self) -> SerializedTransactionDataV2 {
        SerializedTransactionDataV2::from_data(self)
    }

    pub fn to_json(&self) -> BuilderResult<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    /// Restores an IR from a version 1 or version 2 JSON document.
    pub fn restore(mut value: Value) -> BuilderResult<Self> {
        match value.get("version").and_then(Value::as_u64) {
            Some(1) => v1::parse(&value),
            Some(2) => {
                strip_kind_tags(&mut value);
                serde_json::from_value::<SerializedTransactionDataV2>(value)?.into_data()
            }
            other => Err(BuilderError::invalid_argument(format!(
                "unsupported transaction JSON version: {other:?}"
            ))),
        }
    }

    pub fn from_json(json: &str) -> BuilderResult<Self> {
        Self::restore(serde_json::from_str(json)?)
    }
}

/// The version 1 layout.
mod v1 {
    use super::*;

    fn invalid(message: impl Into<String>) -> BuilderError {
        BuilderError::invalid_argument(message)
    }

    fn present<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
        value.get(name).filter(|value| !value.is_null())
    }

    fn field<'a>(value: &'a Value, name: &str) -> BuilderResult<&'a Value> {
        present(value, name).ok_or_else(|| invalid(format!("missing field `{name}` in {value}")))
    }

    fn array<'a>(value: &'a Value, name: &str) -> BuilderResult<&'a Vec<Value>> {
        field(value, name)?
            .as_array()
            .ok_or_else(|| invalid(format!("field `{name}` must be an array")))
    }

    fn string<'a>(value: &'a Value, name: &str) -> BuilderResult<&'a str> {
        field(value, name)?
            .as_str()
            .ok_or_else(|| invalid(format!("field `{name}` must be a string")))
    }

    fn number(value: &Value, name: &str) -> BuilderResult<u64> {
        parse_u64(field(value, name)?).map_err(|e| invalid(format!("field `{name}`: {e}")))
    }

    fn index(value: &Value, name: &str) -> BuilderResult<u16> {
        let n = number(value, name)?;
        u16::try_from(n).map_err(|_| invalid(format!("field `{name}` out of range: {n}")))
    }

    fn address(value: &Value, name: &str) -> BuilderResult<SuiAddress> {
        Ok(SuiAddress::from_hex(string(value, name)?)?)
    }

    fn object_ref(value: &Value) -> BuilderResult<ObjectRef> {
        Ok(ObjectRef {
            object_id: address(value, "objectId")?,
            version: number(value, "version")?,
            digest: ObjectDigest::from_base58(string(value, "digest")?)?,
        })
    }

    fn bytes(value: &Value) -> BuilderResult<Vec<u8>> {
        value
            .as_array()
            .ok_or_else(|| invalid(format!("expected a byte array, got {value}")))?
            .iter()
            .map(|byte| {
                byte.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| invalid(format!("invalid byte {byte}")))
            })
            .collect()
    }

    fn argument(value: &Value) -> BuilderResult<Argument> {
        match string(value, "kind")? {
            "GasCoin" => Ok(Argument::GasCoin),
            "Input" => Ok(Argument::Input(index(value, "index")?)),
            "Result" => Ok(Argument::Result(index(value, "index")?)),
            "NestedResult" => Ok(Argument::NestedResult(
                index(value, "index")?,
                index(value, "resultIndex")?,
            )),
            other => Err(invalid(format!("unknown argument kind {other:?}"))),
        }
    }

    fn arguments(value: &Value, name: &str) -> BuilderResult<Vec<Argument>> {
        array(value, name)?.iter().map(argument).collect()
    }

    fn type_tag(value: &Value) -> BuilderResult<TypeTag> {
        if let Some(tag) = value.as_str() {
            return Ok(TypeTag::parse(tag)?);
        }
        let map = value
            .as_object()
            .filter(|map| map.len() == 1)
            .ok_or_else(|| invalid(format!("invalid type tag {value}")))?;
        let (name, inner) = map
            .iter()
            .next()
            .ok_or_else(|| invalid("empty type tag"))?;
        Ok(match name.as_str() {
            "bool" => TypeTag::Bool,
            "u8" => TypeTag::U8,
            "u16" => TypeTag::U16,
            "u32" => TypeTag::U32,
            "u64" => TypeTag::U64,
            "u128" => TypeTag::U128,
            "u256" => TypeTag::U256,
            "address" => TypeTag::Address,
            "signer" => TypeTag::Signer,
            "vector" => TypeTag::Vector(Box::new(type_tag(inner)?)),
            "struct" => TypeTag::Struct(Box::new(StructTag {
                address: address(inner, "address")?,
                module: string(inner, "module")?.to_string(),
                name: string(inner, "name")?.to_string(),
                type_params: match present(inner, "typeParams") {
                    Some(params) => params
                        .as_array()
                        .ok_or_else(|| invalid("typeParams must be an array"))?
                        .iter()
                        .map(type_tag)
                        .collect::<BuilderResult<_>>()?,
                    None => Vec::new(),
                },
            })),
            other => return Err(invalid(format!("unknown type tag {other:?}"))),
        })
    }

    fn input(value: &Value) -> BuilderResult<Input> {
        let raw = value.get("value").cloned().unwrap_or(Value::Null);

        if let Some(object) = present(&raw, "Object") {
            let arg = if let Some(owned) = present(object, "ImmOrOwned") {
                ObjectArg::ImmOrOwnedObject(object_ref(owned)?)
            } else if let Some(shared) = present(object, "Shared") {
                ObjectArg::SharedObject {
                    id: address(shared, "objectId")?,
                    initial_shared_version: number(shared, "initialSharedVersion")?,
                    mutable: field(shared, "mutable")?
                        .as_bool()
                        .ok_or_else(|| invalid("field `mutable` must be a bool"))?,
                }
            } else if let Some(receiving) = present(object, "Receiving") {
                ObjectArg::Receiving(object_ref(receiving)?)
            } else {
                return Err(invalid(format!("unknown object input {object}")));
            };
            return Ok(Input::Object(arg));
        }
        if let Some(pure) = present(&raw, "Pure") {
            return Ok(Input::Pure(bytes(pure)?));
        }

        if value.get("type").and_then(Value::as_str) == Some("object") {
            let id = raw
                .as_str()
                .ok_or_else(|| invalid(format!("object input must be an id string, got {raw}")))?;
            Ok(Input::UnresolvedObject(UnresolvedObject::new(
                ObjectId::from_hex(id)?,
            )))
        } else {
            Ok(Input::UnresolvedPure(raw))
        }
    }

    fn modules(value: &Value) -> BuilderResult<Vec<Vec<u8>>> {
        array(value, "modules")?.iter().map(bytes).collect()
    }

    fn dependencies(value: &Value) -> BuilderResult<Vec<ObjectId>> {
        array(value, "dependencies")?
            .iter()
            .map(|dependency| -> BuilderResult<ObjectId> {
                let id = dependency
                    .as_str()
                    .ok_or_else(|| invalid(format!("invalid dependency {dependency}")))?;
                Ok(ObjectId::from_hex(id)?)
            })
            .collect()
    }

    fn command(value: &Value) -> BuilderResult<Command> {
        Ok(match string(value, "kind")? {
            "MoveCall" => {
                let target = string(value, "target")?;
                let (package, module, function) = match target.split("::").collect::<Vec<_>>()[..]
                {
                    [package, module, function] => (package, module, function),
                    _ => return Err(invalid(format!("invalid move call target {target:?}"))),
                };
                let type_arguments = match present(value, "typeArguments") {
                    Some(tags) => tags
                        .as_array()
                        .ok_or_else(|| invalid("typeArguments must be an array"))?
                        .iter()
                        .map(type_tag)
                        .collect::<BuilderResult<_>>()?,
                    None => Vec::new(),
                };
                Command::MoveCall(Box::new(MoveCall {
                    package: ObjectId::from_hex(package)?,
                    module: module.to_string(),
                    function: function.to_string(),
                    type_arguments,
                    arguments: arguments(value, "arguments")?,
                    argument_types: None,
                }))
            }
            "TransferObjects" => Command::TransferObjects {
                objects: arguments(value, "objects")?,
                address: argument(field(value, "address")?)?,
            },
            "SplitCoins" => Command::SplitCoins {
                coin: argument(field(value, "coin")?)?,
                amounts: arguments(value, "amounts")?,
            },
            "MergeCoins" => Command::MergeCoins {
                destination: argument(field(value, "destination")?)?,
                sources: arguments(value, "sources")?,
            },
            "MakeMoveVec" => Command::MakeMoveVec {
                element_type: match present(value, "type") {
                    Some(ty) => present(ty, "Some").map(type_tag).transpose()?,
                    None => None,
                },
                elements: arguments(value, "objects")?,
            },
            "Publish" => Command::Publish {
                modules: modules(value)?,
                dependencies: dependencies(value)?,
            },
            "Upgrade" => Command::Upgrade {
                modules: modules(value)?,
                dependencies: dependencies(value)?,
                package: address(value, "packageId")?,
                ticket: argument(field(value, "ticket")?)?,
            },
            other => return Err(invalid(format!("unknown command kind {other:?}"))),
        })
    }

    fn expiration(value: &Value) -> BuilderResult<TransactionExpiration> {
        if let Some(epoch) = present(value, "Epoch") {
            let epoch = parse_u64(epoch).map_err(|e| invalid(format!("expiration epoch: {e}")))?;
            Ok(TransactionExpiration::Epoch(epoch))
        } else if value.get("None").is_some() {
            Ok(TransactionExpiration::None)
        } else {
            Err(invalid(format!("invalid expiration {value}")))
        }
    }

    pub(super) fn parse(value: &Value) -> BuilderResult<TransactionData> {
        let gas = field(value, "gasConfig")?;
        let optional_number = |name: &str| {
            present(gas, name)
                .map(|n| parse_u64(n).map_err(|e| invalid(format!("gasConfig.{name}: {e}"))))
                .transpose()
        };

        Ok(TransactionData {
            sender: present(value, "sender")
                .map(|_| address(value, "sender"))
                .transpose()?,
            expiration: present(value, "expiration").map(expiration).transpose()?,
            gas_data: GasConfig {
                payment: match present(gas, "payment") {
                    Some(_) => Some(
                        array(gas, "payment")?
                            .iter()
                            .map(object_ref)
                            .collect::<BuilderResult<Vec<_>>>()?,
                    ),
                    None => None,
                },
                owner: present(gas, "owner")
                    .map(|_| address(gas, "owner"))
                    .transpose()?,
                price: optional_number("price")?,
                budget: optional_number("budget")?,
            },
            inputs: array(value, "inputs")?
                .iter()
                .map(input)
                .collect::<BuilderResult<_>>()?,
            commands: array(value, "transactions")?
                .iter()
                .map(command)
                .collect::<BuilderResult<_>>()?,
        })
    }
}
