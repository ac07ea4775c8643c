//! Wire types for programmable transactions.
//!
//! Each type has a schema built from the [`bcs`] combinators. The schemas
//! operate on [`BcsValue`]s; the typed `schema()` accessors convert through
//! [`IntoBcsValue`] and [`FromBcsValue`], so the Rust types and the wire
//! layout are declared once each and checked against each other on every
//! write.

use crate::address::{address, ObjectId, SuiAddress};
use crate::bcs::{self, BcsType, BcsValue, FromBcsValue, IntoBcsValue, SerializedBcs};
use crate::digest::{ObjectDigest, TransactionDigest};
use crate::error::{BcsError, BcsResult};
use crate::type_tag::{type_tag, TypeTag};
use once_cell::sync::Lazy;

/// A reference to a command argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Argument {
    /// The gas coin, usable only by-reference except in `TransferObjects`.
    GasCoin,
    /// An input by index.
    Input(u16),
    /// The single result of a prior command.
    Result(u16),
    /// One result of a prior command that returns several.
    NestedResult(u16, u16),
}

/// One pinned version of an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub object_id: ObjectId,
    pub version: u64,
    pub digest: ObjectDigest,
}

/// How an object input is passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectArg {
    ImmOrOwnedObject(ObjectRef),
    SharedObject {
        id: ObjectId,
        initial_shared_version: u64,
        mutable: bool,
    },
    Receiving(ObjectRef),
}

impl ObjectArg {
    pub fn id(&self) -> ObjectId {
        match self {
            Self::ImmOrOwnedObject(r) | Self::Receiving(r) => r.object_id,
            Self::SharedObject { id, .. } => *id,
        }
    }
}

/// A transaction input.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CallArg {
    /// Already-serialized pure bytes.
    Pure(Vec<u8>),
    Object(ObjectArg),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProgrammableMoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<Argument>,
}

/// A command in a programmable transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    MoveCall(Box<ProgrammableMoveCall>),
    TransferObjects {
        objects: Vec<Argument>,
        address: Argument,
    },
    SplitCoins {
        coin: Argument,
        amounts: Vec<Argument>,
    },
    MergeCoins {
        destination: Argument,
        sources: Vec<Argument>,
    },
    Publish {
        modules: Vec<Vec<u8>>,
        dependencies: Vec<ObjectId>,
    },
    MakeMoveVec {
        element_type: Option<TypeTag>,
        elements: Vec<Argument>,
    },
    Upgrade {
        modules: Vec<Vec<u8>>,
        dependencies: Vec<ObjectId>,
        package: ObjectId,
        ticket: Argument,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

/// The kind of a transaction. Only programmable transactions can be built
/// here; the system kinds exist so their indices decode.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    ProgrammableTransaction(ProgrammableTransaction),
    ChangeEpoch,
    Genesis,
    ConsensusCommitPrologue,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GasData {
    pub payment: Vec<ObjectRef>,
    pub owner: SuiAddress,
    pub price: u64,
    pub budget: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransactionExpiration {
    #[default]
    None,
    Epoch(u64),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransactionDataV1 {
    pub kind: TransactionKind,
    pub sender: SuiAddress,
    pub gas_data: GasData,
    pub expiration: TransactionExpiration,
}

/// Versioned transaction payload; the signed and hashed unit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TransactionData {
    V1(TransactionDataV1),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IntentScope {
    #[default]
    TransactionData,
    TransactionEffects,
    CheckpointSummary,
    PersonalMessage,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IntentVersion {
    #[default]
    V0,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AppId {
    #[default]
    Sui,
    Narwhal,
    Consensus,
}

/// Domain separation prefix for signed messages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Intent {
    pub scope: IntentScope,
    pub version: IntentVersion,
    pub app_id: AppId,
}

impl Intent {
    /// The intent for signing a Sui transaction.
    pub fn sui_transaction() -> Self {
        Self::default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IntentMessage {
    pub intent: Intent,
    pub value: TransactionData,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SenderSignedTransaction {
    pub intent_message: IntentMessage,
    pub tx_signatures: Vec<Vec<u8>>,
}

/// A transaction with its signatures, as submitted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SenderSignedData(pub Vec<SenderSignedTransaction>);

impl TransactionData {
    pub fn v1(
        kind: TransactionKind,
        sender: SuiAddress,
        gas_data: GasData,
        expiration: TransactionExpiration,
    ) -> Self {
        Self::V1(TransactionDataV1 {
            kind,
            sender,
            gas_data,
            expiration,
        })
    }

    pub fn kind(&self) -> &TransactionKind {
        match self {
            Self::V1(v1) => &v1.kind,
        }
    }

    pub fn to_bytes(&self) -> BcsResult<Vec<u8>> {
        Self::schema().serialize(self).map(SerializedBcs::into_bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> BcsResult<Self> {
        Self::schema().parse(bytes)
    }

    /// Digest over the serialized payload.
    pub fn digest(&self) -> BcsResult<TransactionDigest> {
        Ok(TransactionDigest::of_transaction_data(&self.to_bytes()?))
    }
}

impl TransactionKind {
    pub fn to_bytes(&self) -> BcsResult<Vec<u8>> {
        Self::schema().serialize(self).map(SerializedBcs::into_bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> BcsResult<Self> {
        Self::schema().parse(bytes)
    }
}

fn get<T: FromBcsValue>(value: &BcsValue, name: &str) -> BcsResult<T> {
    T::from_bcs_value(value.field(name)?)
}

fn unknown_variant(schema: &str, variant: &str) -> BcsError {
    BcsError::validation(schema, format!("unexpected variant `{variant}`"))
}

impl IntoBcsValue for Argument {
    fn into_bcs_value(self) -> BcsValue {
        match self {
            Self::GasCoin => BcsValue::unit_variant("GasCoin"),
            Self::Input(i) => BcsValue::variant("Input", BcsValue::U16(i)),
            Self::Result(i) => BcsValue::variant("Result", BcsValue::U16(i)),
            Self::NestedResult(i, j) => BcsValue::variant("NestedResult", (i, j).into_bcs_value()),
        }
    }
}

impl FromBcsValue for Argument {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        Ok(match value.as_variant()? {
            ("GasCoin", None) => Self::GasCoin,
            ("Input", Some(p)) => Self::Input(u16::from_bcs_value(p)?),
            ("Result", Some(p)) => Self::Result(u16::from_bcs_value(p)?),
            ("NestedResult", Some(p)) => {
                let (i, j) = <(u16, u16)>::from_bcs_value(p)?;
                Self::NestedResult(i, j)
            }
            (other, _) => return Err(unknown_variant("Argument", other)),
        })
    }
}

impl IntoBcsValue for ObjectRef {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::structure([
            ("objectId", self.object_id.into_bcs_value()),
            ("version", BcsValue::U64(self.version)),
            ("digest", self.digest.into_bcs_value()),
        ])
    }
}

impl FromBcsValue for ObjectRef {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        Ok(Self {
            object_id: get(value, "objectId")?,
            version: get(value, "version")?,
            digest: get(value, "digest")?,
        })
    }
}

impl IntoBcsValue for ObjectArg {
    fn into_bcs_value(self) -> BcsValue {
        match self {
            Self::ImmOrOwnedObject(r) => BcsValue::variant("ImmOrOwnedObject", r.into_bcs_value()),
            Self::SharedObject {
                id,
                initial_shared_version,
                mutable,
            } => BcsValue::variant(
                "SharedObject",
                BcsValue::structure([
                    ("objectId", id.into_bcs_value()),
                    ("initialSharedVersion", BcsValue::U64(initial_shared_version)),
                    ("mutable", BcsValue::Bool(mutable)),
                ]),
            ),
            Self::Receiving(r) => BcsValue::variant("Receiving", r.into_bcs_value()),
        }
    }
}

impl FromBcsValue for ObjectArg {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        Ok(match value.as_variant()? {
            ("ImmOrOwnedObject", Some(p)) => Self::ImmOrOwnedObject(ObjectRef::from_bcs_value(p)?),
            ("SharedObject", Some(p)) => Self::SharedObject {
                id: get(p, "objectId")?,
                initial_shared_version: get(p, "initialSharedVersion")?,
                mutable: get(p, "mutable")?,
            },
            ("Receiving", Some(p)) => Self::Receiving(ObjectRef::from_bcs_value(p)?),
            (other, _) => return Err(unknown_variant("ObjectArg", other)),
        })
    }
}

impl IntoBcsValue for CallArg {
    fn into_bcs_value(self) -> BcsValue {
        match self {
            Self::Pure(bytes) => BcsValue::variant("Pure", bytes.into_bcs_value()),
            Self::Object(arg) => BcsValue::variant("Object", arg.into_bcs_value()),
        }
    }
}

impl FromBcsValue for CallArg {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        Ok(match value.as_variant()? {
            ("Pure", Some(p)) => Self::Pure(Vec::<u8>::from_bcs_value(p)?),
            ("Object", Some(p)) => Self::Object(ObjectArg::from_bcs_value(p)?),
            (other, _) => return Err(unknown_variant("CallArg", other)),
        })
    }
}

impl IntoBcsValue for ProgrammableMoveCall {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::structure([
            ("package", self.package.into_bcs_value()),
            ("module", BcsValue::String(self.module)),
            ("function", BcsValue::String(self.function)),
            ("typeArguments", self.type_arguments.into_bcs_value()),
            ("arguments", self.arguments.into_bcs_value()),
        ])
    }
}

impl FromBcsValue for ProgrammableMoveCall {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        Ok(Self {
            package: get(value, "package")?,
            module: get(value, "module")?,
            function: get(value, "function")?,
            type_arguments: get(value, "typeArguments")?,
            arguments: get(value, "arguments")?,
        })
    }
}

impl IntoBcsValue for Command {
    fn into_bcs_value(self) -> BcsValue {
        match self {
            Self::MoveCall(call) => BcsValue::variant("MoveCall", (*call).into_bcs_value()),
            Self::TransferObjects { objects, address } => BcsValue::variant(
                "TransferObjects",
                BcsValue::structure([
                    ("objects", objects.into_bcs_value()),
                    ("address", address.into_bcs_value()),
                ]),
            ),
            Self::SplitCoins { coin, amounts } => BcsValue::variant(
                "SplitCoins",
                BcsValue::structure([
                    ("coin", coin.into_bcs_value()),
                    ("amounts", amounts.into_bcs_value()),
                ]),
            ),
            Self::MergeCoins {
                destination,
                sources,
            } => BcsValue::variant(
                "MergeCoins",
                BcsValue::structure([
                    ("destination", destination.into_bcs_value()),
                    ("sources", sources.into_bcs_value()),
                ]),
            ),
            Self::Publish {
                modules,
                dependencies,
            } => BcsValue::variant(
                "Publish",
                BcsValue::structure([
                    ("modules", modules.into_bcs_value()),
                    ("dependencies", dependencies.into_bcs_value()),
                ]),
            ),
            Self::MakeMoveVec {
                element_type,
                elements,
            } => BcsValue::variant(
                "MakeMoveVec",
                BcsValue::structure([
                    ("type", element_type.into_bcs_value()),
                    ("elements", elements.into_bcs_value()),
                ]),
            ),
            Self::Upgrade {
                modules,
                dependencies,
                package,
                ticket,
            } => BcsValue::variant(
                "Upgrade",
                BcsValue::structure([
                    ("modules", modules.into_bcs_value()),
                    ("dependencies", dependencies.into_bcs_value()),
                    ("package", package.into_bcs_value()),
                    ("ticket", ticket.into_bcs_value()),
                ]),
            ),
        }
    }
}

impl FromBcsValue for Command {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        let (variant, payload) = value.as_variant()?;
        let Some(p) = payload else {
            return Err(unknown_variant("Command", variant));
        };
        Ok(match variant {
            "MoveCall" => Self::MoveCall(Box::new(ProgrammableMoveCall::from_bcs_value(p)?)),
            "TransferObjects" => Self::TransferObjects {
                objects: get(p, "objects")?,
                address: get(p, "address")?,
            },
            "SplitCoins" => Self::SplitCoins {
                coin: get(p, "coin")?,
                amounts: get(p, "amounts")?,
            },
            "MergeCoins" => Self::MergeCoins {
                destination: get(p, "destination")?,
                sources: get(p, "sources")?,
            },
            "Publish" => Self::Publish {
                modules: get(p, "modules")?,
                dependencies: get(p, "dependencies")?,
            },
            "MakeMoveVec" => Self::MakeMoveVec {
                element_type: get(p, "type")?,
                elements: get(p, "elements")?,
            },
            "Upgrade" => Self::Upgrade {
                modules: get(p, "modules")?,
                dependencies: get(p, "dependencies")?,
                package: get(p, "package")?,
                ticket: get(p, "ticket")?,
            },
            other => return Err(unknown_variant("Command", other)),
        })
    }
}

impl IntoBcsValue for ProgrammableTransaction {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::structure([
            ("inputs", self.inputs.into_bcs_value()),
            ("commands", self.commands.into_bcs_value()),
        ])
    }
}

impl FromBcsValue for ProgrammableTransaction {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        Ok(Self {
            inputs: get(value, "inputs")?,
            commands: get(value, "commands")?,
        })
    }
}

impl IntoBcsValue for TransactionKind {
    fn into_bcs_value(self) -> BcsValue {
        match self {
            Self::ProgrammableTransaction(pt) => {
                BcsValue::variant("ProgrammableTransaction", pt.into_bcs_value())
            }
            Self::ChangeEpoch => BcsValue::unit_variant("ChangeEpoch"),
            Self::Genesis => BcsValue::unit_variant("Genesis"),
            Self::ConsensusCommitPrologue => BcsValue::unit_variant("ConsensusCommitPrologue"),
        }
    }
}

impl FromBcsValue for TransactionKind {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        Ok(match value.as_variant()? {
            ("ProgrammableTransaction", Some(p)) => {
                Self::ProgrammableTransaction(ProgrammableTransaction::from_bcs_value(p)?)
            }
            ("ChangeEpoch", None) => Self::ChangeEpoch,
            ("Genesis", None) => Self::Genesis,
            ("ConsensusCommitPrologue", None) => Self::ConsensusCommitPrologue,
            (other, _) => return Err(unknown_variant("TransactionKind", other)),
        })
    }
}

impl IntoBcsValue for GasData {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::structure([
            ("payment", self.payment.into_bcs_value()),
            ("owner", self.owner.into_bcs_value()),
            ("price", BcsValue::U64(self.price)),
            ("budget", BcsValue::U64(self.budget)),
        ])
    }
}

impl FromBcsValue for GasData {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        Ok(Self {
            payment: get(value, "payment")?,
            owner: get(value, "owner")?,
            price: get(value, "price")?,
            budget: get(value, "budget")?,
        })
    }
}

impl IntoBcsValue for TransactionExpiration {
    fn into_bcs_value(self) -> BcsValue {
        match self {
            Self::None => BcsValue::unit_variant("None"),
            Self::Epoch(epoch) => BcsValue::variant("Epoch", BcsValue::U64(epoch)),
        }
    }
}

impl FromBcsValue for TransactionExpiration {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        Ok(match value.as_variant()? {
            ("None", None) => Self::None,
            ("Epoch", Some(p)) => Self::Epoch(u64::from_bcs_value(p)?),
            (other, _) => return Err(unknown_variant("TransactionExpiration", other)),
        })
    }
}

impl IntoBcsValue for TransactionData {
    fn into_bcs_value(self) -> BcsValue {
        match self {
            Self::V1(v1) => BcsValue::variant(
                "V1",
                BcsValue::structure([
                    ("kind", v1.kind.into_bcs_value()),
                    ("sender", v1.sender.into_bcs_value()),
                    ("gasData", v1.gas_data.into_bcs_value()),
                    ("expiration", v1.expiration.into_bcs_value()),
                ]),
            ),
        }
    }
}

impl FromBcsValue for TransactionData {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        match value.as_variant()? {
            ("V1", Some(p)) => Ok(Self::V1(TransactionDataV1 {
                kind: get(p, "kind")?,
                sender: get(p, "sender")?,
                gas_data: get(p, "gasData")?,
                expiration: get(p, "expiration")?,
            })),
            (other, _) => Err(unknown_variant("TransactionData", other)),
        }
    }
}

macro_rules! unit_enum_value {
    ($ty:ident, $schema:literal, [$($variant:ident),+]) => {
        impl IntoBcsValue for $ty {
            fn into_bcs_value(self) -> BcsValue {
                match self {
                    $(Self::$variant => BcsValue::unit_variant(stringify!($variant)),)+
                }
            }
        }

        impl FromBcsValue for $ty {
            fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
                match value.as_variant()? {
                    $((stringify!($variant), None) => Ok(Self::$variant),)+
                    (other, _) => Err(unknown_variant($schema, other)),
                }
            }
        }
    };
}

unit_enum_value!(
    IntentScope,
    "IntentScope",
    [TransactionData, TransactionEffects, CheckpointSummary, PersonalMessage]
);
unit_enum_value!(IntentVersion, "IntentVersion", [V0]);
unit_enum_value!(AppId, "AppId", [Sui, Narwhal, Consensus]);

impl IntoBcsValue for Intent {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::structure([
            ("scope", self.scope.into_bcs_value()),
            ("version", self.version.into_bcs_value()),
            ("appId", self.app_id.into_bcs_value()),
        ])
    }
}

impl FromBcsValue for Intent {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        Ok(Self {
            scope: get(value, "scope")?,
            version: get(value, "version")?,
            app_id: get(value, "appId")?,
        })
    }
}

impl IntoBcsValue for IntentMessage {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::structure([
            ("intent", self.intent.into_bcs_value()),
            ("value", self.value.into_bcs_value()),
        ])
    }
}

impl FromBcsValue for IntentMessage {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        Ok(Self {
            intent: get(value, "intent")?,
            value: get(value, "value")?,
        })
    }
}

impl IntoBcsValue for SenderSignedTransaction {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::structure([
            ("intentMessage", self.intent_message.into_bcs_value()),
            ("txSignatures", self.tx_signatures.into_bcs_value()),
        ])
    }
}

impl FromBcsValue for SenderSignedTransaction {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        Ok(Self {
            intent_message: get(value, "intentMessage")?,
            tx_signatures: get(value, "txSignatures")?,
        })
    }
}

impl IntoBcsValue for SenderSignedData {
    fn into_bcs_value(self) -> BcsValue {
        self.0.into_bcs_value()
    }
}

impl FromBcsValue for SenderSignedData {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        Vec::from_bcs_value(value).map(Self)
    }
}

/// Dynamic wire schemas, built once.
struct Wire {
    argument: BcsType<BcsValue>,
    object_ref: BcsType<BcsValue>,
    object_arg: BcsType<BcsValue>,
    call_arg: BcsType<BcsValue>,
    move_call: BcsType<BcsValue>,
    command: BcsType<BcsValue>,
    programmable_transaction: BcsType<BcsValue>,
    transaction_kind: BcsType<BcsValue>,
    gas_data: BcsType<BcsValue>,
    expiration: BcsType<BcsValue>,
    transaction_data: BcsType<BcsValue>,
    intent: BcsType<BcsValue>,
    intent_message: BcsType<BcsValue>,
    sender_signed_data: BcsType<BcsValue>,
}

fn unit_enum(name: &str, variants: &[&str]) -> BcsType<BcsValue> {
    bcs::enum_(name.to_string(), variants.iter().map(|v| (*v, None)))
}

impl Wire {
    fn new() -> Self {
        let addr = address().dynamic();
        let uint64 = bcs::u64().dynamic();
        let modules = bcs::vector(bcs::byte_vector()).dynamic();
        let dependencies = bcs::vector(address()).dynamic();

        let argument = bcs::enum_(
            "Argument",
            [
                ("GasCoin", None),
                ("Input", Some(bcs::u16().dynamic())),
                ("Result", Some(bcs::u16().dynamic())),
                (
                    "NestedResult",
                    Some(bcs::tuple2(bcs::u16(), bcs::u16()).dynamic()),
                ),
            ],
        );
        let arguments = bcs::vector(argument.clone()).dynamic();

        let object_ref = bcs::struct_(
            "ObjectRef",
            [
                ("objectId", addr.clone()),
                ("version", uint64.clone()),
                ("digest", ObjectDigest::schema().dynamic()),
            ],
        );

        let object_arg = bcs::enum_(
            "ObjectArg",
            [
                ("ImmOrOwnedObject", Some(object_ref.clone())),
                (
                    "SharedObject",
                    Some(bcs::struct_(
                        "SharedObjectRef",
                        [
                            ("objectId", addr.clone()),
                            ("initialSharedVersion", uint64.clone()),
                            ("mutable", bcs::bool().dynamic()),
                        ],
                    )),
                ),
                ("Receiving", Some(object_ref.clone())),
            ],
        );

        let call_arg = bcs::enum_(
            "CallArg",
            [
                ("Pure", Some(bcs::byte_vector().dynamic())),
                ("Object", Some(object_arg.clone())),
            ],
        );

        let move_call = bcs::struct_(
            "ProgrammableMoveCall",
            [
                ("package", addr.clone()),
                ("module", bcs::string().dynamic()),
                ("function", bcs::string().dynamic()),
                ("typeArguments", bcs::vector(type_tag()).dynamic()),
                ("arguments", arguments.clone()),
            ],
        );

        let command = bcs::enum_(
            "Command",
            [
                ("MoveCall", Some(move_call.clone())),
                (
                    "TransferObjects",
                    Some(bcs::struct_(
                        "TransferObjects",
                        [("objects", arguments.clone()), ("address", argument.clone())],
                    )),
                ),
                (
                    "SplitCoins",
                    Some(bcs::struct_(
                        "SplitCoins",
                        [("coin", argument.clone()), ("amounts", arguments.clone())],
                    )),
                ),
                (
                    "MergeCoins",
                    Some(bcs::struct_(
                        "MergeCoins",
                        [("destination", argument.clone()), ("sources", arguments.clone())],
                    )),
                ),
                (
                    "Publish",
                    Some(bcs::struct_(
                        "Publish",
                        [("modules", modules.clone()), ("dependencies", dependencies.clone())],
                    )),
                ),
                (
                    "MakeMoveVec",
                    Some(bcs::struct_(
                        "MakeMoveVec",
                        [
                            ("type", bcs::option(type_tag()).dynamic()),
                            ("elements", arguments.clone()),
                        ],
                    )),
                ),
                (
                    "Upgrade",
                    Some(bcs::struct_(
                        "Upgrade",
                        [
                            ("modules", modules),
                            ("dependencies", dependencies),
                            ("package", addr.clone()),
                            ("ticket", argument.clone()),
                        ],
                    )),
                ),
            ],
        );

        let programmable_transaction = bcs::struct_(
            "ProgrammableTransaction",
            [
                ("inputs", bcs::vector(call_arg.clone()).dynamic()),
                ("commands", bcs::vector(command.clone()).dynamic()),
            ],
        );

        let transaction_kind = bcs::enum_(
            "TransactionKind",
            [
                (
                    "ProgrammableTransaction",
                    Some(programmable_transaction.clone()),
                ),
                ("ChangeEpoch", None),
                ("Genesis", None),
                ("ConsensusCommitPrologue", None),
            ],
        );

        let gas_data = bcs::struct_(
            "GasData",
            [
                ("payment", bcs::vector(object_ref.clone()).dynamic()),
                ("owner", addr.clone()),
                ("price", uint64.clone()),
                ("budget", uint64.clone()),
            ],
        );

        let expiration = bcs::enum_(
            "TransactionExpiration",
            [("None", None), ("Epoch", Some(uint64))],
        );

        let transaction_data = bcs::enum_(
            "TransactionData",
            [(
                "V1",
                Some(bcs::struct_(
                    "TransactionDataV1",
                    [
                        ("kind", transaction_kind.clone()),
                        ("sender", addr),
                        ("gasData", gas_data.clone()),
                        ("expiration", expiration.clone()),
                    ],
                )),
            )],
        );

        let intent = bcs::struct_(
            "Intent",
            [
                (
                    "scope",
                    unit_enum(
                        "IntentScope",
                        &[
                            "TransactionData",
                            "TransactionEffects",
                            "CheckpointSummary",
                            "PersonalMessage",
                        ],
                    ),
                ),
                ("version", unit_enum("IntentVersion", &["V0"])),
                ("appId", unit_enum("AppId", &["Sui", "Narwhal", "Consensus"])),
            ],
        );

        let intent_message = bcs::struct_(
            "IntentMessage",
            [("intent", intent.clone()), ("value", transaction_data.clone())],
        );

        let sender_signed_data = bcs::vector(bcs::struct_(
            "SenderSignedTransaction",
            [
                ("intentMessage", intent_message.clone()),
                (
                    "txSignatures",
                    bcs::vector(bcs::byte_vector()).dynamic(),
                ),
            ],
        ))
        .dynamic();

        Self {
            argument,
            object_ref,
            object_arg,
            call_arg,
            move_call,
            command,
            programmable_transaction,
            transaction_kind,
            gas_data,
            expiration,
            transaction_data,
            intent,
            intent_message,
            sender_signed_data,
        }
    }
}

static WIRE: Lazy<Wire> = Lazy::new(Wire::new);

fn typed<T>(name: &'static str, wire: &BcsType<BcsValue>) -> BcsType<T>
where
    T: IntoBcsValue + FromBcsValue + Clone + 'static,
{
    wire.transform(
        name,
        |value: &T| Ok(value.clone().into_bcs_value()),
        |value: BcsValue| T::from_bcs_value(&value),
    )
}

macro_rules! schema_accessor {
    ($ty:ident, $field:ident) => {
        impl $ty {
            /// Wire schema for this type.
            pub fn schema() -> BcsType<Self> {
                typed(stringify!($ty), &WIRE.$field)
            }
        }
    };
}

schema_accessor!(Argument, argument);
schema_accessor!(ObjectRef, object_ref);
schema_accessor!(ObjectArg, object_arg);
schema_accessor!(CallArg, call_arg);
schema_accessor!(ProgrammableMoveCall, move_call);
schema_accessor!(Command, command);
schema_accessor!(ProgrammableTransaction, programmable_transaction);
schema_accessor!(TransactionKind, transaction_kind);
schema_accessor!(GasData, gas_data);
schema_accessor!(TransactionExpiration, expiration);
schema_accessor!(TransactionData, transaction_data);
schema_accessor!(Intent, intent);
schema_accessor!(IntentMessage, intent_message);
schema_accessor!(SenderSignedData, sender_signed_data);
