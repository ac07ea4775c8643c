//! Transaction builder.

use super::data::{
    BuildDataOptions, Command, GasConfig, Input, MoveCall, TransactionData, TransactionIntent,
    TransactionOverrides, UnresolvedObject,
};
use super::json::SerializedTransactionDataV2;
use super::resolve::{
    resolve_transaction_data, ResolveConfig, ResolveContext, TransactionPlugin, TransactionPlugins,
};
use crate::api::LedgerClient;
use crate::error::{BuilderError, BuilderResult};
use num_bigint::BigUint;
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;
use sui_txn_types::address::address;
use sui_txn_types::{
    bcs, serialize_pure_json, Argument, ObjectArg, ObjectId, ObjectRef, PureType, SuiAddress,
    TransactionDigest, TransactionExpiration, TypeTag,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Where a [`Transaction`] is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransactionState {
    /// Accepting changes.
    #[default]
    Open,
    /// Resolution has run; any change moves back to `Open`.
    Resolved,
    /// Full transaction bytes were produced. No further changes are accepted.
    Serialized,
}

/// Options for [`Transaction::build`].
#[derive(Clone, Default)]
pub struct BuildOptions {
    /// Build only the transaction kind. Gas and sender are neither resolved nor serialized.
    pub only_kind: bool,
    pub max_size: Option<usize>,
    pub overrides: TransactionOverrides,
    pub client: Option<Arc<dyn LedgerClient>>,
    pub cancellation: CancellationToken,
    pub config: ResolveConfig,
}

impl fmt::Debug for BuildOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildOptions")
            .field("only_kind", &self.only_kind)
            .field("max_size", &self.max_size)
            .field("overrides", &self.overrides)
            .field("has_client", &self.client.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl BuildOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ledger client used for lookups, pricing and simulation.
    #[must_use]
    pub fn with_client(mut self, client: Arc<dyn LedgerClient>) -> Self {
        self.client = Some(client);
        self
    }

    #[must_use]
    pub fn kind_only(mut self) -> Self {
        self.only_kind = true;
        self
    }

    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: TransactionOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Sets the token whose cancellation aborts the build at its next ledger call.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: ResolveConfig) -> Self {
        self.config = config;
        self
    }

    fn context(&self) -> ResolveContext {
        ResolveContext {
            client: self.client.clone(),
            config: self.config,
            only_kind: self.only_kind,
            cancellation: self.cancellation.clone(),
            overrides: self.overrides.clone(),
        }
    }

    fn data_options(&self) -> BuildDataOptions {
        BuildDataOptions {
            only_kind: self.only_kind,
            max_size: self.max_size,
            overrides: self.overrides.clone(),
        }
    }
}

/// The result of a command, usable as an argument to later commands.
///
/// Commands that return several values expose them through
/// [`nested_result`](Self::nested_result).
#[derive(Debug)]
pub struct TransactionResult {
    index: u16,
    nested: RefCell<Vec<Argument>>,
}

impl TransactionResult {
    fn new(index: u16) -> Self {
        Self {
            index,
            nested: RefCell::new(Vec::new()),
        }
    }

    /// Index of the command.
    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn argument(&self) -> Argument {
        Argument::Result(self.index)
    }

    /// The `position`-th value returned by the command.
    pub fn nested_result(&self, position: u16) -> Argument {
        let mut nested = self.nested.borrow_mut();
        while nested.len() <= usize::from(position) {
            let next = nested.len() as u16;
            nested.push(Argument::NestedResult(self.index, next));
        }
        nested[usize::from(position)]
    }
}

impl From<TransactionResult> for Argument {
    fn from(result: TransactionResult) -> Self {
        result.argument()
    }
}

impl From<&TransactionResult> for Argument {
    fn from(result: &TransactionResult) -> Self {
        result.argument()
    }
}

fn parse_target(target: &str) -> BuilderResult<(ObjectId, String, String)> {
    match target.split("::").collect::<Vec<_>>()[..] {
        [package, module, function] if !module.is_empty() && !function.is_empty() => Ok((
            ObjectId::from_hex(package)?,
            module.to_string(),
            function.to_string(),
        )),
        _ => Err(BuilderError::invalid_argument(format!(
            "invalid move call target {target:?}, expected package::module::function"
        ))),
    }
}

/// A programmable transaction under construction.
///
/// Inputs and commands are added through the helper methods, which return
/// arguments for use in later commands. [`build`](Self::build) resolves
/// everything the ledger has to fill in and returns the BCS bytes to sign.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use sui_txn_builder::api::SuiClient;
/// use sui_txn_builder::{BuildOptions, SuiConfig, Transaction};
/// use sui_txn_types::{ObjectId, SuiAddress};
///
/// # async fn run() -> sui_txn_builder::BuilderResult<()> {
/// let client = Arc::new(SuiClient::new(SuiConfig::testnet())?);
/// let sender = SuiAddress::from_hex("0x8d6c")?;
///
/// let mut tx = Transaction::new();
/// tx.set_sender(sender)?;
/// let amount = tx.pure_u64(1_000_000)?;
/// let coin = tx.split_coins(tx.gas(), vec![amount])?;
/// let recipient = tx.pure_address(SuiAddress::from_hex("0xbeef")?)?;
/// tx.transfer_objects(vec![coin.nested_result(0)], recipient)?;
///
/// let pool = tx.object(ObjectId::from_hex("0x5")?)?;
/// tx.move_call("0x2::example::touch", &[], vec![pool])?;
///
/// let bytes = tx.build(&BuildOptions::new().with_client(client)).await?;
/// # let _ = bytes;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    data: TransactionData,
    plugins: TransactionPlugins,
    state: TransactionState,
}

impl Transaction {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing IR.
    pub fn from_data(data: TransactionData) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    /// Restores a transaction from version 1 or version 2 JSON.
    pub fn from_json(json: &str) -> BuilderResult<Self> {
        Ok(Self::from_data(TransactionData::from_json(json)?))
    }

    /// Loads serialized transaction data.
    pub fn from_bytes(bytes: &[u8]) -> BuilderResult<Self> {
        Ok(Self::from_data(TransactionData::from_bytes(bytes)?))
    }

    /// Loads a serialized transaction kind; sender and gas start unset.
    pub fn from_kind_bytes(bytes: &[u8]) -> BuilderResult<Self> {
        Ok(Self::from_data(TransactionData::from_kind_bytes(bytes)?))
    }

    pub fn data(&self) -> &TransactionData {
        &self.data
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Version 2 JSON snapshot, including anything still unresolved.
    pub fn snapshot(&self) -> SerializedTransactionDataV2 {
        self.data.snapshot()
    }

    /// The snapshot as a JSON string.
    pub fn serialize(&self) -> BuilderResult<String> {
        self.data.to_json()
    }

    fn edit(&mut self) -> BuilderResult<&mut TransactionData> {
        if self.state == TransactionState::Serialized {
            return Err(BuilderError::invalid_argument(
                "transaction has already been built and can no longer be changed",
            ));
        }
        self.state = TransactionState::Open;
        Ok(&mut self.data)
    }

    // Plugins

    /// Adds a plugin that runs before the resolution stages on every build.
    pub fn add_build_plugin(&mut self, plugin: Arc<TransactionPlugin>) {
        self.plugins.add_build_plugin(plugin);
    }

    /// Registers the resolver for intents named `name`.
    pub fn add_intent_resolver(
        &mut self,
        name: impl Into<String>,
        resolver: Arc<TransactionPlugin>,
    ) -> BuilderResult<()> {
        self.plugins.add_intent_resolver(name, resolver)
    }

    // Sender, expiration and gas

    pub fn set_sender(&mut self, sender: SuiAddress) -> BuilderResult<()> {
        self.edit()?.sender = Some(sender);
        Ok(())
    }

    /// Sets the sender unless one is already present.
    pub fn set_sender_if_not_set(&mut self, sender: SuiAddress) -> BuilderResult<()> {
        if self.data.sender.is_none() {
            self.set_sender(sender)?;
        }
        Ok(())
    }

    pub fn set_expiration(&mut self, expiration: TransactionExpiration) -> BuilderResult<()> {
        self.edit()?.expiration = Some(expiration);
        Ok(())
    }

    pub fn set_gas_price(&mut self, price: u64) -> BuilderResult<()> {
        self.edit()?.gas_data.price = Some(price);
        Ok(())
    }

    pub fn set_gas_budget(&mut self, budget: u64) -> BuilderResult<()> {
        self.edit()?.gas_data.budget = Some(budget);
        Ok(())
    }

    pub fn set_gas_owner(&mut self, owner: SuiAddress) -> BuilderResult<()> {
        self.edit()?.gas_data.owner = Some(owner);
        Ok(())
    }

    pub fn set_gas_payment(&mut self, payment: Vec<ObjectRef>) -> BuilderResult<()> {
        self.edit()?.gas_data.payment = Some(payment);
        Ok(())
    }

    /// Replaces all gas settings at once.
    pub fn set_gas_config(&mut self, gas: GasConfig) -> BuilderResult<()> {
        self.edit()?.gas_data = gas;
        Ok(())
    }

    // Inputs

    /// The gas coin.
    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    /// A raw value typed later from the parameter that consumes it.
    pub fn pure(&mut self, value: impl Into<Value>) -> BuilderResult<Argument> {
        self.edit()?.add_input(Input::UnresolvedPure(value.into()))
    }

    /// Already serialized pure bytes.
    pub fn pure_bytes(&mut self, bytes: Vec<u8>) -> BuilderResult<Argument> {
        self.edit()?.add_input(Input::Pure(bytes))
    }

    /// A JSON value serialized as `ty`.
    pub fn pure_with(&mut self, ty: &PureType, value: &Value) -> BuilderResult<Argument> {
        let bytes = serialize_pure_json(ty, value)?;
        self.pure_bytes(bytes)
    }

    pub fn pure_bool(&mut self, value: bool) -> BuilderResult<Argument> {
        let bytes = bcs::bool().serialize(&value)?.into_bytes();
        self.pure_bytes(bytes)
    }

    pub fn pure_u8(&mut self, value: u8) -> BuilderResult<Argument> {
        let bytes = bcs::u8().serialize(&value)?.into_bytes();
        self.pure_bytes(bytes)
    }

    pub fn pure_u16(&mut self, value: u16) -> BuilderResult<Argument> {
        let bytes = bcs::u16().serialize(&value)?.into_bytes();
        self.pure_bytes(bytes)
    }

    pub fn pure_u32(&mut self, value: u32) -> BuilderResult<Argument> {
        let bytes = bcs::u32().serialize(&value)?.into_bytes();
        self.pure_bytes(bytes)
    }

    pub fn pure_u64(&mut self, value: u64) -> BuilderResult<Argument> {
        let bytes = bcs::u64().serialize(&value)?.into_bytes();
        self.pure_bytes(bytes)
    }

    pub fn pure_u128(&mut self, value: u128) -> BuilderResult<Argument> {
        let bytes = bcs::u128().serialize(&value)?.into_bytes();
        self.pure_bytes(bytes)
    }

    pub fn pure_u256(&mut self, value: &BigUint) -> BuilderResult<Argument> {
        let bytes = bcs::u256().serialize(value)?.into_bytes();
        self.pure_bytes(bytes)
    }

    pub fn pure_string(&mut self, value: &str) -> BuilderResult<Argument> {
        let bytes = bcs::string().serialize(&value.to_string())?.into_bytes();
        self.pure_bytes(bytes)
    }

    pub fn pure_address(&mut self, value: SuiAddress) -> BuilderResult<Argument> {
        let bytes = address().serialize(&value)?.into_bytes();
        self.pure_bytes(bytes)
    }

    /// An object by id, fetched during resolution.
    ///
    /// Each object appears once in the inputs; passing the same id again
    /// returns the existing argument.
    pub fn object(&mut self, object_id: ObjectId) -> BuilderResult<Argument> {
        self.add_object(Input::UnresolvedObject(UnresolvedObject::new(object_id)))
    }

    /// An object by id with resolution hints, such as a known version or
    /// forced mutability.
    pub fn unresolved_object(&mut self, object: UnresolvedObject) -> BuilderResult<Argument> {
        self.add_object(Input::UnresolvedObject(object))
    }

    /// An owned or immutable object at a known version.
    pub fn object_ref(&mut self, reference: ObjectRef) -> BuilderResult<Argument> {
        self.add_object(Input::Object(ObjectArg::ImmOrOwnedObject(reference)))
    }

    /// A shared object. Adding it again with `mutable` set upgrades the existing input.
    pub fn shared_object_ref(
        &mut self,
        object_id: ObjectId,
        initial_shared_version: u64,
        mutable: bool,
    ) -> BuilderResult<Argument> {
        self.add_object(Input::Object(ObjectArg::SharedObject {
            id: object_id,
            initial_shared_version,
            mutable,
        }))
    }

    /// An object sent to another object, received by this transaction.
    pub fn receiving_ref(&mut self, reference: ObjectRef) -> BuilderResult<Argument> {
        self.add_object(Input::Object(ObjectArg::Receiving(reference)))
    }

    fn add_object(&mut self, input: Input) -> BuilderResult<Argument> {
        let object_id = input
            .object_id()
            .ok_or_else(|| BuilderError::Internal("object input without an id".to_string()))?;
        let data = self.edit()?;

        let existing = data
            .inputs
            .iter()
            .position(|candidate| candidate.object_id() == Some(object_id));
        let Some(index) = existing else {
            return data.add_input(input);
        };

        if let (
            Input::Object(ObjectArg::SharedObject {
                mutable: existing, ..
            }),
            Input::Object(ObjectArg::SharedObject { mutable, .. }),
        ) = (&mut data.inputs[index], &input)
        {
            *existing |= *mutable;
        }
        let index = u16::try_from(index)
            .map_err(|_| BuilderError::invalid_argument(format!("too many inputs: {index}")))?;
        Ok(Argument::Input(index))
    }

    // Commands

    /// Appends any command.
    pub fn add_command(&mut self, command: Command) -> BuilderResult<TransactionResult> {
        let index = self.edit()?.add_command(command)?;
        Ok(TransactionResult::new(index))
    }

    /// Calls `package::module::function`.
    pub fn move_call(
        &mut self,
        target: &str,
        type_arguments: &[&str],
        arguments: Vec<Argument>,
    ) -> BuilderResult<TransactionResult> {
        let (package, module, function) = parse_target(target)?;
        let type_arguments = type_arguments
            .iter()
            .map(|tag| TypeTag::parse(tag))
            .collect::<Result<Vec<_>, _>>()?;
        self.add_command(Command::MoveCall(Box::new(MoveCall {
            package,
            module,
            function,
            type_arguments,
            arguments,
            argument_types: None,
        })))
    }

    pub fn transfer_objects(
        &mut self,
        objects: Vec<Argument>,
        address: Argument,
    ) -> BuilderResult<TransactionResult> {
        self.add_command(Command::TransferObjects { objects, address })
    }

    pub fn split_coins(
        &mut self,
        coin: Argument,
        amounts: Vec<Argument>,
    ) -> BuilderResult<TransactionResult> {
        self.add_command(Command::SplitCoins { coin, amounts })
    }

    pub fn merge_coins(
        &mut self,
        destination: Argument,
        sources: Vec<Argument>,
    ) -> BuilderResult<TransactionResult> {
        self.add_command(Command::MergeCoins {
            destination,
            sources,
        })
    }

    pub fn publish(
        &mut self,
        modules: Vec<Vec<u8>>,
        dependencies: Vec<ObjectId>,
    ) -> BuilderResult<TransactionResult> {
        self.add_command(Command::Publish {
            modules,
            dependencies,
        })
    }

    pub fn upgrade(
        &mut self,
        modules: Vec<Vec<u8>>,
        dependencies: Vec<ObjectId>,
        package: ObjectId,
        ticket: Argument,
    ) -> BuilderResult<TransactionResult> {
        self.add_command(Command::Upgrade {
            modules,
            dependencies,
            package,
            ticket,
        })
    }

    /// Builds a vector from `elements`. The element type is required when
    /// `elements` is empty or holds pure values.
    pub fn make_move_vec(
        &mut self,
        element_type: Option<&str>,
        elements: Vec<Argument>,
    ) -> BuilderResult<TransactionResult> {
        let element_type = element_type.map(TypeTag::parse).transpose()?;
        self.add_command(Command::MakeMoveVec {
            element_type,
            elements,
        })
    }

    /// Adds an intent for a registered resolver to expand.
    pub fn add_intent(&mut self, intent: TransactionIntent) -> BuilderResult<TransactionResult> {
        self.add_command(Command::Intent(intent))
    }

    // Resolution and output

    /// Runs the resolution pipeline without serializing.
    pub async fn prepare(&mut self, options: &BuildOptions) -> BuilderResult<()> {
        let context = options.context();
        if !options.only_kind && context.sender(&self.data).is_none() {
            return Err(BuilderError::MissingSender);
        }
        resolve_transaction_data(&mut self.data, &self.plugins, &context).await?;
        if self.state == TransactionState::Open {
            self.state = TransactionState::Resolved;
        }
        Ok(())
    }

    /// Resolves the transaction and returns its BCS bytes.
    ///
    /// A full build moves the transaction to [`TransactionState::Serialized`];
    /// a kind-only build leaves it open to further changes.
    pub async fn build(&mut self, options: &BuildOptions) -> BuilderResult<Vec<u8>> {
        self.prepare(options).await?;
        let bytes = self.data.build(&options.data_options())?;

        if options.only_kind {
            info!(size = bytes.len(), "Built transaction kind");
        } else {
            let digest = TransactionDigest::of_transaction_data(&bytes);
            info!(txn_digest = %digest, size = bytes.len(), "Built transaction");
            self.state = TransactionState::Serialized;
        }
        Ok(bytes)
    }

    /// Resolves the transaction and returns the digest it will be signed under.
    pub async fn get_digest(&mut self, options: &BuildOptions) -> BuilderResult<TransactionDigest> {
        let options = BuildOptions {
            only_kind: false,
            ..options.clone()
        };
        self.prepare(&options).await?;
        let bytes = self.data.build(&options.data_options())?;
        Ok(TransactionDigest::of_transaction_data(&bytes))
    }
}
