//! The resolution pipeline.
//!
//! Resolution turns a transaction that names objects by id and passes raw
//! values into one where every input is a concrete Pure or Object argument
//! and the gas settings are complete. It runs as a plugin chain:
//!
//! 1. intent resolvers for the intents present in the transaction
//! 2. caller-registered build plugins
//! 3. [`NormalizeInputs`]
//! 4. [`ResolveObjectReferences`]
//! 5. [`SetGasPrice`], [`SetGasBudget`] and [`SetGasPayment`], unless only
//!    the transaction kind is being built
//! 6. [`ValidateInputs`]
//!
//! Every stage leaves fields the caller already set untouched, so resolving
//! an already resolved transaction changes nothing.

use super::data::{
    BuildDataOptions, Command, GasConfig, Input, TransactionData, TransactionOverrides,
    UnresolvedObject,
};
use super::plugins::{Next, Plugin, PluginRegistry, PluginRunner};
use crate::api::{Coin, LedgerClient};
use crate::error::{BuilderError, BuilderResult, LookupFailure};
use async_trait::async_trait;
use futures::future::try_join_all;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use sui_txn_types::{
    pure_schema_for, serialize_pure_json, Argument, ObjectArg, ObjectDigest, ObjectId, ObjectRef,
    OpenMoveTypeSignature, PureType, SuiAddress,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Gas units added on top of the simulated computation cost.
pub const GAS_SAFE_OVERHEAD: u64 = 1000;
/// Budget used for the simulation that estimates the real budget.
pub const MAX_GAS: u64 = 50_000_000_000;
pub const MAX_OBJECTS_PER_FETCH: usize = 50;
pub const MAX_GAS_OBJECTS: usize = 256;

const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

/// A plugin over the transaction IR.
pub type TransactionPlugin = dyn Plugin<TransactionData, ResolveContext>;

/// Build plugins and intent resolvers for one builder.
pub type TransactionPlugins = PluginRegistry<TransactionData, ResolveContext>;

/// Tunables for resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveConfig {
    pub gas_safe_overhead: u64,
    pub max_gas: u64,
    pub max_objects_per_fetch: usize,
    pub max_gas_objects: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            gas_safe_overhead: GAS_SAFE_OVERHEAD,
            max_gas: MAX_GAS,
            max_objects_per_fetch: MAX_OBJECTS_PER_FETCH,
            max_gas_objects: MAX_GAS_OBJECTS,
        }
    }
}

impl ResolveConfig {
    #[must_use]
    pub fn with_gas_safe_overhead(mut self, overhead: u64) -> Self {
        self.gas_safe_overhead = overhead;
        self
    }

    #[must_use]
    pub fn with_max_gas(mut self, max_gas: u64) -> Self {
        self.max_gas = max_gas;
        self
    }

    /// Sets the object lookup batch size. Zero is treated as one.
    #[must_use]
    pub fn with_max_objects_per_fetch(mut self, max: usize) -> Self {
        self.max_objects_per_fetch = max;
        self
    }

    #[must_use]
    pub fn with_max_gas_objects(mut self, max: usize) -> Self {
        self.max_gas_objects = max;
        self
    }
}

/// Shared, read-only configuration for one pipeline run.
#[derive(Clone, Default)]
pub struct ResolveContext {
    pub client: Option<Arc<dyn LedgerClient>>,
    pub config: ResolveConfig,
    pub only_kind: bool,
    pub cancellation: CancellationToken,
    /// Values the final build will substitute. Stages treat them as set.
    pub overrides: TransactionOverrides,
}

impl fmt::Debug for ResolveContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveContext")
            .field("has_client", &self.client.is_some())
            .field("config", &self.config)
            .field("only_kind", &self.only_kind)
            .field("cancelled", &self.cancellation.is_cancelled())
            .field("overrides", &self.overrides)
            .finish()
    }
}

impl ResolveContext {
    pub fn new(client: Option<Arc<dyn LedgerClient>>) -> Self {
        Self {
            client,
            ..Default::default()
        }
    }

    /// The sender the build will use.
    pub fn sender(&self, data: &TransactionData) -> Option<SuiAddress> {
        self.overrides.sender.or(data.sender)
    }

    /// The gas owner the build will use, defaulting to the sender.
    pub fn gas_owner(&self, data: &TransactionData) -> Option<SuiAddress> {
        self.overrides
            .gas_data
            .owner
            .or(data.gas_data.owner)
            .or_else(|| self.sender(data))
    }

    /// The gas price the build will use.
    pub fn gas_price(&self, data: &TransactionData) -> Option<u64> {
        self.overrides.gas_data.price.or(data.gas_data.price)
    }

    /// The ledger client, required by any stage that has lookups to make.
    pub fn client(&self) -> BuilderResult<&dyn LedgerClient> {
        self.client.as_deref().ok_or_else(|| {
            BuilderError::Config(
                "a ledger client is required to resolve this transaction".to_string(),
            )
        })
    }

    /// Awaits a ledger request unless the build is cancelled first.
    pub async fn ledger<T, F>(&self, request: F) -> BuilderResult<T>
    where
        F: Future<Output = BuilderResult<T>>,
    {
        if self.cancellation.is_cancelled() {
            return Err(BuilderError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(BuilderError::Cancelled),
            result = request => result,
        }
    }
}

/// Budget from simulated costs: computation plus a safety overhead, plus net
/// storage when that is larger.
pub fn compute_gas_budget(
    computation_cost: u64,
    storage_cost: u64,
    storage_rebate: u64,
    gas_price: u64,
    safe_overhead: u64,
) -> u64 {
    let overhead = i128::from(safe_overhead).saturating_mul(i128::from(gas_price));
    let base = i128::from(computation_cost).saturating_add(overhead);
    let with_storage = base
        .saturating_add(i128::from(storage_cost))
        .saturating_sub(i128::from(storage_rebate));
    u64::try_from(base.max(with_storage)).unwrap_or(u64::MAX)
}

/// Runs intent resolvers, the registered build plugins and the core stages.
pub async fn resolve_transaction_data(
    data: &mut TransactionData,
    plugins: &TransactionPlugins,
    context: &ResolveContext,
) -> BuilderResult<()> {
    if context.cancellation.is_cancelled() {
        return Err(BuilderError::Cancelled);
    }

    let mut runner = PluginRunner::new();
    for name in data.intent_names() {
        let resolver = plugins
            .intent_resolver(&name)
            .ok_or_else(|| BuilderError::IntentUnresolved(name.clone()))?;
        runner.push(resolver.clone());
    }
    runner.extend(plugins.build_plugins().iter().cloned());
    runner.extend(core_stages(context.only_kind));

    debug!(
        stages = runner.len(),
        only_kind = context.only_kind,
        "Resolving transaction"
    );
    runner.run(data, context).await
}

/// The built-in stages, in order.
pub fn core_stages(only_kind: bool) -> Vec<Arc<TransactionPlugin>> {
    let mut stages: Vec<Arc<TransactionPlugin>> =
        vec![Arc::new(NormalizeInputs), Arc::new(ResolveObjectReferences)];
    if !only_kind {
        stages.push(Arc::new(SetGasPrice));
        stages.push(Arc::new(SetGasBudget));
        stages.push(Arc::new(SetGasPayment));
    }
    stages.push(Arc::new(ValidateInputs));
    stages
}

/// Types raw inputs from the parameters that consume them.
///
/// Move calls with unresolved inputs get their parameter signatures from the
/// ledger, one lookup per distinct function. Raw values passed where a pure
/// type is expected are serialized, and raw strings passed where an object is
/// expected become object ids. Split amounts are serialized as `u64` and
/// transfer recipients as addresses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NormalizeInputs;

#[async_trait]
impl Plugin<TransactionData, ResolveContext> for NormalizeInputs {
    fn name(&self) -> &str {
        "normalize-inputs"
    }

    async fn run(
        &self,
        data: &mut TransactionData,
        context: &ResolveContext,
        next: Next<'_, TransactionData, ResolveContext>,
    ) -> BuilderResult<()> {
        normalize_inputs(data, context).await?;
        next.run(data, context).await
    }
}

type FunctionKey = (ObjectId, String, String);

fn needs_signatures(data: &TransactionData, arguments: &[Argument]) -> bool {
    arguments.iter().any(|argument| match argument {
        Argument::Input(index) => data
            .inputs
            .get(usize::from(*index))
            .map_or(false, |input| !input.is_resolved()),
        _ => false,
    })
}

async fn normalize_inputs(data: &mut TransactionData, context: &ResolveContext) -> BuilderResult<()> {
    let mut functions: BTreeSet<FunctionKey> = BTreeSet::new();
    let mut raw_arguments = Vec::new();
    for command in &data.commands {
        match command {
            Command::MoveCall(call)
                if call.argument_types.is_none() && needs_signatures(data, &call.arguments) =>
            {
                functions.insert((call.package, call.module.clone(), call.function.clone()));
            }
            Command::SplitCoins { amounts, .. } => {
                raw_arguments.extend(amounts.iter().map(|amount| (*amount, PureType::U64)));
            }
            Command::TransferObjects { address, .. } => {
                raw_arguments.push((*address, PureType::Address));
            }
            _ => {}
        }
    }

    for (argument, ty) in &raw_arguments {
        normalize_raw_argument(data, *argument, ty)?;
    }

    if !functions.is_empty() {
        let client = context.client()?;
        let signatures = try_join_all(functions.iter().map(|(package, module, function)| async move {
            let normalized = context
                .ledger(client.get_normalized_move_function(package, module, function))
                .await?;
            let mut parameters = normalized.parameter_signatures()?;
            if parameters
                .last()
                .map_or(false, OpenMoveTypeSignature::is_tx_context)
            {
                parameters.pop();
            }
            Ok::<_, BuilderError>(((*package, module.clone(), function.clone()), parameters))
        }))
        .await?
        .into_iter()
        .collect::<HashMap<_, _>>();
        debug!(functions = signatures.len(), "Fetched move function signatures");

        for command in &mut data.commands {
            if let Command::MoveCall(call) = command {
                if call.argument_types.is_none() {
                    let key = (call.package, call.module.clone(), call.function.clone());
                    if let Some(parameters) = signatures.get(&key) {
                        call.argument_types = Some(parameters.clone());
                    }
                }
            }
        }
    }

    for index in 0..data.commands.len() {
        let Command::MoveCall(call) = &data.commands[index] else {
            continue;
        };
        let Some(parameters) = &call.argument_types else {
            continue;
        };
        if parameters.len() != call.arguments.len() {
            return Err(BuilderError::invalid_argument(format!(
                "Incorrect number of arguments for {}: expected {}, got {}",
                call.target(),
                parameters.len(),
                call.arguments.len()
            )));
        }

        let mut updates = Vec::new();
        for (parameter, argument) in parameters.iter().zip(&call.arguments) {
            let Argument::Input(input_index) = *argument else {
                continue;
            };
            let slot = usize::from(input_index);
            let input = data.inputs.get(slot).ok_or_else(|| {
                BuilderError::invalid_argument(format!(
                    "{} references missing input {input_index}",
                    call.target()
                ))
            })?;
            let value = match input {
                Input::UnresolvedPure(value) => value.clone(),
                Input::UnresolvedObject(object) => Value::String(object.object_id.to_hex()),
                Input::Pure(_) | Input::Object(_) => continue,
            };

            if let Some(ty) = pure_schema_for(parameter) {
                updates.push((slot, Input::Pure(serialize_pure_json(&ty, &value)?)));
            } else if matches!(input, Input::UnresolvedPure(_)) {
                let id = value.as_str().ok_or_else(|| {
                    BuilderError::invalid_argument(format!(
                        "expected an object id string for {}, got {value}",
                        call.target()
                    ))
                })?;
                updates.push((
                    slot,
                    Input::UnresolvedObject(UnresolvedObject::new(ObjectId::from_hex(id)?)),
                ));
            }
        }
        for (slot, input) in updates {
            data.inputs[slot] = input;
        }
    }
    Ok(())
}

fn normalize_raw_argument(
    data: &mut TransactionData,
    argument: Argument,
    ty: &PureType,
) -> BuilderResult<()> {
    let Argument::Input(index) = argument else {
        return Ok(());
    };
    if let Some(input) = data.inputs.get_mut(usize::from(index)) {
        if let Input::UnresolvedPure(value) = input {
            let bytes = serialize_pure_json(ty, value)?;
            *input = Input::Pure(bytes);
        }
    }
    Ok(())
}

/// Replaces object ids with full object arguments.
///
/// Objects without a caller-supplied version are fetched in batches, each id
/// once. Shared objects become shared arguments, mutable when any use needs
/// it; objects used as `Receiving<T>` become receiving references; the rest
/// become owned or immutable references.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResolveObjectReferences;

#[async_trait]
impl Plugin<TransactionData, ResolveContext> for ResolveObjectReferences {
    fn name(&self) -> &str {
        "resolve-object-references"
    }

    async fn run(
        &self,
        data: &mut TransactionData,
        context: &ResolveContext,
        next: Next<'_, TransactionData, ResolveContext>,
    ) -> BuilderResult<()> {
        resolve_object_references(data, context).await?;
        next.run(data, context).await
    }
}

#[derive(Debug, Clone, Copy)]
struct FetchedObject {
    reference: ObjectRef,
    initial_shared_version: Option<u64>,
}

async fn fetch_objects(
    ids: &[ObjectId],
    context: &ResolveContext,
) -> BuilderResult<HashMap<ObjectId, FetchedObject>> {
    let mut fetched = HashMap::new();
    if ids.is_empty() {
        return Ok(fetched);
    }

    let client = context.client()?;
    let chunk_size = context.config.max_objects_per_fetch.max(1);
    let responses = try_join_all(
        ids.chunks(chunk_size)
            .map(|chunk| context.ledger(client.multi_get_objects(chunk))),
    )
    .await?;

    let mut failures = Vec::new();
    for (chunk, responses) in ids.chunks(chunk_size).zip(responses) {
        for (position, object_id) in chunk.iter().enumerate() {
            let Some(response) = responses.get(position) else {
                failures.push(LookupFailure {
                    object_id: *object_id,
                    reason: "no response returned".to_string(),
                });
                continue;
            };
            match (&response.data, response.error_reason()) {
                (Some(object), None) => {
                    fetched.insert(
                        *object_id,
                        FetchedObject {
                            reference: object.object_ref()?,
                            initial_shared_version: object.initial_shared_version(),
                        },
                    );
                }
                (_, reason) => failures.push(LookupFailure {
                    object_id: *object_id,
                    reason: reason.unwrap_or_else(|| "no data returned".to_string()),
                }),
            }
        }
    }

    if !failures.is_empty() {
        return Err(BuilderError::LedgerLookup { failures });
    }
    debug!(objects = fetched.len(), "Fetched object references");
    Ok(fetched)
}

fn is_used_as_mutable(data: &TransactionData, index: u16) -> bool {
    let mut mutable = false;
    data.get_input_uses(index, |argument, command| match command {
        Command::MoveCall(call) => {
            if let Some(types) = &call.argument_types {
                mutable |= call
                    .arguments
                    .iter()
                    .zip(types)
                    .any(|(candidate, ty)| candidate == argument && ty.needs_mutable_object());
            }
        }
        Command::MakeMoveVec { .. } | Command::MergeCoins { .. } | Command::SplitCoins { .. } => {
            mutable = true;
        }
        _ => {}
    });
    mutable
}

fn is_used_as_receiving(data: &TransactionData, index: u16) -> bool {
    let mut receiving = false;
    data.get_input_uses(index, |argument, command| {
        if let Command::MoveCall(call) = command {
            if let Some(types) = &call.argument_types {
                receiving |= call
                    .arguments
                    .iter()
                    .zip(types)
                    .any(|(candidate, ty)| candidate == argument && ty.is_receiving());
            }
        }
    });
    receiving
}

async fn resolve_object_references(
    data: &mut TransactionData,
    context: &ResolveContext,
) -> BuilderResult<()> {
    let mut ids = Vec::new();
    for input in &data.inputs {
        if let Input::UnresolvedObject(object) = input {
            if object.version.is_none()
                && object.initial_shared_version.is_none()
                && !ids.contains(&object.object_id)
            {
                ids.push(object.object_id);
            }
        }
    }
    let fetched = fetch_objects(&ids, context).await?;

    for index in 0..data.inputs.len() {
        let Input::UnresolvedObject(object) = &data.inputs[index] else {
            continue;
        };
        let object = object.clone();
        let input_index = u16::try_from(index)
            .map_err(|_| BuilderError::invalid_argument(format!("too many inputs: {index}")))?;
        let found = fetched.get(&object.object_id);

        let initial_shared_version = object
            .initial_shared_version
            .or_else(|| found.and_then(|found| found.initial_shared_version));
        let arg = match initial_shared_version {
            Some(initial_shared_version) => ObjectArg::SharedObject {
                id: object.object_id,
                initial_shared_version,
                mutable: object.mutable.unwrap_or(false) || is_used_as_mutable(data, input_index),
            },
            None => {
                let reference = object_reference(&object, found)?;
                if is_used_as_receiving(data, input_index) {
                    ObjectArg::Receiving(reference)
                } else {
                    ObjectArg::ImmOrOwnedObject(reference)
                }
            }
        };
        data.inputs[index] = Input::Object(arg);
    }
    Ok(())
}

/// The caller's version and digest take precedence over fetched ones.
fn object_reference(
    object: &UnresolvedObject,
    found: Option<&FetchedObject>,
) -> BuilderResult<ObjectRef> {
    let version = object
        .version
        .or_else(|| found.map(|found| found.reference.version));
    let digest: Option<ObjectDigest> = object
        .digest
        .or_else(|| found.map(|found| found.reference.digest));
    match (version, digest) {
        (Some(version), Some(digest)) => Ok(ObjectRef {
            object_id: object.object_id,
            version,
            digest,
        }),
        _ => Err(BuilderError::invalid_argument(format!(
            "object {} needs both a version and a digest",
            object.object_id
        ))),
    }
}

/// Uses the reference gas price when no price is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct SetGasPrice;

#[async_trait]
impl Plugin<TransactionData, ResolveContext> for SetGasPrice {
    fn name(&self) -> &str {
        "set-gas-price"
    }

    async fn run(
        &self,
        data: &mut TransactionData,
        context: &ResolveContext,
        next: Next<'_, TransactionData, ResolveContext>,
    ) -> BuilderResult<()> {
        if context.gas_price(data).is_none() {
            let client = context.client()?;
            let price = context.ledger(client.get_reference_gas_price()).await?;
            debug!(price, "Using reference gas price");
            data.gas_data.price = Some(price);
        }
        next.run(data, context).await
    }
}

/// Estimates a budget by simulating the transaction when no budget is set.
///
/// The simulation runs with the maximum budget and an empty payment list.
#[derive(Debug, Default, Clone, Copy)]
pub struct SetGasBudget;

#[async_trait]
impl Plugin<TransactionData, ResolveContext> for SetGasBudget {
    fn name(&self) -> &str {
        "set-gas-budget"
    }

    async fn run(
        &self,
        data: &mut TransactionData,
        context: &ResolveContext,
        next: Next<'_, TransactionData, ResolveContext>,
    ) -> BuilderResult<()> {
        let overridden = context.overrides.gas_data.budget.is_some();
        if data.gas_data.budget.is_none() && !overridden {
            let budget = estimate_budget(data, context).await?;
            info!(budget, "Estimated gas budget");
            data.gas_data.budget = Some(budget);
        }
        next.run(data, context).await
    }
}

async fn estimate_budget(data: &TransactionData, context: &ResolveContext) -> BuilderResult<u64> {
    let client = context.client()?;
    let overrides = &context.overrides;
    let simulation = data.build(&BuildDataOptions {
        overrides: TransactionOverrides {
            gas_data: GasConfig {
                budget: Some(context.config.max_gas),
                payment: Some(Vec::new()),
                ..overrides.gas_data.clone()
            },
            ..overrides.clone()
        },
        ..Default::default()
    })?;

    let response = context
        .ledger(client.dry_run_transaction_block(&simulation))
        .await?;
    let status = &response.effects.status;
    if !status.is_success() {
        return Err(BuilderError::SimulationFailed {
            error: status
                .error
                .clone()
                .unwrap_or_else(|| status.status.clone()),
        });
    }

    let gas_used = &response.effects.gas_used;
    Ok(compute_gas_budget(
        gas_used.computation_cost()?,
        gas_used.storage_cost()?,
        gas_used.storage_rebate()?,
        context.gas_price(data).unwrap_or(1),
        context.config.gas_safe_overhead,
    ))
}

/// Pays with the gas owner's SUI coins when no payment is set.
///
/// Coins that are also passed as owned inputs are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct SetGasPayment;

#[async_trait]
impl Plugin<TransactionData, ResolveContext> for SetGasPayment {
    fn name(&self) -> &str {
        "set-gas-payment"
    }

    async fn run(
        &self,
        data: &mut TransactionData,
        context: &ResolveContext,
        next: Next<'_, TransactionData, ResolveContext>,
    ) -> BuilderResult<()> {
        let overridden = context.overrides.gas_data.payment.is_some();
        if data.gas_data.payment.is_none() && !overridden {
            let owner = context
                .gas_owner(data)
                .ok_or(BuilderError::MissingSender)?;
            let payment = select_gas_coins(data, owner, context).await?;
            debug!(owner = %owner, coins = payment.len(), "Selected gas payment");
            data.gas_data.payment = Some(payment);
        }
        next.run(data, context).await
    }
}

async fn select_gas_coins(
    data: &TransactionData,
    owner: SuiAddress,
    context: &ResolveContext,
) -> BuilderResult<Vec<ObjectRef>> {
    let client = context.client()?;
    let coins = context
        .ledger(client.get_coins(&owner, SUI_COIN_TYPE))
        .await?;

    let owned_inputs: HashSet<ObjectId> = data
        .inputs
        .iter()
        .filter_map(|input| match input {
            Input::Object(ObjectArg::ImmOrOwnedObject(reference)) => Some(reference.object_id),
            _ => None,
        })
        .collect();

    let payment = coins
        .iter()
        .filter(|coin| !owned_inputs.contains(&coin.coin_object_id))
        .take(context.config.max_gas_objects)
        .map(Coin::object_ref)
        .collect::<BuilderResult<Vec<_>>>()?;
    if payment.is_empty() {
        return Err(BuilderError::NoGasCoins { owner });
    }
    Ok(payment)
}

/// Fails when an intent or an unresolved input survived the earlier stages.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValidateInputs;

#[async_trait]
impl Plugin<TransactionData, ResolveContext> for ValidateInputs {
    fn name(&self) -> &str {
        "validate-inputs"
    }

    async fn run(
        &self,
        data: &mut TransactionData,
        context: &ResolveContext,
        next: Next<'_, TransactionData, ResolveContext>,
    ) -> BuilderResult<()> {
        if let Some(name) = data.intent_names().into_iter().next() {
            return Err(BuilderError::IntentUnresolved(name));
        }
        for (index, input) in data.inputs.iter().enumerate() {
            if !input.is_resolved() {
                return Err(BuilderError::Internal(format!(
                    "Input at index {index} has not been resolved: {input:?}"
                )));
            }
        }
        next.run(data, context).await
    }
}
