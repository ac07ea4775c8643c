//! The mutable transaction IR.
//!
//! [`TransactionData`] holds a programmable transaction while it is being
//! assembled. Unlike the wire types it may contain inputs the ledger still
//! has to fill in, intent commands that a resolver will expand, and cached
//! parameter signatures for move calls. [`TransactionData::build`] lowers it
//! to the wire types once every one of those has been resolved.

use crate::error::{BuilderError, BuilderResult};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use sui_txn_types::bcs::BcsWriterOptions;
use sui_txn_types::transaction::{self as wire, ProgrammableMoveCall};
use sui_txn_types::{
    Argument, CallArg, GasData, ObjectArg, ObjectDigest, ObjectId, ObjectRef,
    OpenMoveTypeSignature, ProgrammableTransaction, SuiAddress, TransactionDigest,
    TransactionExpiration, TransactionKind, TypeTag,
};

/// How an input argument is consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    Pure,
    Object,
}

/// An object input whose reference has not been fetched yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnresolvedObject {
    pub object_id: ObjectId,
    pub version: Option<u64>,
    pub digest: Option<ObjectDigest>,
    pub initial_shared_version: Option<u64>,
    /// Forces a shared object to be requested mutably.
    pub mutable: Option<bool>,
}

impl UnresolvedObject {
    pub fn new(object_id: ObjectId) -> Self {
        Self {
            object_id,
            ..Default::default()
        }
    }
}

/// A transaction input.
#[derive(Clone, Debug, PartialEq)]
pub enum Input {
    /// Serialized pure bytes.
    Pure(Vec<u8>),
    /// A fully specified object.
    Object(ObjectArg),
    /// A raw application value whose Move type is not known yet.
    UnresolvedPure(Value),
    UnresolvedObject(UnresolvedObject),
}

impl Input {
    /// The kind of argument this input resolves to, when already decided.
    ///
    /// An `UnresolvedPure` value may still turn out to be an object id, so it
    /// has no kind until the normalize stage has seen its use site.
    pub fn kind(&self) -> Option<ArgumentKind> {
        match self {
            Self::Pure(_) => Some(ArgumentKind::Pure),
            Self::Object(_) | Self::UnresolvedObject(_) => Some(ArgumentKind::Object),
            Self::UnresolvedPure(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Pure(_) | Self::Object(_))
    }

    /// The object id behind an object input, resolved or not.
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Self::Object(arg) => Some(arg.id()),
            Self::UnresolvedObject(object) => Some(object.object_id),
            Self::Pure(_) | Self::UnresolvedPure(_) => None,
        }
    }

    fn to_call_arg(&self, index: u16) -> BuilderResult<CallArg> {
        match self {
            Self::Pure(bytes) => Ok(CallArg::Pure(bytes.clone())),
            Self::Object(arg) => Ok(CallArg::Object(*arg)),
            Self::UnresolvedPure(_) | Self::UnresolvedObject(_) => {
                Err(BuilderError::UnresolvedInput { index })
            }
        }
    }
}

impl From<CallArg> for Input {
    fn from(arg: CallArg) -> Self {
        match arg {
            CallArg::Pure(bytes) => Self::Pure(bytes),
            CallArg::Object(object) => Self::Object(object),
        }
    }
}

/// A move call, with the parameter signatures once they are known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<Argument>,
    /// Parameter signatures without the trailing `TxContext`. Never serialized to the wire.
    pub argument_types: Option<Vec<OpenMoveTypeSignature>>,
}

impl MoveCall {
    /// `package::module::function` with the package in long form.
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package.to_hex(), self.module, self.function)
    }
}

/// The arguments bound to one intent input name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntentArgs {
    One(Argument),
    Many(Vec<Argument>),
}

/// A high-level command that a registered resolver expands into real commands.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionIntent {
    pub name: String,
    pub inputs: BTreeMap<String, IntentArgs>,
    pub data: Map<String, Value>,
}

/// A command in the IR.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    MoveCall(Box<MoveCall>),
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
    Intent(TransactionIntent),
}

impl Command {
    /// Every argument of the command, in field order.
    pub fn arguments(&self) -> Vec<&Argument> {
        match self {
            Self::MoveCall(call) => call.arguments.iter().collect(),
            Self::TransferObjects { objects, address } => {
                objects.iter().chain(std::iter::once(address)).collect()
            }
            Self::SplitCoins { coin, amounts } => std::iter::once(coin).chain(amounts).collect(),
            Self::MergeCoins {
                destination,
                sources,
            } => std::iter::once(destination).chain(sources).collect(),
            Self::Publish { .. } => Vec::new(),
            Self::MakeMoveVec { elements, .. } => elements.iter().collect(),
            Self::Upgrade { ticket, .. } => vec![ticket],
            Self::Intent(intent) => intent
                .inputs
                .values()
                .flat_map(|args| match args {
                    IntentArgs::One(arg) => std::slice::from_ref(arg),
                    IntentArgs::Many(args) => args.as_slice(),
                })
                .collect(),
        }
    }

    pub fn arguments_mut(&mut self) -> Vec<&mut Argument> {
        match self {
            Self::MoveCall(call) => call.arguments.iter_mut().collect(),
            Self::TransferObjects { objects, address } => objects
                .iter_mut()
                .chain(std::iter::once(address))
                .collect(),
            Self::SplitCoins { coin, amounts } => {
                std::iter::once(coin).chain(amounts.iter_mut()).collect()
            }
            Self::MergeCoins {
                destination,
                sources,
            } => std::iter::once(destination)
                .chain(sources.iter_mut())
                .collect(),
            Self::Publish { .. } => Vec::new(),
            Self::MakeMoveVec { elements, .. } => elements.iter_mut().collect(),
            Self::Upgrade { ticket, .. } => vec![ticket],
            Self::Intent(intent) => intent
                .inputs
                .values_mut()
                .flat_map(|args| match args {
                    IntentArgs::One(arg) => std::slice::from_mut(arg),
                    IntentArgs::Many(args) => args.as_mut_slice(),
                })
                .collect(),
        }
    }

    /// Name of the command kind, for logs and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::MoveCall(_) => "MoveCall",
            Self::TransferObjects { .. } => "TransferObjects",
            Self::SplitCoins { .. } => "SplitCoins",
            Self::MergeCoins { .. } => "MergeCoins",
            Self::Publish { .. } => "Publish",
            Self::MakeMoveVec { .. } => "MakeMoveVec",
            Self::Upgrade { .. } => "Upgrade",
            Self::Intent(_) => "Intent",
        }
    }

    fn to_wire(&self) -> BuilderResult<wire::Command> {
        Ok(match self {
            Self::MoveCall(call) => wire::Command::MoveCall(Box::new(ProgrammableMoveCall {
                package: call.package,
                module: call.module.clone(),
                function: call.function.clone(),
                type_arguments: call.type_arguments.clone(),
                arguments: call.arguments.clone(),
            })),
            Self::TransferObjects { objects, address } => wire::Command::TransferObjects {
                objects: objects.clone(),
                address: *address,
            },
            Self::SplitCoins { coin, amounts } => wire::Command::SplitCoins {
                coin: *coin,
                amounts: amounts.clone(),
            },
            Self::MergeCoins {
                destination,
                sources,
            } => wire::Command::MergeCoins {
                destination: *destination,
                sources: sources.clone(),
            },
            Self::Publish {
                modules,
                dependencies,
            } => wire::Command::Publish {
                modules: modules.clone(),
                dependencies: dependencies.clone(),
            },
            Self::MakeMoveVec {
                element_type,
                elements,
            } => wire::Command::MakeMoveVec {
                element_type: element_type.clone(),
                elements: elements.clone(),
            },
            Self::Upgrade {
                modules,
                dependencies,
                package,
                ticket,
            } => wire::Command::Upgrade {
                modules: modules.clone(),
                dependencies: dependencies.clone(),
                package: *package,
                ticket: *ticket,
            },
            Self::Intent(intent) => return Err(BuilderError::IntentUnresolved(intent.name.clone())),
        })
    }
}

impl From<wire::Command> for Command {
    fn from(command: wire::Command) -> Self {
        match command {
            wire::Command::MoveCall(call) => {
                let ProgrammableMoveCall {
                    package,
                    module,
                    function,
                    type_arguments,
                    arguments,
                } = *call;
                Self::MoveCall(Box::new(MoveCall {
                    package,
                    module,
                    function,
                    type_arguments,
                    arguments,
                    argument_types: None,
                }))
            }
            wire::Command::TransferObjects { objects, address } => {
                Self::TransferObjects { objects, address }
            }
            wire::Command::SplitCoins { coin, amounts } => Self::SplitCoins { coin, amounts },
            wire::Command::MergeCoins {
                destination,
                sources,
            } => Self::MergeCoins {
                destination,
                sources,
            },
            wire::Command::Publish {
                modules,
                dependencies,
            } => Self::Publish {
                modules,
                dependencies,
            },
            wire::Command::MakeMoveVec {
                element_type,
                elements,
            } => Self::MakeMoveVec {
                element_type,
                elements,
            },
            wire::Command::Upgrade {
                modules,
                dependencies,
                package,
                ticket,
            } => Self::Upgrade {
                modules,
                dependencies,
                package,
                ticket,
            },
        }
    }
}

/// Gas settings, each filled in by the pipeline when unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GasConfig {
    pub payment: Option<Vec<ObjectRef>>,
    /// Defaults to the sender.
    pub owner: Option<SuiAddress>,
    pub price: Option<u64>,
    pub budget: Option<u64>,
}

/// Values that take precedence over the IR for a single build.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionOverrides {
    pub sender: Option<SuiAddress>,
    pub expiration: Option<TransactionExpiration>,
    pub gas_data: GasConfig,
}

/// Options for lowering the IR to bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildDataOptions {
    /// Serialize only the transaction kind, without sender or gas.
    pub only_kind: bool,
    /// Fail with a size-limit error beyond this many bytes.
    pub max_size: Option<usize>,
    pub overrides: TransactionOverrides,
}

/// A transaction under construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionData {
    pub sender: Option<SuiAddress>,
    pub expiration: Option<TransactionExpiration>,
    pub gas_data: GasConfig,
    pub inputs: Vec<Input>,
    pub commands: Vec<Command>,
}

fn index_u16(index: usize, what: &str) -> BuilderResult<u16> {
    u16::try_from(index)
        .map_err(|_| BuilderError::invalid_argument(format!("too many {what}: {index}")))
}

impl TransactionData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an input and returns the argument that refers to it.
    pub fn add_input(&mut self, input: Input) -> BuilderResult<Argument> {
        let index = index_u16(self.inputs.len(), "inputs")?;
        self.inputs.push(input);
        Ok(Argument::Input(index))
    }

    /// Appends a command and returns its index.
    ///
    /// Every argument must refer to an existing input or an earlier command.
    pub fn add_command(&mut self, command: Command) -> BuilderResult<u16> {
        let index = index_u16(self.commands.len(), "commands")?;
        for argument in command.arguments() {
            self.check_argument(argument, index)?;
        }
        self.commands.push(command);
        Ok(index)
    }

    fn check_argument(&self, argument: &Argument, command_index: u16) -> BuilderResult<()> {
        match *argument {
            Argument::GasCoin => Ok(()),
            Argument::Input(input) if usize::from(input) < self.inputs.len() => Ok(()),
            Argument::Input(input) => Err(BuilderError::invalid_argument(format!(
                "command {command_index} references input {input}, but only {} exist",
                self.inputs.len()
            ))),
            Argument::Result(result) | Argument::NestedResult(result, _)
                if result < command_index =>
            {
                Ok(())
            }
            Argument::Result(result) | Argument::NestedResult(result, _) => {
                Err(BuilderError::invalid_argument(format!(
                    "command {command_index} references the result of command {result}, \
                     which does not precede it"
                )))
            }
        }
    }

    /// Checks that every argument refers to an input or an earlier command.
    pub fn validate_arguments(&self) -> BuilderResult<()> {
        for (index, command) in self.commands.iter().enumerate() {
            let index = index_u16(index, "commands")?;
            for argument in command.arguments() {
                self.check_argument(argument, index)?;
            }
        }
        Ok(())
    }

    /// Replaces the command at `index` with `replacement`.
    ///
    /// Results of later commands that pointed past `index` are shifted by
    /// `replacement.len() - 1`. References to the replaced command itself
    /// keep pointing at `index`.
    pub fn replace_command(&mut self, index: usize, replacement: Vec<Command>) -> BuilderResult<()> {
        self.replace_command_with_result(index, replacement, index)
    }

    /// Like [`replace_command`](Self::replace_command), but references to
    /// the replaced command are redirected to `result_index`, given in
    /// post-replacement numbering.
    pub fn replace_command_with_result(
        &mut self,
        index: usize,
        replacement: Vec<Command>,
        result_index: usize,
    ) -> BuilderResult<()> {
        if index >= self.commands.len() {
            return Err(BuilderError::invalid_argument(format!(
                "cannot replace command {index}, only {} exist",
                self.commands.len()
            )));
        }
        let inserted = replacement.len();
        let new_len = self.commands.len() - 1 + inserted;
        if new_len > usize::from(u16::MAX) || result_index > usize::from(u16::MAX) {
            return Err(BuilderError::invalid_argument(format!(
                "too many commands: {new_len}"
            )));
        }

        self.commands.splice(index..=index, replacement);

        // Bounded by the length check above, so the casts cannot truncate.
        let shift = |result: u16| -> u16 {
            let result = usize::from(result);
            if result == index {
                result_index as u16
            } else if result > index {
                (result + inserted - 1) as u16
            } else {
                result as u16
            }
        };
        for command in &mut self.commands[index + inserted..] {
            for argument in command.arguments_mut() {
                match argument {
                    Argument::Result(result) | Argument::NestedResult(result, _) => {
                        *result = shift(*result);
                    }
                    Argument::GasCoin | Argument::Input(_) => {}
                }
            }
        }
        Ok(())
    }

    /// Applies `f` to every argument, with the index of its command.
    pub fn map_arguments(&mut self, mut f: impl FnMut(&mut Argument, usize)) {
        for (index, command) in self.commands.iter_mut().enumerate() {
            for argument in command.arguments_mut() {
                f(argument, index);
            }
        }
    }

    /// Calls `visitor` for every use of input `index`, with its command.
    pub fn get_input_uses(&self, index: u16, mut visitor: impl FnMut(&Argument, &Command)) {
        let target = Argument::Input(index);
        for command in &self.commands {
            for argument in command.arguments() {
                if *argument == target {
                    visitor(argument, command);
                }
            }
        }
    }

    /// Index of the first input that is not yet Pure or Object.
    pub fn first_unresolved_input(&self) -> Option<u16> {
        self.inputs
            .iter()
            .position(|input| !input.is_resolved())
            .map(|index| u16::try_from(index).unwrap_or(u16::MAX))
    }

    /// Index of the first intent command with the given name.
    pub fn find_intent(&self, name: &str) -> Option<usize> {
        self.commands
            .iter()
            .position(|command| matches!(command, Command::Intent(intent) if intent.name == name))
    }

    /// Names of every intent still present, without duplicates.
    pub fn intent_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for command in &self.commands {
            if let Command::Intent(intent) = command {
                if !names.contains(&intent.name) {
                    names.push(intent.name.clone());
                }
            }
        }
        names
    }

    /// Lowers inputs and commands to a programmable transaction kind.
    pub fn to_kind(&self) -> BuilderResult<TransactionKind> {
        let inputs = self
            .inputs
            .iter()
            .enumerate()
            .map(|(index, input)| input.to_call_arg(index_u16(index, "inputs")?))
            .collect::<BuilderResult<Vec<_>>>()?;
        let commands = self
            .commands
            .iter()
            .map(Command::to_wire)
            .collect::<BuilderResult<Vec<_>>>()?;
        self.validate_arguments()?;

        Ok(TransactionKind::ProgrammableTransaction(
            ProgrammableTransaction { inputs, commands },
        ))
    }

    /// Lowers the IR to wire transaction data, applying `overrides`.
    pub fn to_wire(&self, overrides: &TransactionOverrides) -> BuilderResult<wire::TransactionData> {
        let kind = self.to_kind()?;
        self.assemble(kind, overrides)
    }

    fn assemble(
        &self,
        kind: TransactionKind,
        overrides: &TransactionOverrides,
    ) -> BuilderResult<wire::TransactionData> {
        let sender = overrides
            .sender
            .or(self.sender)
            .ok_or(BuilderError::MissingSender)?;
        let gas = &overrides.gas_data;
        let payment = gas
            .payment
            .clone()
            .or_else(|| self.gas_data.payment.clone())
            .ok_or(BuilderError::MissingGasData { field: "payment" })?;
        let price = gas
            .price
            .or(self.gas_data.price)
            .ok_or(BuilderError::MissingGasData { field: "price" })?;
        let budget = gas
            .budget
            .or(self.gas_data.budget)
            .ok_or(BuilderError::MissingGasData { field: "budget" })?;
        let owner = gas.owner.or(self.gas_data.owner).unwrap_or(sender);
        let expiration = overrides
            .expiration
            .or(self.expiration)
            .unwrap_or_default();

        Ok(wire::TransactionData::v1(
            kind,
            sender,
            GasData {
                payment,
                owner,
                price,
                budget,
            },
            expiration,
        ))
    }

    /// Serializes the IR.
    ///
    /// Fails with [`BuilderError::UnresolvedInput`] naming the first input
    /// that is not yet Pure or Object.
    pub fn build(&self, options: &BuildDataOptions) -> BuilderResult<Vec<u8>> {
        let kind = self.to_kind()?;
        let writer = match options.max_size {
            Some(max) => BcsWriterOptions::default().max_size(max),
            None => BcsWriterOptions::default(),
        };
        let bytes = if options.only_kind {
            TransactionKind::schema().serialize_with(&kind, writer)?
        } else {
            let data = self.assemble(kind, &options.overrides)?;
            wire::TransactionData::schema().serialize_with(&data, writer)?
        };
        Ok(bytes.into_bytes())
    }

    /// Digest of the fully built transaction.
    pub fn digest(&self) -> BuilderResult<TransactionDigest> {
        let bytes = self.build(&BuildDataOptions::default())?;
        Ok(TransactionDigest::of_transaction_data(&bytes))
    }

    /// Loads wire transaction data. Only programmable transactions are accepted.
    pub fn from_wire(data: wire::TransactionData) -> BuilderResult<Self> {
        let wire::TransactionData::V1(v1) = data;
        let mut ir = Self::from_kind(v1.kind)?;
        ir.sender = Some(v1.sender);
        ir.expiration = Some(v1.expiration);
        ir.gas_data = GasConfig {
            payment: Some(v1.gas_data.payment),
            owner: Some(v1.gas_data.owner),
            price: Some(v1.gas_data.price),
            budget: Some(v1.gas_data.budget),
        };
        Ok(ir)
    }

    fn from_kind(kind: TransactionKind) -> BuilderResult<Self> {
        match kind {
            TransactionKind::ProgrammableTransaction(programmable) => Ok(Self {
                inputs: programmable.inputs.into_iter().map(Input::from).collect(),
                commands: programmable
                    .commands
                    .into_iter()
                    .map(Command::from)
                    .collect(),
                ..Default::default()
            }),
            other => Err(BuilderError::invalid_argument(format!(
                "only programmable transactions can be loaded, got {other:?}"
            ))),
        }
    }

    /// Decodes serialized transaction data.
    pub fn from_bytes(bytes: &[u8]) -> BuilderResult<Self> {
        Self::from_wire(wire::TransactionData::from_bytes(bytes)?)
    }

    /// Decodes a serialized transaction kind, leaving sender and gas unset.
    pub fn from_kind_bytes(bytes: &[u8]) -> BuilderResult<Self> {
        Self::from_kind(TransactionKind::from_bytes(bytes)?)
    }
}
