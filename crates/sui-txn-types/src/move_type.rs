//! Move parameter signatures as returned by the ledger.
//!
//! These describe how a function consumes each argument: the reference kind
//! and an open type body that may still mention the function's type
//! parameters.

use crate::address::SuiAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference kind of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRef {
    #[serde(rename = "&")]
    Immutable,
    #[serde(rename = "&mut")]
    Mutable,
}

/// A parameter signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpenMoveTypeSignature {
    /// `None` for by-value parameters.
    #[serde(rename = "ref")]
    pub reference: Option<MoveRef>,
    pub body: OpenMoveTypeSignatureBody,
}

/// The type part of a signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpenMoveTypeSignatureBody {
    Address,
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Vector(Box<OpenMoveTypeSignatureBody>),
    Datatype {
        package: SuiAddress,
        module: String,
        #[serde(rename = "type")]
        type_name: String,
        #[serde(rename = "typeParameters")]
        type_parameters: Vec<OpenMoveTypeSignatureBody>,
    },
    TypeParameter(u16),
}

impl OpenMoveTypeSignature {
    pub fn new(reference: Option<MoveRef>, body: OpenMoveTypeSignatureBody) -> Self {
        Self { reference, body }
    }

    /// Returns true for `&TxContext` and `&mut TxContext`.
    pub fn is_tx_context(&self) -> bool {
        self.body
            .is_datatype(SuiAddress::FRAMEWORK, "tx_context", "TxContext")
    }

    /// Returns true for `0x2::transfer::Receiving<T>`.
    pub fn is_receiving(&self) -> bool {
        self.body
            .is_datatype(SuiAddress::FRAMEWORK, "transfer", "Receiving")
    }

    /// Returns true when the parameter is taken by value or by `&mut`.
    pub fn needs_mutable_object(&self) -> bool {
        self.reference != Some(MoveRef::Immutable)
    }
}

impl OpenMoveTypeSignatureBody {
    pub fn datatype(
        package: SuiAddress,
        module: impl Into<String>,
        type_name: impl Into<String>,
        type_parameters: Vec<OpenMoveTypeSignatureBody>,
    ) -> Self {
        Self::Datatype {
            package,
            module: module.into(),
            type_name: type_name.into(),
            type_parameters,
        }
    }

    /// Returns true if this is the named datatype, with any type parameters.
    pub fn is_datatype(&self, address: SuiAddress, module_name: &str, name: &str) -> bool {
        matches!(
            self,
            Self::Datatype { package, module, type_name, .. }
                if *package == address && module == module_name && type_name == name
        )
    }
}

impl fmt::Display for OpenMoveTypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reference {
            Some(MoveRef::Immutable) => write!(f, "&{}", self.body),
            Some(MoveRef::Mutable) => write!(f, "&mut {}", self.body),
            None => write!(f, "{}", self.body),
        }
    }
}

impl fmt::Display for OpenMoveTypeSignatureBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => write!(f, "address"),
            Self::Bool => write!(f, "bool"),
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::U128 => write!(f, "u128"),
            Self::U256 => write!(f, "u256"),
            Self::Vector(inner) => write!(f, "vector<{inner}>"),
            Self::Datatype {
                package,
                module,
                type_name,
                type_parameters,
            } => {
                write!(f, "{}::{module}::{type_name}", package.to_short_string())?;
                if !type_parameters.is_empty() {
                    let params: Vec<String> =
                        type_parameters.iter().map(ToString::to_string).collect();
                    write!(f, "<{}>", params.join(", "))?;
                }
                Ok(())
            }
            Self::TypeParameter(index) => write!(f, "T{index}"),
        }
    }
}
