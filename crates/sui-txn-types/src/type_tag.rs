//! Move type tags.
//!
//! [`TypeTag`] is recursive: `vector<T>` and struct type parameters contain
//! further tags. The wire schema breaks the cycle with [`bcs::lazy`].

use crate::address::{address, SuiAddress};
use crate::bcs::{self, BcsType, BcsValue, FromBcsValue, IntoBcsValue};
use crate::error::{BcsError, BcsResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a type string accepted by the parser.
const MAX_TYPE_TAG_LENGTH: usize = 1024;

/// Maximum nesting depth accepted by the parser.
const MAX_TYPE_NESTING_DEPTH: usize = 16;

/// A Move type.
///
/// Variant order matches the wire encoding.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

/// A fully qualified struct type with its type parameters.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StructTag {
    pub address: SuiAddress,
    pub module: String,
    pub name: String,
    pub type_params: Vec<TypeTag>,
}

impl StructTag {
    pub fn new(
        address: SuiAddress,
        module: impl Into<String>,
        name: impl Into<String>,
        type_params: Vec<TypeTag>,
    ) -> Self {
        Self {
            address,
            module: module.into(),
            name: name.into(),
            type_params,
        }
    }

    /// `0x2::sui::SUI`
    pub fn sui() -> Self {
        Self::new(SuiAddress::FRAMEWORK, "sui", "SUI", vec![])
    }

    /// `0x2::coin::Coin<0x2::sui::SUI>`
    pub fn gas_coin() -> Self {
        Self::new(
            SuiAddress::FRAMEWORK,
            "coin",
            "Coin",
            vec![TypeTag::Struct(Box::new(Self::sui()))],
        )
    }

    /// Returns true if this names `address::module::name`, ignoring type parameters.
    pub fn is(&self, address: SuiAddress, module: &str, name: &str) -> bool {
        self.address == address && self.module == module && self.name == name
    }
}

impl TypeTag {
    pub fn vector(element: TypeTag) -> Self {
        Self::Vector(Box::new(element))
    }

    pub fn struct_tag(tag: StructTag) -> Self {
        Self::Struct(Box::new(tag))
    }

    /// Parses a type string such as `vector<u8>` or
    /// `0x2::coin::Coin<0x2::sui::SUI>`.
    pub fn parse(s: &str) -> BcsResult<Self> {
        let s = s.trim();
        if s.len() > MAX_TYPE_TAG_LENGTH {
            return Err(BcsError::InvalidTypeTag(format!(
                "type tag too long: {} bytes (max {MAX_TYPE_TAG_LENGTH})",
                s.len()
            )));
        }
        parse_type_tag(s, 0)
    }
}

fn parse_type_tag(s: &str, depth: usize) -> BcsResult<TypeTag> {
    if depth > MAX_TYPE_NESTING_DEPTH {
        return Err(BcsError::InvalidTypeTag(format!(
            "type tag nesting too deep: {depth} levels (max {MAX_TYPE_NESTING_DEPTH})"
        )));
    }

    match s {
        "bool" => return Ok(TypeTag::Bool),
        "u8" => return Ok(TypeTag::U8),
        "u16" => return Ok(TypeTag::U16),
        "u32" => return Ok(TypeTag::U32),
        "u64" => return Ok(TypeTag::U64),
        "u128" => return Ok(TypeTag::U128),
        "u256" => return Ok(TypeTag::U256),
        "address" => return Ok(TypeTag::Address),
        "signer" => return Ok(TypeTag::Signer),
        _ => {}
    }

    if let Some(inner) = s.strip_prefix("vector<").and_then(|r| r.strip_suffix('>')) {
        return Ok(TypeTag::vector(parse_type_tag(inner.trim(), depth + 1)?));
    }

    parse_struct_tag(s, depth).map(TypeTag::struct_tag)
}

fn parse_struct_tag(s: &str, depth: usize) -> BcsResult<StructTag> {
    let (base, params) = match s.find('<') {
        Some(idx) => {
            let Some(inner) = s[idx + 1..].strip_suffix('>') else {
                return Err(BcsError::InvalidTypeTag(format!("malformed generic type: {s}")));
            };
            (&s[..idx], Some(inner))
        }
        None => (s, None),
    };

    let parts: Vec<&str> = base.trim().split("::").collect();
    let [addr, module, name] = parts.as_slice() else {
        return Err(BcsError::InvalidTypeTag(format!(
            "expected address::module::name, got {s}"
        )));
    };
    for ident in [module, name] {
        if !is_valid_identifier(ident) {
            return Err(BcsError::InvalidTypeTag(format!("invalid identifier `{ident}` in {s}")));
        }
    }
    let address = SuiAddress::from_hex(addr)
        .map_err(|e| BcsError::InvalidTypeTag(format!("{s}: {e}")))?;

    let type_params = match params {
        Some(params) => split_type_params(params)?
            .into_iter()
            .map(|p| parse_type_tag(p, depth + 1))
            .collect::<BcsResult<Vec<_>>>()?,
        None => vec![],
    };

    Ok(StructTag::new(address, *module, *name, type_params))
}

/// Splits a comma-separated generic parameter list, ignoring commas nested
/// inside angle brackets.
pub fn split_type_params(s: &str) -> BcsResult<Vec<&str>> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth < 0 {
                    return Err(BcsError::InvalidTypeTag(format!("unbalanced `>` in {s}")));
                }
            }
            ',' if depth == 0 => {
                out.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(BcsError::InvalidTypeTag(format!("unbalanced `<` in {s}")));
    }
    let last = s[start..].trim();
    if !last.is_empty() || !out.is_empty() {
        out.push(last);
    }
    if out.iter().any(|p| p.is_empty()) {
        return Err(BcsError::InvalidTypeTag(format!("empty type parameter in {s}")));
    }
    Ok(out)
}

fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.name)?;
        if !self.type_params.is_empty() {
            write!(f, "<")?;
            for (i, param) in self.type_params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{param}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::U8 => write!(f, "u8"),
            TypeTag::U16 => write!(f, "u16"),
            TypeTag::U32 => write!(f, "u32"),
            TypeTag::U64 => write!(f, "u64"),
            TypeTag::U128 => write!(f, "u128"),
            TypeTag::U256 => write!(f, "u256"),
            TypeTag::Address => write!(f, "address"),
            TypeTag::Signer => write!(f, "signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{inner}>"),
            TypeTag::Struct(tag) => write!(f, "{tag}"),
        }
    }
}

impl FromStr for TypeTag {
    type Err = BcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromStr for StructTag {
    type Err = BcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match TypeTag::parse(s)? {
            TypeTag::Struct(tag) => Ok(*tag),
            other => Err(BcsError::InvalidTypeTag(format!("{other} is not a struct type"))),
        }
    }
}

/// Normalizes a struct type string, expanding addresses to full length.
pub fn normalize_struct_tag(s: &str) -> BcsResult<String> {
    s.parse::<StructTag>().map(|tag| tag.to_string())
}

const VARIANTS: [&str; 11] = [
    "bool", "u8", "u64", "u128", "address", "signer", "vector", "struct", "u16", "u32", "u256",
];

static TYPE_TAG_WIRE: Lazy<BcsType<BcsValue>> = Lazy::new(|| {
    let struct_tag = bcs::struct_(
        "StructTag",
        [
            ("address", address().dynamic()),
            ("module", bcs::string().dynamic()),
            ("name", bcs::string().dynamic()),
            (
                "typeParams",
                bcs::vector(bcs::lazy("TypeTag", || TYPE_TAG_WIRE.clone())).dynamic(),
            ),
        ],
    );
    bcs::enum_(
        "TypeTag",
        VARIANTS.map(|variant| {
            let payload = match variant {
                "vector" => Some(bcs::lazy("TypeTag", || TYPE_TAG_WIRE.clone())),
                "struct" => Some(struct_tag.clone()),
                _ => None,
            };
            (variant, payload)
        }),
    )
});

static TYPE_TAG: Lazy<BcsType<TypeTag>> = Lazy::new(|| {
    TYPE_TAG_WIRE.transform(
        "TypeTag",
        |tag: &TypeTag| Ok(to_wire_value(tag)),
        |value: BcsValue| from_wire_value(&value),
    )
});

/// Schema for a [`TypeTag`].
pub fn type_tag() -> BcsType<TypeTag> {
    TYPE_TAG.clone()
}

fn to_wire_value(tag: &TypeTag) -> BcsValue {
    match tag {
        TypeTag::Bool => BcsValue::unit_variant("bool"),
        TypeTag::U8 => BcsValue::unit_variant("u8"),
        TypeTag::U16 => BcsValue::unit_variant("u16"),
        TypeTag::U32 => BcsValue::unit_variant("u32"),
        TypeTag::U64 => BcsValue::unit_variant("u64"),
        TypeTag::U128 => BcsValue::unit_variant("u128"),
        TypeTag::U256 => BcsValue::unit_variant("u256"),
        TypeTag::Address => BcsValue::unit_variant("address"),
        TypeTag::Signer => BcsValue::unit_variant("signer"),
        TypeTag::Vector(inner) => BcsValue::variant("vector", to_wire_value(inner)),
        TypeTag::Struct(tag) => BcsValue::variant(
            "struct",
            BcsValue::structure([
                ("address", tag.address.into_bcs_value()),
                ("module", BcsValue::String(tag.module.clone())),
                ("name", BcsValue::String(tag.name.clone())),
                (
                    "typeParams",
                    BcsValue::Vector(tag.type_params.iter().map(to_wire_value).collect()),
                ),
            ]),
        ),
    }
}

fn from_wire_value(value: &BcsValue) -> BcsResult<TypeTag> {
    let (variant, payload) = value.as_variant()?;
    Ok(match (variant, payload) {
        ("bool", None) => TypeTag::Bool,
        ("u8", None) => TypeTag::U8,
        ("u16", None) => TypeTag::U16,
        ("u32", None) => TypeTag::U32,
        ("u64", None) => TypeTag::U64,
        ("u128", None) => TypeTag::U128,
        ("u256", None) => TypeTag::U256,
        ("address", None) => TypeTag::Address,
        ("signer", None) => TypeTag::Signer,
        ("vector", Some(inner)) => TypeTag::vector(from_wire_value(inner)?),
        ("struct", Some(fields)) => TypeTag::struct_tag(StructTag {
            address: SuiAddress::from_bcs_value(fields.field("address")?)?,
            module: String::from_bcs_value(fields.field("module")?)?,
            name: String::from_bcs_value(fields.field("name")?)?,
            type_params: fields
                .field("typeParams")?
                .as_vector()?
                .iter()
                .map(from_wire_value)
                .collect::<BcsResult<_>>()?,
        }),
        (other, _) => {
            return Err(BcsError::validation(
                "TypeTag",
                format!("unexpected variant `{other}`"),
            ))
        }
    })
}

impl IntoBcsValue for TypeTag {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::String(self.to_string())
    }
}

impl FromBcsValue for TypeTag {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        match value {
            BcsValue::String(s) => Self::parse(s),
            other => from_wire_value(other),
        }
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
