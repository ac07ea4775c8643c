//! Dynamic values for struct and enum schemas.
//!
//! Struct and enum schemas are assembled at runtime from field and variant
//! lists, so the values they carry are dynamic too. Typed schemas convert to
//! and from [`BcsValue`] through [`IntoBcsValue`] and [`FromBcsValue`], which
//! is what [`BcsType::dynamic`](super::BcsType::dynamic) relies on.

use crate::error::{BcsError, BcsResult};
use num_bigint::BigUint;
use std::collections::BTreeMap;
use std::fmt;

/// A decoded BCS value whose shape is described by a runtime schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BcsValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    U256(BigUint),
    String(String),
    Vector(Vec<BcsValue>),
    Tuple(Vec<BcsValue>),
    Option(Option<Box<BcsValue>>),
    /// Named fields in declaration order.
    Struct(Vec<(String, BcsValue)>),
    /// A variant name and its payload, if the variant carries one.
    Enum {
        variant: String,
        value: Option<Box<BcsValue>>,
    },
}

impl BcsValue {
    /// Builds a struct value from `(name, value)` pairs.
    pub fn structure<N: Into<String>>(fields: impl IntoIterator<Item = (N, BcsValue)>) -> Self {
        Self::Struct(fields.into_iter().map(|(n, v)| (n.into(), v)).collect())
    }

    /// Builds an enum value carrying a payload.
    pub fn variant(name: impl Into<String>, value: BcsValue) -> Self {
        Self::Enum {
            variant: name.into(),
            value: Some(Box::new(value)),
        }
    }

    /// Builds a payload-free enum value.
    pub fn unit_variant(name: impl Into<String>) -> Self {
        Self::Enum {
            variant: name.into(),
            value: None,
        }
    }

    /// Short name of the value's kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::U128(_) => "u128",
            Self::U256(_) => "u256",
            Self::String(_) => "string",
            Self::Vector(_) => "vector",
            Self::Tuple(_) => "tuple",
            Self::Option(_) => "option",
            Self::Struct(_) => "struct",
            Self::Enum { .. } => "enum",
        }
    }

    /// Looks up a struct field by name.
    pub fn field(&self, name: &str) -> BcsResult<&BcsValue> {
        match self {
            Self::Struct(fields) => fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v)
                .ok_or_else(|| BcsError::validation("struct", format!("missing field `{name}`"))),
            other => Err(mismatch("struct", other)),
        }
    }

    /// Splits an enum value into its variant name and payload.
    pub fn as_variant(&self) -> BcsResult<(&str, Option<&BcsValue>)> {
        match self {
            Self::Enum { variant, value } => Ok((variant.as_str(), value.as_deref())),
            other => Err(mismatch("enum", other)),
        }
    }

    /// Returns the payload of an enum value, failing for unit variants.
    pub fn payload(&self) -> BcsResult<&BcsValue> {
        match self.as_variant()? {
            (_, Some(value)) => Ok(value),
            (name, None) => Err(BcsError::validation(
                "enum",
                format!("variant `{name}` has no payload"),
            )),
        }
    }

    pub fn as_vector(&self) -> BcsResult<&[BcsValue]> {
        match self {
            Self::Vector(items) => Ok(items),
            other => Err(mismatch("vector", other)),
        }
    }

    pub fn as_tuple(&self) -> BcsResult<&[BcsValue]> {
        match self {
            Self::Tuple(items) => Ok(items),
            other => Err(mismatch("tuple", other)),
        }
    }

    pub fn as_str(&self) -> BcsResult<&str> {
        match self {
            Self::String(s) => Ok(s),
            other => Err(mismatch("string", other)),
        }
    }

    fn as_u128(&self, expected: &'static str) -> BcsResult<u128> {
        match self {
            Self::U8(v) => Ok(u128::from(*v)),
            Self::U16(v) => Ok(u128::from(*v)),
            Self::U32(v) => Ok(u128::from(*v)),
            Self::U64(v) => Ok(u128::from(*v)),
            Self::U128(v) => Ok(*v),
            Self::U256(v) => u128::try_from(v)
                .map_err(|_| BcsError::validation(expected, format!("{v} is out of range"))),
            other => Err(mismatch(expected, other)),
        }
    }
}

impl fmt::Display for BcsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::U128(v) => write!(f, "{v}"),
            Self::U256(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Vector(items) => write_list(f, "[", items.iter(), "]"),
            Self::Tuple(items) => write_list(f, "(", items.iter(), ")"),
            Self::Option(None) => write!(f, "None"),
            Self::Option(Some(v)) => write!(f, "Some({v})"),
            Self::Struct(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
            Self::Enum { variant, value: None } => write!(f, "{variant}"),
            Self::Enum {
                variant,
                value: Some(v),
            } => write!(f, "{variant}({v})"),
        }
    }
}

fn write_list<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: impl Iterator<Item = &'a BcsValue>,
    close: &str,
) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

pub(crate) fn mismatch(expected: &str, got: &BcsValue) -> BcsError {
    BcsError::validation(expected, format!("expected {expected}, got {}", got.kind()))
}

/// Conversion of a typed value into a [`BcsValue`].
pub trait IntoBcsValue {
    fn into_bcs_value(self) -> BcsValue;
}

/// Conversion of a [`BcsValue`] back into a typed value.
pub trait FromBcsValue: Sized {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self>;
}

impl IntoBcsValue for BcsValue {
    fn into_bcs_value(self) -> BcsValue {
        self
    }
}

impl FromBcsValue for BcsValue {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        Ok(value.clone())
    }
}

macro_rules! uint_value {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl IntoBcsValue for $ty {
            fn into_bcs_value(self) -> BcsValue {
                BcsValue::$variant(self)
            }
        }

        impl FromBcsValue for $ty {
            fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
                let wide = value.as_u128($name)?;
                <$ty>::try_from(wide)
                    .map_err(|_| BcsError::validation($name, format!("{wide} is out of range")))
            }
        }
    };
}

uint_value!(u8, U8, "u8");
uint_value!(u16, U16, "u16");
uint_value!(u32, U32, "u32");
uint_value!(u64, U64, "u64");
uint_value!(u128, U128, "u128");

impl IntoBcsValue for BigUint {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::U256(self)
    }
}

impl FromBcsValue for BigUint {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        match value {
            BcsValue::U256(v) => Ok(v.clone()),
            other => other.as_u128("u256").map(BigUint::from),
        }
    }
}

impl IntoBcsValue for bool {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::Bool(self)
    }
}

impl FromBcsValue for bool {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        match value {
            BcsValue::Bool(b) => Ok(*b),
            other => Err(mismatch("bool", other)),
        }
    }
}

impl IntoBcsValue for String {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::String(self)
    }
}

impl FromBcsValue for String {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl<T: IntoBcsValue> IntoBcsValue for Vec<T> {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::Vector(self.into_iter().map(IntoBcsValue::into_bcs_value).collect())
    }
}

impl<T: FromBcsValue> FromBcsValue for Vec<T> {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        value.as_vector()?.iter().map(T::from_bcs_value).collect()
    }
}

impl<T: IntoBcsValue> IntoBcsValue for Option<T> {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::Option(self.map(|v| Box::new(v.into_bcs_value())))
    }
}

impl<T: FromBcsValue> FromBcsValue for Option<T> {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        match value {
            BcsValue::Option(None) => Ok(None),
            BcsValue::Option(Some(inner)) => T::from_bcs_value(inner).map(Some),
            other => Err(mismatch("option", other)),
        }
    }
}

impl<A: IntoBcsValue, B: IntoBcsValue> IntoBcsValue for (A, B) {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::Tuple(vec![self.0.into_bcs_value(), self.1.into_bcs_value()])
    }
}

impl<A: FromBcsValue, B: FromBcsValue> FromBcsValue for (A, B) {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        match value.as_tuple()? {
            [a, b] => Ok((A::from_bcs_value(a)?, B::from_bcs_value(b)?)),
            items => Err(BcsError::validation(
                "tuple",
                format!("expected 2 elements, got {}", items.len()),
            )),
        }
    }
}

impl<A: IntoBcsValue, B: IntoBcsValue, C: IntoBcsValue> IntoBcsValue for (A, B, C) {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::Tuple(vec![
            self.0.into_bcs_value(),
            self.1.into_bcs_value(),
            self.2.into_bcs_value(),
        ])
    }
}

impl<A: FromBcsValue, B: FromBcsValue, C: FromBcsValue> FromBcsValue for (A, B, C) {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        match value.as_tuple()? {
            [a, b, c] => Ok((
                A::from_bcs_value(a)?,
                B::from_bcs_value(b)?,
                C::from_bcs_value(c)?,
            )),
            items => Err(BcsError::validation(
                "tuple",
                format!("expected 3 elements, got {}", items.len()),
            )),
        }
    }
}

/// Maps become a vector of key/value tuples.
impl<K: IntoBcsValue, V: IntoBcsValue> IntoBcsValue for BTreeMap<K, V> {
    fn into_bcs_value(self) -> BcsValue {
        BcsValue::Vector(self.into_iter().map(|pair| pair.into_bcs_value()).collect())
    }
}

impl<K: FromBcsValue + Ord, V: FromBcsValue> FromBcsValue for BTreeMap<K, V> {
    fn from_bcs_value(value: &BcsValue) -> BcsResult<Self> {
        value
            .as_vector()?
            .iter()
            .map(<(K, V)>::from_bcs_value)
            .collect()
    }
}
