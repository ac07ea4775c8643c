//! Serialization of pure (non-object) arguments.
//!
//! A [`PureType`] is the subset of Move types that can be passed as raw
//! bytes. It is derived from a parameter signature, or parsed from a short
//! type string such as `u64` or `vector<address>`, and converts loosely typed
//! JSON values into canonical bytes.

use crate::address::{address, SuiAddress};
use crate::bcs::{self, BcsType, BcsValue};
use crate::error::{BcsError, BcsResult};
use crate::move_type::{OpenMoveTypeSignature, OpenMoveTypeSignatureBody};
use num_bigint::BigUint;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A type whose values are passed as pure bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PureType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    /// UTF-8 or ASCII string, both length-prefixed bytes on the wire.
    String,
    Vector(Box<PureType>),
    Option(Box<PureType>),
}

/// Returns the pure type for a parameter signature, or `None` when the
/// parameter must be an object.
pub fn pure_schema_for(signature: &OpenMoveTypeSignature) -> Option<PureType> {
    PureType::from_body(&signature.body)
}

impl PureType {
    /// Maps a signature body to a pure type.
    ///
    /// Besides primitives and vectors of pure types this recognizes
    /// `0x1::string::String`, `0x1::ascii::String`, `0x1::option::Option<T>`
    /// and `0x2::object::ID`.
    pub fn from_body(body: &OpenMoveTypeSignatureBody) -> Option<Self> {
        use OpenMoveTypeSignatureBody as Body;

        Some(match body {
            Body::Address => Self::Address,
            Body::Bool => Self::Bool,
            Body::U8 => Self::U8,
            Body::U16 => Self::U16,
            Body::U32 => Self::U32,
            Body::U64 => Self::U64,
            Body::U128 => Self::U128,
            Body::U256 => Self::U256,
            Body::Vector(inner) => Self::Vector(Box::new(Self::from_body(inner)?)),
            Body::Datatype {
                package,
                module,
                type_name,
                type_parameters,
            } => match (module.as_str(), type_name.as_str()) {
                ("string" | "ascii", "String") if *package == SuiAddress::STD => Self::String,
                ("option", "Option") if *package == SuiAddress::STD => {
                    let [inner] = type_parameters.as_slice() else {
                        return None;
                    };
                    Self::Option(Box::new(Self::from_body(inner)?))
                }
                ("object", "ID") if *package == SuiAddress::FRAMEWORK => Self::Address,
                _ => return None,
            },
            Body::TypeParameter(_) => return None,
        })
    }

    /// Schema for values of this type.
    pub fn schema(&self) -> BcsType<BcsValue> {
        match self {
            Self::Bool => bcs::bool().dynamic(),
            Self::U8 => bcs::u8().dynamic(),
            Self::U16 => bcs::u16().dynamic(),
            Self::U32 => bcs::u32().dynamic(),
            Self::U64 => bcs::u64().dynamic(),
            Self::U128 => bcs::u128().dynamic(),
            Self::U256 => bcs::u256().dynamic(),
            Self::Address => address().dynamic(),
            Self::String => bcs::string().dynamic(),
            Self::Vector(inner) => bcs::vector(inner.schema()).dynamic(),
            Self::Option(inner) => bcs::option(inner.schema()).dynamic(),
        }
    }

    /// Converts a JSON value into a [`BcsValue`] of this type.
    ///
    /// Integers are accepted as JSON numbers or decimal strings, addresses as
    /// hex strings, vectors as arrays and `null` as `None`.
    pub fn value_from_json(&self, json: &Value) -> BcsResult<BcsValue> {
        let wrong = || {
            BcsError::validation(
                self.to_string(),
                format!("cannot convert {json} to {self}"),
            )
        };
        Ok(match self {
            Self::Bool => BcsValue::Bool(json.as_bool().ok_or_else(wrong)?),
            Self::U8 => BcsValue::U8(self.narrow(json)?),
            Self::U16 => BcsValue::U16(self.narrow(json)?),
            Self::U32 => BcsValue::U32(self.narrow(json)?),
            Self::U64 => BcsValue::U64(self.narrow(json)?),
            Self::U128 => BcsValue::U128(self.narrow(json)?),
            Self::U256 => BcsValue::U256(self.big_uint(json)?),
            Self::Address => {
                let s = json.as_str().ok_or_else(wrong)?;
                BcsValue::String(SuiAddress::from_hex(s)?.to_hex())
            }
            Self::String => BcsValue::String(json.as_str().ok_or_else(wrong)?.to_string()),
            Self::Vector(inner) => BcsValue::Vector(
                json.as_array()
                    .ok_or_else(wrong)?
                    .iter()
                    .map(|item| inner.value_from_json(item))
                    .collect::<BcsResult<_>>()?,
            ),
            Self::Option(inner) => match json {
                Value::Null => BcsValue::Option(None),
                other => BcsValue::Option(Some(Box::new(inner.value_from_json(other)?))),
            },
        })
    }

    fn big_uint(&self, json: &Value) -> BcsResult<BigUint> {
        let text = match json {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.trim().to_string(),
            _ => {
                return Err(BcsError::validation(
                    self.to_string(),
                    format!("expected unsigned integer, got {json}"),
                ))
            }
        };
        BigUint::from_str(&text).map_err(|_| {
            BcsError::validation(self.to_string(), format!("`{text}` is not an unsigned integer"))
        })
    }

    fn narrow<T: TryFrom<BigUint>>(&self, json: &Value) -> BcsResult<T> {
        let value = self.big_uint(json)?;
        let shown = value.to_string();
        T::try_from(value)
            .map_err(|_| BcsError::validation(self.to_string(), format!("{shown} is out of range")))
    }
}

/// Serializes a JSON value as pure bytes of the given type.
pub fn serialize_pure_json(ty: &PureType, json: &Value) -> BcsResult<Vec<u8>> {
    let value = ty.value_from_json(json)?;
    Ok(ty.schema().serialize(&value)?.into_bytes())
}

impl fmt::Display for PureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::U8 => write!(f, "u8"),
            Self::U16 => write!(f, "u16"),
            Self::U32 => write!(f, "u32"),
            Self::U64 => write!(f, "u64"),
            Self::U128 => write!(f, "u128"),
            Self::U256 => write!(f, "u256"),
            Self::Address => write!(f, "address"),
            Self::String => write!(f, "string"),
            Self::Vector(inner) => write!(f, "vector<{inner}>"),
            Self::Option(inner) => write!(f, "option<{inner}>"),
        }
    }
}

impl FromStr for PureType {
    type Err = BcsError;

    /// Parses `u64`, `address`, `id`, `string`, `vector<T>` or `option<T>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let wrapped = |prefix: &str| {
            s.strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix('>'))
        };
        Ok(match s {
            "bool" => Self::Bool,
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "u128" => Self::U128,
            "u256" => Self::U256,
            "address" | "id" => Self::Address,
            "string" => Self::String,
            _ => {
                if let Some(inner) = wrapped("vector<") {
                    Self::Vector(Box::new(inner.parse()?))
                } else if let Some(inner) = wrapped("option<") {
                    Self::Option(Box::new(inner.parse()?))
                } else {
                    return Err(BcsError::InvalidTypeTag(format!("`{s}` is not a pure type")));
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_type::MoveRef;
    use serde_json::json;

    fn datatype(package: SuiAddress, module: &str, name: &str, params: Vec<OpenMoveTypeSignatureBody>) -> OpenMoveTypeSignature {
        OpenMoveTypeSignature::new(
            None,
            OpenMoveTypeSignatureBody::datatype(package, module, name, params),
        )
    }

    #[test]
    fn test_schema_for_signatures() {
        let u64_ref = OpenMoveTypeSignature::new(Some(MoveRef::Immutable), OpenMoveTypeSignatureBody::U64);
        assert_eq!(pure_schema_for(&u64_ref), Some(PureType::U64));
        assert_eq!(
            pure_schema_for(&datatype(SuiAddress::STD, "string", "String", vec![])),
            Some(PureType::String)
        );
        assert_eq!(
            pure_schema_for(&datatype(SuiAddress::STD, "ascii", "String", vec![])),
            Some(PureType::String)
        );
        assert_eq!(
            pure_schema_for(&datatype(SuiAddress::FRAMEWORK, "object", "ID", vec![])),
            Some(PureType::Address)
        );
        assert_eq!(
            pure_schema_for(&datatype(
                SuiAddress::STD,
                "option",
                "Option",
                vec![OpenMoveTypeSignatureBody::U8]
            )),
            Some(PureType::Option(Box::new(PureType::U8)))
        );
    }

    #[test]
    fn test_objects_are_not_pure() {
        assert_eq!(
            pure_schema_for(&datatype(SuiAddress::FRAMEWORK, "coin", "Coin", vec![])),
            None
        );
        assert_eq!(
            pure_schema_for(&datatype(SuiAddress::FRAMEWORK, "string", "String", vec![])),
            None
        );
        let generic = OpenMoveTypeSignature::new(
            None,
            OpenMoveTypeSignatureBody::Vector(Box::new(OpenMoveTypeSignatureBody::TypeParameter(0))),
        );
        assert_eq!(pure_schema_for(&generic), None);
    }

    #[test]
    fn test_integers_from_numbers_and_strings() {
        assert_eq!(serialize_pure_json(&PureType::U64, &json!(100)).unwrap(), vec![100, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(serialize_pure_json(&PureType::U64, &json!("100")).unwrap(), vec![100, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(serialize_pure_json(&PureType::U8, &json!(255)).unwrap(), vec![255]);
        assert!(serialize_pure_json(&PureType::U8, &json!(256)).is_err());
        assert!(serialize_pure_json(&PureType::U64, &json!(-1)).is_err());
        assert!(serialize_pure_json(&PureType::U64, &json!("1.5")).is_err());
        let max = serialize_pure_json(&PureType::U256, &json!("115792089237316195423570985008687907853269984665640564039457584007913129639935")).unwrap();
        assert_eq!(max, vec![0xff; 32]);
    }

    #[test]
    fn test_address_and_string() {
        let bytes = serialize_pure_json(&PureType::Address, &json!("0x2")).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[31], 2);
        assert_eq!(serialize_pure_json(&PureType::String, &json!("hi")).unwrap(), vec![2, b'h', b'i']);
        assert!(serialize_pure_json(&PureType::Address, &json!(2)).is_err());
    }

    #[test]
    fn test_vectors_and_options() {
        let ty: PureType = "vector<option<u16>>".parse().unwrap();
        let bytes = serialize_pure_json(&ty, &json!([1, null])).unwrap();
        assert_eq!(bytes, vec![2, 1, 1, 0, 0]);
    }

    #[test]
    fn test_parse_type_strings() {
        assert_eq!("id".parse::<PureType>().unwrap(), PureType::Address);
        assert_eq!(
            "vector<u8>".parse::<PureType>().unwrap(),
            PureType::Vector(Box::new(PureType::U8))
        );
        assert!("0x2::coin::Coin".parse::<PureType>().is_err());
        assert_eq!(PureType::Option(Box::new(PureType::U64)).to_string(), "option<u64>");
    }
}
