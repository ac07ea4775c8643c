//! Composable schemas.
//!
//! A [`BcsType<T>`] knows how to read a `T` from a [`BcsReader`], write one to
//! a [`BcsWriter`], validate one before writing, and (when it can) predict its
//! encoded size. Schemas hold no mutable state and are cheap to clone, so
//! composite schemas simply capture clones of their children.

use crate::bcs::reader::BcsReader;
use crate::bcs::uleb::uleb_len;
use crate::bcs::value::{mismatch, BcsValue, FromBcsValue, IntoBcsValue};
use crate::bcs::writer::{BcsWriter, BcsWriterOptions, DEFAULT_INITIAL_SIZE};
use crate::error::{BcsError, BcsResult};
use base64::Engine;
use num_bigint::BigUint;
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type ReadFn<T> = dyn Fn(&mut BcsReader<'_>) -> BcsResult<T> + Send + Sync;
type WriteFn<T> = dyn Fn(&T, &mut BcsWriter) -> BcsResult<()> + Send + Sync;
type SizeFn<T> = dyn Fn(&T) -> Option<usize> + Send + Sync;
type ValidateFn<T> = dyn Fn(&T) -> BcsResult<()> + Send + Sync;

/// A named description of how to encode and decode values of type `T`.
pub struct BcsType<T> {
    name: Arc<str>,
    read: Arc<ReadFn<T>>,
    write: Arc<WriteFn<T>>,
    size: Arc<SizeFn<T>>,
    validate: Arc<ValidateFn<T>>,
}

impl<T> Clone for BcsType<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            read: Arc::clone(&self.read),
            write: Arc::clone(&self.write),
            size: Arc::clone(&self.size),
            validate: Arc::clone(&self.validate),
        }
    }
}

impl<T> fmt::Debug for BcsType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BcsType").field("name", &self.name).finish()
    }
}

impl<T: 'static> BcsType<T> {
    /// Creates a schema from a reader and a writer.
    ///
    /// The writer may assume the value has already passed validation.
    pub fn new<R, W>(name: impl Into<Arc<str>>, read: R, write: W) -> Self
    where
        R: Fn(&mut BcsReader<'_>) -> BcsResult<T> + Send + Sync + 'static,
        W: Fn(&T, &mut BcsWriter) -> BcsResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            read: Arc::new(read),
            write: Arc::new(write),
            size: Arc::new(|_: &T| None),
            validate: Arc::new(|_: &T| Ok(())),
        }
    }

    /// Sets the size predictor.
    #[must_use]
    pub fn with_size<F>(mut self, size: F) -> Self
    where
        F: Fn(&T) -> Option<usize> + Send + Sync + 'static,
    {
        self.size = Arc::new(size);
        self
    }

    /// Adds a validation step, run after any existing ones.
    #[must_use]
    pub fn with_validation<F>(mut self, check: F) -> Self
    where
        F: Fn(&T) -> BcsResult<()> + Send + Sync + 'static,
    {
        let previous = Arc::clone(&self.validate);
        self.validate = Arc::new(move |value: &T| {
            previous(value)?;
            check(value)
        });
        self
    }

    /// The schema's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads one value.
    pub fn read(&self, reader: &mut BcsReader<'_>) -> BcsResult<T> {
        (self.read)(reader)
    }

    /// Validates and writes one value.
    pub fn write(&self, value: &T, writer: &mut BcsWriter) -> BcsResult<()> {
        self.validate(value)?;
        self.encode(value, writer)
    }

    /// Checks that `value` matches the schema without writing anything.
    pub fn validate(&self, value: &T) -> BcsResult<()> {
        (self.validate)(value)
    }

    /// Encoded size of `value`, when it can be computed without encoding.
    pub fn serialized_size(&self, value: &T) -> Option<usize> {
        (self.size)(value)
    }

    /// Writes without re-running validation; used by composites that have
    /// already validated the whole value.
    fn encode(&self, value: &T, writer: &mut BcsWriter) -> BcsResult<()> {
        (self.write)(value, writer)
    }

    /// Serializes `value` into a buffer sized from [`serialized_size`](Self::serialized_size).
    pub fn serialize(&self, value: &T) -> BcsResult<SerializedBcs> {
        let initial = self.serialized_size(value).unwrap_or(DEFAULT_INITIAL_SIZE);
        self.serialize_with(value, BcsWriterOptions::default().initial_size(initial))
    }

    /// Serializes `value` with explicit writer options.
    pub fn serialize_with(&self, value: &T, options: BcsWriterOptions) -> BcsResult<SerializedBcs> {
        self.validate(value)?;
        let mut writer = BcsWriter::new(options);
        self.encode(value, &mut writer)?;
        Ok(SerializedBcs {
            bytes: writer.into_bytes(),
        })
    }

    /// Decodes a complete value, rejecting trailing bytes.
    pub fn parse(&self, bytes: &[u8]) -> BcsResult<T> {
        let mut reader = BcsReader::new(bytes);
        let value = self.read(&mut reader)?;
        if !reader.is_empty() {
            return Err(BcsError::TrailingBytes(reader.remaining()));
        }
        Ok(value)
    }

    /// Decodes a complete value from hex, with or without a `0x` prefix.
    pub fn from_hex(&self, encoded: &str) -> BcsResult<T> {
        let stripped = encoded.strip_prefix("0x").unwrap_or(encoded);
        let bytes = hex::decode(stripped)
            .map_err(|e| BcsError::invalid_encoding(self.name(), format!("bad hex: {e}")))?;
        self.parse(&bytes)
    }

    /// Decodes a complete value from standard base64.
    pub fn from_base64(&self, encoded: &str) -> BcsResult<T> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| BcsError::invalid_encoding(self.name(), format!("bad base64: {e}")))?;
        self.parse(&bytes)
    }

    /// Decodes a complete value from base58.
    pub fn from_base58(&self, encoded: &str) -> BcsResult<T> {
        let bytes = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| BcsError::invalid_encoding(self.name(), format!("bad base58: {e}")))?;
        self.parse(&bytes)
    }

    /// Derives a schema for another logical type with the same encoding.
    ///
    /// `input` converts the new type into this schema's type before writing;
    /// `output` converts decoded values back. Conversion failures surface as
    /// validation or decode errors respectively.
    pub fn transform<U, I, O>(&self, name: impl Into<Arc<str>>, input: I, output: O) -> BcsType<U>
    where
        U: 'static,
        I: Fn(&U) -> BcsResult<T> + Send + Sync + 'static,
        O: Fn(T) -> BcsResult<U> + Send + Sync + 'static,
    {
        let input = Arc::new(input);

        let inner = self.clone();
        let read = move |reader: &mut BcsReader<'_>| output(inner.read(reader)?);

        let inner = self.clone();
        let to_inner = Arc::clone(&input);
        let write = move |value: &U, writer: &mut BcsWriter| inner.encode(&to_inner(value)?, writer);

        let inner = self.clone();
        let to_inner = Arc::clone(&input);
        let size = move |value: &U| {
            to_inner(value)
                .ok()
                .and_then(|converted| inner.serialized_size(&converted))
        };

        let inner = self.clone();
        let validate = move |value: &U| inner.validate(&input(value)?);

        BcsType::new(name, read, write)
            .with_size(size)
            .with_validation(validate)
    }

    /// Wraps this schema so it reads and writes [`BcsValue`]s.
    pub fn dynamic(&self) -> BcsType<BcsValue>
    where
        T: IntoBcsValue + FromBcsValue,
    {
        self.transform(
            Arc::clone(&self.name),
            |value: &BcsValue| T::from_bcs_value(value),
            |value: T| Ok(value.into_bcs_value()),
        )
    }
}

/// Encoded bytes with convenience views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedBcs {
    bytes: Vec<u8>,
}

impl SerializedBcs {
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Lowercase hex without a prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(&self.bytes).into_string()
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

macro_rules! fixed_uint {
    ($(#[$doc:meta])* $fn:ident, $ty:ty, $read:ident, $write:ident) => {
        $(#[$doc])*
        pub fn $fn() -> BcsType<$ty> {
            BcsType::new(
                stringify!($fn),
                |reader: &mut BcsReader<'_>| reader.$read(),
                |value: &$ty, writer: &mut BcsWriter| writer.$write(*value),
            )
            .with_size(|_: &$ty| Some(std::mem::size_of::<$ty>()))
        }
    };
}

fixed_uint!(
    /// Unsigned 8-bit integer.
    u8, u8, read_u8, write_u8
);
fixed_uint!(
    /// Unsigned 16-bit little-endian integer.
    u16, u16, read_u16, write_u16
);
fixed_uint!(
    /// Unsigned 32-bit little-endian integer.
    u32, u32, read_u32, write_u32
);
fixed_uint!(
    /// Unsigned 64-bit little-endian integer.
    u64, u64, read_u64, write_u64
);
fixed_uint!(
    /// Unsigned 128-bit little-endian integer.
    u128, u128, read_u128, write_u128
);

/// Unsigned 256-bit little-endian integer.
pub fn u256() -> BcsType<BigUint> {
    BcsType::new(
        "u256",
        |reader: &mut BcsReader<'_>| reader.read_u256(),
        |value: &BigUint, writer: &mut BcsWriter| writer.write_u256(value),
    )
    .with_size(|_: &BigUint| Some(32))
    .with_validation(|value: &BigUint| {
        if value.bits() > 256 {
            return Err(BcsError::validation("u256", format!("{value} exceeds 256 bits")));
        }
        Ok(())
    })
}

/// A single byte, `0` or `1`.
pub fn bool() -> BcsType<bool> {
    BcsType::new(
        "bool",
        |reader: &mut BcsReader<'_>| match reader.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(BcsError::invalid_encoding(
                "bool",
                format!("expected 0 or 1, got {other}"),
            )),
        },
        |value: &bool, writer: &mut BcsWriter| writer.write_u8(u8::from(*value)),
    )
    .with_size(|_: &bool| Some(1))
}

/// A ULEB128-encoded integer.
pub fn uleb128() -> BcsType<u64> {
    BcsType::new(
        "uleb128",
        |reader: &mut BcsReader<'_>| reader.read_uleb128(),
        |value: &u64, writer: &mut BcsWriter| writer.write_uleb128(*value),
    )
    .with_size(|value: &u64| Some(uleb_len(*value)))
}

/// A length-prefixed UTF-8 string.
pub fn string() -> BcsType<String> {
    BcsType::new(
        "string",
        |reader: &mut BcsReader<'_>| {
            let length = reader.read_length(1)?;
            let bytes = reader.read_bytes(length)?;
            String::from_utf8(bytes.to_vec())
                .map_err(|e| BcsError::invalid_encoding("string", e.to_string()))
        },
        |value: &String, writer: &mut BcsWriter| {
            writer.write_length(value.len())?;
            writer.write_bytes(value.as_bytes())
        },
    )
    .with_size(|value: &String| Some(uleb_len(value.len() as u64) + value.len()))
}

/// Exactly `length` raw bytes with no prefix.
pub fn bytes(length: usize) -> BcsType<Vec<u8>> {
    let name = format!("bytes[{length}]");
    let check_name = name.clone();
    BcsType::new(
        name,
        move |reader: &mut BcsReader<'_>| Ok(reader.read_bytes(length)?.to_vec()),
        |value: &Vec<u8>, writer: &mut BcsWriter| writer.write_bytes(value),
    )
    .with_size(move |_: &Vec<u8>| Some(length))
    .with_validation(move |value: &Vec<u8>| {
        if value.len() != length {
            return Err(BcsError::validation(
                check_name.as_str(),
                format!("expected {length} bytes, got {}", value.len()),
            ));
        }
        Ok(())
    })
}

/// Length-prefixed raw bytes.
pub fn byte_vector() -> BcsType<Vec<u8>> {
    BcsType::new(
        "vector<u8>",
        |reader: &mut BcsReader<'_>| {
            let length = reader.read_length(1)?;
            Ok(reader.read_bytes(length)?.to_vec())
        },
        |value: &Vec<u8>, writer: &mut BcsWriter| {
            writer.write_length(value.len())?;
            writer.write_bytes(value)
        },
    )
    .with_size(|value: &Vec<u8>| Some(uleb_len(value.len() as u64) + value.len()))
}

fn sum_sizes<T: 'static>(schema: &BcsType<T>, values: &[T]) -> Option<usize> {
    values
        .iter()
        .try_fold(0usize, |acc, v| Some(acc + schema.serialized_size(v)?))
}

/// A length-prefixed sequence of `element` values.
pub fn vector<T: 'static>(element: BcsType<T>) -> BcsType<Vec<T>> {
    let name = format!("vector<{}>", element.name());

    let inner = element.clone();
    let read = move |reader: &mut BcsReader<'_>| {
        let length = reader.read_length(0)?;
        let mut out = Vec::with_capacity(length.min(reader.remaining()));
        for _ in 0..length {
            out.push(inner.read(reader)?);
        }
        Ok(out)
    };

    let inner = element.clone();
    let write = move |values: &Vec<T>, writer: &mut BcsWriter| {
        writer.write_length(values.len())?;
        values.iter().try_for_each(|v| inner.encode(v, writer))
    };

    let inner = element.clone();
    let size = move |values: &Vec<T>| {
        Some(uleb_len(values.len() as u64) + sum_sizes(&inner, values)?)
    };

    BcsType::new(name, read, write)
        .with_size(size)
        .with_validation(move |values: &Vec<T>| values.iter().try_for_each(|v| element.validate(v)))
}

/// Exactly `length` values of `element` with no length prefix.
pub fn fixed_array<T: 'static>(length: usize, element: BcsType<T>) -> BcsType<Vec<T>> {
    let name = format!("{}[{length}]", element.name());

    let inner = element.clone();
    let read = move |reader: &mut BcsReader<'_>| {
        (0..length).map(|_| inner.read(reader)).collect::<BcsResult<Vec<T>>>()
    };

    let inner = element.clone();
    let write = move |values: &Vec<T>, writer: &mut BcsWriter| {
        values.iter().try_for_each(|v| inner.encode(v, writer))
    };

    let inner = element.clone();
    let size = move |values: &Vec<T>| sum_sizes(&inner, values);

    let check_name = name.clone();
    BcsType::new(name, read, write)
        .with_size(size)
        .with_validation(move |values: &Vec<T>| {
            if values.len() != length {
                return Err(BcsError::validation(
                    check_name.as_str(),
                    format!("expected {length} elements, got {}", values.len()),
                ));
            }
            values.iter().try_for_each(|v| element.validate(v))
        })
}

/// `None` or `Some(value)`, tagged like a two-variant enum.
pub fn option<T: 'static>(element: BcsType<T>) -> BcsType<Option<T>> {
    let name = format!("Option<{}>", element.name());

    let inner = element.clone();
    let enum_name = name.clone();
    let read = move |reader: &mut BcsReader<'_>| match reader.read_uleb128()? {
        0 => Ok(None),
        1 => inner.read(reader).map(Some),
        index => Err(BcsError::UnknownVariant {
            schema: enum_name.clone(),
            index,
        }),
    };

    let inner = element.clone();
    let write = move |value: &Option<T>, writer: &mut BcsWriter| match value {
        None => writer.write_uleb128(0),
        Some(v) => {
            writer.write_uleb128(1)?;
            inner.encode(v, writer)
        }
    };

    let inner = element.clone();
    let size = move |value: &Option<T>| match value {
        None => Some(1),
        Some(v) => Some(1 + inner.serialized_size(v)?),
    };

    BcsType::new(name, read, write)
        .with_size(size)
        .with_validation(move |value: &Option<T>| match value {
            None => Ok(()),
            Some(v) => element.validate(v),
        })
}

/// A pair, encoded as its elements back to back.
pub fn tuple2<A: 'static, B: 'static>(a: BcsType<A>, b: BcsType<B>) -> BcsType<(A, B)> {
    let name = format!("({}, {})", a.name(), b.name());

    let (ra, rb) = (a.clone(), b.clone());
    let read = move |reader: &mut BcsReader<'_>| Ok((ra.read(reader)?, rb.read(reader)?));

    let (wa, wb) = (a.clone(), b.clone());
    let write = move |value: &(A, B), writer: &mut BcsWriter| {
        wa.encode(&value.0, writer)?;
        wb.encode(&value.1, writer)
    };

    let (sa, sb) = (a.clone(), b.clone());
    let size = move |value: &(A, B)| {
        Some(sa.serialized_size(&value.0)? + sb.serialized_size(&value.1)?)
    };

    BcsType::new(name, read, write)
        .with_size(size)
        .with_validation(move |value: &(A, B)| {
            a.validate(&value.0)?;
            b.validate(&value.1)
        })
}

/// A triple, encoded as its elements back to back.
pub fn tuple3<A: 'static, B: 'static, C: 'static>(
    a: BcsType<A>,
    b: BcsType<B>,
    c: BcsType<C>,
) -> BcsType<(A, B, C)> {
    let name = format!("({}, {}, {})", a.name(), b.name(), c.name());

    let (ra, rb, rc) = (a.clone(), b.clone(), c.clone());
    let read = move |reader: &mut BcsReader<'_>| {
        Ok((ra.read(reader)?, rb.read(reader)?, rc.read(reader)?))
    };

    let (wa, wb, wc) = (a.clone(), b.clone(), c.clone());
    let write = move |value: &(A, B, C), writer: &mut BcsWriter| {
        wa.encode(&value.0, writer)?;
        wb.encode(&value.1, writer)?;
        wc.encode(&value.2, writer)
    };

    let (sa, sb, sc) = (a.clone(), b.clone(), c.clone());
    let size = move |value: &(A, B, C)| {
        Some(
            sa.serialized_size(&value.0)?
                + sb.serialized_size(&value.1)?
                + sc.serialized_size(&value.2)?,
        )
    };

    BcsType::new(name, read, write)
        .with_size(size)
        .with_validation(move |value: &(A, B, C)| {
            a.validate(&value.0)?;
            b.validate(&value.1)?;
            c.validate(&value.2)
        })
}

/// A map encoded as a vector of `(key, value)` tuples.
///
/// Entries are written sorted by their encoded key bytes, so equal maps always
/// produce equal bytes. Duplicate keys are rejected on read.
pub fn map<K, V>(key: BcsType<K>, value: BcsType<V>) -> BcsType<BTreeMap<K, V>>
where
    K: Ord + 'static,
    V: 'static,
{
    let name = format!("map<{}, {}>", key.name(), value.name());

    let (rk, rv) = (key.clone(), value.clone());
    let dup_name = name.clone();
    let read = move |reader: &mut BcsReader<'_>| {
        let length = reader.read_length(0)?;
        let mut out = BTreeMap::new();
        for _ in 0..length {
            let k = rk.read(reader)?;
            let v = rv.read(reader)?;
            if out.insert(k, v).is_some() {
                return Err(BcsError::invalid_encoding(dup_name.as_str(), "duplicate key"));
            }
        }
        Ok(out)
    };

    let (wk, wv) = (key.clone(), value.clone());
    let write = move |entries: &BTreeMap<K, V>, writer: &mut BcsWriter| {
        let mut encoded = Vec::with_capacity(entries.len());
        for (k, v) in entries {
            let mut key_writer = BcsWriter::default();
            wk.encode(k, &mut key_writer)?;
            encoded.push((key_writer.into_bytes(), v));
        }
        encoded.sort_by(|a, b| a.0.cmp(&b.0));
        writer.write_length(encoded.len())?;
        for (key_bytes, v) in encoded {
            writer.write_bytes(&key_bytes)?;
            wv.encode(v, writer)?;
        }
        Ok(())
    };

    let (sk, sv) = (key.clone(), value.clone());
    let size = move |entries: &BTreeMap<K, V>| {
        entries.iter().try_fold(uleb_len(entries.len() as u64), |acc, (k, v)| {
            Some(acc + sk.serialized_size(k)? + sv.serialized_size(v)?)
        })
    };

    BcsType::new(name, read, write)
        .with_size(size)
        .with_validation(move |entries: &BTreeMap<K, V>| {
            entries.iter().try_for_each(|(k, v)| {
                key.validate(k)?;
                value.validate(v)
            })
        })
}

type Fields = Arc<[(String, BcsType<BcsValue>)]>;

fn struct_field<'a>(schema: &str, value: &'a BcsValue, field: &str) -> BcsResult<&'a BcsValue> {
    value
        .field(field)
        .map_err(|_| BcsError::validation(schema, format!("missing field `{field}`")))
}

/// A struct whose fields are encoded in declaration order.
///
/// Values are [`BcsValue::Struct`]s; every declared field must be present and
/// no undeclared field may appear.
pub fn struct_<N: Into<String>>(
    name: impl Into<Arc<str>>,
    fields: impl IntoIterator<Item = (N, BcsType<BcsValue>)>,
) -> BcsType<BcsValue> {
    let name: Arc<str> = name.into();
    let fields: Fields = fields.into_iter().map(|(n, t)| (n.into(), t)).collect();

    let read_fields = Arc::clone(&fields);
    let read = move |reader: &mut BcsReader<'_>| {
        let mut out = Vec::with_capacity(read_fields.len());
        for (field, schema) in read_fields.iter() {
            out.push((field.clone(), schema.read(reader)?));
        }
        Ok(BcsValue::Struct(out))
    };

    let write_fields = Arc::clone(&fields);
    let write_name = Arc::clone(&name);
    let write = move |value: &BcsValue, writer: &mut BcsWriter| {
        for (field, schema) in write_fields.iter() {
            schema.encode(struct_field(&write_name, value, field)?, writer)?;
        }
        Ok(())
    };

    let size_fields = Arc::clone(&fields);
    let size = move |value: &BcsValue| {
        size_fields.iter().try_fold(0usize, |acc, (field, schema)| {
            Some(acc + schema.serialized_size(value.field(field).ok()?)?)
        })
    };

    let check_name = Arc::clone(&name);
    let validate = move |value: &BcsValue| {
        let BcsValue::Struct(present) = value else {
            return Err(mismatch(&check_name, value));
        };
        if let Some((unknown, _)) = present
            .iter()
            .find(|(n, _)| !fields.iter().any(|(declared, _)| declared == n))
        {
            return Err(BcsError::validation(
                &*check_name,
                format!("unknown field `{unknown}`"),
            ));
        }
        for (field, schema) in fields.iter() {
            schema.validate(struct_field(&check_name, value, field)?)?;
        }
        Ok(())
    };

    BcsType::new(name, read, write)
        .with_size(size)
        .with_validation(validate)
}

type Variants = Arc<[(String, Option<BcsType<BcsValue>>)]>;

fn variant_index(
    schema: &str,
    variants: &Variants,
    value: &BcsValue,
) -> BcsResult<(usize, Option<BcsType<BcsValue>>)> {
    let (name, _) = value
        .as_variant()
        .map_err(|_| mismatch(schema, value))?;
    variants
        .iter()
        .position(|(declared, _)| declared == name)
        .map(|index| (index, variants[index].1.clone()))
        .ok_or_else(|| BcsError::validation(schema, format!("unknown variant `{name}`")))
}

/// A tagged union: ULEB128 variant index followed by the variant's payload.
///
/// Variants with `None` as their schema carry no payload.
pub fn enum_<N: Into<String>>(
    name: impl Into<Arc<str>>,
    variants: impl IntoIterator<Item = (N, Option<BcsType<BcsValue>>)>,
) -> BcsType<BcsValue> {
    let name: Arc<str> = name.into();
    let variants: Variants = variants.into_iter().map(|(n, t)| (n.into(), t)).collect();

    let read_variants = Arc::clone(&variants);
    let read_name = Arc::clone(&name);
    let read = move |reader: &mut BcsReader<'_>| {
        let index = reader.read_uleb128()?;
        let (variant, schema) = usize::try_from(index)
            .ok()
            .and_then(|i| read_variants.get(i))
            .ok_or_else(|| BcsError::UnknownVariant {
                schema: read_name.to_string(),
                index,
            })?;
        let value = match schema {
            Some(schema) => Some(Box::new(schema.read(reader)?)),
            None => None,
        };
        Ok(BcsValue::Enum {
            variant: variant.clone(),
            value,
        })
    };

    let write_variants = Arc::clone(&variants);
    let write_name = Arc::clone(&name);
    let write = move |value: &BcsValue, writer: &mut BcsWriter| {
        let (index, schema) = variant_index(&write_name, &write_variants, value)?;
        writer.write_uleb128(index as u64)?;
        match (schema, value.as_variant()?.1) {
            (Some(schema), Some(payload)) => schema.encode(payload, writer),
            _ => Ok(()),
        }
    };

    let size_variants = Arc::clone(&variants);
    let size_name = Arc::clone(&name);
    let size = move |value: &BcsValue| {
        let (index, schema) = variant_index(&size_name, &size_variants, value).ok()?;
        let payload = match (schema, value.as_variant().ok()?.1) {
            (Some(schema), Some(payload)) => schema.serialized_size(payload)?,
            _ => 0,
        };
        Some(uleb_len(index as u64) + payload)
    };

    let check_name = Arc::clone(&name);
    let validate = move |value: &BcsValue| {
        let (_, schema) = variant_index(&check_name, &variants, value)?;
        let (variant, payload) = value.as_variant()?;
        match (schema, payload) {
            (Some(schema), Some(payload)) => schema.validate(payload),
            (None, None) => Ok(()),
            (Some(_), None) => Err(BcsError::validation(
                &*check_name,
                format!("variant `{variant}` requires a payload"),
            )),
            (None, Some(_)) => Err(BcsError::validation(
                &*check_name,
                format!("variant `{variant}` takes no payload"),
            )),
        }
    };

    BcsType::new(name, read, write)
        .with_size(size)
        .with_validation(validate)
}

struct Deferred<T> {
    cell: OnceCell<BcsType<T>>,
    producer: Box<dyn Fn() -> BcsType<T> + Send + Sync>,
}

impl<T: 'static> Deferred<T> {
    fn get(&self) -> &BcsType<T> {
        self.cell.get_or_init(|| (self.producer)())
    }
}

/// A schema whose definition is produced on first use and then cached.
///
/// Recursive shapes refer to themselves through this, e.g. a type tag whose
/// `vector` arm contains another type tag. `name` should be the name of the
/// schema `producer` returns, since it appears in composite names and errors
/// before the producer has run.
pub fn lazy<T, F>(name: impl Into<Arc<str>>, producer: F) -> BcsType<T>
where
    T: 'static,
    F: Fn() -> BcsType<T> + Send + Sync + 'static,
{
    let deferred = Arc::new(Deferred {
        cell: OnceCell::new(),
        producer: Box::new(producer),
    });

    let d = Arc::clone(&deferred);
    let read = move |reader: &mut BcsReader<'_>| d.get().read(reader);
    let d = Arc::clone(&deferred);
    let write = move |value: &T, writer: &mut BcsWriter| d.get().encode(value, writer);
    let d = Arc::clone(&deferred);
    let size = move |value: &T| d.get().serialized_size(value);

    BcsType::new(name, read, write)
        .with_size(size)
        .with_validation(move |value: &T| deferred.get().validate(value))
}
