// Licensed under the Apache-2.0 license

//! Dual-key codec
//!
//! Transforms a record between its typed form and a map keyed by either the
//! integer or the string member of its [`KeyTable`]. Nested records and
//! name → record maps recurse through their own tables. The same key mode is
//! used for the whole call tree.

use std::collections::BTreeMap;

use coset::cbor::value::Value;
use log::{debug, trace};

use crate::error::{EarError, EarResult};
use crate::keys::{FieldKind, KeyMapping, KeyMode, KeyTable};
use crate::wire;

/// A type with its own key table.
///
/// The table decides which fields exist, their wire keys and their
/// [`FieldKind`]; the record only moves typed values in and out.
pub trait Record: Default {
    /// Type name used in error messages
    const NAME: &'static str;
    const KEYS: KeyTable;

    /// Wire value of `field`, or `None` if the field is absent.
    fn encode_field(&self, field: &str, mode: KeyMode) -> Option<Value>;

    /// Assigns `field` from its raw wire value. The value's shape has
    /// already been checked against the field's [`FieldKind`].
    fn decode_field(&mut self, field: &str, value: &Value, decoder: &Decoder) -> EarResult<()>;

    fn to_map(&self, mode: KeyMode) -> Value {
        encode(self, mode)
    }

    fn from_map(value: &Value, mode: KeyMode) -> EarResult<Self> {
        decode(value, mode)
    }

    /// String-keyed JSON text
    fn to_json(&self) -> EarResult<String> {
        let json = wire::to_json(&self.to_map(KeyMode::Str))?;
        Ok(serde_json::to_string(&json)?)
    }

    fn from_json(text: &str) -> EarResult<Self> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Self::from_map(&wire::from_json(&json), KeyMode::Str)
    }

    /// Integer-keyed CBOR bytes
    fn to_cbor(&self) -> EarResult<Vec<u8>> {
        wire::to_cbor(&self.to_map(KeyMode::Int))
    }

    fn from_cbor(bytes: &[u8]) -> EarResult<Self> {
        Self::from_map(&wire::from_cbor(bytes)?, KeyMode::Int)
    }
}

/// Flattens `record` into a map keyed per `mode`, in table order.
/// Absent fields are left out rather than written as null.
pub fn encode<R: Record>(record: &R, mode: KeyMode) -> Value {
    let entries = R::KEYS
        .fields()
        .filter_map(|(field, mapping)| {
            record
                .encode_field(field, mode)
                .map(|value| (mapping.key(mode), value))
        })
        .collect();
    Value::Map(entries)
}

/// Encodes a name → record map. Entry names are data and are kept verbatim.
pub fn encode_records<R: Record>(records: &BTreeMap<String, R>, mode: KeyMode) -> Value {
    Value::Map(
        records
            .iter()
            .map(|(name, record)| (Value::Text(name.clone()), encode(record, mode)))
            .collect(),
    )
}

/// Decodes `value` as `R` with the relaxed [`Decoder`].
pub fn decode<R: Record>(value: &Value, mode: KeyMode) -> EarResult<R> {
    Decoder::new(mode).decode(value)
}

/// Rebuilds records from key-mapped values.
///
/// Keys of the other key mode are skipped by default, so a nested record
/// written in the wrong mode decodes as an empty record. With
/// [`Decoder::strict`] they are an error instead. Unknown keys of the right
/// mode are always ignored.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    mode: KeyMode,
    strict: bool,
}

impl Decoder {
    pub fn new(mode: KeyMode) -> Self {
        Self {
            mode,
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn decode<R: Record>(&self, value: &Value) -> EarResult<R> {
        let entries = match value {
            Value::Map(entries) => entries,
            other => return Err(EarError::conversion(R::NAME, wire::describe(other))),
        };

        let mut record = R::default();
        for (key, raw) in entries {
            if !self.in_mode(key) {
                if self.strict {
                    return Err(EarError::KeyModeMismatch {
                        record: R::NAME,
                        expected: self.mode,
                    });
                }
                debug!("{}: skipping key {:?} outside {:?} mode", R::NAME, key, self.mode);
                continue;
            }

            let Some((field, mapping)) = R::KEYS.lookup(key, self.mode) else {
                trace!("{}: ignoring unknown key {:?}", R::NAME, key);
                continue;
            };

            check_kind(R::NAME, mapping, raw)?;
            record.decode_field(field, raw, self)?;
        }
        Ok(record)
    }

    /// Decodes a name → record map, keeping entry names verbatim.
    pub fn decode_records<R: Record>(&self, value: &Value) -> EarResult<BTreeMap<String, R>> {
        let entries = match value {
            Value::Map(entries) => entries,
            other => return Err(EarError::conversion(R::NAME, wire::describe(other))),
        };

        let mut records = BTreeMap::new();
        for (name, raw) in entries {
            let Value::Text(name) = name else {
                return Err(EarError::conversion("entry name", wire::describe(name)));
            };
            records.insert(name.clone(), self.decode(raw)?);
        }
        Ok(records)
    }

    fn in_mode(&self, key: &Value) -> bool {
        matches!(
            (self.mode, key),
            (KeyMode::Int, Value::Integer(_)) | (KeyMode::Str, Value::Text(_))
        )
    }
}

fn check_kind(record: &'static str, mapping: &KeyMapping, raw: &Value) -> EarResult<()> {
    let accepted = match mapping.kind {
        FieldKind::Record | FieldKind::RecordMap => matches!(raw, Value::Map(_)),
        FieldKind::EnumLike => matches!(raw, Value::Integer(_) | Value::Text(_)),
        FieldKind::Scalar => !matches!(raw, Value::Map(_) | Value::Array(_)),
    };
    if accepted {
        Ok(())
    } else {
        Err(EarError::Conversion {
            target: record,
            found: format!("{} for field {}", wire::describe(raw), mapping.field),
        })
    }
}

/// Reads a text scalar.
pub fn text(value: &Value, field: &'static str) -> EarResult<String> {
    match value {
        Value::Text(s) => Ok(s.clone()),
        other => Err(EarError::conversion(field, wire::describe(other))),
    }
}

/// Reads an integer scalar that fits in an `i64`.
pub fn integer(value: &Value, field: &'static str) -> EarResult<i64> {
    match value {
        Value::Integer(i) => {
            i64::try_from(*i).map_err(|_| EarError::conversion(field, "integer out of range"))
        }
        other => Err(EarError::conversion(field, wire::describe(other))),
    }
}
