// Licensed under the Apache-2.0 license

//! Key mapping tables
//!
//! Every record type declares one static table pairing each serializable
//! field with an integer key (CBOR form) and a string key (JSON form). The
//! same table drives both encode and decode, for both wire forms.
//!
//! Rows whose field name contains a dot (`submods.status`) belong to a nested
//! structure. A table built with [`KeyTable::scoped`] addresses those rows by
//! prefix, with the part after the first dot as the leaf field name.

use coset::cbor::value::Value;

/// Selects which member of a [`KeyMapping`] is used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyMode {
    /// Integer keys, for CBOR and other constrained transports
    Int,
    /// String keys, for JSON and JWT transport
    Str,
}

/// How the codec treats the value stored under a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text or integer, emitted as is
    Scalar,
    /// A record with its own key table
    Record,
    /// A value normalized through its type's canonical conversion
    EnumLike,
    /// Caller-named entries, each a record with its own key table
    RecordMap,
}

/// One row of a key table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMapping {
    pub field: &'static str,
    pub int_key: i64,
    pub str_key: &'static str,
    pub kind: FieldKind,
}

impl KeyMapping {
    pub const fn new(
        field: &'static str,
        int_key: i64,
        str_key: &'static str,
        kind: FieldKind,
    ) -> Self {
        Self {
            field,
            int_key,
            str_key,
            kind,
        }
    }

    /// Wire key for this row under `mode`
    pub fn key(&self, mode: KeyMode) -> Value {
        match mode {
            KeyMode::Int => Value::Integer(self.int_key.into()),
            KeyMode::Str => Value::Text(self.str_key.to_string()),
        }
    }

    /// Exact inverse of [`KeyMapping::key`].
    pub fn matches(&self, key: &Value, mode: KeyMode) -> bool {
        match (mode, key) {
            (KeyMode::Int, Value::Integer(i)) => i64::try_from(*i).ok() == Some(self.int_key),
            (KeyMode::Str, Value::Text(s)) => s == self.str_key,
            _ => false,
        }
    }
}

/// A static key table, optionally narrowed to one dotted scope.
#[derive(Debug, Clone, Copy)]
pub struct KeyTable {
    entries: &'static [KeyMapping],
    scope: Option<&'static str>,
}

impl KeyTable {
    /// Table addressing the undotted rows of `entries`.
    pub const fn new(entries: &'static [KeyMapping]) -> Self {
        Self {
            entries,
            scope: None,
        }
    }

    /// Table addressing the rows of `entries` named `<scope>.<leaf>`.
    pub const fn scoped(entries: &'static [KeyMapping], scope: &'static str) -> Self {
        Self {
            entries,
            scope: Some(scope),
        }
    }

    /// `(leaf field name, row)` pairs reachable from this table, in table order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &'static KeyMapping)> + '_ {
        let entries: &'static [KeyMapping] = self.entries;
        entries
            .iter()
            .filter_map(move |mapping| self.leaf(mapping).map(|leaf| (leaf, mapping)))
    }

    /// Reverse lookup from a wire key to `(leaf field name, row)`.
    pub fn lookup(&self, key: &Value, mode: KeyMode) -> Option<(&'static str, &'static KeyMapping)> {
        self.fields().find(|(_, mapping)| mapping.matches(key, mode))
    }

    fn leaf(&self, mapping: &'static KeyMapping) -> Option<&'static str> {
        match (self.scope, mapping.field.split_once('.')) {
            (None, None) => Some(mapping.field),
            (Some(scope), Some((prefix, leaf))) if prefix == scope => Some(leaf),
            _ => None,
        }
    }

    /// True if two rows share a field name, an integer key or a string key.
    ///
    /// Checked against the full underlying table, so a scoped table inherits
    /// the guarantee of its parent.
    pub const fn has_duplicate_keys(&self) -> bool {
        let e = self.entries;
        let mut i = 0;
        while i < e.len() {
            let mut j = i + 1;
            while j < e.len() {
                if e[i].int_key == e[j].int_key
                    || str_eq(e[i].str_key, e[j].str_key)
                    || str_eq(e[i].field, e[j].field)
                {
                    return true;
                }
                j += 1;
            }
            i += 1;
        }
        false
    }
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}
