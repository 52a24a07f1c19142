// Licensed under the Apache-2.0 license

// https://www.ietf.org/archive/id/draft-ietf-rats-ar4si-08.html#section-3.1

use coset::cbor::value::Value;

use crate::codec::{Decoder, Record};
use crate::error::EarResult;
use crate::keys::{FieldKind, KeyMapping, KeyMode, KeyTable};
use crate::trust::claim::{Dimension, TrustClaim};
use crate::validate::Validate;

const TRUST_VECTOR_KEYS: &[KeyMapping] = &[
    KeyMapping::new("instance_identity", 0, "instance-identity", FieldKind::EnumLike),
    KeyMapping::new("configuration", 1, "configuration", FieldKind::EnumLike),
    KeyMapping::new("executables", 2, "executables", FieldKind::EnumLike),
    KeyMapping::new("file_system", 3, "file-system", FieldKind::EnumLike),
    KeyMapping::new("hardware", 4, "hardware", FieldKind::EnumLike),
    KeyMapping::new("runtime_opaque", 5, "runtime-opaque", FieldKind::EnumLike),
    KeyMapping::new("storage_opaque", 6, "storage-opaque", FieldKind::EnumLike),
    KeyMapping::new("sourced_data", 7, "sourced-data", FieldKind::EnumLike),
];

const _: () = assert!(!TrustVector::KEYS.has_duplicate_keys());

/// Per-dimension trustworthiness claims about an attester.
///
/// `None` in a slot means no claim is made for that dimension at all, which is
/// different from an explicit [`NO_CLAIM`](crate::claim::NO_CLAIM).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TrustVector {
    pub instance_identity: Option<TrustClaim>,
    pub configuration: Option<TrustClaim>,
    pub executables: Option<TrustClaim>,
    pub file_system: Option<TrustClaim>,
    pub hardware: Option<TrustClaim>,
    pub runtime_opaque: Option<TrustClaim>,
    pub storage_opaque: Option<TrustClaim>,
    pub sourced_data: Option<TrustClaim>,
}

impl TrustVector {
    pub fn get(&self, dimension: Dimension) -> Option<&TrustClaim> {
        self.slot(dimension).as_ref()
    }

    pub fn set(&mut self, dimension: Dimension, claim: Option<TrustClaim>) {
        *self.slot_mut(dimension) = claim;
    }

    /// Builder form of [`TrustVector::set`].
    pub fn with(mut self, dimension: Dimension, claim: TrustClaim) -> Self {
        self.set(dimension, Some(claim));
        self
    }

    /// Present claims, in key order.
    pub fn claims(&self) -> impl Iterator<Item = (Dimension, &TrustClaim)> {
        [
            (Dimension::InstanceIdentity, &self.instance_identity),
            (Dimension::Configuration, &self.configuration),
            (Dimension::Executables, &self.executables),
            (Dimension::FileSystem, &self.file_system),
            (Dimension::Hardware, &self.hardware),
            (Dimension::RuntimeOpaque, &self.runtime_opaque),
            (Dimension::StorageOpaque, &self.storage_opaque),
            (Dimension::SourcedData, &self.sourced_data),
        ]
        .into_iter()
        .filter_map(|(dimension, slot)| slot.as_ref().map(|claim| (dimension, claim)))
    }

    fn slot(&self, dimension: Dimension) -> &Option<TrustClaim> {
        match dimension {
            Dimension::InstanceIdentity => &self.instance_identity,
            Dimension::Configuration => &self.configuration,
            Dimension::Executables => &self.executables,
            Dimension::FileSystem => &self.file_system,
            Dimension::Hardware => &self.hardware,
            Dimension::RuntimeOpaque => &self.runtime_opaque,
            Dimension::StorageOpaque => &self.storage_opaque,
            Dimension::SourcedData => &self.sourced_data,
        }
    }

    fn slot_mut(&mut self, dimension: Dimension) -> &mut Option<TrustClaim> {
        match dimension {
            Dimension::InstanceIdentity => &mut self.instance_identity,
            Dimension::Configuration => &mut self.configuration,
            Dimension::Executables => &mut self.executables,
            Dimension::FileSystem => &mut self.file_system,
            Dimension::Hardware => &mut self.hardware,
            Dimension::RuntimeOpaque => &mut self.runtime_opaque,
            Dimension::StorageOpaque => &mut self.storage_opaque,
            Dimension::SourcedData => &mut self.sourced_data,
        }
    }
}

fn dimension_of(field: &str) -> Option<Dimension> {
    let dimension = match field {
        "instance_identity" => Dimension::InstanceIdentity,
        "configuration" => Dimension::Configuration,
        "executables" => Dimension::Executables,
        "file_system" => Dimension::FileSystem,
        "hardware" => Dimension::Hardware,
        "runtime_opaque" => Dimension::RuntimeOpaque,
        "storage_opaque" => Dimension::StorageOpaque,
        "sourced_data" => Dimension::SourcedData,
        _ => return None,
    };
    Some(dimension)
}

impl Record for TrustVector {
    const NAME: &'static str = "TrustVector";
    const KEYS: KeyTable = KeyTable::new(TRUST_VECTOR_KEYS);

    // Claims travel as their integer value in both key modes.
    fn encode_field(&self, field: &str, _mode: KeyMode) -> Option<Value> {
        let claim = self.get(dimension_of(field)?)?;
        Some(Value::Integer(claim.value.into()))
    }

    fn decode_field(&mut self, field: &str, value: &Value, _decoder: &Decoder) -> EarResult<()> {
        if let Some(dimension) = dimension_of(field) {
            self.set(dimension, Some(TrustClaim::from_wire(dimension, value)?));
        }
        Ok(())
    }
}

impl Validate for TrustVector {
    fn validate(&self) -> EarResult<()> {
        for (_, claim) in self.claims() {
            claim.validate()?;
        }
        Ok(())
    }
}
