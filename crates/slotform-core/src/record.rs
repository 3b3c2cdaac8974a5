//! Canonical records and collections — the validated output side
//!
//! A `Record` always carries a key and exposes every declared value
//! attribute, present or absent. A `Collection` is the ordered sequence
//! of records produced by one normalization call.

use serde::ser::{Serialize, SerializeMap, Serializer};
use sha2::{Digest, Sha256};

use crate::spec::CollectionSpec;
use crate::value::{Mapping, RawValue, Scalar};

// ── Record ────────────────────────────────────────────────

/// One validated record: a key plus every declared value attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    key_attribute: String,
    key: Scalar,
    values: Vec<(String, Option<RawValue>)>,
}

impl Record {
    /// A record with the given key and all value attributes absent
    pub fn new(spec: &CollectionSpec, key: impl Into<Scalar>) -> Self {
        Self {
            key_attribute: spec.key_attribute().to_string(),
            key: key.into(),
            values: spec
                .value_attributes()
                .iter()
                .map(|a| (a.clone(), None))
                .collect(),
        }
    }

    /// Builder form of [`Record::set`]
    pub fn with(mut self, attribute: &str, value: impl Into<RawValue>) -> Self {
        self.set(attribute, value.into());
        self
    }

    /// Set a value attribute. Null clears it. Returns false if the attribute
    /// is not declared.
    pub fn set(&mut self, attribute: &str, value: RawValue) -> bool {
        match self.values.iter_mut().find(|(name, _)| name == attribute) {
            Some(slot) => {
                slot.1 = if value.is_null() { None } else { Some(value) };
                true
            }
            None => false,
        }
    }

    pub fn key(&self) -> &Scalar {
        &self.key
    }

    pub fn key_attribute(&self) -> &str {
        &self.key_attribute
    }

    /// Value of a declared value attribute, `None` when absent or undeclared
    pub fn get(&self, attribute: &str) -> Option<&RawValue> {
        self.values
            .iter()
            .find(|(name, _)| name == attribute)
            .and_then(|(_, v)| v.as_ref())
    }

    /// Every value attribute in declared order
    pub fn values(&self) -> impl Iterator<Item = (&str, Option<&RawValue>)> {
        self.values.iter().map(|(name, v)| (name.as_str(), v.as_ref()))
    }

    /// Full form: every declared attribute, absent ones as null
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert(self.key_attribute.clone(), self.key.to_json());
        for (name, value) in &self.values {
            map.insert(
                name.clone(),
                value
                    .as_ref()
                    .map(RawValue::to_json)
                    .unwrap_or(serde_json::Value::Null),
            );
        }
        serde_json::Value::Object(map)
    }

    /// Compact form: present value attributes only, key omitted
    fn to_compact_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .filter_map(|(name, v)| v.as_ref().map(|v| (name.clone(), v.to_json())))
                .collect(),
        )
    }
}

impl From<&Record> for RawValue {
    fn from(record: &Record) -> Self {
        let mut mapping = Mapping::new();
        mapping.insert(
            record.key_attribute.clone(),
            RawValue::Scalar(record.key.clone()),
        );
        for (name, value) in &record.values {
            if let Some(v) = value {
                mapping.insert(name.clone(), v.clone());
            }
        }
        RawValue::Mapping(mapping)
    }
}

impl From<Record> for RawValue {
    fn from(record: Record) -> Self {
        RawValue::from(&record)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry(&self.key_attribute, &self.key.to_json())?;
        for (name, value) in &self.values {
            map.serialize_entry(name, &value.as_ref().map(RawValue::to_json))?;
        }
        map.end()
    }
}

// ── Collection ────────────────────────────────────────────

/// The canonical collection: records in first-seen key order
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    records: Vec<Record>,
}

impl Collection {
    pub(crate) fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Key text of every record, in order
    pub fn keys(&self) -> Vec<String> {
        self.records.iter().map(|r| r.key.key_text()).collect()
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.key.key_text() == key)
    }

    /// `[{key_attr: k, attr: v|null, ...}, ...]`
    pub fn to_json_list(&self) -> serde_json::Value {
        serde_json::Value::Array(self.records.iter().map(Record::to_json).collect())
    }

    /// `{k: {attr: v, ...}, ...}` with absent attributes omitted
    ///
    /// Returns `None` when the mapping would not read back as the same
    /// collection: a key that is not a string, or keys that are all
    /// declared attribute names (read back as one record).
    pub fn to_json_dict(&self) -> Option<serde_json::Value> {
        if !self.dict_form_round_trips() {
            return None;
        }
        Some(serde_json::Value::Object(
            self.records
                .iter()
                .map(|r| (r.key.key_text(), r.to_compact_json()))
                .collect(),
        ))
    }

    fn dict_form_round_trips(&self) -> bool {
        if self
            .records
            .iter()
            .any(|r| !matches!(r.key, Scalar::String(_)))
        {
            return false;
        }
        match self.records.first() {
            Some(first) => !self.records.iter().all(|r| {
                let key = r.key.key_text();
                key == first.key_attribute || first.values.iter().any(|(name, _)| *name == key)
            }),
            None => true,
        }
    }

    /// Hex SHA-256 of the canonical list form
    pub fn semantic_hash(&self) -> String {
        let canonical = self.to_json_list().to_string();
        let digest = Sha256::digest(canonical.as_bytes());
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for Collection {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}
