//! Record builder — assembles extracted entries into the canonical collection
//!
//! Records are kept in a backing vector in the order their keys were
//! first seen; a key → position index sits beside it for duplicate
//! detection.

use std::collections::BTreeMap;

use tracing::trace;

use crate::record::{Collection, Record};
use crate::spec::CollectionSpec;
use crate::{Error, Result};

use super::extract::{mismatch, KeyedValues};

pub(crate) struct CollectionBuilder<'s> {
    spec: &'s CollectionSpec,
    index: BTreeMap<String, usize>,
    records: Vec<Record>,
}

impl<'s> CollectionBuilder<'s> {
    pub(crate) fn new(spec: &'s CollectionSpec) -> Self {
        Self {
            spec,
            index: BTreeMap::new(),
            records: Vec::new(),
        }
    }

    /// Append one entry, failing on a duplicate or inconsistent key
    pub(crate) fn push(&mut self, entry: KeyedValues) -> Result<()> {
        let key_text = entry.key.key_text();

        if let Some(declared) = &entry.declared_key {
            let declared = declared.key_text();
            if declared != key_text {
                return Err(mismatch(self.spec, &declared, &key_text));
            }
        }

        if self.index.contains_key(&key_text) {
            return Err(Error::DuplicateKey {
                slot: self.spec.slot().to_string(),
                key: key_text,
            });
        }

        let mut record = Record::new(self.spec, entry.key);
        for (name, value) in entry.values {
            if !record.set(&name, value) {
                return Err(Error::UnrecognizedShape {
                    slot: self.spec.slot().to_string(),
                    value: name,
                    attributes: self.spec.describe_attributes(),
                });
            }
        }

        trace!(slot = self.spec.slot(), key = %key_text, position = self.records.len(), "record");
        self.index.insert(key_text, self.records.len());
        self.records.push(record);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn finish(self) -> Collection {
        Collection::from_records(self.records)
    }
}
