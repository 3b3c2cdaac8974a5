//! Collection normalizer — converts a polymorphic collection value into
//! its canonical ordered record sequence
//!
//! Authors may write a collection-valued slot in many shapes:
//!
//! ```text
//! [k1, k2]                              list of keys
//! [{k1: {s2: a}}, {k2: null}]           list of key/object pairs
//! [{k3: v3}, [k4, v4, v5]]              key/value pairs and positional tuples
//! [{s1: k5, s2: v52}]                   list of records
//! {k1: {s2: a}, k2: {s3: b}}            mapping of key/object entries
//! {k1: v11, k2: v21}                    mapping of key/value entries (one value attribute)
//! {s1: k1, s2: v12}                     a single record
//! ```
//!
//! # Pipeline
//!
//! `RawValue → classify_form → (classify_element | classify_entry) → extract → builder → Collection`
//!
//! # Guarantees
//!
//! - **Deterministic**: same input always produces same output
//! - **Order preserving**: records appear in first-seen key order, never sorted
//! - **Strict**: any entry that fits no form fails the whole call
//! - **Pure**: the input is never mutated and no state survives the call

mod builder;
mod classify;
mod extract;

use tracing::debug;

use crate::record::Collection;
use crate::spec::CollectionSpec;
use crate::value::RawValue;
use crate::Result;

use builder::CollectionBuilder;
use classify::{classify_element, classify_entry, classify_form, Form, RawEntry};
use extract::extract;

// ── Public API ─────────────────────────────────────────────

/// Normalize one collection value against its spec
///
/// # Errors
/// `UnrecognizedShape`, `KeyAttributeMismatch`, `DuplicateKey`,
/// `PositionalOverflow`, `AmbiguousScalarPayload` or `MissingKeyAttribute`.
/// There is no partial result.
pub fn normalize(raw: &RawValue, spec: &CollectionSpec) -> Result<Collection> {
    let form = classify_form(raw, spec)?;
    debug!(slot = spec.slot(), form = form.name(), "classified collection");

    let mut builder = CollectionBuilder::new(spec);
    match form {
        Form::Absent | Form::Empty => {}
        Form::SingleRecord(mapping) => {
            push(&mut builder, RawEntry::Direct(mapping), spec)?;
        }
        Form::MappingOfRecords(mapping) => {
            for (key, payload) in mapping.iter() {
                push(&mut builder, classify_entry(key, payload, spec)?, spec)?;
            }
        }
        Form::Sequence(items) => {
            for item in items {
                push(&mut builder, classify_element(item, spec)?, spec)?;
            }
        }
    }

    debug!(slot = spec.slot(), records = builder.len(), "normalized collection");
    Ok(builder.finish())
}

/// Normalize a value already decoded as `serde_json::Value`
pub fn normalize_json(json: &serde_json::Value, spec: &CollectionSpec) -> Result<Collection> {
    normalize(&RawValue::from_json(json), spec)
}

fn push(
    builder: &mut CollectionBuilder<'_>,
    entry: RawEntry<'_>,
    spec: &CollectionSpec,
) -> Result<()> {
    debug!(slot = spec.slot(), entry = entry.name(), "classified entry");
    builder.push(extract(entry, spec)?)
}
