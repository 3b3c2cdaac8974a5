//! Form and element classification
//!
//! Structural inspection only: the classifier looks at container kinds,
//! entry counts and whether mapping keys are declared attribute names.
//! Nothing here builds records or validates payload contents.

use crate::spec::CollectionSpec;
use crate::value::{Mapping, RawValue, Scalar};
use crate::{Error, Result};

// ── Tagged shapes ─────────────────────────────────────────

/// Top-level shape of a collection value
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Form<'a> {
    /// Null or not supplied
    Absent,
    /// Empty sequence or empty mapping
    Empty,
    /// A mapping whose keys are all declared attribute names
    SingleRecord(&'a Mapping),
    /// A mapping keyed by record identity
    MappingOfRecords(&'a Mapping),
    /// A sequence; each element is one record
    Sequence(&'a [RawValue]),
}

impl Form<'_> {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Form::Absent => "absent",
            Form::Empty => "empty",
            Form::SingleRecord(_) => "single-record",
            Form::MappingOfRecords(_) => "mapping-of-records",
            Form::Sequence(_) => "sequence",
        }
    }
}

/// What an outer key is paired with
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Payload<'a> {
    Null,
    Object(&'a Mapping),
    Scalar(&'a Scalar),
}

/// One entry of the input, before key/value extraction
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RawEntry<'a> {
    /// A bare scalar: the key, nothing else
    Key(&'a Scalar),
    /// A one-entry mapping inside a sequence: `{key: payload}`
    KeyedElement { key: &'a str, payload: Payload<'a> },
    /// One `(key, payload)` entry of a mapping-of-records
    KeyedEntry { key: &'a str, payload: Payload<'a> },
    /// `[key, v1, v2, ...]`
    Positional {
        key: &'a Scalar,
        values: &'a [RawValue],
    },
    /// A record-shaped mapping with no outer key
    Direct(&'a Mapping),
}

impl RawEntry<'_> {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            RawEntry::Key(_) => "key",
            RawEntry::KeyedElement { .. } => "keyed-element",
            RawEntry::KeyedEntry { .. } => "keyed-entry",
            RawEntry::Positional { .. } => "positional",
            RawEntry::Direct(_) => "direct",
        }
    }
}

// ── Classification ────────────────────────────────────────

/// True when every key of `mapping` is a declared attribute name
fn looks_like_record(mapping: &Mapping, spec: &CollectionSpec) -> bool {
    mapping.keys().all(|k| spec.is_declared(k))
}

/// True when the mapping also carries a scalar key attribute value
fn carries_scalar_key(mapping: &Mapping, spec: &CollectionSpec) -> bool {
    matches!(
        mapping.get(spec.key_attribute()),
        Some(RawValue::Scalar(_))
    )
}

fn unrecognized(value: &RawValue, spec: &CollectionSpec) -> Error {
    Error::UnrecognizedShape {
        slot: spec.slot().to_string(),
        value: value.to_string(),
        attributes: spec.describe_attributes(),
    }
}

/// Classify the whole collection value.
///
/// A non-empty mapping is a single record whenever all of its keys are
/// declared attribute names; only otherwise is it read as keyed by record.
pub(crate) fn classify_form<'a>(raw: &'a RawValue, spec: &CollectionSpec) -> Result<Form<'a>> {
    match raw {
        RawValue::Null => Ok(Form::Absent),
        RawValue::Sequence(items) if items.is_empty() => Ok(Form::Empty),
        RawValue::Mapping(m) if m.is_empty() => Ok(Form::Empty),
        RawValue::Sequence(items) => Ok(Form::Sequence(items)),
        RawValue::Mapping(m) if looks_like_record(m, spec) => Ok(Form::SingleRecord(m)),
        RawValue::Mapping(m) => Ok(Form::MappingOfRecords(m)),
        RawValue::Scalar(_) => Err(unrecognized(raw, spec)),
    }
}

fn classify_payload<'a>(
    payload: &'a RawValue,
    context: &RawValue,
    spec: &CollectionSpec,
) -> Result<Payload<'a>> {
    match payload {
        RawValue::Null => Ok(Payload::Null),
        RawValue::Mapping(m) => Ok(Payload::Object(m)),
        RawValue::Scalar(s) => Ok(Payload::Scalar(s)),
        RawValue::Sequence(_) => Err(unrecognized(context, spec)),
    }
}

/// Classify one element of a sequence-of-entries
pub(crate) fn classify_element<'a>(
    element: &'a RawValue,
    spec: &CollectionSpec,
) -> Result<RawEntry<'a>> {
    match element {
        RawValue::Scalar(s) => Ok(RawEntry::Key(s)),
        RawValue::Sequence(items) => match items.split_first() {
            Some((RawValue::Scalar(key), values)) => Ok(RawEntry::Positional { key, values }),
            _ => Err(unrecognized(element, spec)),
        },
        RawValue::Mapping(m) if m.is_empty() => Err(unrecognized(element, spec)),
        RawValue::Mapping(m) if looks_like_record(m, spec) && carries_scalar_key(m, spec) => {
            Ok(RawEntry::Direct(m))
        }
        RawValue::Mapping(m) => match m.single_entry() {
            Some((key, payload)) => Ok(RawEntry::KeyedElement {
                key,
                payload: classify_payload(payload, element, spec)?,
            }),
            None if looks_like_record(m, spec) => Ok(RawEntry::Direct(m)),
            None => Err(unrecognized(element, spec)),
        },
        RawValue::Null => Err(unrecognized(element, spec)),
    }
}

/// Classify one `(outer_key, payload)` entry of a mapping-of-records
pub(crate) fn classify_entry<'a>(
    key: &'a str,
    payload: &'a RawValue,
    spec: &CollectionSpec,
) -> Result<RawEntry<'a>> {
    match payload {
        RawValue::Sequence(_) => {
            let context: Mapping = std::iter::once((key, payload.clone())).collect();
            Err(unrecognized(&RawValue::Mapping(context), spec))
        }
        _ => Ok(RawEntry::KeyedEntry {
            key,
            payload: classify_payload(payload, payload, spec)?,
        }),
    }
}
