//! Key/value extraction — turns a classified entry into a key plus
//! named attribute values.

use crate::spec::CollectionSpec;
use crate::value::{Mapping, RawValue, Scalar};
use crate::{Error, Result};

use super::classify::{Payload, RawEntry};

/// A key and its named values, ready for the builder
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct KeyedValues {
    pub key: Scalar,
    /// Key attribute value found inside the payload, if any
    pub declared_key: Option<Scalar>,
    pub values: Vec<(String, RawValue)>,
}

impl KeyedValues {
    fn key_only(key: Scalar) -> Self {
        Self {
            key,
            declared_key: None,
            values: Vec::new(),
        }
    }
}

pub(crate) fn mismatch(spec: &CollectionSpec, declared: &str, key: &str) -> Error {
    Error::KeyAttributeMismatch {
        slot: spec.slot().to_string(),
        attribute: spec.key_attribute().to_string(),
        declared: declared.to_string(),
        key: key.to_string(),
    }
}

fn overflow(spec: &CollectionSpec, key: &Scalar, supplied: usize) -> Error {
    Error::PositionalOverflow {
        slot: spec.slot().to_string(),
        key: key.key_text(),
        supplied,
        declared: spec.value_attributes().len(),
        attributes: spec.describe_value_attributes(),
    }
}

/// Extract the key and values implied by one classified entry
pub(crate) fn extract(entry: RawEntry<'_>, spec: &CollectionSpec) -> Result<KeyedValues> {
    match entry {
        RawEntry::Key(key) => Ok(KeyedValues::key_only(key.clone())),
        RawEntry::KeyedElement { key, payload } => {
            let key = Scalar::from(key);
            match payload {
                Payload::Scalar(value) => positional(key, std::slice::from_ref(value), spec),
                other => keyed_payload(key, other, spec),
            }
        }
        RawEntry::KeyedEntry { key, payload } => {
            let key = Scalar::from(key);
            match payload {
                Payload::Scalar(value) => scalar_shorthand(key, value, spec),
                other => keyed_payload(key, other, spec),
            }
        }
        RawEntry::Positional { key, values } => {
            let values: Vec<RawValue> = values.to_vec();
            positional_values(key.clone(), values, spec)
        }
        RawEntry::Direct(mapping) => direct(mapping, spec),
    }
}

fn keyed_payload(key: Scalar, payload: Payload<'_>, spec: &CollectionSpec) -> Result<KeyedValues> {
    match payload {
        Payload::Null => Ok(KeyedValues::key_only(key)),
        Payload::Object(mapping) => {
            let (declared_key, values) = named_values(mapping, spec)?;
            if let Some(declared) = &declared_key {
                if declared.key_text() != key.key_text() {
                    return Err(mismatch(spec, &declared.key_text(), &key.key_text()));
                }
            }
            Ok(KeyedValues {
                key,
                declared_key,
                values,
            })
        }
        Payload::Scalar(value) => positional(key, std::slice::from_ref(value), spec),
    }
}

fn positional(key: Scalar, values: &[Scalar], spec: &CollectionSpec) -> Result<KeyedValues> {
    let values = values.iter().cloned().map(RawValue::Scalar).collect();
    positional_values(key, values, spec)
}

/// Map values onto value attributes by declared position
fn positional_values(
    key: Scalar,
    values: Vec<RawValue>,
    spec: &CollectionSpec,
) -> Result<KeyedValues> {
    let declared = spec.value_attributes();
    if values.len() > declared.len() {
        return Err(overflow(spec, &key, values.len()));
    }
    let values = declared
        .iter()
        .cloned()
        .zip(values)
        .filter(|(_, v)| !v.is_null())
        .collect();
    Ok(KeyedValues {
        key,
        declared_key: None,
        values,
    })
}

/// `{key: scalar}` in a mapping-of-records: needs exactly one value attribute
fn scalar_shorthand(key: Scalar, value: &Scalar, spec: &CollectionSpec) -> Result<KeyedValues> {
    match spec.value_attributes() {
        [only] => Ok(KeyedValues {
            key,
            declared_key: None,
            values: vec![(only.clone(), RawValue::Scalar(value.clone()))],
        }),
        [] => Err(overflow(spec, &key, 1)),
        _ => Err(Error::AmbiguousScalarPayload {
            slot: spec.slot().to_string(),
            key: key.key_text(),
            value: value.to_string(),
            attributes: spec.describe_value_attributes(),
        }),
    }
}

/// A mapping with no outer key: the key attribute field is the key
fn direct(mapping: &Mapping, spec: &CollectionSpec) -> Result<KeyedValues> {
    let (declared_key, values) = named_values(mapping, spec)?;
    match declared_key {
        Some(key) => Ok(KeyedValues {
            key: key.clone(),
            declared_key: Some(key),
            values,
        }),
        None => Err(Error::MissingKeyAttribute {
            slot: spec.slot().to_string(),
            attribute: spec.key_attribute().to_string(),
            value: RawValue::Mapping(mapping.clone()).to_string(),
        }),
    }
}

/// Split a record-shaped mapping into its key attribute value and value
/// attributes. Undeclared names are rejected; null values are dropped.
fn named_values(
    mapping: &Mapping,
    spec: &CollectionSpec,
) -> Result<(Option<Scalar>, Vec<(String, RawValue)>)> {
    let mut declared_key = None;
    let mut values = Vec::new();
    for (name, value) in mapping.iter() {
        if name == spec.key_attribute() {
            match value {
                RawValue::Null => {}
                RawValue::Scalar(s) => declared_key = Some(s.clone()),
                other => {
                    return Err(Error::MissingKeyAttribute {
                        slot: spec.slot().to_string(),
                        attribute: name.to_string(),
                        value: other.to_string(),
                    })
                }
            }
        } else if spec.is_value_attribute(name) {
            if !value.is_null() {
                values.push((name.to_string(), value.clone()));
            }
        } else {
            return Err(Error::UnrecognizedShape {
                slot: spec.slot().to_string(),
                value: RawValue::Mapping(mapping.clone()).to_string(),
                attributes: spec.describe_attributes(),
            });
        }
    }
    Ok((declared_key, values))
}
