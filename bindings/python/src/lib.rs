//! Python bindings for Slotform
//!
//! Thin wrapper around `slotform-core` — ZERO logic here.
//! All behavior comes from the canonical Rust implementation.

use std::path::Path;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use slotform_core::{Collection, CollectionSpec, Namespaces, RawValue};

fn to_py_err(e: slotform_core::Error) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn normalize_text(value: &str, spec: &str) -> PyResult<Collection> {
    let spec = CollectionSpec::from_yaml_str(spec).map_err(to_py_err)?;
    let raw = RawValue::from_yaml_str(value)
        .map_err(|e| PyValueError::new_err(format!("Parse error: {}", e)))?;
    slotform_core::normalize(&raw, &spec).map_err(to_py_err)
}

fn to_json_string(value: &serde_json::Value) -> PyResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| PyValueError::new_err(format!("Serialization error: {}", e)))
}

/// Normalize a collection value to its canonical record list.
///
/// Args:
///     value: JSON or YAML text of the collection value
///     spec: JSON or YAML text of the collection spec
///         {"slot": "ev", "key_attribute": "s1", "value_attributes": ["s2", "s3"]}
///     as_dict: emit the compact key-indexed form instead of a list;
///         refused when the keys would not read back as the same collection
///
/// Returns:
///     JSON string of the canonical collection
///
/// Raises:
///     ValueError: If the value matches no accepted form, repeats a key,
///         or contradicts its own key
#[pyfunction]
#[pyo3(signature = (value, spec, as_dict = false))]
fn normalize(value: &str, spec: &str, as_dict: bool) -> PyResult<String> {
    let collection = normalize_text(value, spec)?;
    if as_dict {
        let dict = collection.to_json_dict().ok_or_else(|| {
            PyValueError::new_err(
                "collection keys cannot be written as a mapping; use the list form",
            )
        })?;
        to_json_string(&dict)
    } else {
        to_json_string(&collection.to_json_list())
    }
}

/// Compute the SHA-256 semantic hash of a normalized collection.
///
/// Equivalent authored forms produce the same hash.
#[pyfunction]
fn semantic_hash(value: &str, spec: &str) -> PyResult<String> {
    Ok(normalize_text(value, spec)?.semantic_hash())
}

/// Merge JSON-LD context sources.
///
/// Args:
///     contexts: JSON text — a string, an object, or a list of them
///     base: optional base IRI, always appended last
///
/// Returns:
///     JSON string of the merged {"@context": ...} document, or None
#[pyfunction]
#[pyo3(signature = (contexts, base = None))]
fn merge_contexts(contexts: &str, base: Option<&str>) -> PyResult<Option<String>> {
    let parsed: serde_json::Value = serde_json::from_str(contexts)
        .map_err(|e| PyValueError::new_err(format!("Parse error: {}", e)))?;
    let sources: slotform_core::Contexts = match parsed {
        serde_json::Value::Null => slotform_core::Contexts::None,
        serde_json::Value::Array(items) => items.into(),
        other => slotform_core::ContextSource::from(other).into(),
    };
    match slotform_core::merge_contexts(sources, base).map_err(to_py_err)? {
        Some(merged) => to_json_string(&merged).map(Some),
        None => Ok(None),
    }
}

/// Parse an import map (file path, inline JSON, or inline YAML).
///
/// Returns:
///     JSON string of the identifier → location table
#[pyfunction]
#[pyo3(signature = (source, base = None))]
fn parse_import_map(source: &str, base: Option<&str>) -> PyResult<String> {
    let map = slotform_core::parse_import_map(source, base.map(Path::new)).map_err(to_py_err)?;
    serde_json::to_string_pretty(&map)
        .map_err(|e| PyValueError::new_err(format!("Serialization error: {}", e)))
}

/// Resolve one import identifier.
///
/// Args:
///     source: import map (file path, inline JSON, or inline YAML)
///     prefixes: JSON object of namespace prefix → URI
///     import_: the identifier to resolve
#[pyfunction]
fn map_import(source: &str, prefixes: &str, import_: &str) -> PyResult<String> {
    let map = slotform_core::parse_import_map(source, None).map_err(to_py_err)?;
    let table: std::collections::BTreeMap<String, String> = serde_json::from_str(prefixes)
        .map_err(|e| PyValueError::new_err(format!("Parse error: {}", e)))?;
    let mut namespaces = Namespaces::new();
    for (prefix, uri) in table {
        namespaces.insert(prefix, uri).map_err(to_py_err)?;
    }
    slotform_core::map_import(&map, &namespaces, import_).map_err(to_py_err)
}

/// Slotform Python module — canonical record collections
#[pymodule]
fn slotform(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(normalize, m)?)?;
    m.add_function(wrap_pyfunction!(semantic_hash, m)?)?;
    m.add_function(wrap_pyfunction!(merge_contexts, m)?)?;
    m.add_function(wrap_pyfunction!(parse_import_map, m)?)?;
    m.add_function(wrap_pyfunction!(map_import, m)?)?;
    Ok(())
}
