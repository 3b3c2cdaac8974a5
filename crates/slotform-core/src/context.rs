//! JSON-LD context merging
//!
//! Aggregates an ordered list of context sources into one `@context`
//! document that can be attached to the root of any JSON object before
//! conversion to RDF. `@base` is ignored inside imported and nested
//! contexts, so a requested base is always appended last at the root.

use serde_json::{json, Value};
use tracing::debug;

use crate::{Error, Result};

/// One context source
#[derive(Debug, Clone, PartialEq)]
pub enum ContextSource {
    /// A URI, a local file name, or inline JSON-LD text
    Text(String),
    /// An already-structured context object
    Object(Value),
}

impl From<&str> for ContextSource {
    fn from(s: &str) -> Self {
        ContextSource::Text(s.to_string())
    }
}

impl From<String> for ContextSource {
    fn from(s: String) -> Self {
        ContextSource::Text(s)
    }
}

impl From<Value> for ContextSource {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => ContextSource::Text(s),
            other => ContextSource::Object(other),
        }
    }
}

/// None, one, or an ordered list of context sources
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Contexts {
    #[default]
    None,
    One(ContextSource),
    Many(Vec<ContextSource>),
}

impl Contexts {
    fn into_sources(self) -> Vec<ContextSource> {
        match self {
            Contexts::None => Vec::new(),
            Contexts::One(source) => vec![source],
            Contexts::Many(sources) => sources,
        }
    }
}

impl<T: Into<ContextSource>> From<Vec<T>> for Contexts {
    fn from(sources: Vec<T>) -> Self {
        Contexts::Many(sources.into_iter().map(Into::into).collect())
    }
}

impl From<ContextSource> for Contexts {
    fn from(source: ContextSource) -> Self {
        Contexts::One(source)
    }
}

impl From<&str> for Contexts {
    fn from(s: &str) -> Self {
        Contexts::One(ContextSource::from(s))
    }
}

impl<T: Into<Contexts>> From<Option<T>> for Contexts {
    fn from(contexts: Option<T>) -> Self {
        contexts.map(Into::into).unwrap_or_default()
    }
}

/// Strip an enclosing `{"@context": ...}` wrapper
fn prune_context_node(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("@context") => {
            map.remove("@context").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn to_file_uri(name: &str) -> String {
    format!("file://{}", name)
}

fn resolve_source(source: ContextSource) -> Result<Value> {
    let value = match source {
        ContextSource::Text(text) if text.trim_start().starts_with('{') => {
            serde_json::from_str::<Value>(&text)
                .map_err(|e| Error::ContextParseFailure(e.to_string()))?
        }
        ContextSource::Text(text) if !text.contains("://") => Value::String(to_file_uri(&text)),
        ContextSource::Text(text) => Value::String(text),
        ContextSource::Object(value) => value,
    };
    Ok(prune_context_node(value))
}

/// Merge context sources, appending `{"@base": base}` last when given.
///
/// Returns `None` when there is nothing to merge, `{"@context": payload}`
/// for a single entry, and `{"@context": [payload, ...]}` otherwise.
///
/// # Errors
/// `ContextParseFailure` for malformed inline JSON-LD text.
pub fn merge_contexts(contexts: impl Into<Contexts>, base: Option<&str>) -> Result<Option<Value>> {
    let mut context_list = contexts
        .into()
        .into_sources()
        .into_iter()
        .map(resolve_source)
        .collect::<Result<Vec<_>>>()?;

    if let Some(base) = base.filter(|b| !b.is_empty()) {
        context_list.push(json!({ "@base": base }));
    }

    debug!(entries = context_list.len(), "merged contexts");
    Ok(match context_list.len() {
        0 => None,
        1 => context_list.pop().map(|only| json!({ "@context": only })),
        _ => Some(json!({ "@context": context_list })),
    })
}
