//! Raw input model — untrusted values decoded from YAML/JSON
//!
//! `RawValue` holds a collection field exactly as the author wrote it,
//! before any schema knowledge is applied. Mappings are an explicit
//! ordered association list: document order is part of the value and is
//! what the normalizer uses to order the records it emits.

use std::fmt;

// ── Scalars ───────────────────────────────────────────────

/// A leaf value that can serve as a record key
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    /// Text form used for key identity and diagnostics.
    ///
    /// Strings are returned without quotes, so `"1"` and `1` share an identity.
    pub fn key_text(&self) -> String {
        match self {
            Scalar::Boolean(b) => b.to_string(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::String(s) => s.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Boolean(b) => serde_json::Value::Bool(*b),
            Scalar::Integer(i) => serde_json::json!(*i),
            Scalar::Float(f) => serde_json::json!(*f),
            Scalar::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String(s) => write!(f, "\"{}\"", s),
            other => write!(f, "{}", other.key_text()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Integer(i)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Boolean(b)
    }
}

// ── Mapping ───────────────────────────────────────────────

/// Insertion-ordered string-keyed mapping
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping {
    entries: Vec<(String, RawValue)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert or replace; a replaced entry keeps its original position
    pub fn insert(&mut self, key: impl Into<String>, value: RawValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// The sole entry of a one-entry mapping
    pub fn single_entry(&self) -> Option<(&str, &RawValue)> {
        match self.entries.as_slice() {
            [(k, v)] => Some((k.as_str(), v)),
            _ => None,
        }
    }
}

impl<K: Into<String>> FromIterator<(K, RawValue)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, RawValue)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

// ── RawValue ──────────────────────────────────────────────

/// A generic decoded value: null, scalar, sequence or mapping
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    #[default]
    Null,
    Scalar(Scalar),
    Sequence(Vec<RawValue>),
    Mapping(Mapping),
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            RawValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            RawValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Scalar(Scalar::Boolean(_)) => "boolean",
            RawValue::Scalar(Scalar::Integer(_)) => "integer",
            RawValue::Scalar(Scalar::Float(_)) => "float",
            RawValue::Scalar(Scalar::String(_)) => "string",
            RawValue::Sequence(_) => "sequence",
            RawValue::Mapping(_) => "mapping",
        }
    }

    /// Convert from serde_json::Value, keeping object key order
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => RawValue::Null,
            serde_json::Value::Bool(b) => RawValue::Scalar(Scalar::Boolean(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => RawValue::Scalar(Scalar::Integer(i)),
                None => n
                    .as_f64()
                    .map(|f| RawValue::Scalar(Scalar::Float(f)))
                    .unwrap_or(RawValue::Null),
            },
            serde_json::Value::String(s) => RawValue::Scalar(Scalar::String(s.clone())),
            serde_json::Value::Array(arr) => {
                RawValue::Sequence(arr.iter().map(RawValue::from_json).collect())
            }
            serde_json::Value::Object(map) => RawValue::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), RawValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert from serde_yaml::Value. Non-string mapping keys use their text form;
    /// tags are dropped.
    pub fn from_yaml(yaml: &serde_yaml::Value) -> Self {
        match yaml {
            serde_yaml::Value::Null => RawValue::Null,
            serde_yaml::Value::Bool(b) => RawValue::Scalar(Scalar::Boolean(*b)),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => RawValue::Scalar(Scalar::Integer(i)),
                None => n
                    .as_f64()
                    .map(|f| RawValue::Scalar(Scalar::Float(f)))
                    .unwrap_or(RawValue::Null),
            },
            serde_yaml::Value::String(s) => RawValue::Scalar(Scalar::String(s.clone())),
            serde_yaml::Value::Sequence(seq) => {
                RawValue::Sequence(seq.iter().map(RawValue::from_yaml).collect())
            }
            serde_yaml::Value::Mapping(map) => RawValue::Mapping(
                map.iter()
                    .map(|(k, v)| (yaml_key_text(k), RawValue::from_yaml(v)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => RawValue::from_yaml(&tagged.value),
        }
    }

    /// Parse YAML (or JSON, which YAML accepts) text
    pub fn from_yaml_str(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
        Ok(RawValue::from_yaml(&yaml))
    }

    /// Convert to serde_json::Value
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            RawValue::Null => serde_json::Value::Null,
            RawValue::Scalar(s) => s.to_json(),
            RawValue::Sequence(seq) => {
                serde_json::Value::Array(seq.iter().map(RawValue::to_json).collect())
            }
            RawValue::Mapping(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

fn yaml_key_text(key: &serde_yaml::Value) -> String {
    match RawValue::from_yaml(key) {
        RawValue::Scalar(s) => s.key_text(),
        RawValue::Null => "null".to_string(),
        other => other.to_string(),
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => write!(f, "null"),
            RawValue::Scalar(s) => write!(f, "{}", s),
            RawValue::Sequence(seq) => {
                write!(f, "[")?;
                for (i, v) in seq.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            RawValue::Mapping(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\": {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(json: serde_json::Value) -> Self {
        RawValue::from_json(&json)
    }
}

impl From<Scalar> for RawValue {
    fn from(s: Scalar) -> Self {
        RawValue::Scalar(s)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Scalar(Scalar::from(s))
    }
}

impl From<Mapping> for RawValue {
    fn from(m: Mapping) -> Self {
        RawValue::Mapping(m)
    }
}

impl From<Vec<RawValue>> for RawValue {
    fn from(seq: Vec<RawValue>) -> Self {
        RawValue::Sequence(seq)
    }
}
