//! Collection specs — the schema metadata for one collection-valued slot
//!
//! A spec names the key attribute and the value attributes in their
//! declared order. It can be built in code or loaded from YAML/JSON:
//!
//! ```yaml
//! slot: ev
//! key_attribute: s1
//! value_attributes: [s2, s3]
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

fn default_slot() -> String {
    "items".to_string()
}

/// Key attribute plus ordered value attributes for one slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSpec", into = "RawSpec")]
pub struct CollectionSpec {
    slot: String,
    key_attribute: String,
    value_attributes: Vec<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSpec {
    #[serde(default = "default_slot")]
    slot: String,
    key_attribute: String,
    #[serde(default)]
    value_attributes: Vec<String>,
}

impl TryFrom<RawSpec> for CollectionSpec {
    type Error = Error;

    fn try_from(raw: RawSpec) -> Result<Self> {
        CollectionSpec::new(raw.key_attribute, raw.value_attributes).map(|s| s.with_slot(raw.slot))
    }
}

impl From<CollectionSpec> for RawSpec {
    fn from(spec: CollectionSpec) -> Self {
        RawSpec {
            slot: spec.slot,
            key_attribute: spec.key_attribute,
            value_attributes: spec.value_attributes,
        }
    }
}

impl CollectionSpec {
    /// Build a spec, rejecting empty names, duplicates, and a key attribute
    /// that is also listed as a value attribute.
    pub fn new<K, I, V>(key_attribute: K, value_attributes: I) -> Result<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let key_attribute = key_attribute.into();
        let value_attributes: Vec<String> =
            value_attributes.into_iter().map(Into::into).collect();

        if key_attribute.is_empty() {
            return Err(Error::InvalidSpec("key attribute name is empty".into()));
        }
        let mut seen = BTreeSet::new();
        for attr in &value_attributes {
            if attr.is_empty() {
                return Err(Error::InvalidSpec("value attribute name is empty".into()));
            }
            if *attr == key_attribute {
                return Err(Error::InvalidSpec(format!(
                    "key attribute {} is also declared as a value attribute",
                    key_attribute
                )));
            }
            if !seen.insert(attr.as_str()) {
                return Err(Error::InvalidSpec(format!(
                    "value attribute {} is declared more than once",
                    attr
                )));
            }
        }

        Ok(Self {
            slot: default_slot(),
            key_attribute,
            value_attributes,
        })
    }

    /// Name the owning slot (used in diagnostics only)
    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = slot.into();
        self
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn key_attribute(&self) -> &str {
        &self.key_attribute
    }

    pub fn value_attributes(&self) -> &[String] {
        &self.value_attributes
    }

    /// True for the key attribute or any declared value attribute
    pub fn is_declared(&self, name: &str) -> bool {
        name == self.key_attribute || self.is_value_attribute(name)
    }

    pub fn is_value_attribute(&self, name: &str) -> bool {
        self.value_attributes.iter().any(|a| a == name)
    }

    /// All declared names, key first, comma-separated, for error messages
    pub fn describe_attributes(&self) -> String {
        std::iter::once(self.key_attribute.as_str())
            .chain(self.value_attributes.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn describe_value_attributes(&self) -> String {
        format!("[{}]", self.value_attributes.join(", "))
    }

    // ── Loading ───────────────────────────────────────────

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::InvalidSpec(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::InvalidSpec(e.to_string()))
    }

    /// Load a spec file; YAML also covers JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }
}
