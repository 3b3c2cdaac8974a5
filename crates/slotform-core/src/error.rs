//! Error types for Slotform
//!
//! All fallible operations return `Result<T, Error>`.
//! Normalization errors carry the slot name, the offending key or value,
//! and the declared attribute names so a failed construction can be
//! diagnosed without re-running it.

use std::path::PathBuf;

/// Slotform error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An input element matches none of the accepted collection forms
    #[error("Slot: {slot} - unrecognized entry shape {value} (attributes: {attributes})")]
    UnrecognizedShape {
        slot: String,
        value: String,
        attributes: String,
    },

    /// An explicit key attribute inside a payload conflicts with the outer key
    #[error("Slot: {slot} - attribute {attribute} value ({declared}) does not match key ({key})")]
    KeyAttributeMismatch {
        slot: String,
        attribute: String,
        declared: String,
        key: String,
    },

    /// Two entries resolve to the same key attribute value
    #[error("Slot: {slot} - {key}: duplicate key")]
    DuplicateKey { slot: String, key: String },

    /// More positional values than declared value attributes
    #[error(
        "Slot: {slot} - key ({key}) supplies {supplied} positional values but only {declared} value attributes are declared ({attributes})"
    )]
    PositionalOverflow {
        slot: String,
        key: String,
        supplied: usize,
        declared: usize,
        attributes: String,
    },

    /// Scalar shorthand used while more than one value attribute is declared
    #[error(
        "Slot: {slot} - scalar value ({value}) for key ({key}) is ambiguous: declared value attributes are {attributes}"
    )]
    AmbiguousScalarPayload {
        slot: String,
        key: String,
        value: String,
        attributes: String,
    },

    /// A record-shaped mapping that does not carry a usable key attribute value
    #[error("Slot: {slot} - record {value} has no value for key attribute {attribute}")]
    MissingKeyAttribute {
        slot: String,
        attribute: String,
        value: String,
    },

    /// The collection spec itself is malformed
    #[error("Invalid collection spec: {0}")]
    InvalidSpec(String),

    /// Malformed JSON/YAML supplied as an import map
    #[error("Import map parse error: {0}")]
    MapParseFailure(String),

    /// Malformed JSON-LD context text
    #[error("Context parse error: {0}")]
    ContextParseFailure(String),

    /// A CURIE prefix with no namespace mapping
    #[error("Unknown CURIE prefix: {0}")]
    UnknownPrefix(String),

    /// A namespace prefix that is not a valid name
    #[error("Invalid namespace prefix: {0}")]
    InvalidPrefix(String),

    /// Reading a source file failed
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Short category name, stable across message wording changes
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnrecognizedShape { .. } => "unrecognized-shape",
            Error::KeyAttributeMismatch { .. } => "key-attribute-mismatch",
            Error::DuplicateKey { .. } => "duplicate-key",
            Error::PositionalOverflow { .. } => "positional-overflow",
            Error::AmbiguousScalarPayload { .. } => "ambiguous-scalar-payload",
            Error::MissingKeyAttribute { .. } => "missing-key-attribute",
            Error::InvalidSpec(_) => "invalid-spec",
            Error::MapParseFailure(_) => "map-parse-failure",
            Error::ContextParseFailure(_) => "context-parse-failure",
            Error::UnknownPrefix(_) => "unknown-prefix",
            Error::InvalidPrefix(_) => "invalid-prefix",
            Error::Io { .. } => "io",
        }
    }

    /// True for errors raised by the collection normalizer itself
    pub fn is_normalization(&self) -> bool {
        matches!(
            self,
            Error::UnrecognizedShape { .. }
                | Error::KeyAttributeMismatch { .. }
                | Error::DuplicateKey { .. }
                | Error::PositionalOverflow { .. }
                | Error::AmbiguousScalarPayload { .. }
                | Error::MissingKeyAttribute { .. }
        )
    }
}

/// Result type alias for Slotform operations
pub type Result<T> = std::result::Result<T, Error>;
