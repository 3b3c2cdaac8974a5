//! Slotform Core - canonical normalization of schema-declared record collections
//!
//! This is the single source of truth for Slotform semantics.
//! The CLI and all language bindings call into this same core.
//!
//! # Architecture
//!
//! ```text
//! YAML/JSON → RawValue → Normalizer → Collection (ordered Records)
//!                            ↑
//!                      CollectionSpec (key attribute + value attributes)
//!
//! context sources → merge_contexts → @context document
//! import map      → parse_import_map → map_import(id) → location
//! ```
//!
//! # Guarantees
//!
//! - **Liberal in, strict out**: many authored shapes, one canonical form
//! - **Deterministic**: same input always produces identical output
//! - **Order preserving**: records keep first-seen key order
//! - **Stateless**: every call is independent and reentrant

pub mod context;
pub mod error;
pub mod import_map;
pub mod normalizer;
pub mod record;
pub mod spec;
pub mod value;

pub use context::{merge_contexts, ContextSource, Contexts};
pub use error::{Error, Result};
pub use import_map::{
    map_import, parse_import_map, ImportMap, ImportMapSource, NamespaceResolver, Namespaces,
};
pub use normalizer::{normalize, normalize_json};
pub use record::{Collection, Record};
pub use spec::CollectionSpec;
pub use value::{Mapping, RawValue, Scalar};

/// Version of the slotform-core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
