//! Import maps — rewrite schema import identifiers to concrete locations
//!
//! An import map is a flat table from CURIEs, URIs or names to file paths
//! or URLs. A key ending in `:` maps a whole prefix. Resolution tries the
//! prefix table, then a direct lookup, then namespace expansion through a
//! [`NamespaceResolver`], then one last lookup on the expanded form.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::{Error, Result};

/// Identifier → location
pub type ImportMap = BTreeMap<String, String>;

// ── Namespace resolution ──────────────────────────────────

/// Expands a CURIE (`prefix:local`) into a full URI
pub trait NamespaceResolver {
    fn uri_for(&self, curie: &str) -> Result<String>;
}

/// A prefix table with optional default and base namespaces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespaces {
    prefixes: BTreeMap<String, String>,
    default: Option<String>,
    base: Option<String>,
}

fn is_valid_prefix(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

impl Namespaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a prefix; a later mapping for the same prefix replaces the earlier one
    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Result<()> {
        let prefix = prefix.into();
        if !is_valid_prefix(&prefix) {
            return Err(Error::InvalidPrefix(prefix));
        }
        self.prefixes.insert(prefix, uri.into());
        Ok(())
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    pub fn set_default(&mut self, uri: impl Into<String>) {
        self.default = Some(uri.into());
    }

    pub fn set_base(&mut self, uri: impl Into<String>) {
        self.base = Some(uri.into());
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    /// Compact a URI using the longest matching namespace
    pub fn curie_for(&self, uri: &str) -> Option<String> {
        self.prefixes
            .iter()
            .filter(|(_, ns)| uri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len())
            .map(|(prefix, ns)| format!("{}:{}", prefix, &uri[ns.len()..]))
    }
}

impl NamespaceResolver for Namespaces {
    fn uri_for(&self, curie: &str) -> Result<String> {
        if curie.contains("://") {
            return Ok(curie.to_string());
        }
        match curie.split_once(':') {
            Some(("", local)) => self
                .default
                .as_ref()
                .map(|ns| format!("{}{}", ns, local))
                .ok_or_else(|| Error::UnknownPrefix("@default".into())),
            Some((prefix, local)) => self
                .prefixes
                .get(prefix)
                .map(|ns| format!("{}{}", ns, local))
                .ok_or_else(|| Error::UnknownPrefix(prefix.to_string())),
            None => self
                .base
                .as_ref()
                .map(|ns| format!("{}{}", ns, curie))
                .ok_or_else(|| Error::UnknownPrefix("@base".into())),
        }
    }
}

// ── Import map sources ────────────────────────────────────

/// Where an import map comes from
pub enum ImportMapSource<'a> {
    /// No map: every identifier resolves to itself
    None,
    /// An already-parsed table
    Mapping(ImportMap),
    /// Inline JSON (starts with `{`), inline YAML (contains whitespace), or a file path
    Text(String),
    /// A file on disk; its directory becomes the base
    Path(PathBuf),
    /// An open reader holding JSON or YAML text
    Reader(&'a mut dyn Read),
}

impl From<ImportMap> for ImportMapSource<'_> {
    fn from(map: ImportMap) -> Self {
        ImportMapSource::Mapping(map)
    }
}

impl From<&str> for ImportMapSource<'_> {
    fn from(text: &str) -> Self {
        ImportMapSource::Text(text.to_string())
    }
}

impl From<PathBuf> for ImportMapSource<'_> {
    fn from(path: PathBuf) -> Self {
        ImportMapSource::Path(path)
    }
}

fn looks_like_inline_yaml(text: &str) -> bool {
    text.contains('\n') || text.contains('\r') || text.contains(' ')
}

/// A value with a colon is a CURIE or URI, unless the colon starts a
/// Windows drive path
fn is_curie_or_uri(value: &str) -> bool {
    value.contains(':') && !value.contains(":\\")
}

/// JSON when the text opens an object, YAML otherwise. Empty YAML is an empty map.
fn parse_text(text: &str) -> Result<ImportMap> {
    if text.trim_start().starts_with('{') {
        return serde_json::from_str(text).map_err(|e| Error::MapParseFailure(e.to_string()));
    }
    let parsed: Option<ImportMap> =
        serde_yaml::from_str(text).map_err(|e| Error::MapParseFailure(e.to_string()))?;
    Ok(parsed.unwrap_or_default())
}

fn absolute(base: &Path) -> Result<PathBuf> {
    if base.is_absolute() {
        return Ok(base.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(base))
        .map_err(|source| Error::Io {
            path: base.to_path_buf(),
            source,
        })
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse an import map and make relative locations absolute against `base`.
///
/// Loading from a file always uses the file's own directory as base.
///
/// # Errors
/// `MapParseFailure` for malformed JSON/YAML; `Io` when a file or reader
/// cannot be read.
pub fn parse_import_map<'a>(
    source: impl Into<ImportMapSource<'a>>,
    base: Option<&Path>,
) -> Result<ImportMap> {
    let map = match source.into() {
        ImportMapSource::None => ImportMap::new(),
        ImportMapSource::Mapping(map) => map,
        ImportMapSource::Reader(reader) => {
            let mut text = String::new();
            reader.read_to_string(&mut text).map_err(|source| Error::Io {
                path: PathBuf::from("<reader>"),
                source,
            })?;
            parse_text(&text)?
        }
        ImportMapSource::Text(text)
            if text.trim_start().starts_with('{') || looks_like_inline_yaml(&text) =>
        {
            parse_text(&text)?
        }
        ImportMapSource::Text(path) => {
            return parse_import_map(ImportMapSource::Path(PathBuf::from(path)), base);
        }
        ImportMapSource::Path(path) => {
            let text = read_file(&path)?;
            debug!(path = %path.display(), "loaded import map");
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            return parse_import_map(ImportMapSource::Mapping(parse_text(&text)?), dir);
        }
    };

    match base.filter(|b| !b.as_os_str().is_empty()) {
        Some(base) => {
            let root = absolute(base)?;
            Ok(map
                .into_iter()
                .map(|(k, v)| {
                    if is_curie_or_uri(&v) {
                        (k, v)
                    } else {
                        (k, root.join(&v).to_string_lossy().into_owned())
                    }
                })
                .collect())
        }
        None => Ok(map),
    }
}

/// Look up one import identifier.
///
/// Order: prefix entry (`ex:` → URL concatenation or path join), direct
/// lookup, namespace expansion of anything still CURIE-shaped, and a
/// final lookup on the expanded form.
pub fn map_import(
    import_map: &ImportMap,
    namespaces: &dyn NamespaceResolver,
    import: &str,
) -> Result<String> {
    let mut sname = import.to_string();

    if let Some((prefix, local)) = import.split_once(':') {
        if let Some(expanded) = import_map.get(&format!("{}:", prefix)) {
            sname = if expanded.starts_with("http") {
                format!("{}{}", expanded, local)
            } else {
                Path::new(expanded).join(local).to_string_lossy().into_owned()
            };
            trace!(import, expanded = %sname, "prefix expansion");
        }
    }

    if let Some(mapped) = import_map.get(&sname) {
        sname = mapped.clone();
    }

    if is_curie_or_uri(&sname) {
        sname = namespaces.uri_for(&sname)?;
        trace!(import, uri = %sname, "namespace expansion");
    }

    let resolved = import_map.get(&sname).cloned().unwrap_or(sname);
    debug!(import, resolved = %resolved, "mapped import");
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> ImportMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn namespaces() -> Namespaces {
        let mut ns = Namespaces::new();
        ns.insert("linkml", "https://w3id.org/linkml/").unwrap();
        ns.insert("ex", "http://example.org/").unwrap();
        ns
    }

    // ── Namespaces ─────────────────────────────────────

    #[test]
    fn test_uri_for() {
        let mut ns = namespaces();
        ns.insert("dc", "http://example.org/dc/").unwrap();
        assert_eq!(ns.uri_for("dc:table").unwrap(), "http://example.org/dc/table");
        assert_eq!(ns.uri_for("http://something.org").unwrap(), "http://something.org");
        assert!(matches!(ns.uri_for("foo:bar"), Err(Error::UnknownPrefix(p)) if p == "foo"));
    }

    #[test]
    fn test_default_and_base() {
        let mut ns = Namespaces::new();
        assert_eq!(
            ns.uri_for("Base").unwrap_err().to_string(),
            "Unknown CURIE prefix: @base"
        );
        assert!(ns.uri_for(":Schema").is_err());
        ns.set_default("https://w3id.org/biolink/metamodel/");
        ns.set_base("http://example.org/base/");
        assert_eq!(
            ns.uri_for(":Schema").unwrap(),
            "https://w3id.org/biolink/metamodel/Schema"
        );
        assert_eq!(ns.uri_for("Base").unwrap(), "http://example.org/base/Base");
    }

    #[test]
    fn test_invalid_prefix() {
        let mut ns = Namespaces::new();
        assert!(matches!(
            ns.insert("123", "http://example.org/foo/"),
            Err(Error::InvalidPrefix(_))
        ));
        assert!(ns.is_empty());
    }

    #[test]
    fn test_curie_for_longest_match() {
        let mut ns = Namespaces::new();
        ns.insert("l1", "http://example.org/subset/").unwrap();
        ns.insert("l2", "http://example.org/subset/test/").unwrap();
        ns.insert("l3", "http://example.org/subset/t").unwrap();
        ns.insert("u1", "urn:example:").unwrap();
        assert_eq!(ns.curie_for("http://example.org/subset/foo").unwrap(), "l1:foo");
        assert_eq!(ns.curie_for("http://example.org/subset/test/foo").unwrap(), "l2:foo");
        assert_eq!(ns.curie_for("http://example.org/subset/table/foo").unwrap(), "l3:able/foo");
        assert_eq!(ns.curie_for("urn:example:foo").unwrap(), "u1:foo");
        assert_eq!(ns.curie_for("http://google.com/test"), None);
    }

    // ── Parsing ────────────────────────────────────────

    #[test]
    fn test_parse_none_and_mapping() {
        assert!(parse_import_map(ImportMapSource::None, None).unwrap().is_empty());
        let m = map(&[("a", "b")]);
        assert_eq!(parse_import_map(m.clone(), None).unwrap(), m);
    }

    #[test]
    fn test_parse_inline_json_and_yaml() {
        let json = parse_import_map(r#"{"ex:": "http://example.org/"}"#, None).unwrap();
        assert_eq!(json, map(&[("ex:", "http://example.org/")]));
        let yaml = parse_import_map("linkml:types: local/types\n", None).unwrap();
        assert_eq!(yaml, map(&[("linkml:types", "local/types")]));
    }

    #[test]
    fn test_parse_malformed() {
        let err = parse_import_map("{broken", None).unwrap_err();
        assert!(matches!(err, Error::MapParseFailure(_)));
        let err = parse_import_map("a: [unclosed\n", None).unwrap_err();
        assert!(matches!(err, Error::MapParseFailure(_)));
    }

    #[test]
    fn test_base_rewrites_relative_paths_only() {
        let m = map(&[
            ("a", "schemas/a"),
            ("b", "http://example.org/b"),
            ("c", "ex:c"),
            ("d", "C:\\schemas\\d"),
        ]);
        let out = parse_import_map(m, Some(Path::new("/root/base"))).unwrap();
        assert_eq!(out["a"], "/root/base/schemas/a");
        assert_eq!(out["b"], "http://example.org/b");
        assert_eq!(out["c"], "ex:c");
        assert!(out["d"].starts_with("/root/base/"));
    }

    #[test]
    fn test_parse_from_file_uses_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("importmap.yaml");
        std::fs::write(&path, "types: local/types\nremote: http://example.org/r\n").unwrap();
        let out = parse_import_map(path.clone(), None).unwrap();
        assert_eq!(
            out["types"],
            dir.path().join("local/types").to_string_lossy()
        );
        assert_eq!(out["remote"], "http://example.org/r");

        let as_text = parse_import_map(path.to_str().unwrap(), None).unwrap();
        assert_eq!(as_text, out);
    }

    #[test]
    fn test_parse_from_reader() {
        let mut reader = std::io::Cursor::new(r#"{"x": "y"}"#);
        let out = parse_import_map(ImportMapSource::Reader(&mut reader), None).unwrap();
        assert_eq!(out, map(&[("x", "y")]));
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse_import_map("no-such-importmap.json", None).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    // ── Lookup ─────────────────────────────────────────

    #[test]
    fn test_prefix_to_url() {
        let m = map(&[("ex:", "http://example.org/")]);
        assert_eq!(
            map_import(&m, &namespaces(), "ex:Thing").unwrap(),
            "http://example.org/Thing"
        );
    }

    #[test]
    fn test_prefix_to_directory() {
        let m = map(&[("linkml:", "/opt/linkml/model")]);
        assert_eq!(
            map_import(&m, &namespaces(), "linkml:types").unwrap(),
            "/opt/linkml/model/types"
        );
    }

    #[test]
    fn test_direct_lookup() {
        let m = map(&[("linkml:types", "/local/types")]);
        assert_eq!(
            map_import(&m, &namespaces(), "linkml:types").unwrap(),
            "/local/types"
        );
    }

    #[test]
    fn test_lookup_after_namespace_expansion() {
        let m = map(&[("https://w3id.org/linkml/types", "/cache/types")]);
        assert_eq!(
            map_import(&m, &namespaces(), "linkml:types").unwrap(),
            "/cache/types"
        );
    }

    #[test]
    fn test_unmapped_identifiers() {
        let m = ImportMap::new();
        assert_eq!(map_import(&m, &namespaces(), "local/schema").unwrap(), "local/schema");
        assert_eq!(
            map_import(&m, &namespaces(), "linkml:types").unwrap(),
            "https://w3id.org/linkml/types"
        );
        assert!(map_import(&m, &namespaces(), "nope:types").is_err());
    }

    #[test]
    fn test_windows_path_is_not_a_curie() {
        let m = ImportMap::new();
        assert_eq!(
            map_import(&m, &Namespaces::new(), "C:\\schemas\\core").unwrap(),
            "C:\\schemas\\core"
        );
    }
}
