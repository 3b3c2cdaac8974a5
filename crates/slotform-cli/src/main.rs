use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process;

use slotform_core::{
    map_import, merge_contexts, normalize, parse_import_map, Collection, CollectionSpec, Error,
    ImportMapSource, Namespaces, RawValue,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Slotform — normalize polymorphic record collections
///
/// Turn liberally-authored YAML/JSON collection values into one canonical,
/// validated record list; merge JSON-LD contexts; resolve import maps.
#[derive(Parser)]
#[command(name = "slotform", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a collection value to its canonical record list
    Normalize {
        /// Collection spec file (YAML or JSON)
        #[arg(long)]
        spec: PathBuf,
        /// YAML or JSON file holding the collection value
        file: PathBuf,
        /// Emit the compact key-indexed form instead of a list
        #[arg(long)]
        dict: bool,
    },

    /// Compute the semantic hash (SHA-256) of a normalized collection
    Hash {
        /// Collection spec file (YAML or JSON)
        #[arg(long)]
        spec: PathBuf,
        /// YAML or JSON file holding the collection value
        file: PathBuf,
    },

    /// Merge JSON-LD context sources into one @context document
    MergeContexts {
        /// Base IRI appended last as {"@base": ...}
        #[arg(long)]
        base: Option<String>,
        /// URIs, file names, or inline JSON-LD text, in order
        sources: Vec<String>,
    },

    /// Resolve schema import identifiers through an import map
    ResolveImport {
        /// Import map: file path, inline JSON, or inline YAML
        #[arg(long)]
        map: Option<String>,
        /// Directory that relative map locations are resolved against
        #[arg(long)]
        base: Option<PathBuf>,
        /// Namespace prefix used for CURIE expansion, as prefix=uri
        #[arg(long = "prefix", value_parser = parse_prefix)]
        prefixes: Vec<(String, String)>,
        /// Identifiers to resolve
        #[arg(required = true)]
        imports: Vec<String>,
    },

    /// Show version information
    Version,
}

fn parse_prefix(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(p, u)| (p.to_string(), u.to_string()))
        .ok_or_else(|| format!("expected prefix=uri, got '{}'", s))
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("SLOTFORM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// 1 = the input was rejected, 2 = the tool could not run
fn exit_code_for(err: &Error) -> i32 {
    match err {
        Error::Io { .. } | Error::InvalidSpec(_) => 2,
        _ => 1,
    }
}

fn report(err: &Error) -> i32 {
    eprintln!("{} [{}]: {}", "error".red().bold(), err.kind(), err);
    exit_code_for(err)
}

fn load_collection(spec: &Path, file: &Path) -> Result<Collection, i32> {
    debug!(spec = %spec.display(), file = %file.display(), "loading collection");
    let spec = CollectionSpec::load(spec).map_err(|e| report(&e))?;
    let text = std::fs::read_to_string(file).map_err(|source| {
        report(&Error::Io {
            path: file.to_path_buf(),
            source,
        })
    })?;
    let raw = RawValue::from_yaml_str(&text).map_err(|e| {
        eprintln!("{} [parse]: {}: {}", "error".red().bold(), file.display(), e);
        1
    })?;
    normalize(&raw, &spec).map_err(|e| report(&e))
}

fn print_json(value: &serde_json::Value) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            2
        }
    }
}

fn run_normalize(spec: &Path, file: &Path, dict: bool) -> i32 {
    match load_collection(spec, file) {
        Ok(collection) if dict => match collection.to_json_dict() {
            Some(json) => print_json(&json),
            None => {
                eprintln!(
                    "{} [dict-form]: keys of {} cannot be written as a mapping; use list output",
                    "error".red().bold(),
                    file.display()
                );
                1
            }
        },
        Ok(collection) => print_json(&collection.to_json_list()),
        Err(code) => code,
    }
}

fn run_hash(spec: &Path, file: &Path) -> i32 {
    match load_collection(spec, file) {
        Ok(collection) => {
            println!("{}", collection.semantic_hash());
            0
        }
        Err(code) => code,
    }
}

fn run_merge_contexts(sources: Vec<String>, base: Option<&str>) -> i32 {
    debug!(sources = sources.len(), base, "merging contexts");
    match merge_contexts(sources, base) {
        Ok(Some(merged)) => print_json(&merged),
        Ok(None) => {
            println!("null");
            0
        }
        Err(e) => report(&e),
    }
}

fn run_resolve_import(
    map: Option<String>,
    base: Option<&Path>,
    prefixes: Vec<(String, String)>,
    imports: &[String],
) -> i32 {
    let source = match map {
        Some(text) => ImportMapSource::Text(text),
        None => ImportMapSource::None,
    };
    let import_map = match parse_import_map(source, base) {
        Ok(m) => m,
        Err(e) => return report(&e),
    };
    debug!(entries = import_map.len(), "import map loaded");

    let mut namespaces = Namespaces::new();
    for (prefix, uri) in prefixes {
        if let Err(e) = namespaces.insert(prefix, uri) {
            return report(&e);
        }
    }

    for import in imports {
        match map_import(&import_map, &namespaces, import) {
            Ok(location) => println!("{}", location),
            Err(e) => return report(&e),
        }
    }
    0
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let exit_code = match cli.command {
        Commands::Normalize { spec, file, dict } => run_normalize(&spec, &file, dict),
        Commands::Hash { spec, file } => run_hash(&spec, &file),
        Commands::MergeContexts { base, sources } => run_merge_contexts(sources, base.as_deref()),
        Commands::ResolveImport {
            map,
            base,
            prefixes,
            imports,
        } => run_resolve_import(map, base.as_deref(), prefixes, &imports),
        Commands::Version => {
            println!(
                "slotform {} (slotform-core {})",
                env!("CARGO_PKG_VERSION"),
                slotform_core::VERSION
            );
            0
        }
    };

    process::exit(exit_code);
}
