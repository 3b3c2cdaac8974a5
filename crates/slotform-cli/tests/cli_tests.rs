//! Integration tests for the Slotform CLI
//!
//! These tests invoke the actual slotform binary and verify:
//! - Exit codes (0 = success, 1 = input rejected, 2 = error)
//! - stdout/stderr output
//! - JSON output format
//! - All commands work end-to-end

use std::path::PathBuf;
use std::process::Command;

// ── Helpers ───────────────────────────────────────────────

fn slotform_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_slotform"))
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(format!("../../tests/fixtures/{}", name))
}

fn fixture_str(name: &str) -> String {
    fixture(name).to_str().unwrap().to_string()
}

fn run_slotform(args: &[&str]) -> std::process::Output {
    Command::new(slotform_bin())
        .args(args)
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env_remove("SLOTFORM_LOG")
        .output()
        .expect("failed to execute slotform")
}

fn normalize_fixture(spec: &str, input: &str, extra: &[&str]) -> std::process::Output {
    let spec = fixture_str(spec);
    let input = fixture_str(input);
    let mut args = vec!["normalize", "--spec", spec.as_str(), input.as_str()];
    args.extend_from_slice(extra);
    run_slotform(&args)
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("should be valid JSON")
}

// ── Version ───────────────────────────────────────────────

#[test]
fn test_version_command() {
    let output = run_slotform(&["version"]);
    assert!(output.status.success(), "version should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("slotform"), "should contain 'slotform'");
    assert!(
        stdout.contains(env!("CARGO_PKG_VERSION")),
        "should contain version"
    );
    assert!(stdout.contains(&format!("slotform-core {}", slotform_core::VERSION)));
}

#[test]
fn test_version_flag() {
    let output = run_slotform(&["--version"]);
    assert!(output.status.success(), "--version should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

// ── Normalize ─────────────────────────────────────────────

#[test]
fn test_normalize_list_of_keys() {
    let output = normalize_fixture("spec-ev.yaml", "valid/list-of-keys.yaml", &[]);
    assert!(output.status.success(), "valid collection should exit 0");
    assert_eq!(
        stdout_json(&output),
        serde_json::json!([
            {"s1": "k1", "s2": null, "s3": null},
            {"s1": "k2", "s2": null, "s3": null}
        ])
    );
}

#[test]
fn test_normalize_mixed_forms() {
    let output = normalize_fixture("spec-ev.yaml", "valid/mixed-forms.yaml", &[]);
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        serde_json::json!([
            {"s1": "k1", "s2": null, "s3": null},
            {"s1": "k2", "s2": "v2", "s3": null},
            {"s1": "k3", "s2": "v32", "s3": "v33"},
            {"s1": "k4", "s2": null, "s3": "v43"},
            {"s1": "k5", "s2": "v52", "s3": null}
        ])
    );
}

#[test]
fn test_normalize_dict_output() {
    let output = normalize_fixture("spec-ev.yaml", "valid/mapping-of-objects.yaml", &["--dict"]);
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        serde_json::json!({
            "k1": {"s2": "v12", "s3": "v13"},
            "k2": {"s3": "v23"},
            "k3": {}
        })
    );
}

#[test]
fn test_normalize_dict_output_refused_for_attribute_keys() {
    let output = normalize_fixture("spec-ev.yaml", "valid/attribute-keys.yaml", &["--dict"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("dict-form"));
    assert!(output.stdout.is_empty());

    let output = normalize_fixture("spec-ev.yaml", "valid/attribute-keys.yaml", &[]);
    assert!(output.status.success(), "list output still works");
    assert_eq!(stdout_json(&output)[0]["s1"], "s2");
}

#[test]
fn test_normalize_key_values_single_attribute() {
    let output = normalize_fixture("spec-single.yaml", "valid/key-values.yaml", &[]);
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        serde_json::json!([{"s1": "k1", "s2": "v11"}, {"s1": "k2", "s2": "v21"}])
    );
}

#[test]
fn test_normalize_key_values_ambiguous() {
    let output = normalize_fixture("spec-ev.yaml", "valid/key-values.yaml", &[]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ambiguous-scalar-payload"));
}

#[test]
fn test_normalize_duplicate_key() {
    let output = normalize_fixture("spec-ev.yaml", "invalid/duplicate-key.yaml", &[]);
    assert_eq!(output.status.code(), Some(1), "duplicate key should exit 1");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("k1: duplicate key"));
    assert!(output.stdout.is_empty(), "no partial output on failure");
}

#[test]
fn test_normalize_key_mismatch() {
    let output = normalize_fixture("spec-ev.yaml", "invalid/key-mismatch.yaml", &[]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Slot: ev - attribute s1 value (k2) does not match key (k1)"));
}

#[test]
fn test_normalize_positional_overflow() {
    let output = normalize_fixture("spec-ev.yaml", "invalid/positional-overflow.yaml", &[]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("positional-overflow"));
}

#[test]
fn test_normalize_malformed_yaml() {
    let output = normalize_fixture("spec-ev.yaml", "invalid/malformed.yaml", &[]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"));
}

#[test]
fn test_normalize_invalid_spec() {
    let output = normalize_fixture("spec-invalid.yaml", "valid/list-of-keys.yaml", &[]);
    assert_eq!(output.status.code(), Some(2), "invalid spec should exit 2");
}

#[test]
fn test_normalize_nonexistent_file() {
    let spec = fixture_str("spec-ev.yaml");
    let output = run_slotform(&["normalize", "--spec", &spec, "nonexistent.yaml"]);
    assert_eq!(output.status.code(), Some(2), "missing file should exit 2");
}

// ── Hash ──────────────────────────────────────────────────

#[test]
fn test_hash_equivalent_forms_match() {
    let spec = fixture_str("spec-ev.yaml");
    let a = run_slotform(&["hash", "--spec", &spec, &fixture_str("valid/mapping-of-objects.yaml")]);
    let b = run_slotform(&["hash", "--spec", &spec, &fixture_str("valid/equivalent-forms.json")]);
    assert!(a.status.success());
    assert!(b.status.success());
    let hash_a = String::from_utf8_lossy(&a.stdout).trim().to_string();
    let hash_b = String::from_utf8_lossy(&b.stdout).trim().to_string();
    assert_eq!(hash_a.len(), 64);
    assert_eq!(hash_a, hash_b);
}

#[test]
fn test_hash_differs_for_different_collections() {
    let spec = fixture_str("spec-ev.yaml");
    let a = run_slotform(&["hash", "--spec", &spec, &fixture_str("valid/list-of-keys.yaml")]);
    let b = run_slotform(&["hash", "--spec", &spec, &fixture_str("valid/mixed-forms.yaml")]);
    assert_ne!(a.stdout, b.stdout);
}

// ── Merge contexts ────────────────────────────────────────

#[test]
fn test_merge_contexts_with_base() {
    let output = run_slotform(&[
        "merge-contexts",
        "--base",
        "http://x/",
        "a.jsonld",
        "b.jsonld",
    ]);
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        serde_json::json!({
            "@context": ["file://a.jsonld", "file://b.jsonld", {"@base": "http://x/"}]
        })
    );
}

#[test]
fn test_merge_contexts_inline_json() {
    let output = run_slotform(&[
        "merge-contexts",
        r#"{"@context": {"ex": "http://example.org/"}}"#,
    ]);
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        serde_json::json!({"@context": {"ex": "http://example.org/"}})
    );
}

#[test]
fn test_merge_contexts_nothing() {
    let output = run_slotform(&["merge-contexts"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "null");
}

#[test]
fn test_merge_contexts_malformed() {
    let output = run_slotform(&["merge-contexts", "{oops"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("context-parse-failure"));
}

// ── Resolve import ────────────────────────────────────────

#[test]
fn test_resolve_import_inline_map() {
    let output = run_slotform(&[
        "resolve-import",
        "--map",
        r#"{"ex:": "http://example.org/"}"#,
        "ex:Thing",
    ]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "http://example.org/Thing"
    );
}

#[test]
fn test_resolve_import_map_file() {
    let map = fixture("import-maps/importmap.yaml");
    let output = run_slotform(&[
        "resolve-import",
        "--map",
        map.to_str().unwrap(),
        "linkml:types",
        "local",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "https://w3id.org/linkml/types");
    assert!(lines[1].ends_with("schemas/local"));
    assert!(PathBuf::from(lines[1]).is_absolute());
}

#[test]
fn test_resolve_import_with_prefixes() {
    let output = run_slotform(&[
        "resolve-import",
        "--prefix",
        "ex=http://example.org/",
        "ex:Thing",
    ]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "http://example.org/Thing"
    );
}

#[test]
fn test_resolve_import_unknown_prefix() {
    let output = run_slotform(&["resolve-import", "nope:Thing"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown CURIE prefix: nope"));
}

#[test]
fn test_resolve_import_missing_map_file() {
    let output = run_slotform(&["resolve-import", "--map", "missing-map.yaml", "x"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_resolve_import_requires_identifier() {
    let output = run_slotform(&["resolve-import"]);
    assert!(!output.status.success());
}

// ── Logging ───────────────────────────────────────────────

#[test]
fn test_debug_logging_goes_to_stderr() {
    let spec = fixture_str("spec-ev.yaml");
    let input = fixture_str("valid/list-of-keys.yaml");
    let output = Command::new(slotform_bin())
        .args(["normalize", "--spec", spec.as_str(), input.as_str()])
        .env("SLOTFORM_LOG", "debug")
        .output()
        .expect("failed to execute slotform");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("classified collection"));
    assert!(stderr.contains("loading collection"));
    // stdout stays machine-readable
    stdout_json(&output);
}

#[test]
fn test_tempfile_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.json");
    std::fs::write(&input, r#"[["k2", "a"], "k1"]"#).unwrap();
    let spec = fixture_str("spec-ev.yaml");
    let output = run_slotform(&["normalize", "--spec", &spec, input.to_str().unwrap()]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json[0]["s1"], "k2");
    assert_eq!(json[1]["s1"], "k1");
}
