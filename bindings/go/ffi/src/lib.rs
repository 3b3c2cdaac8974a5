//! C-FFI layer for Slotform — used by Go (cgo) and other FFI consumers.
//!
//! ZERO logic here. All calls delegate to `slotform-core`.
//!
//! # Memory Contract
//!
//! All functions that return `*mut c_char` allocate via `CString`.
//! The caller MUST free the returned string by calling `slotform_free_string()`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use slotform_core::{Collection, CollectionSpec, RawValue};

/// Result from a Slotform FFI call.
/// If `error` is null, the call succeeded and `result` contains the output.
/// If `error` is non-null, the call failed and `error` contains the error message.
/// The caller MUST free both `result` and `error` with `slotform_free_string()`.
#[repr(C)]
pub struct SlotformResult {
    pub result: *mut c_char,
    pub error: *mut c_char,
}

impl SlotformResult {
    fn ok(value: String) -> Self {
        let c = CString::new(value).unwrap_or_default();
        SlotformResult {
            result: c.into_raw(),
            error: std::ptr::null_mut(),
        }
    }

    fn err(msg: String) -> Self {
        let c = CString::new(msg).unwrap_or_default();
        SlotformResult {
            result: std::ptr::null_mut(),
            error: c.into_raw(),
        }
    }

    fn none() -> Self {
        SlotformResult {
            result: std::ptr::null_mut(),
            error: std::ptr::null_mut(),
        }
    }
}

/// Helper: convert a C string pointer to a Rust &str.
/// Returns None if the pointer is null or not valid UTF-8.
unsafe fn cstr_to_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

fn normalize_text(value: &str, spec: &str) -> Result<Collection, String> {
    let spec = CollectionSpec::from_yaml_str(spec).map_err(|e| e.to_string())?;
    let raw = RawValue::from_yaml_str(value).map_err(|e| format!("Parse error: {}", e))?;
    slotform_core::normalize(&raw, &spec).map_err(|e| e.to_string())
}

/// Normalize a collection value (JSON or YAML text) against a spec
/// (JSON or YAML text) and return the canonical record list as JSON.
///
/// # Safety
/// `value` and `spec` must be valid null-terminated UTF-8 C strings.
/// The caller must free the returned strings with `slotform_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn slotform_normalize(
    value: *const c_char,
    spec: *const c_char,
) -> SlotformResult {
    let value = match cstr_to_str(value) {
        Some(s) => s,
        None => return SlotformResult::err("null or invalid UTF-8 value".into()),
    };
    let spec = match cstr_to_str(spec) {
        Some(s) => s,
        None => return SlotformResult::err("null or invalid UTF-8 spec".into()),
    };

    match normalize_text(value, spec) {
        Ok(collection) => match serde_json::to_string_pretty(&collection.to_json_list()) {
            Ok(json) => SlotformResult::ok(json),
            Err(e) => SlotformResult::err(format!("Serialization error: {}", e)),
        },
        Err(e) => SlotformResult::err(e),
    }
}

/// Compute the SHA-256 semantic hash of a normalized collection.
///
/// # Safety
/// `value` and `spec` must be valid null-terminated UTF-8 C strings.
/// The caller must free the returned strings with `slotform_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn slotform_semantic_hash(
    value: *const c_char,
    spec: *const c_char,
) -> SlotformResult {
    let value = match cstr_to_str(value) {
        Some(s) => s,
        None => return SlotformResult::err("null or invalid UTF-8 value".into()),
    };
    let spec = match cstr_to_str(spec) {
        Some(s) => s,
        None => return SlotformResult::err("null or invalid UTF-8 spec".into()),
    };

    match normalize_text(value, spec) {
        Ok(collection) => SlotformResult::ok(collection.semantic_hash()),
        Err(e) => SlotformResult::err(e),
    }
}

/// Merge JSON-LD context sources given as a JSON list of strings/objects.
/// `base` may be null. When nothing is merged both fields are null.
///
/// # Safety
/// `contexts` must be a valid null-terminated UTF-8 C string; `base` must be
/// null or one. The caller must free the returned strings with
/// `slotform_free_string()`.
#[no_mangle]
pub unsafe extern "C" fn slotform_merge_contexts(
    contexts: *const c_char,
    base: *const c_char,
) -> SlotformResult {
    let contexts = match cstr_to_str(contexts) {
        Some(s) => s,
        None => return SlotformResult::err("null or invalid UTF-8 contexts".into()),
    };
    let base = cstr_to_str(base);

    let sources: Vec<serde_json::Value> = match serde_json::from_str(contexts) {
        Ok(v) => v,
        Err(e) => return SlotformResult::err(format!("Parse error: {}", e)),
    };

    match slotform_core::merge_contexts(sources, base) {
        Ok(Some(merged)) => match serde_json::to_string_pretty(&merged) {
            Ok(json) => SlotformResult::ok(json),
            Err(e) => SlotformResult::err(format!("Serialization error: {}", e)),
        },
        Ok(None) => SlotformResult::none(),
        Err(e) => SlotformResult::err(e.to_string()),
    }
}

/// Free a string previously returned by a Slotform FFI function.
///
/// # Safety
/// `ptr` must be a pointer previously returned by a Slotform FFI function,
/// or null (in which case this is a no-op).
#[no_mangle]
pub unsafe extern "C" fn slotform_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}
