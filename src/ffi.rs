//! FFI bindings for Daily Insight
//!
//! This module provides C-compatible functions for calling the engine from the
//! app layer. Requests and responses are JSON in null-terminated C strings.
//! Every returned string is allocated here and must be freed by the caller
//! using `insight_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::pipeline::InsightEngine;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Engine from an optional config JSON; NULL selects the defaults
unsafe fn engine_from(config_json: *const c_char) -> Result<InsightEngine> {
    match cstr_to_string(config_json) {
        Some(json) => InsightEngine::new(EngineConfig::from_json(&json)?),
        None => Ok(InsightEngine::default()),
    }
}

/// Shared body of the request/response entry points
unsafe fn run_json(
    request_json: *const c_char,
    config_json: *const c_char,
    call: impl FnOnce(&InsightEngine, &str) -> Result<String>,
) -> *mut c_char {
    clear_last_error();

    let request = match cstr_to_string(request_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid request string pointer");
            return ptr::null_mut();
        }
    };

    let outcome = engine_from(config_json).and_then(|engine| call(&engine, &request));
    match outcome {
        Ok(response) => string_to_cstr(&response),
        Err(e) => {
            tracing::debug!(error = %e, "ffi call failed");
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Trend view for one variable.
///
/// # Safety
/// - `request_json` must be a valid null-terminated C string.
/// - `config_json` must be a valid null-terminated C string or NULL.
/// - Returns a newly allocated string that must be freed with `insight_free_string`.
/// - Returns NULL on error; call `insight_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn insight_trend_json(
    request_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    run_json(request_json, config_json, |engine, request| engine.trend_json(request))
}

/// Relationship view for two variables.
///
/// # Safety
/// Same contract as `insight_trend_json`.
#[no_mangle]
pub unsafe extern "C" fn insight_relationship_json(
    request_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    run_json(request_json, config_json, |engine, request| {
        engine.relationship_json(request)
    })
}

/// Drill-down into one contingency cell.
///
/// # Safety
/// Same contract as `insight_trend_json`.
#[no_mangle]
pub unsafe extern "C" fn insight_select_cell_json(
    request_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    run_json(request_json, config_json, |engine, request| {
        engine.select_cell_json(request)
    })
}

/// Weekly heatmap grid for one variable.
///
/// # Safety
/// Same contract as `insight_trend_json`.
#[no_mangle]
pub unsafe extern "C" fn insight_heatmap_json(
    request_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    run_json(request_json, config_json, |engine, request| engine.heatmap_json(request))
}

/// Last error message on this thread, or NULL.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with `insight_free_string`.
#[no_mangle]
pub unsafe extern "C" fn insight_last_error() -> *mut c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(msg) => msg.clone().into_raw(),
        None => ptr::null_mut(),
    })
}

/// Free a string returned by an `insight_*` function.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by this library, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn insight_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREND_REQUEST: &str = r#"{
        "variable": {
            "label": "mood",
            "kind": "ordinal",
            "samples": [
                {"date": "1.3.2024", "value": 3},
                {"date": "3.3.2024", "value": 5}
            ]
        },
        "today": "2024-03-04"
    }"#;

    unsafe fn take(ptr: *mut c_char) -> String {
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        insight_free_string(ptr);
        s
    }

    #[test]
    fn test_trend_round_trip() {
        let request = CString::new(TREND_REQUEST).unwrap();
        unsafe {
            let out = insight_trend_json(request.as_ptr(), ptr::null());
            assert!(!out.is_null());
            let report: serde_json::Value = serde_json::from_str(&take(out)).unwrap();
            assert_eq!(report["days"], 4);
            assert_eq!(report["series"]["tier"], "days");
            assert!(insight_last_error().is_null());
        }
    }

    #[test]
    fn test_error_sets_last_error() {
        let request = CString::new("{}").unwrap();
        unsafe {
            let out = insight_relationship_json(request.as_ptr(), ptr::null());
            assert!(out.is_null());
            let err = insight_last_error();
            assert!(!err.is_null());
            assert!(take(err).contains("JSON"));
        }
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let request = CString::new(TREND_REQUEST).unwrap();
        let config = CString::new(r#"{"max_labels": 1}"#).unwrap();
        unsafe {
            let out = insight_trend_json(request.as_ptr(), config.as_ptr());
            assert!(out.is_null());
            assert!(take(insight_last_error()).contains("max_labels"));
        }
    }

    #[test]
    fn test_null_request() {
        unsafe {
            assert!(insight_heatmap_json(ptr::null(), ptr::null()).is_null());
            assert!(take(insight_last_error()).contains("Invalid request"));
            insight_free_string(ptr::null_mut());
        }
    }
}
