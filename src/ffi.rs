//! FFI bindings for Synheart Pulse
//!
//! This module provides C-compatible functions for calling Pulse from host
//! apps. Strings are null-terminated; every returned string is allocated here
//! and must be freed by the caller using `pulse_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use crate::config::ScanConfig;
use crate::encoder::ReportEncoder;
use crate::pipeline::samples_to_report_json;
use crate::sampler::Frame;
use crate::session::ScanSession;
use crate::types::{FrameSample, MotionEvent};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn to_json_cstr<T: serde::Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Replay a JSON array of frame samples and motion readings and return the
/// report JSON.
///
/// # Safety
/// - `json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `pulse_free_string`.
/// - Returns NULL on error; call `pulse_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn pulse_samples_to_report(json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match samples_to_report_json(json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Session API
// ============================================================================

/// Opaque handle to a ScanSession
pub struct PulseSessionHandle {
    session: ScanSession,
    encoder: ReportEncoder,
}

/// Create an idle scan session.
///
/// # Safety
/// - `config_json` may be NULL for the default configuration, otherwise it must
///   be a valid null-terminated C string holding a (possibly partial) config.
/// - Must be freed with `pulse_session_free`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn pulse_session_new(config_json: *const c_char) -> *mut PulseSessionHandle {
    clear_last_error();

    let config = if config_json.is_null() {
        ScanConfig::default()
    } else {
        let json = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match ScanConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    match ScanSession::with_config(config) {
        Ok(session) => Box::into_raw(Box::new(PulseSessionHandle {
            session,
            encoder: ReportEncoder::new(),
        })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a scan session. Discarding an unfinished session aborts the scan.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `pulse_session_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn pulse_session_free(handle: *mut PulseSessionHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Start acquiring.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `pulse_session_new`.
/// - Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn pulse_session_start(handle: *mut PulseSessionHandle) -> c_int {
    clear_last_error();

    let handle = match handle.as_mut() {
        Some(h) => h,
        None => {
            set_last_error("Null session pointer");
            return -1;
        }
    };

    match handle.session.start() {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Append a reduced frame sample and return live feedback JSON.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `pulse_session_new`.
/// - Returns a newly allocated string that must be freed with `pulse_free_string`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn pulse_session_push_sample(
    handle: *mut PulseSessionHandle,
    timestamp_ms: f64,
    red_mean: f64,
    green_mean: f64,
    blue_mean: f64,
) -> *mut c_char {
    clear_last_error();

    let handle = match handle.as_mut() {
        Some(h) => h,
        None => {
            set_last_error("Null session pointer");
            return ptr::null_mut();
        }
    };

    let sample = FrameSample::from_means(timestamp_ms, red_mean, green_mean, blue_mean);
    match handle.session.push_sample(sample) {
        Ok(feedback) => to_json_cstr(&feedback),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Reduce a packed RGBA frame, append it and return live feedback JSON.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `pulse_session_new`.
/// - `data` must point to `len` readable bytes.
/// - Returns a newly allocated string that must be freed with `pulse_free_string`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn pulse_session_push_frame_rgba(
    handle: *mut PulseSessionHandle,
    data: *const u8,
    len: usize,
    width: u32,
    height: u32,
    timestamp_ms: f64,
) -> *mut c_char {
    clear_last_error();

    let handle = match handle.as_mut() {
        Some(h) => h,
        None => {
            set_last_error("Null session pointer");
            return ptr::null_mut();
        }
    };
    if data.is_null() {
        set_last_error("Null frame data pointer");
        return ptr::null_mut();
    }

    let bytes = slice::from_raw_parts(data, len);
    let frame = Frame::rgba(bytes, width as usize, height as usize);
    match handle.session.push_frame(&frame, timestamp_ms) {
        Ok(feedback) => to_json_cstr(&feedback),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Feed a motion reading (m/s², gravity removed).
///
/// # Safety
/// - `handle` must be a valid pointer returned by `pulse_session_new`.
/// - Returns 1 when the reading is a motion artifact, 0 when it is not, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn pulse_session_record_motion(
    handle: *mut PulseSessionHandle,
    timestamp_ms: f64,
    x: f64,
    y: f64,
    z: f64,
) -> c_int {
    clear_last_error();

    let handle = match handle.as_mut() {
        Some(h) => h,
        None => {
            set_last_error("Null session pointer");
            return -1;
        }
    };

    let event = MotionEvent {
        timestamp: timestamp_ms,
        x,
        y,
        z,
    };
    match handle.session.record_motion(&event) {
        Some(_) => 1,
        None => 0,
    }
}

/// Current displayed signal quality (0-100).
///
/// # Safety
/// - `handle` must be a valid pointer returned by `pulse_session_new`.
/// - Returns -1.0 for a NULL handle.
#[no_mangle]
pub unsafe extern "C" fn pulse_session_quality(handle: *const PulseSessionHandle) -> f64 {
    match handle.as_ref() {
        Some(h) => h.session.quality(),
        None => -1.0,
    }
}

/// Finish the scan (if still acquiring) and return the report JSON.
///
/// A scan that fails analysis still returns a report with `status = "failed"`.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `pulse_session_new`.
/// - Returns a newly allocated string that must be freed with `pulse_free_string`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn pulse_session_finish(handle: *mut PulseSessionHandle) -> *mut c_char {
    clear_last_error();

    let handle = match handle.as_mut() {
        Some(h) => h,
        None => {
            set_last_error("Null session pointer");
            return ptr::null_mut();
        }
    };

    if handle.session.is_acquiring() {
        // Failure is captured in the session state and encoded in the report.
        let _ = handle.session.finish();
    }

    match handle.encoder.encode_to_json(&handle.session) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a string returned by Pulse functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Pulse function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn pulse_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Pulse function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn pulse_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the Pulse library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn pulse_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
