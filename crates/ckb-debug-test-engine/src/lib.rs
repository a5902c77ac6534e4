//! A shared library engine for exercising the library backend.
//!
//! Every script "runs" for [`CYCLES`] cycles. The argument strings are echoed
//! back in the result document so callers can check what crossed the ABI.
//! Two magic values change the behaviour:
//!
//! - group type `null`: the entry points return a null pointer.
//! - cycle limit below [`CYCLES`]: the result carries an error.
//!
//! `ckb_test_engine_freed` counts calls to `ckb_debugger_free_string`.

use serde_json::json;
use std::ffi::{c_char, c_void, CStr, CString};
use std::sync::atomic::{AtomicUsize, Ordering};

pub const CYCLES: u64 = 4096;

static FREED: AtomicUsize = AtomicUsize::new(0);

type Printer = unsafe extern "C" fn(*mut c_void, *const c_char, *const c_char);

unsafe fn text(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

fn answer(tx: &str, group: &str, hash: &str, cycles: &str) -> *mut c_char {
    if group == "null" {
        return std::ptr::null_mut();
    }
    let error = match cycles.parse::<u64>() {
        Err(_) => Some("Invalid max cycle!".to_string()),
        Ok(limit) if limit < CYCLES => {
            Some(format!("ExceededMaximumCycles: expect cycles <= {}", limit))
        }
        Ok(_) => None,
    };
    let cycle = error.is_none().then_some(CYCLES);
    let document = json!({
        "cycle": cycle,
        "error": error,
        "tx_len": tx.len(),
        "group": group,
        "hash": hash,
    });
    match CString::new(document.to_string()) {
        Ok(text) => text.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// # Safety
///
/// All arguments must be NUL-terminated strings or null.
#[no_mangle]
pub unsafe extern "C" fn ckb_debugger_run_json(
    tx: *const c_char,
    group: *const c_char,
    hash: *const c_char,
    cycles: *const c_char,
) -> *mut c_char {
    answer(&text(tx), &text(group), &text(hash), &text(cycles))
}

/// # Safety
///
/// As [`ckb_debugger_run_json`]; `printer` is called with `ctx` during the
/// call only.
#[no_mangle]
pub unsafe extern "C" fn ckb_debugger_run_json_with_printer(
    tx: *const c_char,
    group: *const c_char,
    hash: *const c_char,
    cycles: *const c_char,
    printer: Printer,
    ctx: *mut c_void,
) -> *mut c_char {
    for message in ["hello", "world"] {
        if let Ok(message) = CString::new(message) {
            printer(ctx, hash, message.as_ptr());
        }
    }
    answer(&text(tx), &text(group), &text(hash), &text(cycles))
}

/// # Safety
///
/// `ptr` must come from one of the entry points above and be freed once.
#[no_mangle]
pub unsafe extern "C" fn ckb_debugger_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
        FREED.fetch_add(1, Ordering::SeqCst);
    }
}

#[no_mangle]
pub extern "C" fn ckb_test_engine_freed() -> usize {
    FREED.load(Ordering::SeqCst)
}
