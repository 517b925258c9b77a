//! Error handling shared by every exported function.

use crate::types::{ErrorCode, FuzzyFcstError};
use fuzzy_fcst_core::FuzzyError;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Initialize error output to success state.
///
/// # Safety
/// The error pointer must be valid if non-null.
#[inline]
pub unsafe fn init_error(out_error: *mut FuzzyFcstError) {
    if !out_error.is_null() {
        *out_error = FuzzyFcstError::success();
    }
}

/// Set an error on the output error pointer.
///
/// # Safety
/// The error pointer must be valid if non-null.
#[inline]
pub unsafe fn set_error(out_error: *mut FuzzyFcstError, code: ErrorCode, message: &str) {
    if !out_error.is_null() {
        (*out_error).set_error(code, message);
    }
}

/// Set a `NullPointer` error if any of `ptrs` is null.
///
/// # Safety
/// The error pointer must be valid if non-null.
#[inline]
pub unsafe fn check_null_pointers(
    out_error: *mut FuzzyFcstError,
    ptrs: &[*const core::ffi::c_void],
) -> bool {
    if ptrs.iter().any(|p| p.is_null()) {
        set_error(out_error, ErrorCode::NullPointer, "Null pointer argument");
        return true;
    }
    false
}

/// Run `f`, translating core errors and panics into `out_error`.
///
/// Returns `Some(value)` on success, `None` on error.
///
/// # Safety
/// The error pointer must be valid if non-null.
pub unsafe fn ffi_try<F, T>(out_error: *mut FuzzyFcstError, f: F) -> Option<T>
where
    F: FnOnce() -> Result<T, FuzzyError>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            set_error(out_error, ErrorCode::from(&e), &e.to_string());
            None
        }
        Err(_) => {
            set_error(out_error, ErrorCode::PanicCaught, "Panic in Rust code");
            None
        }
    }
}
