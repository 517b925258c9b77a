//! malloc-backed arrays handed across the boundary.
//!
//! Everything allocated here is released with libc `free`, which is what the
//! `fuzzy_free_*` functions call.

use libc::{c_double, free, malloc};
use std::ptr;

/// Copy a Rust slice to a newly allocated C array.
///
/// # Safety
/// Returns null on allocation failure or if the slice is empty.
pub unsafe fn slice_to_c_array<T: Copy>(slice: &[T]) -> *mut T {
    if slice.is_empty() {
        return ptr::null_mut();
    }

    let ptr = malloc(std::mem::size_of_val(slice)) as *mut T;
    if !ptr.is_null() {
        ptr::copy_nonoverlapping(slice.as_ptr(), ptr, slice.len());
    }
    ptr
}

/// Copy a slice of doubles to a newly allocated C double array.
///
/// # Safety
/// Returns null on allocation failure or if the slice is empty.
#[inline]
pub unsafe fn vec_to_c_double_array(vec: &[f64]) -> *mut c_double {
    slice_to_c_array(vec)
}

/// Free a pointer from [`slice_to_c_array`] and reset it to null.
///
/// # Safety
/// `*ptr` must be null or come from this module's allocators.
pub unsafe fn free_and_null<T>(ptr: &mut *mut T) {
    if !ptr.is_null() {
        free(*ptr as *mut libc::c_void);
        *ptr = ptr::null_mut();
    }
}
