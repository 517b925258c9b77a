//! Parameter conversion from C types to core types.

use core::ffi::{c_char, c_double, c_int};
use std::ffi::CStr;

use fuzzy_fcst_core::{FuzzyError, Result};

use crate::types::FuzzyOptions;

/// Convert a term count, rejecting anything below 2.
pub fn to_num_terms(value: c_int) -> Result<usize> {
    match usize::try_from(value) {
        Ok(n) if n >= 2 => Ok(n),
        _ => Err(FuzzyError::InvalidConfiguration(format!(
            "num_terms must be at least 2, got {}",
            value
        ))),
    }
}

/// Parse a fixed-size, null-terminated name buffer, falling back to `default`
/// when the buffer is empty. Unknown names are an error.
pub fn parse_name<T>(buffer: &[c_char], default: T) -> Result<T>
where
    T: std::str::FromStr<Err = FuzzyError>,
{
    if !buffer.contains(&0) {
        return Err(FuzzyError::InvalidInput(
            "operator name is not null-terminated".to_string(),
        ));
    }
    // SAFETY: the buffer holds a NUL within its bounds.
    let name = unsafe { CStr::from_ptr(buffer.as_ptr()) }
        .to_str()
        .map_err(|e| FuzzyError::InvalidInput(format!("operator name is not UTF-8: {}", e)))?
        .trim();

    if name.is_empty() {
        Ok(default)
    } else {
        name.parse()
    }
}

/// Translate C options into core options. A null pointer selects the defaults.
///
/// # Safety
/// The pointer must be null or point to a valid `FuzzyOptions`.
pub unsafe fn to_core_options(options: *const FuzzyOptions) -> Result<fuzzy_fcst_core::FuzzyOptions> {
    let defaults = fuzzy_fcst_core::FuzzyOptions::default();
    if options.is_null() {
        return Ok(defaults);
    }

    let opts = &*options;
    Ok(fuzzy_fcst_core::FuzzyOptions {
        num_terms: to_num_terms(opts.num_terms)?,
        intersection: parse_name(&opts.intersection, defaults.intersection)?,
        implication: parse_name(&opts.implication, defaults.implication)?,
        defuzzification: parse_name(&opts.defuzzification, defaults.defuzzification)?,
        parallel: opts.parallel,
    })
}

/// Build a series with NULL handling from a value array and a validity bitmask.
///
/// Bit `i % 64` of `validity[i / 64]` marks element `i` as present; a null
/// bitmask means every element is present.
///
/// # Safety
/// `data` must point to `length` doubles; `validity` must be null or point to
/// `length.div_ceil(64)` words.
pub unsafe fn build_series(
    data: *const c_double,
    validity: *const u64,
    length: usize,
) -> Vec<Option<f64>> {
    if length == 0 {
        return Vec::new();
    }
    let data_slice = std::slice::from_raw_parts(data, length);

    if validity.is_null() {
        return data_slice.iter().map(|&v| Some(v)).collect();
    }

    let validity_slice = std::slice::from_raw_parts(validity, length.div_ceil(64));
    data_slice
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let is_valid = (validity_slice[i / 64] >> (i % 64)) & 1 == 1;
            is_valid.then_some(v)
        })
        .collect()
}
