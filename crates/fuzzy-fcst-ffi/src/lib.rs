//! FFI boundary layer for the fuzzy-fcst prediction engine.
//!
//! Exposes table and series prediction plus the accuracy metrics as
//! C-compatible functions. Every function reports failure through a
//! [`FuzzyFcstError`] out-parameter and returns `false`; panics never cross
//! the boundary.

pub mod allocation;
pub mod conversion;
pub mod error_handling;
pub mod types;

use libc::{c_char, c_double, c_int, size_t};

use fuzzy_fcst_core::{
    build_lag_table, build_variables, evaluate, Evaluation, FuzzyError, FuzzyVariables, LagRow,
    LagTable,
};

use allocation::{free_and_null, slice_to_c_array, vec_to_c_double_array};
use conversion::{build_series, to_core_options};
use error_handling::{check_null_pointers, ffi_try, init_error, set_error};

pub use types::*;

// ============================================================================
// Helper Functions
// ============================================================================

/// Move a finished run into `out_result`, allocating its arrays.
///
/// On allocation failure every array is released and `false` is returned.
unsafe fn write_prediction_result(
    table: &LagTable,
    variables: &FuzzyVariables,
    evaluation: &Evaluation,
    out_result: *mut PredictionResult,
    out_error: *mut FuzzyFcstError,
) -> bool {
    let fallback: Vec<bool> = table
        .rows()
        .iter()
        .map(|r| r.predict.is_some_and(|p| p.is_fallback()))
        .collect();
    let domain = variables.consequent().domain();

    let mut result = PredictionResult {
        predictions: vec_to_c_double_array(&table.predictions()),
        targets: vec_to_c_double_array(&table.targets()),
        fallback: slice_to_c_array(&fallback),
        n_rows: table.len(),
        n_lags: table.n_lags(),
        n_fallbacks: evaluation.summary.fallbacks,
        domain_start: domain.start(),
        domain_end: domain.end(),
        mse: evaluation.mse,
        rmse: evaluation.rmse,
    };

    if result.n_rows > 0
        && (result.predictions.is_null() || result.targets.is_null() || result.fallback.is_null())
    {
        release_prediction_result(&mut result);
        set_error(
            out_error,
            ErrorCode::AllocationError,
            "Memory allocation failed",
        );
        return false;
    }

    *out_result = result;
    true
}

unsafe fn release_prediction_result(result: &mut PredictionResult) {
    free_and_null(&mut result.predictions);
    free_and_null(&mut result.targets);
    free_and_null(&mut result.fallback);
    result.n_rows = 0;
}

type MetricFn = fn(&[f64], &[f64]) -> Result<f64, FuzzyError>;

unsafe fn impl_metric_2arg(
    actual: *const c_double,
    actual_len: size_t,
    predicted: *const c_double,
    predicted_len: size_t,
    out_result: *mut c_double,
    out_error: *mut FuzzyFcstError,
    core_fn: MetricFn,
) -> bool {
    init_error(out_error);

    if check_null_pointers(
        out_error,
        &[
            actual as *const core::ffi::c_void,
            predicted as *const core::ffi::c_void,
            out_result as *const core::ffi::c_void,
        ],
    ) {
        return false;
    }

    let value = ffi_try(out_error, || {
        let actual = std::slice::from_raw_parts(actual, actual_len);
        let predicted = std::slice::from_raw_parts(predicted, predicted_len);
        core_fn(actual, predicted)
    });

    match value {
        Some(v) => {
            *out_result = v;
            true
        }
        None => false,
    }
}

// ============================================================================
// Prediction Functions
// ============================================================================

/// Predict every row of a lag table.
///
/// `values` is row-major with `n_columns` values per row laid out as
/// `target, lag_1, ..., lag_n`, so `n_columns` must be at least 2. Variables
/// are built from the table itself. A null `options` selects the defaults.
///
/// # Safety
/// `values` must point to `n_rows * n_columns` doubles. `out_result` must be
/// valid; release it with `fuzzy_free_prediction_result`.
#[no_mangle]
pub unsafe extern "C" fn fuzzy_table_predict(
    values: *const c_double,
    n_rows: size_t,
    n_columns: size_t,
    options: *const FuzzyOptions,
    out_result: *mut PredictionResult,
    out_error: *mut FuzzyFcstError,
) -> bool {
    init_error(out_error);

    if check_null_pointers(
        out_error,
        &[
            values as *const core::ffi::c_void,
            out_result as *const core::ffi::c_void,
        ],
    ) {
        return false;
    }

    let run = ffi_try(out_error, || {
        let opts = to_core_options(options)?;
        if n_columns < 2 {
            return Err(FuzzyError::InvalidConfiguration(format!(
                "a lag table needs a target and at least one lag column, got {} columns",
                n_columns
            )));
        }

        let cells = n_rows.checked_mul(n_columns).ok_or_else(|| {
            FuzzyError::InvalidInput(format!("{} x {} table is too large", n_rows, n_columns))
        })?;
        let rows = if cells == 0 {
            Vec::new()
        } else {
            std::slice::from_raw_parts(values, cells)
                .chunks_exact(n_columns)
                .map(|row| LagRow::new(row[0], row[1..].to_vec()))
                .collect()
        };

        let mut table = LagTable::new(n_columns - 1, rows)?;
        let variables = build_variables(&table, opts.num_terms)?;
        let evaluation = evaluate(&mut table, &variables, &opts)?;
        Ok((table, variables, evaluation))
    });

    match run {
        Some((table, variables, evaluation)) => {
            write_prediction_result(&table, &variables, &evaluation, out_result, out_error)
        }
        None => false,
    }
}

/// Lag a raw series and predict every row.
///
/// NULL entries (per the validity bitmask) and non-finite values are dropped
/// before lagging. Row `t` of the result predicts the `(window_size + t)`-th
/// remaining observation.
///
/// # Safety
/// `values` must point to `length` doubles and `validity` must be null or
/// point to `length.div_ceil(64)` words. `out_result` must be valid; release it
/// with `fuzzy_free_prediction_result`.
#[no_mangle]
pub unsafe extern "C" fn fuzzy_series_predict(
    values: *const c_double,
    validity: *const u64,
    length: size_t,
    window_size: c_int,
    options: *const FuzzyOptions,
    out_result: *mut PredictionResult,
    out_error: *mut FuzzyFcstError,
) -> bool {
    init_error(out_error);

    if check_null_pointers(
        out_error,
        &[
            values as *const core::ffi::c_void,
            out_result as *const core::ffi::c_void,
        ],
    ) {
        return false;
    }

    let run = ffi_try(out_error, || {
        let opts = to_core_options(options)?;
        opts.validate()?;
        let series = build_series(values, validity, length);
        let window = usize::try_from(window_size).unwrap_or(0);

        let mut table = build_lag_table(&series, window)?;
        let variables = build_variables(&table, opts.num_terms)?;
        let evaluation = evaluate(&mut table, &variables, &opts)?;
        Ok((table, variables, evaluation))
    });

    match run {
        Some((table, variables, evaluation)) => {
            write_prediction_result(&table, &variables, &evaluation, out_result, out_error)
        }
        None => false,
    }
}

// ============================================================================
// Metrics Functions
// ============================================================================

/// Mean Squared Error
///
/// # Safety
/// All pointer arguments must be valid and non-null. Arrays must have the specified lengths.
#[no_mangle]
pub unsafe extern "C" fn fuzzy_mse(
    actual: *const c_double,
    actual_len: size_t,
    predicted: *const c_double,
    predicted_len: size_t,
    out_result: *mut c_double,
    out_error: *mut FuzzyFcstError,
) -> bool {
    impl_metric_2arg(
        actual,
        actual_len,
        predicted,
        predicted_len,
        out_result,
        out_error,
        fuzzy_fcst_core::mse,
    )
}

/// Root Mean Squared Error
///
/// # Safety
/// All pointer arguments must be valid and non-null. Arrays must have the specified lengths.
#[no_mangle]
pub unsafe extern "C" fn fuzzy_rmse(
    actual: *const c_double,
    actual_len: size_t,
    predicted: *const c_double,
    predicted_len: size_t,
    out_result: *mut c_double,
    out_error: *mut FuzzyFcstError,
) -> bool {
    impl_metric_2arg(
        actual,
        actual_len,
        predicted,
        predicted_len,
        out_result,
        out_error,
        fuzzy_fcst_core::rmse,
    )
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a prediction result.
///
/// # Safety
/// The pointer must be valid or null.
#[no_mangle]
pub unsafe extern "C" fn fuzzy_free_prediction_result(result: *mut PredictionResult) {
    if result.is_null() {
        return;
    }
    release_prediction_result(&mut *result);
}

/// Free a double array.
///
/// # Safety
/// The pointer must be valid or null.
#[no_mangle]
pub unsafe extern "C" fn fuzzy_free_double_array(ptr: *mut c_double) {
    let mut ptr = ptr;
    free_and_null(&mut ptr);
}

// ============================================================================
// Version
// ============================================================================

#[no_mangle]
pub extern "C" fn fuzzy_fcst_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
