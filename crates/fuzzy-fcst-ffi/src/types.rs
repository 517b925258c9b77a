//! C-compatible type definitions for the FFI boundary.

use fuzzy_fcst_core::FuzzyError;
use libc::{c_char, c_double, c_int, size_t};

/// Error codes for FFI boundary.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,
    NullPointer = 1,
    InvalidConfiguration = 2,
    RuleAlignment = 3,
    InferenceFailure = 4,
    InvalidInput = 5,
    InsufficientData = 6,
    InvalidParameter = 7,
    AllocationError = 8,
    PanicCaught = 9,
}

impl From<&FuzzyError> for ErrorCode {
    fn from(e: &FuzzyError) -> Self {
        match e {
            FuzzyError::InvalidConfiguration(_) => ErrorCode::InvalidConfiguration,
            FuzzyError::RuleAlignment { .. } => ErrorCode::RuleAlignment,
            FuzzyError::InferenceFailure(_) => ErrorCode::InferenceFailure,
            FuzzyError::InvalidInput(_) => ErrorCode::InvalidInput,
            FuzzyError::InsufficientData { .. } => ErrorCode::InsufficientData,
            FuzzyError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
        }
    }
}

/// Error structure with message buffer for FFI.
#[repr(C)]
pub struct FuzzyFcstError {
    pub code: ErrorCode,
    pub message: [c_char; 256],
}

impl FuzzyFcstError {
    /// Create a success error (no error).
    pub fn success() -> Self {
        Self {
            code: ErrorCode::Success,
            message: [0; 256],
        }
    }

    /// Set an error with code and message.
    pub fn set_error(&mut self, code: ErrorCode, msg: &str) {
        self.code = code;
        copy_string_to_buffer(msg, &mut self.message);
    }

    /// The message as a Rust string, up to the first NUL.
    pub fn message(&self) -> String {
        let bytes: Vec<u8> = self
            .message
            .iter()
            .take_while(|&&c| c != 0)
            .map(|&c| c as u8)
            .collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Default for FuzzyFcstError {
    fn default() -> Self {
        Self::success()
    }
}

/// Prediction options.
///
/// Operator names are null-terminated; an empty name selects the default.
#[repr(C)]
#[derive(Clone)]
pub struct FuzzyOptions {
    /// Intersection operator: "min", "product" or "mean"
    pub intersection: [c_char; 32],
    /// Implication operator: "min", "product" or "bounded_sum"
    pub implication: [c_char; 32],
    /// Defuzzification method: "centroid", "mean_of_maxima" or "weighted_average"
    pub defuzzification: [c_char; 32],
    /// Terms per variable, at least 2
    pub num_terms: c_int,
    /// Predict rows in parallel
    pub parallel: bool,
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        let mut options = Self {
            intersection: [0; 32],
            implication: [0; 32],
            defuzzification: [0; 32],
            num_terms: 7,
            parallel: false,
        };
        copy_string_to_buffer("min", &mut options.intersection);
        copy_string_to_buffer("min", &mut options.implication);
        copy_string_to_buffer("centroid", &mut options.defuzzification);
        options
    }
}

/// Per-row predictions of one run, with in-sample accuracy.
///
/// All arrays have `n_rows` elements and are malloc'd; release them with
/// `fuzzy_free_prediction_result`.
#[repr(C)]
pub struct PredictionResult {
    /// Predicted value per row
    pub predictions: *mut c_double,
    /// Target value per row
    pub targets: *mut c_double,
    /// Whether the row used the last-lag fallback
    pub fallback: *mut bool,
    /// Number of rows
    pub n_rows: size_t,
    /// Number of lag columns
    pub n_lags: size_t,
    /// Number of fallback rows
    pub n_fallbacks: size_t,
    /// First sample point of the shared variable domain
    pub domain_start: c_double,
    /// Last sample point of the shared variable domain
    pub domain_end: c_double,
    /// Mean Squared Error over all rows
    pub mse: c_double,
    /// Root Mean Squared Error over all rows
    pub rmse: c_double,
}

impl Default for PredictionResult {
    fn default() -> Self {
        Self {
            predictions: std::ptr::null_mut(),
            targets: std::ptr::null_mut(),
            fallback: std::ptr::null_mut(),
            n_rows: 0,
            n_lags: 0,
            n_fallbacks: 0,
            domain_start: f64::NAN,
            domain_end: f64::NAN,
            mse: f64::NAN,
            rmse: f64::NAN,
        }
    }
}

/// Copy a string to a fixed-size char buffer, truncating to keep the NUL.
pub(crate) fn copy_string_to_buffer(s: &str, buffer: &mut [c_char]) {
    if buffer.is_empty() {
        return;
    }
    let bytes = s.as_bytes();
    let len = bytes.len().min(buffer.len() - 1);
    for (i, &b) in bytes[..len].iter().enumerate() {
        buffer[i] = b as c_char;
    }
    buffer[len] = 0;
}
