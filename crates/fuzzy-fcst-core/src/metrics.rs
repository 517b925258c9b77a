//! Accuracy metrics over paired target/prediction sequences.

use crate::error::{FuzzyError, Result};

/// Calculates Mean Squared Error between actual and predicted values.
///
/// # Arguments
/// * `actual` - Slice of actual observed values
/// * `predicted` - Slice of predicted values
///
/// # Formula
/// MSE = (1/n) * Σ(actual_i - predicted_i)²
///
/// # Example
/// ```
/// use fuzzy_fcst_core::metrics::mse;
/// let error = mse(&[1.0, 2.0, 3.0], &[1.0, 2.0, 4.0]).unwrap();
/// assert!((error - 1.0 / 3.0).abs() < 1e-12);
/// ```
pub fn mse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    validate_inputs(actual, predicted)?;
    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    Ok(sum / actual.len() as f64)
}

/// Calculates Root Mean Squared Error, in the units of the series.
///
/// # Formula
/// RMSE = √MSE
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    Ok(mse(actual, predicted)?.sqrt())
}

fn validate_inputs(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.len() != predicted.len() {
        return Err(FuzzyError::InvalidInput(format!(
            "Actual and predicted arrays must have the same length: {} vs {}",
            actual.len(),
            predicted.len()
        )));
    }
    if actual.is_empty() {
        return Err(FuzzyError::InsufficientData { needed: 1, got: 0 });
    }
    Ok(())
}
