//! Lagged-feature tables.
//!
//! A [`LagTable`] holds one [`LagRow`] per observation: the `target` value and
//! the `n_lags` observations that preceded it, where `lag_1` is the most recent.
//! The prediction loop only reads the lag columns and writes `predict`.

use crate::error::{FuzzyError, InferenceFailure, Result};

/// How a row's prediction was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PredictionStatus {
    /// Produced by the full fuzzify → rules → defuzzify pipeline.
    Inferred,
    /// Inference failed; the value is the last lag processed for the row.
    Fallback(InferenceFailure),
}

/// A crisp prediction together with how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub value: f64,
    pub status: PredictionStatus,
}

impl Prediction {
    pub fn inferred(value: f64) -> Self {
        Self {
            value,
            status: PredictionStatus::Inferred,
        }
    }

    pub fn fallback(value: f64, reason: InferenceFailure) -> Self {
        Self {
            value,
            status: PredictionStatus::Fallback(reason),
        }
    }

    /// Whether the persistence fallback was used.
    pub fn is_fallback(&self) -> bool {
        matches!(self.status, PredictionStatus::Fallback(_))
    }
}

/// One observation: `target, lag_1..lag_n` plus the `predict` column.
#[derive(Debug, Clone, PartialEq)]
pub struct LagRow {
    /// Observed value at this step
    pub target: f64,
    /// `lags[k - 1]` holds `lag_k`; `lags[0]` is the most recent observation
    pub lags: Vec<f64>,
    /// Prediction, absent until the prediction loop has visited the row
    pub predict: Option<Prediction>,
}

impl LagRow {
    pub fn new(target: f64, lags: Vec<f64>) -> Self {
        Self {
            target,
            lags,
            predict: None,
        }
    }

    /// Value of `lag_k` (1-based).
    pub fn lag(&self, k: usize) -> Option<f64> {
        k.checked_sub(1).and_then(|i| self.lags.get(i)).copied()
    }

    pub fn predicted_value(&self) -> Option<f64> {
        self.predict.map(|p| p.value)
    }
}

/// A validated table of lagged rows sharing the same number of lag columns.
#[derive(Debug, Clone, PartialEq)]
pub struct LagTable {
    n_lags: usize,
    rows: Vec<LagRow>,
}

impl LagTable {
    /// Create a table, checking that every row has exactly `n_lags` finite lags
    /// and a finite target.
    pub fn new(n_lags: usize, rows: Vec<LagRow>) -> Result<Self> {
        if n_lags == 0 {
            return Err(FuzzyError::InvalidConfiguration(
                "table needs a target and at least one lag column".to_string(),
            ));
        }

        for (i, row) in rows.iter().enumerate() {
            if row.lags.len() != n_lags {
                return Err(FuzzyError::InvalidConfiguration(format!(
                    "row {} has {} lag columns, expected {}",
                    i,
                    row.lags.len(),
                    n_lags
                )));
            }
            if !row.target.is_finite() || row.lags.iter().any(|v| !v.is_finite()) {
                return Err(FuzzyError::InvalidConfiguration(format!(
                    "row {} contains a missing or non-finite value",
                    i
                )));
            }
        }

        Ok(Self { n_lags, rows })
    }

    pub fn n_lags(&self) -> usize {
        self.n_lags
    }

    /// Number of columns excluding `predict` (`target` plus lags).
    pub fn n_columns(&self) -> usize {
        self.n_lags + 1
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[LagRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [LagRow] {
        &mut self.rows
    }

    /// Column names in `target, lag_1..lag_n` order.
    pub fn column_names(&self) -> Vec<String> {
        std::iter::once("target".to_string())
            .chain((1..=self.n_lags).map(lag_name))
            .collect()
    }

    /// Smallest and largest value over every target and lag cell.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.rows
            .iter()
            .flat_map(|r| std::iter::once(r.target).chain(r.lags.iter().copied()))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn targets(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.target).collect()
    }

    /// Predictions in row order; `NaN` for rows not yet predicted.
    pub fn predictions(&self) -> Vec<f64> {
        self.rows
            .iter()
            .map(|r| r.predicted_value().unwrap_or(f64::NAN))
            .collect()
    }
}

/// Column name of the `k`-th lag.
pub fn lag_name(k: usize) -> String {
    format!("lag_{}", k)
}

/// Build a lag table from a raw series.
///
/// Missing observations are dropped before shifting, so lags are taken over the
/// compacted series. Row `t` gets `target = y[t]` and `lag_k = y[t - k]`; the
/// first `window_size` observations have no complete window and produce no row.
pub fn build_lag_table(series: &[Option<f64>], window_size: usize) -> Result<LagTable> {
    if window_size == 0 {
        return Err(FuzzyError::InvalidParameter {
            param: "window_size".to_string(),
            value: window_size.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let values: Vec<f64> = series
        .iter()
        .filter_map(|v| *v)
        .filter(|v| v.is_finite())
        .collect();

    if values.len() <= window_size {
        return Err(FuzzyError::InsufficientData {
            needed: window_size + 1,
            got: values.len(),
        });
    }

    let rows = (window_size..values.len())
        .map(|t| {
            let lags = (1..=window_size).map(|k| values[t - k]).collect();
            LagRow::new(values[t], lags)
        })
        .collect();

    LagTable::new(window_size, rows)
}
