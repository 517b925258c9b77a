//! In-sample evaluation: predict every row, then score predictions against
//! targets.

use crate::error::Result;
use crate::metrics::{mse, rmse};
use crate::predict::{predict, FuzzyOptions, PredictionSummary};
use crate::table::{build_lag_table, LagTable};
use crate::variable::{build_variables, FuzzyVariables};

/// Accuracy of one prediction run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub mse: f64,
    pub rmse: f64,
    pub summary: PredictionSummary,
}

/// Predict every row of `table` with `variables` and score the result.
///
/// Fallback rows count toward the error like any other row.
pub fn evaluate(
    table: &mut LagTable,
    variables: &FuzzyVariables,
    options: &FuzzyOptions,
) -> Result<Evaluation> {
    let summary = predict(table.rows_mut(), variables, options)?;

    let targets = table.targets();
    let predictions = table.predictions();
    let evaluation = Evaluation {
        mse: mse(&targets, &predictions)?,
        rmse: rmse(&targets, &predictions)?,
        summary,
    };

    tracing::info!(
        mse = evaluation.mse,
        rmse = evaluation.rmse,
        fallbacks = summary.fallbacks,
        "fuzzy evaluation finished"
    );

    Ok(evaluation)
}

/// Lag `series`, build variables from the resulting table, and evaluate.
///
/// Missing values are dropped before lagging. Returns the predicted table
/// alongside its score.
pub fn evaluate_series(
    series: &[Option<f64>],
    window_size: usize,
    options: &FuzzyOptions,
) -> Result<(LagTable, Evaluation)> {
    options.validate()?;
    let mut table = build_lag_table(series, window_size)?;
    let variables = build_variables(&table, options.num_terms)?;
    let evaluation = evaluate(&mut table, &variables, options)?;
    Ok((table, evaluation))
}
