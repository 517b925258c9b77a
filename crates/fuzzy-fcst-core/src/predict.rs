//! The per-row prediction loop.
//!
//! Each row is fuzzified lag by lag, the rule base fires, the consequent
//! profile is aggregated and defuzzified, and the crisp value is written back
//! into the row's `predict` column.
//!
//! # Fallback policy
//!
//! When a row's inference fails (an input cannot be fuzzified, no rule fires,
//! or defuzzification yields a non-finite value) the prediction is the value of
//! the last lag processed for that row. Lags are processed from `lag_n` down to
//! `lag_1`, so this is `lag_1`, the most recent observation: a naive
//! persistence forecast. The row's [`PredictionStatus`] records the failure so
//! callers can tell the two paths apart; the failure is never propagated.

use crate::defuzz::{defuzzify, DefuzzMethod, MembershipProfile};
use crate::error::{FuzzyError, InferenceFailure, Result};
use crate::fuzzify::{fuzzify, Fuzzified};
use crate::rules::{ImplicationOp, IntersectionOp, RuleBase};
use crate::table::{LagRow, LagTable, Prediction, PredictionStatus};
use crate::variable::{build_variables, FuzzyVariables};

/// Options for a prediction run.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyOptions {
    /// Terms per linguistic variable (same for every variable, at least 2)
    pub num_terms: usize,
    /// Fuzzy AND combining antecedent degrees
    pub intersection: IntersectionOp,
    /// Projection of firing strength onto consequent terms
    pub implication: ImplicationOp,
    /// Strategy collapsing the aggregated profile
    pub defuzzification: DefuzzMethod,
    /// Process rows in parallel (requires the `native` feature)
    pub parallel: bool,
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        Self {
            num_terms: 7,
            intersection: IntersectionOp::Min,
            implication: ImplicationOp::Min,
            defuzzification: DefuzzMethod::Centroid,
            parallel: false,
        }
    }
}

impl FuzzyOptions {
    pub fn validate(&self) -> Result<()> {
        if self.num_terms < 2 {
            return Err(FuzzyError::InvalidConfiguration(format!(
                "num_terms must be at least 2, got {}",
                self.num_terms
            )));
        }
        Ok(())
    }
}

/// Outcome counts of a prediction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PredictionSummary {
    /// Rows visited
    pub rows: usize,
    /// Rows that used the persistence fallback
    pub fallbacks: usize,
}

impl PredictionSummary {
    pub fn inferred(&self) -> usize {
        self.rows - self.fallbacks
    }
}

/// Inference engine over a fixed set of variables and operators.
///
/// Holds the generated rule base, so it can be reused across rows and shared
/// between threads.
#[derive(Debug, Clone)]
pub struct FuzzyEngine<'a> {
    variables: &'a FuzzyVariables,
    rules: RuleBase<'a>,
    intersection: IntersectionOp,
    implication: ImplicationOp,
    defuzzification: DefuzzMethod,
}

impl<'a> FuzzyEngine<'a> {
    pub fn new(variables: &'a FuzzyVariables, options: &FuzzyOptions) -> Result<Self> {
        Ok(Self {
            variables,
            rules: RuleBase::new(variables)?,
            intersection: options.intersection,
            implication: options.implication,
            defuzzification: options.defuzzification,
        })
    }

    pub fn variables(&self) -> &'a FuzzyVariables {
        self.variables
    }

    pub fn rules(&self) -> &RuleBase<'a> {
        &self.rules
    }

    pub fn n_lags(&self) -> usize {
        self.variables.n_lags()
    }

    /// Fuzzify `lags` (`lags[k - 1]` = `lag_k`) against their antecedents.
    ///
    /// Lags are processed from `lag_n` down to `lag_1`; the result is returned
    /// in `lag_1..lag_n` order.
    pub fn fuzzify_lags(&self, lags: &[f64]) -> Result<Vec<Fuzzified<'a>>> {
        if lags.len() != self.n_lags() {
            return Err(FuzzyError::InvalidInput(format!(
                "expected {} lag values, got {}",
                self.n_lags(),
                lags.len()
            )));
        }

        let mut inputs = self
            .variables
            .antecedents()
            .iter()
            .zip(lags)
            .rev()
            .map(|(variable, &value)| fuzzify(variable, value))
            .collect::<Result<Vec<_>>>()?;
        inputs.reverse();
        Ok(inputs)
    }

    /// Aggregated consequent profile for one row of lags.
    pub fn profile(&self, lags: &[f64]) -> Result<MembershipProfile> {
        let inputs = self.fuzzify_lags(lags)?;
        let firing = self.rules.evaluate_rules(&inputs, self.intersection)?;
        Ok(self.rules.apply_implication(&firing, self.implication))
    }

    /// Crisp prediction for one row of lags.
    ///
    /// Fails with [`FuzzyError::InferenceFailure`] when the profile is all zero
    /// or the defuzzified value is not finite.
    pub fn infer(&self, lags: &[f64]) -> Result<f64> {
        let profile = self.profile(lags)?;
        if profile.is_degenerate() {
            return Err(InferenceFailure::DegenerateProfile.into());
        }

        let value = defuzzify(&profile, self.defuzzification);
        if !value.is_finite() {
            return Err(InferenceFailure::NonFiniteOutput(value).into());
        }
        Ok(value)
    }

    /// Predict one row, substituting the persistence fallback on inference
    /// failure. Shape errors are still returned.
    pub fn predict_row(&self, row: &LagRow) -> Result<Prediction> {
        match self.infer(&row.lags) {
            Ok(value) => Ok(Prediction::inferred(value)),
            Err(FuzzyError::InferenceFailure(reason)) => {
                let fallback = last_processed_lag(row);
                Ok(Prediction::fallback(fallback, reason))
            }
            Err(e) => Err(e),
        }
    }

    fn apply(&self, index: usize, row: &mut LagRow) -> Result<()> {
        let prediction = self.predict_row(row)?;
        if let PredictionStatus::Fallback(reason) = prediction.status {
            tracing::debug!(
                row = index,
                reason = %reason,
                fallback = prediction.value,
                "inference failed, using last lag"
            );
        }
        row.predict = Some(prediction);
        Ok(())
    }
}

// lag_1 is processed last.
fn last_processed_lag(row: &LagRow) -> f64 {
    row.lag(1).unwrap_or(f64::NAN)
}

/// Predict every row in place, writing each row's `predict` column.
///
/// Configuration and shape problems fail before any row is touched. Per-row
/// inference failures fall back to the row's last processed lag.
pub fn predict(
    rows: &mut [LagRow],
    variables: &FuzzyVariables,
    options: &FuzzyOptions,
) -> Result<PredictionSummary> {
    options.validate()?;

    let n_lags = variables.n_lags();
    if let Some((i, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, r)| r.lags.len() != n_lags)
    {
        return Err(FuzzyError::InvalidConfiguration(format!(
            "row {} has {} lag columns, variables expect {}",
            i,
            row.lags.len(),
            n_lags
        )));
    }

    let engine = FuzzyEngine::new(variables, options)?;

    tracing::debug!(
        rows = rows.len(),
        n_lags,
        num_terms = variables.consequent().num_terms(),
        intersection = options.intersection.name(),
        implication = options.implication.name(),
        defuzzification = options.defuzzification.name(),
        parallel = options.parallel,
        "running fuzzy prediction"
    );

    run_rows(&engine, rows, options.parallel)?;

    let summary = PredictionSummary {
        rows: rows.len(),
        fallbacks: rows
            .iter()
            .filter(|r| r.predict.is_some_and(|p| p.is_fallback()))
            .count(),
    };

    tracing::info!(
        rows = summary.rows,
        fallbacks = summary.fallbacks,
        "fuzzy prediction finished"
    );

    Ok(summary)
}

/// Build variables from `table` itself and predict every row in place.
///
/// Returns the variables so callers can inspect the session.
pub fn predict_table(
    table: &mut LagTable,
    options: &FuzzyOptions,
) -> Result<(FuzzyVariables, PredictionSummary)> {
    options.validate()?;
    let variables = build_variables(table, options.num_terms)?;
    let summary = predict(table.rows_mut(), &variables, options)?;
    Ok((variables, summary))
}

#[cfg(feature = "native")]
fn run_rows(engine: &FuzzyEngine<'_>, rows: &mut [LagRow], parallel: bool) -> Result<()> {
    use rayon::prelude::*;

    if parallel {
        return rows
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(i, row)| engine.apply(i, row));
    }
    run_sequential(engine, rows)
}

#[cfg(not(feature = "native"))]
fn run_rows(engine: &FuzzyEngine<'_>, rows: &mut [LagRow], _parallel: bool) -> Result<()> {
    run_sequential(engine, rows)
}

fn run_sequential(engine: &FuzzyEngine<'_>, rows: &mut [LagRow]) -> Result<()> {
    rows.iter_mut()
        .enumerate()
        .try_for_each(|(i, row)| engine.apply(i, row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::build_lag_table;
    use crate::variable::{Domain, LinguisticVariable, VariableRole};
    use approx::assert_relative_eq;

    /// lag_1 = previous value: lags [1..5], targets [2..6].
    fn step_table() -> LagTable {
        let rows = (1..=5)
            .map(|v| LagRow::new(v as f64 + 1.0, vec![v as f64]))
            .collect();
        LagTable::new(1, rows).unwrap()
    }

    fn options(num_terms: usize, defuzzification: DefuzzMethod) -> FuzzyOptions {
        FuzzyOptions {
            num_terms,
            defuzzification,
            ..FuzzyOptions::default()
        }
    }

    #[test]
    fn test_step_series_centroid() {
        let mut table = step_table();
        let (variables, summary) =
            predict_table(&mut table, &options(3, DefuzzMethod::Centroid)).unwrap();

        assert_eq!(summary.rows, 5);
        assert_eq!(summary.fallbacks, 0);
        assert_relative_eq!(variables.consequent().domain().start(), 0.0);
        assert_relative_eq!(variables.consequent().domain().end(), 7.0);

        let predictions = table.predictions();
        for (p, lag) in predictions.iter().zip([1.0, 2.0, 3.0, 4.0, 5.0]) {
            assert_relative_eq!(*p, lag, epsilon = 1e-9);
        }

        for pair in predictions.windows(2) {
            assert!(pair[1] > pair[0], "predictions must increase: {:?}", predictions);
        }
        for p in &predictions {
            assert!((0.0..=7.0).contains(p));
        }

        let rows = table.rows();
        for row in &rows[1..rows.len() - 1] {
            let error = (row.predicted_value().unwrap() - row.target).abs();
            assert!(error <= 1.0 + 1e-9, "row {:?}", row);
        }
    }

    #[test]
    fn test_step_series_weighted_average_is_persistence() {
        let mut table = step_table();
        predict_table(&mut table, &options(3, DefuzzMethod::WeightedAverage)).unwrap();

        for row in table.rows() {
            let predicted = row.predicted_value().unwrap();
            assert_relative_eq!(predicted, row.lag(1).unwrap(), epsilon = 1e-9);
            assert!((predicted - row.target).abs() <= 1.0 + 1e-9);
            assert_eq!(row.predict.unwrap().status, PredictionStatus::Inferred);
        }
    }

    #[test]
    fn test_mean_of_maxima_snaps_to_term_positions() {
        let mut table = step_table();
        predict_table(&mut table, &options(3, DefuzzMethod::MeanOfMaxima)).unwrap();

        let predictions = table.predictions();
        assert_eq!(predictions, vec![0.0, 3.5, 3.5, 3.5, 3.5]);
    }

    #[test]
    fn test_fallback_when_no_rule_fires() {
        let rows = vec![
            LagRow::new(5.0, vec![4.0, 3.0]),
            LagRow::new(6.0, vec![5.0, 4.0]),
        ];
        let table = LagTable::new(2, rows).unwrap();
        let variables = build_variables(&table, 3).unwrap();

        // lag_1 far above the domain, lag_2 far below: every rule has a zero
        // antecedent, so nothing fires under min
        let mut pathological = vec![LagRow::new(0.0, vec![1e6, -1e6])];
        let summary = predict(
            &mut pathological,
            &variables,
            &options(3, DefuzzMethod::WeightedAverage),
        )
        .unwrap();

        assert_eq!(summary.fallbacks, 1);
        assert_eq!(summary.inferred(), 0);
        let prediction = pathological[0].predict.unwrap();
        assert_eq!(prediction.value, 1e6);
        assert_eq!(
            prediction.status,
            PredictionStatus::Fallback(InferenceFailure::DegenerateProfile)
        );
    }

    #[test]
    fn test_all_lags_past_the_same_edge_saturate_the_shoulder() {
        let rows = vec![
            LagRow::new(5.0, vec![4.0, 3.0]),
            LagRow::new(6.0, vec![5.0, 4.0]),
        ];
        let table = LagTable::new(2, rows).unwrap();
        let variables = build_variables(&table, 3).unwrap();
        let top = variables.consequent().terms()[2].position();
        let bottom = variables.consequent().terms()[0].position();

        // clamping puts both lags fully in the same shoulder, so its rule fires
        let mut above = vec![LagRow::new(0.0, vec![1e6, 1e6])];
        let mut below = vec![LagRow::new(0.0, vec![-1e6, -1e6])];
        for method in DefuzzMethod::ALL {
            let opts = options(3, method);
            predict(&mut above, &variables, &opts).unwrap();
            predict(&mut below, &variables, &opts).unwrap();

            let high = above[0].predict.unwrap();
            assert_eq!(high.status, PredictionStatus::Inferred);
            assert_relative_eq!(high.value, top, epsilon = 1e-12);

            let low = below[0].predict.unwrap();
            assert_eq!(low.status, PredictionStatus::Inferred);
            assert_relative_eq!(low.value, bottom, epsilon = 1e-12);
        }
        assert_relative_eq!(top, 7.0);
        assert_relative_eq!(bottom, 2.0);
    }

    #[test]
    fn test_mean_intersection_avoids_fallback() {
        let table = LagTable::new(2, vec![LagRow::new(5.0, vec![4.0, 3.0])]).unwrap();
        let variables = build_variables(&table, 3).unwrap();

        let mut rows = vec![LagRow::new(0.0, vec![1e6, -1e6])];
        let opts = FuzzyOptions {
            num_terms: 3,
            intersection: IntersectionOp::Mean,
            ..FuzzyOptions::default()
        };
        let summary = predict(&mut rows, &variables, &opts).unwrap();

        assert_eq!(summary.fallbacks, 0);
        assert!(!rows[0].predict.unwrap().is_fallback());
    }

    #[test]
    fn test_nan_lag_falls_back_to_lag_1() {
        let table = LagTable::new(2, vec![LagRow::new(5.0, vec![4.0, 3.0])]).unwrap();
        let variables = build_variables(&table, 3).unwrap();

        let mut rows = vec![LagRow::new(5.0, vec![4.5, f64::NAN])];
        predict(&mut rows, &variables, &FuzzyOptions::default()).unwrap();

        let prediction = rows[0].predict.unwrap();
        assert_eq!(prediction.value, 4.5);
        // NaN payload: compare by shape
        assert!(matches!(
            prediction.status,
            PredictionStatus::Fallback(InferenceFailure::NonFiniteInput { lag: 2, .. })
        ));
    }

    #[test]
    fn test_shape_errors_fail_before_any_row() {
        let table = step_table();
        let variables = build_variables(&table, 3).unwrap();

        let mut rows = vec![
            LagRow::new(2.0, vec![1.0]),
            LagRow::new(3.0, vec![2.0, 1.0]),
        ];
        let result = predict(&mut rows, &variables, &FuzzyOptions::default());

        assert!(matches!(result, Err(FuzzyError::InvalidConfiguration(_))));
        assert!(rows.iter().all(|r| r.predict.is_none()));
    }

    #[test]
    fn test_invalid_num_terms() {
        let mut table = step_table();
        let result = predict_table(&mut table, &options(1, DefuzzMethod::Centroid));
        assert!(matches!(result, Err(FuzzyError::InvalidConfiguration(_))));
        assert!(table.rows().iter().all(|r| r.predict.is_none()));
    }

    #[test]
    fn test_rule_alignment_fails_before_any_row() {
        let domain = Domain::sampled(0.0, 10.0, 1.0).unwrap();
        let variables = FuzzyVariables::new(
            vec![
                LinguisticVariable::auto_partition("lag_1", VariableRole::Antecedent, domain, 5)
                    .unwrap(),
            ],
            LinguisticVariable::auto_partition("target", VariableRole::Consequent, domain, 3)
                .unwrap(),
        )
        .unwrap();

        let mut rows = vec![LagRow::new(2.0, vec![1.0])];
        let result = predict(&mut rows, &variables, &FuzzyOptions::default());

        assert!(matches!(result, Err(FuzzyError::RuleAlignment { .. })));
        assert!(rows[0].predict.is_none());
    }

    #[test]
    fn test_engine_infer_and_profile() {
        let table = step_table();
        let variables = build_variables(&table, 3).unwrap();
        let engine = FuzzyEngine::new(&variables, &FuzzyOptions::default()).unwrap();

        assert_eq!(engine.n_lags(), 1);
        assert_eq!(engine.rules().len(), 3);

        let profile = engine.profile(&[1.0]).unwrap();
        assert_relative_eq!(profile.membership("low").unwrap(), 2.5 / 3.5, epsilon = 1e-12);
        assert_relative_eq!(profile.membership("medium").unwrap(), 1.0 / 3.5, epsilon = 1e-12);
        assert_relative_eq!(engine.infer(&[1.0]).unwrap(), 1.0, epsilon = 1e-12);

        assert!(matches!(
            engine.infer(&[1.0, 2.0]),
            Err(FuzzyError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_predictions_within_padded_domain() {
        let series: Vec<Option<f64>> = (0..60)
            .map(|i| Some(20.0 + 8.0 * (i as f64 * 0.4).sin() + (i % 5) as f64))
            .collect();
        let table = build_lag_table(&series, 3).unwrap();
        let (lo, hi) = table.value_range().unwrap();

        for intersection in IntersectionOp::ALL {
            for implication in ImplicationOp::ALL {
                for defuzzification in DefuzzMethod::ALL {
                    let mut t = table.clone();
                    let opts = FuzzyOptions {
                        num_terms: 5,
                        intersection,
                        implication,
                        defuzzification,
                        parallel: false,
                    };
                    predict_table(&mut t, &opts).unwrap();

                    for row in t.rows() {
                        let prediction = row.predict.unwrap();
                        assert!(prediction.value.is_finite());
                        if !prediction.is_fallback() {
                            assert!(prediction.value >= lo - 1.0 - 1e-9);
                            assert!(prediction.value <= hi + 1.0 + 1e-9);
                        }
                    }
                }
            }
        }
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_parallel_matches_sequential() {
        let series: Vec<Option<f64>> = (0..200)
            .map(|i| Some(50.0 + 10.0 * (i as f64 * 0.2).cos()))
            .collect();
        let table = build_lag_table(&series, 4).unwrap();

        let mut sequential = table.clone();
        let mut parallel = table;
        let opts = FuzzyOptions::default();
        let parallel_opts = FuzzyOptions {
            parallel: true,
            ..opts.clone()
        };

        let s1 = predict_table(&mut sequential, &opts).unwrap().1;
        let s2 = predict_table(&mut parallel, &parallel_opts).unwrap().1;

        assert_eq!(s1, s2);
        assert_eq!(sequential.rows(), parallel.rows());
    }
}
