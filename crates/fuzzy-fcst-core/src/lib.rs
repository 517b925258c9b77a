//! Fuzzy rule-based time series prediction.
//!
//! A series is turned into a lag table, every lag column and the target get a
//! linguistic variable with an automatic triangular partition, and an
//! index-aligned Mamdani rule base predicts each row's target from its lags.

pub mod defuzz;
pub mod error;
pub mod evaluate;
pub mod fuzzify;
pub mod membership;
pub mod metrics;
pub mod predict;
pub mod rules;
pub mod table;
pub mod variable;

// Re-exports for convenience
pub use defuzz::{
    centroid, defuzzify, mean_of_maxima, weighted_average, DefuzzMethod, MembershipProfile,
    ProfileEntry,
};
pub use error::{FuzzyError, InferenceFailure, Result};
pub use evaluate::{evaluate, evaluate_series, Evaluation};
pub use fuzzify::{fuzzify, Fuzzified};
pub use membership::{term_labels, uniform_partition, MembershipFunction, Term};
pub use metrics::{mse, rmse};
pub use predict::{predict, predict_table, FuzzyEngine, FuzzyOptions, PredictionSummary};
pub use rules::{FiringRecord, ImplicationOp, IntersectionOp, Rule, RuleBase};
pub use table::{
    build_lag_table, lag_name, LagRow, LagTable, Prediction, PredictionStatus,
};
pub use variable::{
    build_variables, Domain, FuzzyVariables, LinguisticVariable, VariableRole,
};
