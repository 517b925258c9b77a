//! Fuzzification: crisp value → membership degree in every term.

use crate::error::{InferenceFailure, Result};
use crate::variable::LinguisticVariable;

/// Membership degrees of one crisp input, indexed like the variable's terms.
#[derive(Debug, Clone, PartialEq)]
pub struct Fuzzified<'a> {
    variable: &'a LinguisticVariable,
    degrees: Vec<f64>,
}

impl<'a> Fuzzified<'a> {
    pub fn variable(&self) -> &'a LinguisticVariable {
        self.variable
    }

    /// Degrees in term order.
    pub fn degrees(&self) -> &[f64] {
        &self.degrees
    }

    /// Degree of the term at `index`, or 0.0 if the variable has no such term.
    pub fn degree_at(&self, index: usize) -> f64 {
        self.degrees.get(index).copied().unwrap_or(0.0)
    }

    /// Degree of the term named `label`.
    pub fn degree(&self, label: &str) -> Option<f64> {
        self.variable
            .terms()
            .iter()
            .position(|t| t.label() == label)
            .map(|i| self.degrees[i])
    }

    /// `(label, degree)` pairs in term order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, f64)> + '_ {
        self.variable
            .terms()
            .iter()
            .zip(self.degrees.iter())
            .map(|(t, &d)| (t.label(), d))
    }
}

/// Membership of `crisp_value` in every term of `variable`.
///
/// Values outside the domain are clamped to its nearest edge, where the
/// boundary shoulder term is fully satisfied. `NaN` cannot be placed on the
/// domain and is rejected as an inference failure.
pub fn fuzzify(variable: &LinguisticVariable, crisp_value: f64) -> Result<Fuzzified<'_>> {
    if crisp_value.is_nan() {
        return Err(InferenceFailure::NonFiniteInput {
            lag: lag_index(variable),
            value: crisp_value,
        }
        .into());
    }

    let x = variable.domain().clamp(crisp_value);
    let degrees = variable.terms().iter().map(|t| t.membership(x)).collect();

    Ok(Fuzzified { variable, degrees })
}

// `lag_k` → k; 0 for variables not named after a lag.
fn lag_index(variable: &LinguisticVariable) -> usize {
    variable
        .name()
        .strip_prefix("lag_")
        .and_then(|k| k.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FuzzyError;
    use crate::variable::{Domain, VariableRole};
    use approx::assert_relative_eq;

    fn lag_variable(num_terms: usize) -> LinguisticVariable {
        let domain = Domain::sampled(0.0, 10.0, 1.0).unwrap();
        LinguisticVariable::auto_partition("lag_2", VariableRole::Antecedent, domain, num_terms)
            .unwrap()
    }

    #[test]
    fn test_fuzzify_interior() {
        let var = lag_variable(3);
        let f = fuzzify(&var, 2.5).unwrap();

        assert_relative_eq!(f.degree("low").unwrap(), 0.5);
        assert_relative_eq!(f.degree("medium").unwrap(), 0.5);
        assert_relative_eq!(f.degree("high").unwrap(), 0.0);
        assert_eq!(f.degree("unknown"), None);
        assert_eq!(f.degrees().len(), 3);
        assert_eq!(f.variable().name(), "lag_2");
    }

    #[test]
    fn test_fuzzify_clamps_outside_domain() {
        let var = lag_variable(5);

        let above = fuzzify(&var, 1e6).unwrap();
        assert_eq!(above.degrees(), &[0.0, 0.0, 0.0, 0.0, 1.0]);

        let below = fuzzify(&var, -1e6).unwrap();
        assert_eq!(below.degrees(), &[1.0, 0.0, 0.0, 0.0, 0.0]);

        let inf = fuzzify(&var, f64::INFINITY).unwrap();
        assert_eq!(inf.degrees(), above.degrees());
    }

    #[test]
    fn test_fuzzify_is_deterministic() {
        let var = lag_variable(7);
        let a = fuzzify(&var, 3.3).unwrap();
        let b = fuzzify(&var, 3.3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fuzzify_nan_fails() {
        let var = lag_variable(3);
        let err = fuzzify(&var, f64::NAN).unwrap_err();
        match err {
            FuzzyError::InferenceFailure(InferenceFailure::NonFiniteInput { lag, value }) => {
                assert_eq!(lag, 2);
                assert!(value.is_nan());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fuzzify_iter_labels() {
        let var = lag_variable(3);
        let f = fuzzify(&var, 10.0).unwrap();
        let pairs: Vec<(&str, f64)> = f.iter().collect();
        assert_eq!(pairs, vec![("low", 0.0), ("medium", 0.0), ("high", 1.0)]);
        assert_relative_eq!(f.degree_at(2), 1.0);
        assert_relative_eq!(f.degree_at(9), 0.0);
    }
}
