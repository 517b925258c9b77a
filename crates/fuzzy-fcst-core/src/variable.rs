//! Linguistic variables and the automatic partition builder.
//!
//! One variable is built per table column over a shared domain: the global
//! min/max of every cell, padded by one unit on each side and sampled at unit
//! steps. `target` becomes the consequent; every lag becomes an antecedent.

use crate::error::{FuzzyError, Result};
use crate::membership::{term_labels, uniform_partition, Term};
use crate::table::{lag_name, LagTable};

/// Padding added below the minimum and above the maximum observed value.
pub const DOMAIN_MARGIN: f64 = 1.0;

/// Sampling step of the domain.
pub const DOMAIN_STEP: f64 = 1.0;

const SAMPLE_TOLERANCE: f64 = 1e-9;

/// Whether a variable is an input or the output of the rule base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableRole {
    Antecedent,
    Consequent,
}

/// Ordered numeric range sampled at a fixed step.
///
/// `end` is the last sample point, which may fall short of the requested upper
/// bound when the span is not a multiple of `step`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    start: f64,
    end: f64,
    step: f64,
}

impl Domain {
    /// Sample `[start, upper]` at `step`, keeping every point that does not
    /// exceed `upper`.
    pub fn sampled(start: f64, upper: f64, step: f64) -> Result<Self> {
        if !start.is_finite() || !upper.is_finite() || step.is_nan() || step <= 0.0 {
            return Err(FuzzyError::InvalidConfiguration(format!(
                "invalid domain [{}, {}] with step {}",
                start, upper, step
            )));
        }
        if upper <= start {
            return Err(FuzzyError::InvalidConfiguration(format!(
                "domain upper bound {} must exceed start {}",
                upper, start
            )));
        }

        let intervals = ((upper - start) / step + SAMPLE_TOLERANCE).floor();
        Ok(Self {
            start,
            end: start + intervals * step,
            step,
        })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of sample points.
    pub fn n_points(&self) -> usize {
        ((self.end - self.start) / self.step + SAMPLE_TOLERANCE).floor() as usize + 1
    }

    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.start, self.end)
    }

    /// Sample points from `start` to `end` inclusive.
    pub fn points(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.n_points()).map(move |i| self.start + i as f64 * self.step)
    }
}

/// A named quantity described by ordered, overlapping fuzzy terms.
///
/// Immutable once built; shared read-only by every inference pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LinguisticVariable {
    name: String,
    role: VariableRole,
    domain: Domain,
    terms: Vec<Term>,
}

impl LinguisticVariable {
    /// Build a variable whose terms uniformly partition `domain`.
    pub fn auto_partition(
        name: impl Into<String>,
        role: VariableRole,
        domain: Domain,
        num_terms: usize,
    ) -> Result<Self> {
        if num_terms < 2 {
            return Err(FuzzyError::InvalidConfiguration(format!(
                "num_terms must be at least 2, got {}",
                num_terms
            )));
        }

        let terms = term_labels(num_terms)
            .into_iter()
            .zip(uniform_partition(domain.start(), domain.end(), num_terms))
            .enumerate()
            .map(|(i, (label, function))| Term::new(i, label, function))
            .collect();

        Ok(Self {
            name: name.into(),
            role,
            domain,
            terms,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> VariableRole {
        self.role
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn term(&self, label: &str) -> Option<&Term> {
        self.terms.iter().find(|t| t.label() == label)
    }

    /// Term positions, lowest term first.
    pub fn positions(&self) -> Vec<f64> {
        self.terms.iter().map(|t| t.position()).collect()
    }

    /// Sum of every term's membership at `x`.
    pub fn total_membership(&self, x: f64) -> f64 {
        self.terms.iter().map(|t| t.membership(x)).sum()
    }
}

/// The variables of one prediction session: one antecedent per lag and the
/// `target` consequent.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyVariables {
    /// `antecedents[k - 1]` describes `lag_k`
    antecedents: Vec<LinguisticVariable>,
    consequent: LinguisticVariable,
}

impl FuzzyVariables {
    /// Assemble a session from prebuilt variables, checking their roles.
    pub fn new(
        antecedents: Vec<LinguisticVariable>,
        consequent: LinguisticVariable,
    ) -> Result<Self> {
        if antecedents.is_empty() {
            return Err(FuzzyError::InvalidConfiguration(
                "at least one antecedent variable is required".to_string(),
            ));
        }
        if let Some(v) = antecedents
            .iter()
            .find(|v| v.role() != VariableRole::Antecedent)
        {
            return Err(FuzzyError::InvalidConfiguration(format!(
                "variable '{}' is not an antecedent",
                v.name()
            )));
        }
        if consequent.role() != VariableRole::Consequent {
            return Err(FuzzyError::InvalidConfiguration(format!(
                "variable '{}' is not a consequent",
                consequent.name()
            )));
        }

        Ok(Self {
            antecedents,
            consequent,
        })
    }

    pub fn antecedents(&self) -> &[LinguisticVariable] {
        &self.antecedents
    }

    /// Antecedent for `lag_k` (1-based).
    pub fn antecedent(&self, k: usize) -> Option<&LinguisticVariable> {
        k.checked_sub(1).and_then(|i| self.antecedents.get(i))
    }

    pub fn consequent(&self) -> &LinguisticVariable {
        &self.consequent
    }

    pub fn n_lags(&self) -> usize {
        self.antecedents.len()
    }

    /// All variables in table column order (`target, lag_1..lag_n`).
    pub fn iter(&self) -> impl Iterator<Item = &LinguisticVariable> {
        std::iter::once(&self.consequent).chain(self.antecedents.iter())
    }
}

/// Build one linguistic variable per table column.
///
/// Every variable shares the domain `[min - 1, max + 1]` (sampled at unit
/// steps) and is partitioned into `num_terms` terms.
pub fn build_variables(table: &LagTable, num_terms: usize) -> Result<FuzzyVariables> {
    if num_terms < 2 {
        return Err(FuzzyError::InvalidConfiguration(format!(
            "num_terms must be at least 2, got {}",
            num_terms
        )));
    }
    if table.n_columns() < 2 {
        return Err(FuzzyError::InvalidConfiguration(
            "table needs a target and at least one lag column".to_string(),
        ));
    }

    let (min_value, max_value) = table.value_range().ok_or_else(|| {
        FuzzyError::InvalidConfiguration("cannot derive a domain from an empty table".to_string())
    })?;

    let domain = Domain::sampled(
        min_value - DOMAIN_MARGIN,
        max_value + DOMAIN_MARGIN,
        DOMAIN_STEP,
    )?;

    let antecedents = (1..=table.n_lags())
        .map(|k| {
            LinguisticVariable::auto_partition(
                lag_name(k),
                VariableRole::Antecedent,
                domain,
                num_terms,
            )
        })
        .collect::<Result<Vec<_>>>()?;
    let consequent =
        LinguisticVariable::auto_partition("target", VariableRole::Consequent, domain, num_terms)?;

    tracing::debug!(
        domain_start = domain.start(),
        domain_end = domain.end(),
        num_terms,
        n_antecedents = antecedents.len(),
        "built linguistic variables"
    );

    FuzzyVariables::new(antecedents, consequent)
}
