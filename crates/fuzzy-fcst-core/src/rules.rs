//! Rule base construction, rule firing and implication.
//!
//! The rule base is implicit: rule `k` reads "IF lag_1 is term[k] AND … AND
//! lag_n is term[k] THEN target is term[k]". Rules are generated once per
//! session and hold references to the terms they combine.

use crate::defuzz::MembershipProfile;
use crate::error::{FuzzyError, Result};
use crate::fuzzify::Fuzzified;
use crate::membership::Term;
use crate::variable::FuzzyVariables;

/// Fuzzy AND used to combine antecedent degrees into a firing strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntersectionOp {
    /// Gödel t-norm
    #[default]
    Min,
    /// Algebraic product t-norm
    Product,
    /// Arithmetic mean. Not a t-norm: a single zero degree does not zero the
    /// result, so strength is not monotone in added antecedents.
    Mean,
}

impl IntersectionOp {
    pub const ALL: [IntersectionOp; 3] = [
        IntersectionOp::Min,
        IntersectionOp::Product,
        IntersectionOp::Mean,
    ];

    /// Combine `degrees`; an empty input yields 0.0.
    pub fn apply(&self, degrees: &[f64]) -> f64 {
        if degrees.is_empty() {
            return 0.0;
        }
        match self {
            IntersectionOp::Min => degrees.iter().copied().fold(f64::INFINITY, f64::min),
            IntersectionOp::Product => degrees.iter().product(),
            IntersectionOp::Mean => degrees.iter().sum::<f64>() / degrees.len() as f64,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IntersectionOp::Min => "min",
            IntersectionOp::Product => "product",
            IntersectionOp::Mean => "mean",
        }
    }
}

impl std::str::FromStr for IntersectionOp {
    type Err = FuzzyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "min" => return Ok(IntersectionOp::Min),
            "product" => return Ok(IntersectionOp::Product),
            "mean" => return Ok(IntersectionOp::Mean),
            _ => {}
        }

        match s.to_lowercase().as_str() {
            "min" | "minimum" | "fmin" => Ok(IntersectionOp::Min),
            "prod" | "product" => Ok(IntersectionOp::Product),
            "mean" | "avg" | "average" => Ok(IntersectionOp::Mean),
            _ => Err(FuzzyError::InvalidParameter {
                param: "intersection_op".to_string(),
                value: s.to_string(),
                reason: "expected one of min, product, mean".to_string(),
            }),
        }
    }
}

/// Operator projecting a rule's firing strength onto its consequent term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImplicationOp {
    /// Mamdani clipping
    #[default]
    Min,
    /// Larsen scaling
    Product,
    /// Łukasiewicz truncation, `max(0, a + b - 1)`
    BoundedSum,
}

impl ImplicationOp {
    pub const ALL: [ImplicationOp; 3] = [
        ImplicationOp::Min,
        ImplicationOp::Product,
        ImplicationOp::BoundedSum,
    ];

    /// Combine a firing strength with a term's nominal truth level.
    pub fn apply(&self, strength: f64, truth: f64) -> f64 {
        match self {
            ImplicationOp::Min => strength.min(truth),
            ImplicationOp::Product => strength * truth,
            ImplicationOp::BoundedSum => (strength + truth - 1.0).max(0.0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ImplicationOp::Min => "min",
            ImplicationOp::Product => "product",
            ImplicationOp::BoundedSum => "bounded_sum",
        }
    }
}

impl std::str::FromStr for ImplicationOp {
    type Err = FuzzyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "min" => return Ok(ImplicationOp::Min),
            "product" => return Ok(ImplicationOp::Product),
            "bounded_sum" => return Ok(ImplicationOp::BoundedSum),
            _ => {}
        }

        match s.to_lowercase().as_str() {
            "min" | "minimum" | "mamdani" => Ok(ImplicationOp::Min),
            "prod" | "product" | "larsen" => Ok(ImplicationOp::Product),
            "bounded_sum" | "boundedsum" | "lukasiewicz" | "maxmin" => {
                Ok(ImplicationOp::BoundedSum)
            }
            _ => Err(FuzzyError::InvalidParameter {
                param: "implication_op".to_string(),
                value: s.to_string(),
                reason: "expected one of min, product, bounded_sum".to_string(),
            }),
        }
    }
}

/// One generated rule: the `k`-th term of every antecedent implies the `k`-th
/// consequent term.
#[derive(Debug, Clone)]
pub struct Rule<'a> {
    /// One term per antecedent, in `lag_1..lag_n` order
    antecedents: Vec<&'a Term>,
    consequent: &'a Term,
}

impl<'a> Rule<'a> {
    pub fn antecedents(&self) -> &[&'a Term] {
        &self.antecedents
    }

    pub fn consequent(&self) -> &'a Term {
        self.consequent
    }
}

/// Per-rule firing strengths of one inference pass, indexed by rule.
#[derive(Debug, Clone, PartialEq)]
pub struct FiringRecord {
    strengths: Vec<f64>,
}

impl FiringRecord {
    pub fn strengths(&self) -> &[f64] {
        &self.strengths
    }

    pub fn strength(&self, rule: usize) -> Option<f64> {
        self.strengths.get(rule).copied()
    }

    /// Whether any rule fired with non-zero strength.
    pub fn any_fired(&self) -> bool {
        self.strengths.iter().any(|&s| s > 0.0)
    }
}

/// The index-aligned rule base of a session.
#[derive(Debug, Clone)]
pub struct RuleBase<'a> {
    rules: Vec<Rule<'a>>,
    consequent_terms: &'a [Term],
}

impl<'a> RuleBase<'a> {
    /// Generate one rule per shared term index.
    ///
    /// Fails with [`FuzzyError::RuleAlignment`] when an antecedent's term count
    /// differs from the consequent's, since some index would be unreachable.
    pub fn new(variables: &'a FuzzyVariables) -> Result<Self> {
        let consequent = variables.consequent();
        let expected = consequent.num_terms();

        if let Some(var) = variables
            .antecedents()
            .iter()
            .find(|v| v.num_terms() != expected)
        {
            return Err(FuzzyError::RuleAlignment {
                variable: var.name().to_string(),
                expected,
                found: var.num_terms(),
            });
        }

        let rules = consequent
            .terms()
            .iter()
            .map(|term| Rule {
                antecedents: variables
                    .antecedents()
                    .iter()
                    .map(|v| &v.terms()[term.index()])
                    .collect(),
                consequent: term,
            })
            .collect();

        Ok(Self {
            rules,
            consequent_terms: consequent.terms(),
        })
    }

    pub fn rules(&self) -> &[Rule<'a>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Firing strength of every rule for one row's fuzzified inputs.
    ///
    /// `inputs` must hold one entry per antecedent, in `lag_1..lag_n` order.
    pub fn evaluate_rules(
        &self,
        inputs: &[Fuzzified<'_>],
        intersection: IntersectionOp,
    ) -> Result<FiringRecord> {
        let n_antecedents = self.rules.first().map_or(0, |r| r.antecedents.len());
        if inputs.len() != n_antecedents {
            return Err(FuzzyError::InvalidInput(format!(
                "expected {} fuzzified inputs, got {}",
                n_antecedents,
                inputs.len()
            )));
        }

        let mut degrees = Vec::with_capacity(n_antecedents);
        let strengths = self
            .rules
            .iter()
            .map(|rule| {
                degrees.clear();
                degrees.extend(
                    rule.antecedents
                        .iter()
                        .zip(inputs)
                        .map(|(term, input)| input.degree_at(term.index())),
                );
                intersection.apply(&degrees)
            })
            .collect();

        Ok(FiringRecord { strengths })
    }

    /// Project firing strengths onto the consequent terms.
    ///
    /// Contributions to the same consequent term are aggregated by maximum.
    pub fn apply_implication(
        &self,
        firing: &FiringRecord,
        implication: ImplicationOp,
    ) -> MembershipProfile {
        let mut profile = MembershipProfile::from_terms(self.consequent_terms);

        for (rule, &strength) in self.rules.iter().zip(firing.strengths()) {
            let term = rule.consequent;
            let contribution = implication.apply(strength, term.height());
            profile.aggregate_max(term.index(), contribution);
        }

        profile
    }
}
