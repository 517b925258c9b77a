//! Aggregated membership profiles and defuzzification.
//!
//! A [`MembershipProfile`] carries one aggregated membership per consequent
//! term together with the term's position on the domain. Defuzzification
//! collapses it to a crisp value:
//!
//! - **Centroid**: centre of mass of the term memberships placed at their
//!   positions
//! - **Mean of maxima**: mean position of every term tied at the maximum
//! - **Weighted average**: `Σ(position·membership) / Σ(membership)`
//!
//! Centroid and weighted average return 0.0 when the profile carries no
//! membership at all.

use crate::error::FuzzyError;
use crate::membership::Term;

/// Tolerance for treating two memberships as tied at the maximum.
const TIE_TOLERANCE: f64 = 1e-12;

/// One consequent term's aggregated membership.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileEntry {
    pub label: String,
    pub position: f64,
    pub membership: f64,
}

/// Per-term aggregated membership, ordered by ascending position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MembershipProfile {
    entries: Vec<ProfileEntry>,
}

impl MembershipProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero-membership profile over `terms`.
    pub fn from_terms(terms: &[Term]) -> Self {
        Self {
            entries: terms
                .iter()
                .map(|t| ProfileEntry {
                    label: t.label().to_string(),
                    position: t.position(),
                    membership: 0.0,
                })
                .collect(),
        }
    }

    /// Append an entry; callers push in ascending position order.
    pub fn push(&mut self, label: impl Into<String>, position: f64, membership: f64) {
        self.entries.push(ProfileEntry {
            label: label.into(),
            position,
            membership,
        });
    }

    /// Raise entry `index` to `membership` if that is larger (max aggregation).
    pub fn aggregate_max(&mut self, index: usize, membership: f64) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.membership = entry.membership.max(membership);
        }
    }

    pub fn entries(&self) -> &[ProfileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn membership(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.membership)
    }

    pub fn memberships(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.membership).collect()
    }

    pub fn total_membership(&self) -> f64 {
        self.entries.iter().map(|e| e.membership).sum()
    }

    /// True when no term carries any membership.
    pub fn is_degenerate(&self) -> bool {
        self.entries.iter().all(|e| e.membership <= 0.0)
    }
}

/// Defuzzification strategy, selected once per prediction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefuzzMethod {
    #[default]
    Centroid,
    MeanOfMaxima,
    WeightedAverage,
}

impl DefuzzMethod {
    pub const ALL: [DefuzzMethod; 3] = [
        DefuzzMethod::Centroid,
        DefuzzMethod::MeanOfMaxima,
        DefuzzMethod::WeightedAverage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DefuzzMethod::Centroid => "centroid",
            DefuzzMethod::MeanOfMaxima => "mean_of_maxima",
            DefuzzMethod::WeightedAverage => "weighted_average",
        }
    }
}

impl std::str::FromStr for DefuzzMethod {
    type Err = FuzzyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "centroid" => return Ok(DefuzzMethod::Centroid),
            "mean_of_maxima" => return Ok(DefuzzMethod::MeanOfMaxima),
            "weighted_average" => return Ok(DefuzzMethod::WeightedAverage),
            _ => {}
        }

        match s.to_lowercase().as_str() {
            "centroid" | "coa" => Ok(DefuzzMethod::Centroid),
            "mom" | "mean_of_maxima" | "meanofmaxima" | "mean_of_maximum" => {
                Ok(DefuzzMethod::MeanOfMaxima)
            }
            "wa" | "weighted_average" | "weightedaverage" => Ok(DefuzzMethod::WeightedAverage),
            _ => Err(FuzzyError::InvalidParameter {
                param: "defuzz_method".to_string(),
                value: s.to_string(),
                reason: "expected one of centroid, mean_of_maxima, weighted_average".to_string(),
            }),
        }
    }
}

/// Collapse `profile` to a crisp value with `method`.
pub fn defuzzify(profile: &MembershipProfile, method: DefuzzMethod) -> f64 {
    match method {
        DefuzzMethod::Centroid => centroid(profile),
        DefuzzMethod::MeanOfMaxima => mean_of_maxima(profile),
        DefuzzMethod::WeightedAverage => weighted_average(profile),
    }
}

/// Centre of mass of the profile, with each term's membership as a point mass
/// at the term's position.
///
/// Returns 0.0 when the total membership is zero.
pub fn centroid(profile: &MembershipProfile) -> f64 {
    let (moment, mass) = profile
        .entries()
        .iter()
        .fold((0.0, 0.0), |(moment, mass), e| {
            (moment + e.position * e.membership, mass + e.membership)
        });

    if mass > 0.0 {
        moment / mass
    } else {
        0.0
    }
}

/// Mean position of the terms tied at the maximum membership.
///
/// An all-zero profile ties every term; an empty profile returns 0.0.
pub fn mean_of_maxima(profile: &MembershipProfile) -> f64 {
    let entries = profile.entries();
    if entries.is_empty() {
        return 0.0;
    }

    let max = entries
        .iter()
        .map(|e| e.membership)
        .fold(f64::NEG_INFINITY, f64::max);

    let (sum, count) = entries
        .iter()
        .filter(|e| (e.membership - max).abs() <= TIE_TOLERANCE)
        .fold((0.0, 0usize), |(sum, count), e| (sum + e.position, count + 1));

    sum / count as f64
}

/// `Σ(position·membership) / Σ(membership)`, or 0.0 when the denominator is zero.
pub fn weighted_average(profile: &MembershipProfile) -> f64 {
    let (numerator, denominator) = profile
        .entries()
        .iter()
        .fold((0.0, 0.0), |(num, den), e| {
            (num + e.position * e.membership, den + e.membership)
        });

    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}
