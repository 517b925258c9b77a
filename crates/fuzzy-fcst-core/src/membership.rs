//! Membership functions and linguistic terms.

/// Piecewise-linear membership function over a variable's domain.
///
/// Shoulders are the open-ended extreme terms of a partition: they stay at 1.0
/// beyond their peak, so values past the domain edge saturate instead of
/// dropping to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MembershipFunction {
    /// Triangle rising from `left` to 1.0 at `peak`, falling to 0.0 at `right`
    Triangular { left: f64, peak: f64, right: f64 },
    /// 1.0 up to `peak`, falling to 0.0 at `foot` (`peak < foot`)
    LeftShoulder { peak: f64, foot: f64 },
    /// 0.0 up to `foot`, rising to 1.0 at `peak` and staying there (`foot < peak`)
    RightShoulder { foot: f64, peak: f64 },
}

impl MembershipFunction {
    /// Membership degree of `x`, in `[0, 1]`.
    pub fn evaluate(&self, x: f64) -> f64 {
        match *self {
            MembershipFunction::Triangular { left, peak, right } => {
                if x == peak {
                    1.0
                } else if x <= left || x >= right {
                    0.0
                } else if x < peak {
                    (x - left) / (peak - left)
                } else {
                    (right - x) / (right - peak)
                }
            }
            MembershipFunction::LeftShoulder { peak, foot } => {
                if x <= peak {
                    1.0
                } else if x >= foot {
                    0.0
                } else {
                    (foot - x) / (foot - peak)
                }
            }
            MembershipFunction::RightShoulder { foot, peak } => {
                if x >= peak {
                    1.0
                } else if x <= foot {
                    0.0
                } else {
                    (x - foot) / (peak - foot)
                }
            }
        }
    }

    /// Innermost point of full membership.
    pub fn peak(&self) -> f64 {
        match *self {
            MembershipFunction::Triangular { peak, .. }
            | MembershipFunction::LeftShoulder { peak, .. }
            | MembershipFunction::RightShoulder { peak, .. } => peak,
        }
    }

    /// Maximum membership attained by the function. Every shape here reaches
    /// 1.0 at its peak, so the partition is always normal.
    pub fn height(&self) -> f64 {
        1.0
    }
}

/// One named fuzzy set of a linguistic variable.
///
/// `index` is the term's position in its variable's ordering (0 = lowest). Rules
/// pair antecedent and consequent terms by this index.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    index: usize,
    label: String,
    function: MembershipFunction,
}

impl Term {
    pub fn new(index: usize, label: impl Into<String>, function: MembershipFunction) -> Self {
        Self {
            index,
            label: label.into(),
            function,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn function(&self) -> &MembershipFunction {
        &self.function
    }

    pub fn membership(&self, x: f64) -> f64 {
        self.function.evaluate(x)
    }

    /// Representative value of the term on the domain, used by defuzzification.
    pub fn position(&self) -> f64 {
        self.function.peak()
    }

    /// Nominal truth level fed to the implication operator.
    pub fn height(&self) -> f64 {
        self.function.height()
    }
}

/// Labels for an automatic partition of `num_terms` terms, lowest first.
pub fn term_labels(num_terms: usize) -> Vec<String> {
    let named: &[&str] = match num_terms {
        3 => &["low", "medium", "high"],
        5 => &["very_low", "low", "medium", "high", "very_high"],
        7 => &[
            "extremely_low",
            "very_low",
            "low",
            "medium",
            "high",
            "very_high",
            "extremely_high",
        ],
        _ => &[],
    };

    if named.is_empty() {
        (0..num_terms).map(|i| format!("term_{}", i)).collect()
    } else {
        named.iter().map(|s| s.to_string()).collect()
    }
}

/// Evenly spaced overlapping triangles over `[lo, hi]` with shoulder extremes.
///
/// Each term peaks at `lo + i * spacing` and reaches zero at its neighbours'
/// peaks, so memberships sum to 1.0 everywhere on the domain.
pub fn uniform_partition(lo: f64, hi: f64, num_terms: usize) -> Vec<MembershipFunction> {
    if num_terms < 2 {
        return vec![];
    }

    let spacing = (hi - lo) / (num_terms - 1) as f64;
    let last = num_terms - 1;

    (0..num_terms)
        .map(|i| {
            let peak = if i == last { hi } else { lo + i as f64 * spacing };
            if i == 0 {
                MembershipFunction::LeftShoulder {
                    peak,
                    foot: peak + spacing,
                }
            } else if i == last {
                MembershipFunction::RightShoulder {
                    foot: peak - spacing,
                    peak,
                }
            } else {
                MembershipFunction::Triangular {
                    left: peak - spacing,
                    peak,
                    right: peak + spacing,
                }
            }
        })
        .collect()
}
