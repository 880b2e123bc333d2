use serde::{Deserialize, Serialize};
use std::fmt;

/// Family a signal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Test,
    Coverage,
    Perf,
    Canary,
}

impl SignalType {
    pub fn as_str(self) -> &'static str {
        match self {
            SignalType::Test => "TEST",
            SignalType::Coverage => "COVERAGE",
            SignalType::Perf => "PERF",
            SignalType::Canary => "CANARY",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a reference value is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

impl Direction {
    /// True when `value` sits on the acceptable side of `threshold` (inclusive).
    pub fn admits(self, value: f64, threshold: f64) -> bool {
        match self {
            Direction::HigherIsBetter => value >= threshold,
            Direction::LowerIsBetter => value <= threshold,
        }
    }

    /// Comparator an acceptable value satisfies.
    pub fn comparator(self) -> &'static str {
        match self {
            Direction::HigherIsBetter => ">=",
            Direction::LowerIsBetter => "<=",
        }
    }

    /// Comparator a rejected value satisfies.
    pub fn violated_comparator(self) -> &'static str {
        match self {
            Direction::HigherIsBetter => "<",
            Direction::LowerIsBetter => ">",
        }
    }
}

/// Unit a signal value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Fraction in [0, 1], rendered as a percentage.
    Ratio,
    /// Non-negative count.
    Count,
}

impl Unit {
    pub fn render(self, value: f64) -> String {
        match self {
            Unit::Ratio => format!("{:.1}%", value * 100.0),
            Unit::Count => format!("{value}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Block,
    Warn,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Block => f.write_str("BLOCK"),
            Severity::Warn => f.write_str("WARN"),
        }
    }
}

/// Final verdict for a release candidate. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Approve,
    Warn,
    Block,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approve => f.write_str("APPROVE"),
            Decision::Warn => f.write_str("WARN"),
            Decision::Block => f.write_str("BLOCK"),
        }
    }
}
