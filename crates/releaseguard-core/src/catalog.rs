//! Static registry of known signals.
//!
//! Every (type, name) pair the gates or the risk model understand has exactly
//! one entry here. Entries are process-wide constants, so evaluations of
//! different releases are scored against identical semantics.

use serde::Serialize;

use crate::types::{Direction, SignalType, Unit};

/// Semantics of one known signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub name: &'static str,
    pub unit: Unit,
    pub direction: Direction,
    /// Relative importance in the risk score. Always positive.
    pub weight: f64,
    /// Value at which the signal contributes zero risk.
    pub ideal: f64,
    /// Distance from `ideal` at which the deviation saturates.
    pub span: f64,
}

const fn entry(
    signal_type: SignalType,
    name: &'static str,
    unit: Unit,
    direction: Direction,
    weight: f64,
    ideal: f64,
    span: f64,
) -> CatalogEntry {
    CatalogEntry {
        signal_type,
        name,
        unit,
        direction,
        weight,
        ideal,
        span,
    }
}

use Direction::{HigherIsBetter, LowerIsBetter};
use SignalType::{Canary, Coverage, Perf, Test};
use Unit::{Count, Ratio};

pub static CATALOG: &[CatalogEntry] = &[
    entry(Test, "unit_pass_rate", Ratio, HigherIsBetter, 1.5, 1.0, 1.0),
    entry(Test, "integration_pass_rate", Ratio, HigherIsBetter, 2.0, 1.0, 1.0),
    entry(Test, "e2e_pass_rate", Ratio, HigherIsBetter, 2.5, 1.0, 1.0),
    entry(Test, "total_tests", Count, HigherIsBetter, 1.0, 1.0, 1.0),
    entry(Test, "flaky_rate", Ratio, LowerIsBetter, 0.5, 0.0, 1.0),
    entry(Coverage, "line_coverage", Ratio, HigherIsBetter, 1.0, 1.0, 1.0),
    entry(Coverage, "coverage_drop", Ratio, LowerIsBetter, 1.0, 0.0, 0.10),
    entry(Perf, "p95_regression", Ratio, LowerIsBetter, 1.5, 0.0, 0.15),
    entry(Perf, "error_rate", Ratio, LowerIsBetter, 2.0, 0.0, 0.01),
    entry(Canary, "5xx_rate", Ratio, LowerIsBetter, 2.0, 0.0, 0.01),
    entry(Canary, "p95_regression", Ratio, LowerIsBetter, 1.5, 0.0, 0.15),
];

/// Look up the catalog entry for a signal. Unknown pairs return `None`.
pub fn lookup(signal_type: SignalType, name: &str) -> Option<&'static CatalogEntry> {
    CATALOG
        .iter()
        .find(|e| e.signal_type == signal_type && e.name == name)
}

pub fn entries() -> &'static [CatalogEntry] {
    CATALOG
}
