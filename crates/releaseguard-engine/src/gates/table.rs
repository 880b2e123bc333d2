use serde::Serialize;

use releaseguard_core::catalog;
use releaseguard_core::signal::SignalKey;
use releaseguard_core::types::{Direction, Severity, SignalType, Unit};

/// A hard pass/fail rule bound to one signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GateRule {
    pub id: &'static str,
    pub signal_type: SignalType,
    pub signal_name: &'static str,
    /// Side of `threshold` that passes. The threshold itself always passes.
    pub direction: Direction,
    pub threshold: f64,
    pub severity: Severity,
}

impl GateRule {
    pub fn admits(&self, value: f64) -> bool {
        self.direction.admits(value, self.threshold)
    }

    pub fn signal_key(&self) -> SignalKey {
        SignalKey::new(self.signal_type, self.signal_name)
    }

    /// Unit of the bound signal, from the catalog.
    pub fn unit(&self) -> Unit {
        catalog::lookup(self.signal_type, self.signal_name)
            .map(|e| e.unit)
            .unwrap_or(Unit::Ratio)
    }
}

const fn rule(
    id: &'static str,
    signal_type: SignalType,
    signal_name: &'static str,
    direction: Direction,
    threshold: f64,
    severity: Severity,
) -> GateRule {
    GateRule {
        id,
        signal_type,
        signal_name,
        direction,
        threshold,
        severity,
    }
}

use Direction::{HigherIsBetter, LowerIsBetter};
use Severity::{Block, Warn};

/// The fixed gate table. Evaluation and rationale follow this order.
pub static GATE_TABLE: &[GateRule] = &[
    rule("UNIT_PASS_RATE", SignalType::Test, "unit_pass_rate", HigherIsBetter, 0.95, Block),
    rule(
        "INTEGRATION_PASS_RATE",
        SignalType::Test,
        "integration_pass_rate",
        HigherIsBetter,
        0.95,
        Block,
    ),
    rule("E2E_PASS_RATE", SignalType::Test, "e2e_pass_rate", HigherIsBetter, 0.98, Block),
    rule("TOTAL_TESTS", SignalType::Test, "total_tests", HigherIsBetter, 1.0, Block),
    rule("LINE_COVERAGE", SignalType::Coverage, "line_coverage", HigherIsBetter, 0.70, Warn),
    rule("COVERAGE_DROP", SignalType::Coverage, "coverage_drop", LowerIsBetter, 0.02, Warn),
    rule("P95_REGRESSION", SignalType::Perf, "p95_regression", LowerIsBetter, 0.15, Block),
    rule("ERROR_RATE", SignalType::Perf, "error_rate", LowerIsBetter, 0.01, Block),
    rule("CANARY_5XX_RATE", SignalType::Canary, "5xx_rate", LowerIsBetter, 0.01, Block),
];
