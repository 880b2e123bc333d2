use serde::Serialize;

use releaseguard_core::types::Severity;

use super::table::{GateRule, GATE_TABLE};
use crate::resolve::EffectiveSignals;

/// A gate whose bound signal was present and on the wrong side of the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GateViolation {
    pub rule: &'static GateRule,
    pub observed: f64,
    pub severity: Severity,
}

impl GateViolation {
    pub fn message(&self) -> String {
        let unit = self.rule.unit();
        format!(
            "{} {} {} {} threshold",
            self.rule.signal_name,
            unit.render(self.observed),
            self.rule.direction.violated_comparator(),
            unit.render(self.rule.threshold),
        )
    }
}

/// Result of one gate against one effective signal set.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    Passed {
        rule: &'static GateRule,
        observed: f64,
    },
    Violated(GateViolation),
    /// The bound signal is absent. Never a failure.
    NotEvaluated { rule: &'static GateRule },
}

impl GateOutcome {
    pub fn rule(&self) -> &'static GateRule {
        match self {
            GateOutcome::Passed { rule, .. } | GateOutcome::NotEvaluated { rule } => *rule,
            GateOutcome::Violated(v) => v.rule,
        }
    }
}

/// Outcomes of every gate, in table order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GateReport {
    outcomes: Vec<GateOutcome>,
}

impl GateReport {
    pub fn outcomes(&self) -> &[GateOutcome] {
        &self.outcomes
    }

    /// Violations in table order.
    pub fn violations(&self) -> impl Iterator<Item = &GateViolation> {
        self.outcomes.iter().filter_map(|o| match o {
            GateOutcome::Violated(v) => Some(v),
            _ => None,
        })
    }

    pub fn has_violation(&self, severity: Severity) -> bool {
        self.violations().any(|v| v.severity == severity)
    }

    pub fn not_evaluated(&self) -> impl Iterator<Item = &'static GateRule> + '_ {
        self.outcomes.iter().filter_map(|o| match o {
            GateOutcome::NotEvaluated { rule } => Some(*rule),
            _ => None,
        })
    }
}

/// Generic evaluator over a gate table.
///
/// Every gate is evaluated independently; nothing short-circuits, so one
/// report can carry several simultaneous failures.
#[derive(Debug, Clone, Copy)]
pub struct GateEvaluator {
    table: &'static [GateRule],
}

impl Default for GateEvaluator {
    fn default() -> Self {
        Self { table: GATE_TABLE }
    }
}

impl GateEvaluator {
    pub fn with_table(table: &'static [GateRule]) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'static [GateRule] {
        self.table
    }

    pub fn evaluate(&self, signals: &EffectiveSignals) -> GateReport {
        let outcomes = self
            .table
            .iter()
            .map(|rule| {
                let outcome = match signals.value(rule.signal_type, rule.signal_name) {
                    None => GateOutcome::NotEvaluated { rule },
                    Some(observed) if rule.admits(observed) => {
                        GateOutcome::Passed { rule, observed }
                    }
                    Some(observed) => GateOutcome::Violated(GateViolation {
                        rule,
                        observed,
                        severity: rule.severity,
                    }),
                };
                tracing::debug!(gate = rule.id, outcome = outcome_label(&outcome), "gate evaluated");
                outcome
            })
            .collect();
        GateReport { outcomes }
    }
}

fn outcome_label(outcome: &GateOutcome) -> &'static str {
    match outcome {
        GateOutcome::Passed { .. } => "passed",
        GateOutcome::Violated(_) => "violated",
        GateOutcome::NotEvaluated { .. } => "not_evaluated",
    }
}

/// Evaluate the standard gate table.
pub fn evaluate_gates(signals: &EffectiveSignals) -> GateReport {
    GateEvaluator::default().evaluate(signals)
}
