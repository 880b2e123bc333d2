use releaseguard_core::catalog;
use releaseguard_core::config::EngineConfig;
use releaseguard_core::errors::EngineError;
use releaseguard_core::signal::Signal;
use releaseguard_core::traits::SignalSource;
use releaseguard_core::types::Severity;

use super::result::{DecisionPath, EvaluationResult, Rationale};
use crate::gates::{GateEvaluator, GateOutcome, GateReport};
use crate::resolve::EffectiveSignals;
use crate::scoring::{compute_risk, RiskScore};

/// Turns a release's signals into a decision.
///
/// Precedence, first match wins:
/// 1. any BLOCK gate violation: BLOCK
/// 2. any WARN gate violation: WARN
/// 3. risk score in `[approve, warn)`: WARN
/// 4. risk score at or above the warn threshold: BLOCK
/// 5. otherwise: APPROVE
///
/// The engine holds only immutable configuration, so one instance can serve
/// concurrent evaluations.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionEngine {
    config: EngineConfig,
    gates: GateEvaluator,
}

impl DecisionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            gates: GateEvaluator::default(),
        }
    }

    /// Construct from raw thresholds, failing fast on an invalid pair.
    pub fn with_thresholds(approve: f64, warn: f64) -> Result<Self, EngineError> {
        Ok(Self::new(EngineConfig::new(approve, warn)?))
    }

    pub fn with_gates(mut self, gates: GateEvaluator) -> Self {
        self.gates = gates;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate every signal recorded for a release, duplicates included.
    pub fn evaluate(&self, signals: &[Signal]) -> Result<EvaluationResult, EngineError> {
        let effective = EffectiveSignals::resolve(signals)?;
        Ok(self.evaluate_effective(&effective))
    }

    /// Fetch a release's signals from `source` and evaluate them.
    pub fn evaluate_release(
        &self,
        source: &dyn SignalSource,
        release_id: &str,
    ) -> Result<EvaluationResult, EngineError> {
        let signals = source.release_signals(release_id)?;
        self.evaluate(&signals)
    }

    pub fn evaluate_effective(&self, signals: &EffectiveSignals) -> EvaluationResult {
        let gates = self.gates.evaluate(signals);
        let risk = compute_risk(signals);
        let path = self.decide(&gates, risk.score);
        let decision = path.decision();

        let mut rationale = Vec::new();
        push_gate_entries(&mut rationale, &gates);
        push_signal_notes(&mut rationale, signals);
        push_score_entries(&mut rationale, &risk);
        rationale.push(Rationale::Decision {
            path,
            decision,
            message: self.explain(path, &gates, risk.score),
        });

        tracing::info!(
            decision = %decision,
            path = ?path,
            risk_score = risk.score,
            violations = gates.violations().count(),
            "release evaluated"
        );

        EvaluationResult {
            decision,
            path,
            risk_score: risk.score,
            rationale,
            signals_hash: signals.fingerprint(),
        }
    }

    fn decide(&self, gates: &GateReport, score: f64) -> DecisionPath {
        if gates.has_violation(Severity::Block) {
            DecisionPath::GateBlock
        } else if gates.has_violation(Severity::Warn) {
            DecisionPath::GateWarn
        } else if score >= self.config.warn_threshold() {
            DecisionPath::RiskBlock
        } else if score >= self.config.approve_threshold() {
            DecisionPath::RiskWarn
        } else {
            DecisionPath::Approve
        }
    }

    fn explain(&self, path: DecisionPath, gates: &GateReport, score: f64) -> String {
        let failed = |severity: Severity| {
            gates
                .violations()
                .filter(|v| v.severity == severity)
                .map(|v| v.rule.id)
                .collect::<Vec<_>>()
                .join(", ")
        };
        match path {
            DecisionPath::GateBlock => format!("blocked by hard gate: {}", failed(Severity::Block)),
            DecisionPath::RiskBlock => format!(
                "blocked by risk score {score:.2} >= warn threshold {:.2}",
                self.config.warn_threshold()
            ),
            DecisionPath::GateWarn => format!("warning from gate: {}", failed(Severity::Warn)),
            DecisionPath::RiskWarn => format!(
                "warning: risk score {score:.2} in [{:.2}, {:.2})",
                self.config.approve_threshold(),
                self.config.warn_threshold()
            ),
            DecisionPath::Approve => format!(
                "approved: no gate violations, risk score {score:.2} < {:.2}",
                self.config.approve_threshold()
            ),
        }
    }
}

fn push_gate_entries(out: &mut Vec<Rationale>, gates: &GateReport) {
    for outcome in gates.outcomes() {
        match outcome {
            GateOutcome::Passed { .. } => {}
            GateOutcome::Violated(v) => out.push(Rationale::GateViolation {
                rule: v.rule.id.to_string(),
                signal: v.rule.signal_key(),
                severity: v.severity,
                observed: v.observed,
                limit: v.rule.threshold,
                message: v.message(),
            }),
            GateOutcome::NotEvaluated { rule } => out.push(Rationale::GateNotEvaluated {
                rule: rule.id.to_string(),
                signal: rule.signal_key(),
                message: format!(
                    "gate {} not evaluated: signal {} missing",
                    rule.id,
                    rule.signal_key()
                ),
            }),
        }
    }
}

fn push_signal_notes(out: &mut Vec<Rationale>, signals: &EffectiveSignals) {
    for s in signals.rejected() {
        out.push(Rationale::RejectedSignal {
            signal: s.key(),
            message: format!("signal {} ignored: value is not a finite number", s.key()),
        });
    }
    for s in signals.iter() {
        if catalog::lookup(s.signal_type, &s.name).is_none() {
            out.push(Rationale::UnknownSignal {
                signal: s.key(),
                value: s.value,
                message: format!("signal {} is not cataloged; informational only", s.key()),
            });
        }
    }
}

fn push_score_entries(out: &mut Vec<Rationale>, risk: &RiskScore) {
    if !risk.is_informative() {
        out.push(Rationale::ScoreUninformative {
            message: "no cataloged signals present; risk score 0 is uninformative".to_string(),
        });
        return;
    }
    for f in risk.factors.iter().filter(|f| f.contribution > 0.0) {
        out.push(Rationale::ScoreFactor {
            signal: f.signal.clone(),
            deviation: f.deviation,
            weight: f.weight,
            contribution: f.contribution,
            message: format!(
                "{} deviates {:.1}% from ideal (weight {})",
                f.signal,
                f.deviation * 100.0,
                f.weight
            ),
        });
    }
}
