use std::fmt;

use serde::{Deserialize, Serialize};

use releaseguard_core::signal::SignalKey;
use releaseguard_core::types::{Decision, Severity};

/// Which rule of the precedence order produced the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPath {
    /// A BLOCK-severity gate failed.
    GateBlock,
    /// The risk score reached the warn threshold.
    RiskBlock,
    /// A WARN-severity gate failed.
    GateWarn,
    /// The risk score fell between the approve and warn thresholds.
    RiskWarn,
    Approve,
}

impl DecisionPath {
    pub fn decision(self) -> Decision {
        match self {
            DecisionPath::GateBlock | DecisionPath::RiskBlock => Decision::Block,
            DecisionPath::GateWarn | DecisionPath::RiskWarn => Decision::Warn,
            DecisionPath::Approve => Decision::Approve,
        }
    }
}

/// One explanation line of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rationale {
    GateViolation {
        rule: String,
        signal: SignalKey,
        severity: Severity,
        observed: f64,
        limit: f64,
        message: String,
    },
    GateNotEvaluated {
        rule: String,
        signal: SignalKey,
        message: String,
    },
    /// Signal with no catalog entry; informational only.
    UnknownSignal {
        signal: SignalKey,
        value: f64,
        message: String,
    },
    /// Signal whose value could not be evaluated (not a finite number).
    RejectedSignal { signal: SignalKey, message: String },
    ScoreFactor {
        signal: SignalKey,
        deviation: f64,
        weight: f64,
        contribution: f64,
        message: String,
    },
    ScoreUninformative { message: String },
    Decision {
        path: DecisionPath,
        decision: Decision,
        message: String,
    },
}

impl Rationale {
    /// The rule or scoring factor that produced this entry.
    pub fn tag(&self) -> String {
        match self {
            Rationale::GateViolation { rule, .. } | Rationale::GateNotEvaluated { rule, .. } => {
                format!("gate:{rule}")
            }
            Rationale::UnknownSignal { signal, .. } | Rationale::RejectedSignal { signal, .. } => {
                format!("signal:{signal}")
            }
            Rationale::ScoreFactor { signal, .. } => format!("score:{signal}"),
            Rationale::ScoreUninformative { .. } => "score".to_string(),
            Rationale::Decision { .. } => "decision".to_string(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Rationale::GateViolation { message, .. }
            | Rationale::GateNotEvaluated { message, .. }
            | Rationale::UnknownSignal { message, .. }
            | Rationale::RejectedSignal { message, .. }
            | Rationale::ScoreFactor { message, .. }
            | Rationale::ScoreUninformative { message }
            | Rationale::Decision { message, .. } => message,
        }
    }

    pub fn is_violation(&self) -> bool {
        matches!(self, Rationale::GateViolation { .. })
    }
}

impl fmt::Display for Rationale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.tag(), self.message())
    }
}

/// Output of one evaluation. Either complete or not produced at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub decision: Decision,
    pub path: DecisionPath,
    /// 0 to 100, two-decimal precision.
    pub risk_score: f64,
    pub rationale: Vec<Rationale>,
    /// Fingerprint of the effective signal set that was evaluated.
    pub signals_hash: String,
}

impl EvaluationResult {
    pub fn violations(&self) -> impl Iterator<Item = &Rationale> {
        self.rationale.iter().filter(|r| r.is_violation())
    }
}
