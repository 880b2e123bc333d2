pub mod evaluator;
pub mod table;

pub use evaluator::{evaluate_gates, GateEvaluator, GateOutcome, GateReport, GateViolation};
pub use table::{GateRule, GATE_TABLE};
