pub mod engine;
pub mod result;

pub use engine::DecisionEngine;
pub use result::{DecisionPath, EvaluationResult, Rationale};
