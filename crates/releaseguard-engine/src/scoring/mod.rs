pub mod risk;

pub use risk::{compute_risk, deviation, round2, RiskScore, ScoreFactor};
