use serde::Serialize;

use releaseguard_core::catalog::{self, CatalogEntry};
use releaseguard_core::signal::SignalKey;
use releaseguard_core::types::Direction;

use crate::resolve::EffectiveSignals;

/// Floor for the deviation denominator.
const SPAN_EPSILON: f64 = 1e-9;

/// Weighted deviation of one cataloged signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreFactor {
    pub signal: SignalKey,
    pub value: f64,
    /// Normalized distance from ideal, in [0, 1].
    pub deviation: f64,
    pub weight: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskScore {
    /// 0 to 100, rounded to two decimals.
    pub score: f64,
    /// One factor per cataloged effective signal, in key order.
    pub factors: Vec<ScoreFactor>,
}

impl RiskScore {
    /// False when no cataloged signal was present to score.
    pub fn is_informative(&self) -> bool {
        !self.factors.is_empty()
    }
}

/// Normalized deviation of `value` from the entry's ideal.
///
/// Monotone in the distance from ideal on the bad side, zero on the good side,
/// saturating at 1 once the distance reaches `max(ideal, span)`.
pub fn deviation(entry: &CatalogEntry, value: f64) -> f64 {
    let scale = entry.ideal.abs().max(entry.span).max(SPAN_EPSILON);
    let raw = match entry.direction {
        Direction::HigherIsBetter => (entry.ideal - value) / scale,
        Direction::LowerIsBetter => (value - entry.ideal) / scale,
    };
    raw.clamp(0.0, 1.0)
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Weighted mean deviation of the present cataloged signals, scaled to 0..100.
///
/// Absent signals enter neither the numerator nor the denominator. Signals
/// without a catalog entry are skipped. Adding an ideal-valued signal dilutes
/// the others' share of the weight, so it lowers a nonzero score.
pub fn compute_risk(signals: &EffectiveSignals) -> RiskScore {
    let factors: Vec<ScoreFactor> = signals
        .iter()
        .filter_map(|s| {
            let entry = catalog::lookup(s.signal_type, &s.name)?;
            let d = deviation(entry, s.value);
            Some(ScoreFactor {
                signal: s.key(),
                value: s.value,
                deviation: d,
                weight: entry.weight,
                contribution: d * entry.weight,
            })
        })
        .collect();

    let total_weight: f64 = factors.iter().map(|f| f.weight).sum();
    let raw = if total_weight > 0.0 {
        let total: f64 = factors.iter().map(|f| f.contribution).sum();
        100.0 * total / total_weight
    } else {
        0.0
    };

    let score = round2(raw);
    tracing::debug!(score, factors = factors.len(), "risk scored");
    RiskScore { score, factors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use releaseguard_core::signal::Signal;
    use releaseguard_core::types::SignalType;

    fn effective(values: &[(SignalType, &str, f64)]) -> EffectiveSignals {
        let now = Utc::now();
        let signals: Vec<Signal> = values
            .iter()
            .map(|(t, n, v)| Signal::new(*t, *n, *v, now))
            .collect();
        EffectiveSignals::resolve(&signals).unwrap()
    }

    #[test]
    fn perfect_signals_score_zero() {
        let risk = compute_risk(&effective(&[
            (SignalType::Test, "unit_pass_rate", 1.0),
            (SignalType::Test, "e2e_pass_rate", 1.0),
            (SignalType::Perf, "error_rate", 0.0),
        ]));
        assert_eq!(risk.score, 0.0);
        assert!(risk.is_informative());
    }

    #[test]
    fn no_signals_is_uninformative() {
        let risk = compute_risk(&EffectiveSignals::default());
        assert_eq!(risk.score, 0.0);
        assert!(!risk.is_informative());
    }

    #[test]
    fn unknown_signals_are_not_scored() {
        let risk = compute_risk(&effective(&[(SignalType::Test, "mutation_score", 0.1)]));
        assert_eq!(risk.score, 0.0);
        assert!(!risk.is_informative());
    }

    #[test]
    fn higher_is_better_deviation() {
        let entry = catalog::lookup(SignalType::Coverage, "line_coverage").unwrap();
        assert!((deviation(entry, 0.9) - 0.1).abs() < 1e-12);
        assert_eq!(deviation(entry, 1.0), 0.0);
        assert_eq!(deviation(entry, 0.0), 1.0);
    }

    #[test]
    fn lower_is_better_deviation_saturates_at_span() {
        let entry = catalog::lookup(SignalType::Perf, "error_rate").unwrap();
        assert_eq!(deviation(entry, 0.0), 0.0);
        assert!((deviation(entry, 0.005) - 0.5).abs() < 1e-12);
        assert_eq!(deviation(entry, 0.01), 1.0);
        assert_eq!(deviation(entry, 0.5), 1.0);
    }

    #[test]
    fn better_than_ideal_clamps_to_zero() {
        let entry = catalog::lookup(SignalType::Test, "total_tests").unwrap();
        assert_eq!(deviation(entry, 500.0), 0.0);
        assert_eq!(deviation(entry, 0.0), 1.0);
        let drop = catalog::lookup(SignalType::Coverage, "coverage_drop").unwrap();
        assert_eq!(deviation(drop, -0.05), 0.0);
    }

    #[test]
    fn reference_release_scores_twelve_and_a_half() {
        let risk = compute_risk(&effective(&[
            (SignalType::Test, "e2e_pass_rate", 0.99),
            (SignalType::Coverage, "line_coverage", 0.85),
            (SignalType::Perf, "p95_regression", 0.05),
            (SignalType::Perf, "error_rate", 0.001),
        ]));
        assert_eq!(risk.score, 12.5);
        assert_eq!(risk.factors.len(), 4);
    }

    #[test]
    fn single_signal_score_is_its_deviation() {
        let risk = compute_risk(&effective(&[(SignalType::Coverage, "line_coverage", 0.65)]));
        assert_eq!(risk.score, 35.0);
    }

    #[test]
    fn ideal_signal_dilutes_other_deviations() {
        let alone = compute_risk(&effective(&[(SignalType::Coverage, "line_coverage", 0.65)]));
        let diluted = compute_risk(&effective(&[
            (SignalType::Coverage, "line_coverage", 0.65),
            (SignalType::Test, "e2e_pass_rate", 1.0),
        ]));
        assert_eq!(alone.score, 35.0);
        assert_eq!(diluted.score, 10.0);
    }

    #[test]
    fn factors_follow_key_order() {
        let risk = compute_risk(&effective(&[
            (SignalType::Canary, "5xx_rate", 0.002),
            (SignalType::Test, "unit_pass_rate", 0.99),
        ]));
        let names: Vec<_> = risk.factors.iter().map(|f| f.signal.to_string()).collect();
        assert_eq!(names, ["TEST/unit_pass_rate", "CANARY/5xx_rate"]);
    }

    #[test]
    fn round2_behaviour() {
        assert_eq!(round2(12.499999), 12.5);
        assert_eq!(round2(0.004), 0.0);
        assert_eq!(round2(33.333333), 33.33);
    }
}
