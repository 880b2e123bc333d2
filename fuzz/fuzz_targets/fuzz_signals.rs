#![no_main]
use libfuzzer_sys::fuzz_target;

use releaseguard_engine::decision::DecisionEngine;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(signals) = releaseguard_core::signal::parse_signals(text) {
        if let Ok(result) = DecisionEngine::default().evaluate(&signals) {
            assert!((0.0..=100.0).contains(&result.risk_score));
            assert!(!result.rationale.is_empty());
        }
    }
});
