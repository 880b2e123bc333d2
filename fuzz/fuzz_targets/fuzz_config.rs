#![no_main]
use libfuzzer_sys::fuzz_target;

use releaseguard_core::config::ConfigLayer;

fuzz_target!(|data: &[u8]| {
    if let Ok(layer) = serde_json::from_slice::<ConfigLayer>(data) {
        if let Ok(config) = layer.resolve() {
            assert!(config.approve_threshold() < config.warn_threshold());
        }
    }
});
