use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use releaseguard_core::errors::EngineError;
use releaseguard_core::signal::{Signal, SignalKey};
use releaseguard_core::types::SignalType;

/// The effective signal set of a release: one value per (type, name).
///
/// Resolution keeps the most recently observed signal for every key. Older
/// duplicates are kept aside in `superseded` and signals whose value is not
/// a finite number in `rejected`; neither participates in evaluation.
#[derive(Debug, Clone, Default)]
pub struct EffectiveSignals {
    values: BTreeMap<SignalKey, Signal>,
    superseded: Vec<Signal>,
    rejected: Vec<Signal>,
}

impl EffectiveSignals {
    /// Resolve latest-wins over an arbitrary signal collection.
    ///
    /// Two signals for one key sharing the latest `observed_at` collapse if
    /// their values agree; if they disagree there is no single effective
    /// value and resolution fails with [`EngineError::AmbiguousSignal`].
    pub fn resolve(signals: &[Signal]) -> Result<Self, EngineError> {
        let mut groups: BTreeMap<SignalKey, Vec<&Signal>> = BTreeMap::new();
        let mut rejected = Vec::new();

        for signal in signals {
            if !signal.value.is_finite() {
                rejected.push(signal.clone());
                continue;
            }
            groups.entry(signal.key()).or_default().push(signal);
        }

        let mut values = BTreeMap::new();
        let mut superseded = Vec::new();

        for (key, group) in groups {
            let Some(latest) = group.iter().map(|s| s.observed_at).max() else {
                continue;
            };
            let winners: Vec<&Signal> = group
                .iter()
                .copied()
                .filter(|s| s.observed_at == latest)
                .collect();
            let chosen = winners[0];
            if winners.iter().any(|s| s.value != chosen.value) {
                return Err(EngineError::AmbiguousSignal {
                    key,
                    count: winners.len(),
                });
            }

            let mut kept = false;
            for signal in group {
                if !kept && std::ptr::eq(signal, chosen) {
                    kept = true;
                } else {
                    superseded.push(signal.clone());
                }
            }
            values.insert(key, chosen.clone());
        }

        Ok(Self {
            values,
            superseded,
            rejected,
        })
    }

    pub fn value(&self, signal_type: SignalType, name: &str) -> Option<f64> {
        self.values
            .get(&SignalKey::new(signal_type, name))
            .map(|s| s.value)
    }

    /// Effective signals in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.values.values()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn superseded(&self) -> &[Signal] {
        &self.superseded
    }

    pub fn rejected(&self) -> &[Signal] {
        &self.rejected
    }

    /// Deterministic hash over the effective (key, value) pairs.
    ///
    /// Timestamps are left out: re-submitting identical values later yields
    /// the same fingerprint, since it yields the same evaluation.
    pub fn fingerprint(&self) -> String {
        let canonical: Vec<String> = self
            .values
            .iter()
            .map(|(key, s)| format!("{key}={}", s.value))
            .collect();
        let joined = canonical.join(",");
        format!("sha256:{:x}", Sha256::digest(joined.as_bytes()))
    }
}
