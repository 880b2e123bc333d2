//! Append-only JSONL ledger of evaluation results.
//!
//! Each line carries the SHA-256 of the previous line in `prev_hash`, so any
//! rewrite of history breaks the chain. Appends run under an advisory lock and
//! land through an atomic rename, which serializes concurrent writers for the
//! same ledger.

pub mod chain;
pub mod lock;

pub use chain::{append_evaluation, latest_for_release, read_entries, verify_chain};
pub use lock::{atomic_write, AdvisoryLock};
