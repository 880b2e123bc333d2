use anyhow::{bail, Context, Result};
use chrono::Utc;
use sha2::{Digest, Sha256};

use super::lock::{atomic_write, AdvisoryLock};
use crate::decision::EvaluationResult;

const GENESIS: &str = "genesis";

fn line_hash(line: &str) -> String {
    format!("sha256:{:x}", Sha256::digest(line.as_bytes()))
}

/// Append an evaluation for `release_id`, returning the new entry's hash.
///
/// The entry records the result fields plus `release_id`, `evaluated_at` and
/// `prev_hash` (SHA-256 of the previous line, "genesis" for the first).
pub fn append_evaluation(path: &str, release_id: &str, result: &EvaluationResult) -> Result<String> {
    let lock = AdvisoryLock::acquire(path)?;

    let content = if std::path::Path::new(path).exists() {
        std::fs::read_to_string(path).with_context(|| format!("cannot read ledger {path}"))?
    } else {
        String::new()
    };

    let prev_hash = content
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .map(line_hash)
        .unwrap_or_else(|| GENESIS.to_string());

    let mut entry = serde_json::json!({
        "release_id": release_id,
        "evaluated_at": Utc::now().to_rfc3339(),
    });
    if let (Some(obj), serde_json::Value::Object(fields)) =
        (entry.as_object_mut(), serde_json::to_value(result)?)
    {
        obj.extend(fields);
        obj.insert("prev_hash".into(), serde_json::Value::String(prev_hash));
    }

    let entry_json = serde_json::to_string(&entry)?;
    let hash = line_hash(&entry_json);

    let mut new_content = content;
    new_content.push_str(&entry_json);
    new_content.push('\n');
    atomic_write(path, new_content.as_bytes())
        .with_context(|| format!("cannot write ledger {path}"))?;
    lock.release()?;

    tracing::debug!(ledger = path, release_id, hash = %hash, "evaluation recorded");
    Ok(hash)
}

/// Read all ledger entries. A missing ledger is empty.
pub fn read_entries(path: &str) -> Result<Vec<serde_json::Value>> {
    if !std::path::Path::new(path).exists() {
        return Ok(Vec::new());
    }
    let content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read ledger {path}"))?;
    let mut entries = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry: serde_json::Value = serde_json::from_str(line)
            .with_context(|| format!("invalid JSON at ledger line {}", i + 1))?;
        entries.push(entry);
    }
    Ok(entries)
}

/// Most recent entry recorded for `release_id`.
pub fn latest_for_release(path: &str, release_id: &str) -> Result<Option<serde_json::Value>> {
    Ok(read_entries(path)?
        .into_iter()
        .rev()
        .find(|e| e.get("release_id").and_then(|v| v.as_str()) == Some(release_id)))
}

/// Verify the hash chain. Returns the number of valid entries.
pub fn verify_chain(path: &str) -> Result<u64> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read ledger {path}"))?;

    let mut count = 0u64;
    let mut prev_hash = GENESIS.to_string();

    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry: serde_json::Value = serde_json::from_str(line)
            .with_context(|| format!("invalid JSON at line {}", i + 1))?;

        let entry_prev = entry
            .get("prev_hash")
            .and_then(serde_json::Value::as_str)
            .unwrap_or(GENESIS);

        if entry_prev != prev_hash {
            bail!(
                "hash chain broken at entry {}: expected prev_hash '{}', got '{}'",
                count,
                prev_hash,
                entry_prev
            );
        }

        prev_hash = line_hash(line);
        count += 1;
    }

    Ok(count)
}
