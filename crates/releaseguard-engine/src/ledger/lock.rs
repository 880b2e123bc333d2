use anyhow::{bail, Context, Result};
use std::io::Write;

/// Locks older than this are considered abandoned.
const STALE_LOCK_SECS: i64 = 60;

/// Write content atomically: write to temp file, fsync, rename.
pub fn atomic_write(path: &str, content: &[u8]) -> Result<()> {
    let dir = std::path::Path::new(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("."));
    let temp_path = dir.join(format!(".{}.tmp", temp_suffix()));

    let mut file = std::fs::File::create(&temp_path)
        .with_context(|| format!("cannot create temp file for {path}"))?;
    file.write_all(content)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&temp_path, path).with_context(|| format!("cannot rename temp to {path}"))?;

    Ok(())
}

/// Advisory lock on a ledger file, held as a `.lock` sibling containing the
/// owner PID and acquisition time. Released on drop.
#[derive(Debug)]
pub struct AdvisoryLock {
    lock_path: String,
}

impl AdvisoryLock {
    /// Acquire the lock. Fails if another live holder exists.
    pub fn acquire(path: &str) -> Result<Self> {
        let lock_path = format!("{path}.lock");

        if std::path::Path::new(&lock_path).exists() {
            let content = std::fs::read_to_string(&lock_path).unwrap_or_default();
            let acquired_at = content.lines().nth(1).and_then(|ts| ts.parse::<i64>().ok());
            // A lock without a readable timestamp was never fully written.
            match acquired_at {
                Some(ts) if chrono::Utc::now().timestamp() - ts <= STALE_LOCK_SECS => {
                    bail!("ledger is locked by another process (lock: {lock_path})")
                }
                _ => {
                    tracing::warn!(lock = %lock_path, "removing stale ledger lock");
                    let _ = std::fs::remove_file(&lock_path);
                }
            }
        }

        let pid = std::process::id();
        let ts = chrono::Utc::now().timestamp();
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .with_context(|| format!("cannot acquire lock {lock_path}"))?;
        file.write_all(format!("{pid}\n{ts}\n").as_bytes())
            .with_context(|| format!("cannot write lock {lock_path}"))?;

        Ok(Self { lock_path })
    }

    pub fn release(self) -> Result<()> {
        if std::path::Path::new(&self.lock_path).exists() {
            std::fs::remove_file(&self.lock_path)
                .with_context(|| format!("cannot release lock {}", self.lock_path))?;
        }
        Ok(())
    }
}

impl Drop for AdvisoryLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.lock_path);
    }
}

fn temp_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{nanos:x}-{}", std::process::id())
}
