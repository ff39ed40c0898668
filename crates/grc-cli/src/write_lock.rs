//! Single-writer lock for a project: `.grc/write.lock`.
//!
//! The lock file records who holds it so a waiting command can say what it
//! is waiting for. A lock whose process is gone is removed and retaken.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::GRC_DIR;

const LOCK_FILE: &str = "write.lock";
const LOCK_WAIT_TIMEOUT: Duration = Duration::from_secs(30);
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct LockHolder {
    pid: u32,
    scope: String,
    acquired_at: DateTime<Utc>,
}

impl LockHolder {
    fn describe(&self) -> String {
        format!(
            "grc {} (pid {}, since {})",
            self.scope,
            self.pid,
            self.acquired_at.format("%H:%M:%S")
        )
    }
}

/// Removes the lock file when dropped.
pub struct WriteLock {
    path: PathBuf,
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[derive(Debug)]
enum Attempt {
    Acquired(WriteLock),
    Busy(Option<LockHolder>),
    Stale(LockHolder),
}

impl std::fmt::Debug for WriteLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteLock").field("path", &self.path).finish()
    }
}

/// Wait up to 30 seconds for the project's write lock.
///
/// `scope` names the command group taking the lock and is shown to other
/// writers while it is held.
pub async fn acquire(project_root: &Path, scope: &str) -> anyhow::Result<WriteLock> {
    let path = project_root.join(GRC_DIR).join(LOCK_FILE);
    let deadline = Instant::now() + LOCK_WAIT_TIMEOUT;

    loop {
        match try_acquire(&path, scope)? {
            Attempt::Acquired(lock) => return Ok(lock),
            Attempt::Stale(holder) => {
                tracing::warn!(holder = %holder.describe(), "removing stale write lock");
                let _ = std::fs::remove_file(&path);
            }
            Attempt::Busy(holder) => {
                if Instant::now() >= deadline {
                    let who = holder.map_or_else(
                        || String::from("an unknown process"),
                        |holder| holder.describe(),
                    );
                    anyhow::bail!(
                        "project is locked by {who}; remove {} if no grc process is running",
                        path.display()
                    );
                }
                tracing::debug!(?holder, "waiting for write lock");
                tokio::time::sleep(LOCK_RETRY_DELAY).await;
            }
        }
    }
}

fn try_acquire(path: &Path, scope: &str) -> anyhow::Result<Attempt> {
    match OpenOptions::new().create_new(true).write(true).open(path) {
        Ok(file) => {
            let lock = WriteLock {
                path: path.to_path_buf(),
            };
            let holder = LockHolder {
                pid: std::process::id(),
                scope: scope.to_string(),
                acquired_at: Utc::now(),
            };
            serde_json::to_writer(file, &holder)
                .with_context(|| format!("failed to write {}", path.display()))?;
            Ok(Attempt::Acquired(lock))
        }
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            // An unreadable holder may be a lock mid-write; treat it as busy.
            let holder = std::fs::read(path)
                .ok()
                .and_then(|bytes| serde_json::from_slice::<LockHolder>(&bytes).ok());
            Ok(match holder {
                Some(holder) if !process_alive(holder.pid) => Attempt::Stale(holder),
                other => Attempt::Busy(other),
            })
        }
        Err(err) => Err(err).with_context(|| format!("failed to create {}", path.display())),
    }
}

fn process_alive(pid: u32) -> bool {
    let proc_root = Path::new("/proc");
    if proc_root.is_dir() {
        return proc_root.join(pid.to_string()).exists();
    }
    std::process::Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .status()
        .is_ok_and(|status| status.success())
}
