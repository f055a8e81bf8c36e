//! Lock files guarding project mutations across processes.
//!
//! A lock is a file at `<locks_dir>/<project_id>.lock` holding the PID of
//! the process that created it. Creation is exclusive, so a second writer
//! sees the file and backs off with a state conflict.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};

use crate::error::EngineError;

/// Held lock on a project; the file is removed on drop.
#[derive(Debug)]
pub struct ProjectLock {
    path: PathBuf,
}

impl ProjectLock {
    /// Acquire the lock for `project_id`, reclaiming it once if the
    /// holder process is gone.
    pub fn acquire(locks_dir: &Path, project_id: &str) -> Result<Self, EngineError> {
        fs::create_dir_all(locks_dir).with_context(|| {
            format!("Failed to create locks directory {}", locks_dir.display())
        })?;
        let path = lock_path(locks_dir, project_id);

        match try_create(&path) {
            Ok(lock) => Ok(lock),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let holder = read_lock(&path);
                if let Some(pid) = holder {
                    if pid != std::process::id() && !is_process_running(pid) {
                        warn!(project = project_id, pid, "Reclaiming stale lock");
                        let _ = fs::remove_file(&path);
                        return try_create(&path).map_err(|_| held(project_id, Some(pid)));
                    }
                }
                Err(held(project_id, holder))
            }
            Err(e) => Err(EngineError::Storage(anyhow::Error::new(e).context(format!(
                "Failed to create lock file {}",
                path.display()
            )))),
        }
    }
}

impl Drop for ProjectLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove lock file");
            }
        } else {
            debug!(path = %self.path.display(), "Released lock");
        }
    }
}

fn try_create(path: &Path) -> std::io::Result<ProjectLock> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    write!(file, "{}", std::process::id())?;
    debug!(path = %path.display(), "Acquired lock");
    Ok(ProjectLock {
        path: path.to_path_buf(),
    })
}

fn held(project_id: &str, holder: Option<u32>) -> EngineError {
    let by = holder
        .map(|pid| format!(" by process {}", pid))
        .unwrap_or_default();
    EngineError::StateConflict(format!(
        "project {} is locked{}; retry once the other writer finishes",
        project_id, by
    ))
}

/// Read the PID from a lock file
pub fn read_lock(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

fn lock_path(locks_dir: &Path, project_id: &str) -> PathBuf {
    locks_dir.join(format!("{}.lock", project_id))
}

/// Check if a process with the given PID is running
fn is_process_running(pid: u32) -> bool {
    #[cfg(unix)]
    {
        use std::process::Command;

        // `kill -0` probes without signalling
        Command::new("kill")
            .args(["-0", &pid.to_string()])
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_and_release() {
        let tmp = TempDir::new().unwrap();
        let lock = ProjectLock::acquire(tmp.path(), "p1").unwrap();
        let path = tmp.path().join("p1.lock");
        assert!(path.exists());
        assert_eq!(read_lock(&path), Some(std::process::id()));
        drop(lock);
        assert!(!path.exists());
    }

    #[test]
    fn test_second_acquire_conflicts() {
        let tmp = TempDir::new().unwrap();
        let _lock = ProjectLock::acquire(tmp.path(), "p1").unwrap();
        let err = ProjectLock::acquire(tmp.path(), "p1").unwrap_err();
        assert_eq!(err.kind(), "state_conflict");
    }

    #[test]
    fn test_locks_are_per_project() {
        let tmp = TempDir::new().unwrap();
        let _a = ProjectLock::acquire(tmp.path(), "p1").unwrap();
        assert!(ProjectLock::acquire(tmp.path(), "p2").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_stale_lock_is_reclaimed() {
        let tmp = TempDir::new().unwrap();
        // PIDs near u32::MAX are never handed out on Linux
        std::fs::write(tmp.path().join("p1.lock"), "4294967290").unwrap();
        let _lock = ProjectLock::acquire(tmp.path(), "p1").unwrap();
        assert_eq!(read_lock(&lock_path(tmp.path(), "p1")), Some(std::process::id()));
    }
}
