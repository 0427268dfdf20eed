use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How long a cycle waits for another `dp` process before giving up
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Advisory lock serializing update cycles on a planner directory.
///
/// Holds an exclusive flock (Unix) on `.dayplan.lock` so two `dp`
/// processes never interleave rewrites of the same notes. The holder's pid
/// is written into the file. The lock is released when the value is
/// dropped; the file itself stays, since unlinking it would let a waiter
/// and a newcomer lock different inodes.
pub struct PlannerLock {
    _file: File,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is held by {holder}: another update is in progress")]
    Timeout { path: PathBuf, holder: String },
}

impl PlannerLock {
    /// Acquire the lock for `dir`, polling until `timeout` passes.
    pub fn acquire(dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = lock_path(dir);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::CreateError {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        while try_lock(&file).is_err() {
            if Instant::now() >= deadline {
                let holder = read_holder(&mut file).unwrap_or_else(|| "an unknown process".to_string());
                return Err(LockError::Timeout { path, holder });
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        // The pid is informational only; failing to record it is harmless.
        let _ = write_holder(&mut file);
        Ok(PlannerLock { _file: file })
    }

    pub fn acquire_default(dir: &Path) -> Result<Self, LockError> {
        Self::acquire(dir, DEFAULT_LOCK_TIMEOUT)
    }
}

pub fn lock_path(dir: &Path) -> PathBuf {
    dir.join(".dayplan.lock")
}

fn write_holder(file: &mut File) -> std::io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    write!(file, "pid {}", std::process::id())?;
    file.flush()
}

fn read_holder(file: &mut File) -> Option<String> {
    let mut holder = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut holder).ok()?;
    let holder = holder.trim();
    (!holder.is_empty()).then(|| holder.to_string())
}

/// Try to acquire an exclusive flock on the file (non-blocking)
#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn acquire_and_release() {
        let tmp = TempDir::new().unwrap();

        let lock = PlannerLock::acquire_default(tmp.path());
        assert!(lock.is_ok());
        let recorded = std::fs::read_to_string(lock_path(tmp.path())).unwrap();
        assert_eq!(recorded, format!("pid {}", std::process::id()));
        drop(lock);

        let again = PlannerLock::acquire_default(tmp.path());
        assert!(again.is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn second_cycle_waits_for_the_first() {
        let tmp = TempDir::new().unwrap();
        let _held = PlannerLock::acquire_default(tmp.path()).unwrap();
        let contender = PlannerLock::acquire(tmp.path(), Duration::from_millis(50));
        match contender {
            Err(LockError::Timeout { holder, .. }) => {
                assert_eq!(holder, format!("pid {}", std::process::id()));
            }
            _ => panic!("expected a timeout"),
        }
    }

    #[test]
    fn missing_directory_is_a_create_error() {
        let tmp = TempDir::new().unwrap();
        let result = PlannerLock::acquire_default(&tmp.path().join("nope"));
        assert!(matches!(result, Err(LockError::CreateError { .. })));
    }
}
