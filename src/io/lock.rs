use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How long a write command waits for another `nd` process
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Advisory write lock on a deck directory (`deck/.lock`).
///
/// Every command that rewrites a project file or deck.toml holds it from
/// load to save, so gestures from two `nd` processes are applied one after
/// the other. The holder writes its process ID into the file and clears it
/// on release. The file is never unlinked: a waiter that already opened it
/// must contend for the same inode as later callers.
pub struct DeckLock {
    file: File,
    path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("deck is busy{}: {path} is held by another nd process", holder_note(.holder))]
    Busy { path: PathBuf, holder: Option<u32> },
}

fn holder_note(holder: &Option<u32>) -> String {
    holder.map(|pid| format!(" (pid {})", pid)).unwrap_or_default()
}

impl DeckLock {
    /// Acquire the lock, polling until `timeout` runs out.
    pub fn acquire(deck_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = deck_dir.join(".lock");
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| LockError::Open {
                path: path.clone(),
                source: e,
            })?;

        let deadline = Instant::now() + timeout;
        while let Err(err) = try_lock(&file) {
            if Instant::now() >= deadline {
                let holder = read_holder(&path);
                tracing::warn!(path = %path.display(), ?holder, "gave up waiting for deck lock");
                return Err(LockError::Busy { path, holder });
            }
            tracing::trace!(error = %err, "deck lock busy");
            std::thread::sleep(POLL_INTERVAL);
        }

        let mut lock = DeckLock { file, path };
        lock.record_holder();
        tracing::trace!(path = %lock.path.display(), "deck lock acquired");
        Ok(lock)
    }

    pub fn acquire_default(deck_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(deck_dir, DEFAULT_TIMEOUT)
    }

    /// Process ID of the current holder, if one is recorded
    pub fn holder(deck_dir: &Path) -> Option<u32> {
        read_holder(&deck_dir.join(".lock"))
    }

    fn record_holder(&mut self) {
        let written = self
            .file
            .set_len(0)
            .and_then(|_| self.file.seek(SeekFrom::Start(0)))
            .and_then(|_| write!(self.file, "{}", std::process::id()))
            .and_then(|_| self.file.flush());
        if let Err(e) = written {
            tracing::debug!(error = %e, "could not record lock holder");
        }
    }
}

impl Drop for DeckLock {
    fn drop(&mut self) {
        // the flock itself is released with the handle
        let _ = self.file.set_len(0);
    }
}

fn read_holder(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
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
