// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{LotoError, Result};
use crate::locking::acquisition::LockRequest;
use crate::locking::handle::LockHandle;
use crate::locking::sleeper::{Sleeper, ThreadSleeper};
use log::debug;
use std::cmp;
use std::fs::{File, OpenOptions, TryLockError};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Mode for newly created lock files so unprivileged users can share them.
pub const LOCK_FILE_MODE: u32 = 0o666;

/// Drives exclusive advisory lock acquisition with optional dithered retries.
pub struct LockController {
    sleeper: Arc<dyn Sleeper>,
}

impl LockController {
    pub fn with_default_sleeper() -> Self {
        Self::new(Arc::new(ThreadSleeper::default()))
    }

    pub fn new(sleeper: Arc<dyn Sleeper>) -> Self {
        Self { sleeper }
    }

    /// Opens `path` for reading, creating it if it does not exist.
    pub fn open(&self, path: &Path) -> Result<File> {
        open_lock_file(path).map_err(|source| LotoError::LockFileUnavailable {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Attempts a non-blocking exclusive lock. `Ok(false)` means another holder has it.
    pub fn try_acquire(&self, file: &File, path: &Path) -> Result<bool> {
        loop {
            match file.try_lock() {
                Ok(()) => return Ok(true),
                Err(TryLockError::WouldBlock) => return Ok(false),
                Err(TryLockError::Error(err)) if err.kind() == std::io::ErrorKind::Interrupted => {
                    continue;
                }
                Err(TryLockError::Error(err)) => {
                    return Err(LotoError::LockingAcquire {
                        path: path.to_path_buf(),
                        details: err.to_string(),
                    });
                }
            }
        }
    }

    /// Runs the acquisition state machine until the lock is held or a terminal
    /// failure (denied, timed out, cancelled) is reached.
    pub fn acquire(&self, request: &mut LockRequest<'_>) -> Result<LockHandle> {
        let path = request.path().to_path_buf();
        let file = self.open(&path)?;
        debug!("Opened lock file {}", path.display());

        loop {
            if self.try_acquire(&file, &path)? {
                debug!(
                    "Acquired advisory lock on {} after {} retries ({:.3}s waited)",
                    path.display(),
                    request.retries(),
                    request.waited().as_secs_f64()
                );
                request.notify_acquired();
                return Ok(LockHandle::new(path, file, Instant::now()));
            }

            if !request.policy().wait_enabled() {
                request.notify_denied();
                return Err(LotoError::LockDenied { path });
            }

            let interval = request.policy_mut().next_interval();
            request.record_retry(interval);
            let slept = self.sleeper.sleep(interval, request.cancellation());
            // The schedule is counted in whole requested seconds; oversleep is not.
            request.policy_mut().record_wait(cmp::min(slept, interval));

            if request.cancellation().is_cancelled() {
                request.notify_cancelled();
                return Err(LotoError::LockCancelled {
                    path,
                    waited_secs: request.waited().as_secs_f64(),
                });
            }

            if request.policy().is_expired() {
                request.notify_timeout();
                return Err(LotoError::LockTimeout {
                    path,
                    waited_secs: request.waited().as_secs_f64(),
                });
            }
        }
    }

    pub fn release(&self, handle: LockHandle) -> Result<()> {
        handle.release()
    }
}

#[cfg(unix)]
fn open_lock_file(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    // O_CREAT on a read-only descriptor: readers of an existing lock file need
    // no write permission on it.
    OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_CREAT)
        .mode(LOCK_FILE_MODE)
        .open(path)
}

#[cfg(not(unix))]
fn open_lock_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
}
