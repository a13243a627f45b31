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
use log::{debug, warn};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Exclusive advisory lock held through an open `std::fs::File`.
///
/// The lock is released by [`LockHandle::release`], on drop, or by the OS when
/// the process exits.
#[derive(Debug)]
pub struct LockHandle {
    path: PathBuf,
    file: Option<File>,
    acquired_at: Instant,
    released: bool,
}

impl LockHandle {
    pub(crate) fn new(path: PathBuf, file: File, acquired_at: Instant) -> Self {
        Self {
            path,
            file: Some(file),
            acquired_at,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(mut self) -> Result<()> {
        self.release_inner()
    }

    fn release_inner(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }

        let held = self.acquired_at.elapsed();
        if let Some(file) = self.file.take() {
            if let Err(err) = file.unlock() {
                self.released = true;
                warn!(
                    "Failed to release advisory lock on {}: {err}",
                    self.path.display()
                );
                return Err(LotoError::LockingRelease {
                    path: self.path.clone(),
                    details: err.to_string(),
                });
            }
            debug!(
                "Released advisory lock on {} after {:.3}s",
                self.path.display(),
                held.as_secs_f64()
            );
        }
        self.released = true;
        Ok(())
    }
}

impl Drop for LockHandle {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        if let Some(file) = self.file.take() {
            if let Err(err) = file.unlock() {
                warn!("Failed to unlock {} during drop: {err}", self.path.display());
            } else {
                debug!(
                    "Released advisory lock on {} on drop after {:.3}s",
                    self.path.display(),
                    self.acquired_at.elapsed().as_secs_f64()
                );
            }
        }

        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use tempfile::TempDir;

    fn open(path: &Path) -> File {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .unwrap()
    }

    #[test]
    fn release_allows_other_handles_to_lock() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("job.lock");
        let file = open(&path);
        file.try_lock().unwrap();

        let handle = LockHandle::new(path.clone(), file, Instant::now());
        assert_eq!(handle.path(), path.as_path());

        let contender = open(&path);
        assert!(contender.try_lock().is_err());

        handle.release().unwrap();
        contender.try_lock().unwrap();
    }

    #[test]
    fn drop_releases_lock() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("job.lock");
        let file = open(&path);
        file.try_lock().unwrap();

        {
            let _handle = LockHandle::new(path.clone(), file, Instant::now());
        }

        let contender = open(&path);
        contender.try_lock().unwrap();
    }
}
