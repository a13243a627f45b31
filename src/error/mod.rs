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

mod context;
mod exit_codes;
mod format;

pub use context::ErrorContext;
pub use exit_codes::{CANCELLED, WRAPPER_FAILURE, get_exit_code};
pub use format::{format_error_chain, format_error_with_color};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LotoError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Can't open lock file: {}", path.display())]
    LockFileUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to gain lock on {}", path.display())]
    LockDenied { path: PathBuf },

    #[error("Timeout to gain lock on {} after waiting {waited_secs:.1}s", path.display())]
    LockTimeout { path: PathBuf, waited_secs: f64 },

    #[error("Cancelled wait for lock on {} after {waited_secs:.1}s", path.display())]
    LockCancelled { path: PathBuf, waited_secs: f64 },

    #[error("Failed to acquire lock on {}: {details}", path.display())]
    LockingAcquire { path: PathBuf, details: String },

    #[error("Failed to release lock on {}: {details}", path.display())]
    LockingRelease { path: PathBuf, details: String },

    #[error("Failed to create child process for '{command}': {source}")]
    ForkFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to execute '{command}': {source}")]
    ExecFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LotoError {
    /// Contention outcomes that quiet mode turns into a silent success exit.
    pub fn is_contention(&self) -> bool {
        matches!(
            self,
            LotoError::LockDenied { .. } | LotoError::LockTimeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LotoError>;
