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
use crate::locking::{AcquireMode, LockTimeoutValue, RetryPolicy};
use crate::paths::locking::{DEFAULT_LOCK_DIR, LockTarget, resolve_lock_target};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Overrides the directory that shorthand resources (`cpu`, `net`) live in.
pub const LOCK_DIR_ENV: &str = "LOTO_LOCK_DIR";

/// How much the wrapper itself says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Chatty,
}

impl Verbosity {
    /// `-q` wins over any number of `-v`.
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if verbose > 0 {
            Verbosity::Chatty
        } else {
            Verbosity::Normal
        }
    }

    pub fn is_quiet(self) -> bool {
        matches!(self, Verbosity::Quiet)
    }

    pub fn is_chatty(self) -> bool {
        matches!(self, Verbosity::Chatty)
    }
}

/// The program and arguments run while the lock is held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl ChildCommand {
    pub fn from_argv(argv: Vec<OsString>) -> Result<Self> {
        let mut argv = argv.into_iter();
        let program = argv
            .next()
            .filter(|program| !program.is_empty())
            .ok_or_else(|| LotoError::ConfigError("missing command after \"--\"".to_string()))?;
        Ok(Self {
            program,
            args: argv.collect(),
        })
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn display_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

/// Settings taken from the environment rather than the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotoSettings {
    pub lock_dir: PathBuf,
}

impl Default for LotoSettings {
    fn default() -> Self {
        Self {
            lock_dir: PathBuf::from(DEFAULT_LOCK_DIR),
        }
    }
}

impl LotoSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(dir) = lookup(LOCK_DIR_ENV).filter(|dir| !dir.trim().is_empty()) {
            log::debug!("{LOCK_DIR_ENV} overrides lock directory with {dir}");
            settings.lock_dir = PathBuf::from(dir);
        }
        settings
    }
}

/// Raw, unvalidated options as collected by the command-line front end.
#[derive(Debug, Clone, Default)]
pub struct CliOptions {
    pub locks: Vec<String>,
    pub wait: bool,
    pub timeout: Option<LockTimeoutValue>,
    pub quiet: bool,
    pub verbose: u8,
    pub command: Vec<OsString>,
}

/// Validated parameters for a single run.
#[derive(Debug, Clone)]
pub struct LotoConfig {
    pub target: LockTarget,
    pub mode: AcquireMode,
    pub timeout: LockTimeoutValue,
    pub verbosity: Verbosity,
    pub command: ChildCommand,
}

impl LotoConfig {
    pub fn from_options(options: CliOptions, settings: &LotoSettings) -> Result<Self> {
        if options.locks.len() > 1 {
            log::warn!("Multiple lock files given; using the last one");
        }

        let lock = options
            .locks
            .last()
            .filter(|lock| !lock.is_empty())
            .ok_or_else(|| {
                LotoError::ConfigError("missing -L=/path/to/lock_file".to_string())
            })?;
        let target = resolve_lock_target(lock, &settings.lock_dir);
        let command = ChildCommand::from_argv(options.command)?;

        // A timeout implies waiting.
        let mode = if options.wait || options.timeout.is_some() {
            AcquireMode::Blocking
        } else {
            AcquireMode::NonBlocking
        };

        Ok(Self {
            target,
            mode,
            timeout: options.timeout.unwrap_or_default(),
            verbosity: Verbosity::from_flags(options.quiet, options.verbose),
            command,
        })
    }

    pub fn lock_path(&self) -> &Path {
        self.target.path()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.mode, self.timeout)
    }
}
