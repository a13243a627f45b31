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

use crate::config::LotoConfig;
use crate::error::Result;
use crate::locking::{
    ConsoleWaitObserver, LockController, LockRequest, LockWaitObserver, NoopLockWaitObserver,
    global_token, restore_default_signal_behavior,
};
use crate::paths::locking::LockTarget;
use crate::reporter::StatusReporter;
use crate::supervisor::{Lifecycle, ProcessSupervisor};
use log::{debug, info};
use std::sync::Arc;

/// Acquires the configured lock, runs the child under it and reports the outcome.
pub struct RunCommand<'a> {
    config: &'a LotoConfig,
    reporter: StatusReporter,
    controller: LockController,
}

impl<'a> RunCommand<'a> {
    pub fn new(config: &'a LotoConfig) -> Result<Self> {
        Ok(Self {
            config,
            reporter: StatusReporter::new(config.verbosity),
            controller: LockController::with_default_sleeper(),
        })
    }

    /// Replaces the default stdout reporter.
    pub fn with_reporter(mut self, reporter: StatusReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Replaces the default controller (tests inject a fake sleeper here).
    pub fn with_controller(mut self, controller: LockController) -> Self {
        self.controller = controller;
        self
    }

    /// Returns the exit code the wrapper should terminate with.
    pub fn execute(&self) -> Result<i32> {
        let lifecycle = Lifecycle::start();
        let path = self.config.lock_path();

        if let LockTarget::Resource { name, .. } = &self.config.target {
            self.reporter
                .info(&format!("Resource {name} uses lock file {}.", path.display()));
        }
        debug!(
            "Locking {} ({:?}, timeout {})",
            path.display(),
            self.config.mode,
            self.config.timeout
        );

        let observer: Arc<dyn LockWaitObserver> = if self.reporter.is_chatty() {
            Arc::new(ConsoleWaitObserver::new(self.reporter.clone()))
        } else {
            Arc::new(NoopLockWaitObserver)
        };

        let mut request = LockRequest::new(path, self.config.retry_policy())
            .with_cancellation(global_token())
            .with_observer(Some(observer.as_ref()));
        let lock = self.controller.acquire(&mut request)?;

        // Signals only cancel the wait; from here on they act as usual.
        restore_default_signal_behavior();
        info!("Holding lock on {}", path.display());

        let supervisor = ProcessSupervisor::new(self.reporter.clone());
        let result = supervisor.run(&self.config.command, lock, &lifecycle, request.waited())?;

        self.reporter.info(&result.summary());
        Ok(result.exit_code())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::{CliOptions, LotoSettings};
    use crate::error::LotoError;
    use crate::locking::{CancellationToken, Sleeper};
    use crate::reporter::test_support::SharedBuffer;
    use std::ffi::OsString;
    use std::fs::File;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Returns immediately, reporting the requested interval as slept.
    struct InstantSleeper;

    impl Sleeper for InstantSleeper {
        fn sleep(&self, requested: Duration, _cancellation: &CancellationToken) -> Duration {
            requested
        }
    }

    fn config(lock: &Path, command: &[&str], configure: impl FnOnce(&mut CliOptions)) -> LotoConfig {
        let mut options = CliOptions {
            locks: vec![lock.to_string_lossy().into_owned()],
            command: command.iter().map(OsString::from).collect(),
            ..CliOptions::default()
        };
        configure(&mut options);
        LotoConfig::from_options(options, &LotoSettings::default()).unwrap()
    }

    fn hold(path: &Path) -> File {
        let file = File::create(path).unwrap();
        file.try_lock().unwrap();
        file
    }

    #[test]
    fn runs_child_and_returns_its_exit_code() {
        let temp = TempDir::new().unwrap();
        let lock = temp.path().join("job.lock");
        let config = config(&lock, &["sh", "-c", "exit 4"], |_| {});

        let code = RunCommand::new(&config).unwrap().execute().unwrap();

        assert_eq!(code, 4);
        assert!(lock.exists());
    }

    #[test]
    fn held_lock_without_wait_is_denied() {
        let temp = TempDir::new().unwrap();
        let lock = temp.path().join("job.lock");
        let _holder = hold(&lock);
        let config = config(&lock, &["true"], |_| {});

        let err = RunCommand::new(&config).unwrap().execute().unwrap_err();

        assert!(matches!(err, LotoError::LockDenied { .. }));
    }

    #[test]
    fn held_lock_with_timeout_expires() {
        let temp = TempDir::new().unwrap();
        let lock = temp.path().join("job.lock");
        let _holder = hold(&lock);
        let config = config(&lock, &["true"], |options| {
            options.timeout = Some(crate::locking::LockTimeoutValue::from_secs(3));
        });

        let err = RunCommand::new(&config)
            .unwrap()
            .with_controller(LockController::new(Arc::new(InstantSleeper)))
            .execute()
            .unwrap_err();

        match err {
            LotoError::LockTimeout { waited_secs, .. } => assert!(waited_secs > 3.0),
            other => panic!("Expected LockTimeout, got {other:?}"),
        }
    }

    #[test]
    fn chatty_run_reports_resource_and_summary() {
        let temp = TempDir::new().unwrap();
        let settings = LotoSettings {
            lock_dir: temp.path().to_path_buf(),
        };
        let options = CliOptions {
            locks: vec!["cpu".to_string()],
            verbose: 1,
            command: vec![OsString::from("true")],
            ..CliOptions::default()
        };
        let config = LotoConfig::from_options(options, &settings).unwrap();
        let buffer = SharedBuffer::default();

        let code = RunCommand::new(&config)
            .unwrap()
            .with_reporter(StatusReporter::with_writer(
                config.verbosity,
                Box::new(buffer.clone()),
            ))
            .execute()
            .unwrap();

        assert_eq!(code, 0);
        let output = buffer.contents();
        let expected_path = temp.path().join("loto.cpu");
        assert!(output.contains(&format!(
            "loto: Resource cpu uses lock file {}.",
            expected_path.display()
        )));
        assert!(output.contains("Waiting for child process"));
        assert!(output.contains("exited with 0"));
        assert!(output.contains("lock wait: 0 sec"));
    }
}
