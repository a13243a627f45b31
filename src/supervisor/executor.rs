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

use crate::config::ChildCommand;
use crate::error::{LotoError, Result};
use crate::locking::LockHandle;
use crate::reporter::StatusReporter;
use crate::supervisor::result::{ChildResult, Lifecycle};
use chrono::Local;
use log::{debug, warn};
use std::io::{self, Write};
use std::process::Command;
use std::time::Duration;

/// Spawns the child command and waits for it while holding the lock.
pub struct ProcessSupervisor {
    reporter: StatusReporter,
}

impl ProcessSupervisor {
    pub fn new(reporter: StatusReporter) -> Self {
        Self { reporter }
    }

    /// Runs `command` to completion and releases `lock` afterwards, also when the
    /// child could not be started.
    ///
    /// The child inherits stdin/stdout/stderr and the environment. The lock file
    /// is opened close-on-exec, so the child never holds a copy of its descriptor.
    pub fn run(
        &self,
        command: &ChildCommand,
        lock: LockHandle,
        lifecycle: &Lifecycle,
        wait_duration: Duration,
    ) -> Result<ChildResult> {
        self.flush_parent_output();

        let mut child = match Command::new(command.program())
            .args(command.args())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                release_lock(lock);
                return Err(classify_spawn_error(command, err));
            }
        };

        let pid = child.id();
        debug!("Spawned child {pid} for {}", command.display_name());
        self.reporter
            .info(&format!("Waiting for child process {pid}"));

        let status = child.wait();
        let finished_at = Local::now();
        release_lock(lock);

        let status = status?;
        debug!("Child {pid} finished with {status}");
        Ok(ChildResult::new(
            pid,
            status,
            lifecycle,
            finished_at,
            wait_duration,
        ))
    }

    fn flush_parent_output(&self) {
        if let Err(err) = self.reporter.flush() {
            debug!("Failed to flush status output: {err}");
        }
        if let Err(err) = io::stdout().flush() {
            debug!("Failed to flush stdout: {err}");
        }
        if let Err(err) = io::stderr().flush() {
            debug!("Failed to flush stderr: {err}");
        }
    }
}

fn release_lock(lock: LockHandle) {
    let path = lock.path().to_path_buf();
    if let Err(err) = lock.release() {
        warn!("Lock on {} was not released cleanly: {err}", path.display());
    }
}

/// Resource exhaustion means no process could be created; anything else means
/// the command itself could not be executed.
fn classify_spawn_error(command: &ChildCommand, source: io::Error) -> LotoError {
    let command = command.display_name();
    if is_fork_failure(&source) {
        LotoError::ForkFailure { command, source }
    } else {
        LotoError::ExecFailure { command, source }
    }
}

#[cfg(unix)]
fn is_fork_failure(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::EAGAIN) | Some(libc::ENOMEM))
}

#[cfg(not(unix))]
fn is_fork_failure(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::OutOfMemory
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::Verbosity;
    use crate::locking::{LockController, LockRequest, RetryPolicy};
    use crate::reporter::test_support::SharedBuffer;
    use std::ffi::OsString;
    use std::path::Path;
    use tempfile::TempDir;

    fn command(argv: &[&str]) -> ChildCommand {
        ChildCommand::from_argv(argv.iter().map(OsString::from).collect()).unwrap()
    }

    fn acquire(path: &Path) -> LockHandle {
        let controller = LockController::with_default_sleeper();
        let mut request = LockRequest::new(path, RetryPolicy::no_wait());
        controller.acquire(&mut request).unwrap()
    }

    fn assert_lock_free(path: &Path) {
        let controller = LockController::with_default_sleeper();
        let file = controller.open(path).unwrap();
        assert!(
            controller.try_acquire(&file, path).unwrap(),
            "lock on {} is still held",
            path.display()
        );
    }

    fn supervisor() -> ProcessSupervisor {
        ProcessSupervisor::new(StatusReporter::with_writer(
            Verbosity::Normal,
            Box::new(SharedBuffer::default()),
        ))
    }

    #[test]
    fn successful_child_releases_lock() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("job.lock");
        let lock = acquire(&path);

        let result = supervisor()
            .run(&command(&["true"]), lock, &Lifecycle::start(), Duration::ZERO)
            .unwrap();

        assert_eq!(result.exit_code(), 0);
        assert!(result.pid() > 0);
        assert_lock_free(&path);
    }

    #[test]
    fn failing_child_propagates_code_and_releases_lock() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("job.lock");
        let lock = acquire(&path);

        let result = supervisor()
            .run(
                &command(&["sh", "-c", "exit 7"]),
                lock,
                &Lifecycle::start(),
                Duration::from_secs(2),
            )
            .unwrap();

        assert_eq!(result.exit_code(), 7);
        assert_eq!(result.wait_duration(), Duration::from_secs(2));
        assert_lock_free(&path);
    }

    #[test]
    fn missing_program_is_exec_failure_and_releases_lock() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("job.lock");
        let lock = acquire(&path);

        let err = supervisor()
            .run(
                &command(&["loto-test-no-such-program"]),
                lock,
                &Lifecycle::start(),
                Duration::ZERO,
            )
            .unwrap_err();

        match err {
            LotoError::ExecFailure { command, .. } => {
                assert_eq!(command, "loto-test-no-such-program")
            }
            other => panic!("Expected ExecFailure, got {other:?}"),
        }
        assert_lock_free(&path);
    }

    #[test]
    fn chatty_supervisor_reports_child_pid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("job.lock");
        let buffer = SharedBuffer::default();
        let supervisor = ProcessSupervisor::new(StatusReporter::with_writer(
            Verbosity::Chatty,
            Box::new(buffer.clone()),
        ));

        let result = supervisor
            .run(
                &command(&["true"]),
                acquire(&path),
                &Lifecycle::start(),
                Duration::ZERO,
            )
            .unwrap();

        assert_eq!(
            buffer.contents(),
            format!("loto: Waiting for child process {}\n", result.pid())
        );
    }

    #[test]
    fn spawn_errors_are_classified() {
        let cmd = command(&["x"]);
        let exhausted = io::Error::from_raw_os_error(libc::EAGAIN);
        assert!(matches!(
            classify_spawn_error(&cmd, exhausted),
            LotoError::ForkFailure { .. }
        ));
        let out_of_memory = io::Error::from_raw_os_error(libc::ENOMEM);
        assert!(matches!(
            classify_spawn_error(&cmd, out_of_memory),
            LotoError::ForkFailure { .. }
        ));
        for errno in [libc::EACCES, libc::ENOENT, libc::ENOEXEC, libc::E2BIG] {
            let err = io::Error::from_raw_os_error(errno);
            assert!(
                matches!(
                    classify_spawn_error(&cmd, err),
                    LotoError::ExecFailure { .. }
                ),
                "errno {errno} should be an exec failure"
            );
        }
    }
}
