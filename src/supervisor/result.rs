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

use chrono::{DateTime, Local};
use std::process::ExitStatus;
use std::time::{Duration, Instant};

/// Exit code reported when a child ends without a code or a signal.
const UNKNOWN_STATUS_EXIT: i32 = 1;

/// Start of the run, taken before the lock wait begins.
#[derive(Debug, Clone, Copy)]
pub struct Lifecycle {
    started_at: DateTime<Local>,
    started: Instant,
}

impl Lifecycle {
    pub fn start() -> Self {
        Self {
            started_at: Local::now(),
            started: Instant::now(),
        }
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Outcome of a supervised child run.
#[derive(Debug, Clone)]
pub struct ChildResult {
    pid: u32,
    status: ExitStatus,
    started_at: DateTime<Local>,
    finished_at: DateTime<Local>,
    wait_duration: Duration,
    total_duration: Duration,
}

impl ChildResult {
    pub(crate) fn new(
        pid: u32,
        status: ExitStatus,
        lifecycle: &Lifecycle,
        finished_at: DateTime<Local>,
        wait_duration: Duration,
    ) -> Self {
        Self {
            pid,
            status,
            started_at: lifecycle.started_at(),
            finished_at,
            wait_duration,
            total_duration: lifecycle.elapsed(),
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn status(&self) -> ExitStatus {
        self.status
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Local> {
        self.finished_at
    }

    /// Time spent waiting for the lock.
    pub fn wait_duration(&self) -> Duration {
        self.wait_duration
    }

    /// Wall time from program start to child exit, lock wait included.
    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    pub fn run_duration(&self) -> Duration {
        self.total_duration.saturating_sub(self.wait_duration)
    }

    pub fn exit_code(&self) -> i32 {
        exit_code_from_status(self.status)
    }

    pub fn summary(&self) -> String {
        format!(
            "Child {} exited with {} (run time: {} sec, lock wait: {} sec, started {})",
            self.pid,
            self.exit_code(),
            self.run_duration().as_secs(),
            self.wait_duration.as_secs(),
            self.started_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Maps a child's status to this process's exit code: the child's own code,
/// or `128 + n` when it was killed by signal `n`.
pub fn exit_code_from_status(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    UNKNOWN_STATUS_EXIT
}
