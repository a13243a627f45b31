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

//! Observer interfaces for lock wait instrumentation.
//!
//! Lock wait observers decouple the `LockController` from user-facing feedback
//! so the retry loop stays free of output concerns.

use crate::reporter::StatusReporter;
use log::debug;
use std::path::Path;
use std::time::Duration;

/// Observer hooks for lock wait events.
pub trait LockWaitObserver: Send + Sync {
    fn on_retry(&self, _path: &Path, _attempt: usize, _interval: Duration, _waited: Duration) {}

    fn on_acquired(&self, _path: &Path, _waited: Duration) {}

    fn on_denied(&self, _path: &Path) {}

    fn on_timeout(&self, _path: &Path, _waited: Duration) {}

    fn on_cancelled(&self, _path: &Path, _waited: Duration) {}
}

/// Observer implementation that performs no work.
#[derive(Debug, Default)]
pub struct NoopLockWaitObserver;

impl LockWaitObserver for NoopLockWaitObserver {}

/// Renders lock wait events as chatty status lines.
pub struct ConsoleWaitObserver {
    reporter: StatusReporter,
}

impl ConsoleWaitObserver {
    pub fn new(reporter: StatusReporter) -> Self {
        Self { reporter }
    }
}

impl LockWaitObserver for ConsoleWaitObserver {
    fn on_retry(&self, path: &Path, attempt: usize, interval: Duration, waited: Duration) {
        debug!(
            "Retry {attempt} for {} after {:.3}s of waiting",
            path.display(),
            waited.as_secs_f64()
        );
        self.reporter.info(&format!(
            "waiting for lock on {} - sleeping {} secs",
            path.display(),
            interval.as_secs()
        ));
    }

    fn on_acquired(&self, path: &Path, waited: Duration) {
        if waited.is_zero() {
            return;
        }
        self.reporter.info(&format!(
            "acquired lock on {} after waiting {} secs",
            path.display(),
            waited.as_secs()
        ));
    }

    fn on_cancelled(&self, path: &Path, waited: Duration) {
        self.reporter.info(&format!(
            "cancelled wait for lock on {} after {} secs",
            path.display(),
            waited.as_secs()
        ));
    }
}
