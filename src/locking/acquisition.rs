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

use crate::locking::cancellation::CancellationToken;
use crate::locking::retry::RetryPolicy;
use crate::locking::wait_observer::LockWaitObserver;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Indicates whether a lock request may wait for contention to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireMode {
    Blocking,
    NonBlocking,
}

impl AcquireMode {
    pub fn is_blocking(self) -> bool {
        matches!(self, AcquireMode::Blocking)
    }
}

/// Carries the mutable state of a single lock acquisition.
pub struct LockRequest<'a> {
    path: PathBuf,
    policy: RetryPolicy,
    cancellation: CancellationToken,
    observer: Option<&'a dyn LockWaitObserver>,
    retries: usize,
}

impl<'a> LockRequest<'a> {
    pub fn new<P: Into<PathBuf>>(path: P, policy: RetryPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            cancellation: CancellationToken::new(),
            observer: None,
            retries: 0,
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn with_observer(mut self, observer: Option<&'a dyn LockWaitObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut RetryPolicy {
        &mut self.policy
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn retries(&self) -> usize {
        self.retries
    }

    pub fn waited(&self) -> Duration {
        self.policy.waited()
    }

    pub fn record_retry(&mut self, interval: Duration) {
        self.retries = self.retries.saturating_add(1);
        if let Some(observer) = self.observer {
            observer.on_retry(&self.path, self.retries, interval, self.waited());
        }
    }

    pub fn notify_acquired(&self) {
        if let Some(observer) = self.observer {
            observer.on_acquired(&self.path, self.waited());
        }
    }

    pub fn notify_denied(&self) {
        if let Some(observer) = self.observer {
            observer.on_denied(&self.path);
        }
    }

    pub fn notify_timeout(&self) {
        if let Some(observer) = self.observer {
            observer.on_timeout(&self.path, self.waited());
        }
    }

    pub fn notify_cancelled(&self) {
        if let Some(observer) = self.observer {
            observer.on_cancelled(&self.path, self.waited());
        }
    }
}
