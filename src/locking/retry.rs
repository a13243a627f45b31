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

//! Dithered, progressively widening retry schedule for contended locks.
//!
//! Each failed attempt sleeps for a random whole number of seconds drawn from
//! `[w/2 + 1, w/2 + w]`, where `w` starts at the initial waiting quantum and
//! grows by one after every draw. The randomness keeps waiters that started at
//! the same moment from polling in lockstep.

use crate::locking::acquisition::AcquireMode;
use crate::locking::timeout::LockTimeoutValue;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Backoff parameter used for the first retry, in seconds.
pub const INITIAL_WAIT_QUANTUM_SECS: u64 = 1;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    mode: AcquireMode,
    base_interval: u64,
    timeout: LockTimeoutValue,
    waited: Duration,
    rng: StdRng,
}

impl RetryPolicy {
    pub fn new(mode: AcquireMode, timeout: LockTimeoutValue) -> Self {
        Self {
            mode,
            base_interval: INITIAL_WAIT_QUANTUM_SECS,
            timeout,
            waited: Duration::ZERO,
            rng: StdRng::from_entropy(),
        }
    }

    /// Give up on the first contended attempt.
    pub fn no_wait() -> Self {
        Self::new(AcquireMode::NonBlocking, LockTimeoutValue::Infinite)
    }

    pub fn waiting(timeout: LockTimeoutValue) -> Self {
        Self::new(AcquireMode::Blocking, timeout)
    }

    /// Replaces the entropy-seeded generator with a deterministic one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn mode(&self) -> AcquireMode {
        self.mode
    }

    pub fn wait_enabled(&self) -> bool {
        self.mode.is_blocking()
    }

    pub fn base_interval(&self) -> u64 {
        self.base_interval
    }

    pub fn waited(&self) -> Duration {
        self.waited
    }

    /// Inclusive bounds, in seconds, of the next interval.
    pub fn interval_bounds(&self) -> (u64, u64) {
        let half = self.base_interval / 2;
        (half + 1, half.saturating_add(self.base_interval))
    }

    /// Draws the next sleep interval and widens the backoff for the attempt after it.
    pub fn next_interval(&mut self) -> Duration {
        let (low, high) = self.interval_bounds();
        let seconds = self.rng.gen_range(low..=high);
        self.base_interval = self.base_interval.saturating_add(1);
        Duration::from_secs(seconds)
    }

    /// Accounts for time actually spent asleep, which may be less than requested.
    pub fn record_wait(&mut self, elapsed: Duration) {
        self.waited = self.waited.saturating_add(elapsed);
    }

    pub fn is_expired(&self) -> bool {
        self.timeout.is_exceeded_by(self.waited)
    }
}
