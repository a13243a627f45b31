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
use std::cmp;
use std::thread;
use std::time::{Duration, Instant};

/// Suspends the caller between lock attempts.
pub trait Sleeper: Send + Sync {
    /// Sleeps for up to `requested` and returns the time that actually elapsed.
    /// Returns early once `cancellation` fires.
    fn sleep(&self, requested: Duration, cancellation: &CancellationToken) -> Duration;
}

/// Sleeps on the current thread in short slices so cancellation is noticed promptly.
#[derive(Debug, Clone)]
pub struct ThreadSleeper {
    slice: Duration,
}

impl ThreadSleeper {
    pub fn new(slice: Duration) -> Self {
        Self {
            slice: cmp::max(slice, Duration::from_millis(1)),
        }
    }
}

impl Default for ThreadSleeper {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl Sleeper for ThreadSleeper {
    fn sleep(&self, requested: Duration, cancellation: &CancellationToken) -> Duration {
        let started = Instant::now();
        while !cancellation.is_cancelled() {
            let elapsed = started.elapsed();
            if elapsed >= requested {
                break;
            }
            thread::sleep(cmp::min(self.slice, requested - elapsed));
        }
        started.elapsed()
    }
}
