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

pub mod acquisition;
pub mod cancellation;
pub mod controller;
pub mod handle;
pub mod retry;
pub mod sleeper;
pub mod timeout;
pub mod wait_observer;

pub use acquisition::{AcquireMode, LockRequest};
pub use cancellation::{CancellationToken, global_token, restore_default_signal_behavior};
pub use controller::{LOCK_FILE_MODE, LockController};
pub use handle::LockHandle;
pub use retry::{INITIAL_WAIT_QUANTUM_SECS, RetryPolicy};
pub use sleeper::{Sleeper, ThreadSleeper};
pub use timeout::{LockTimeoutParseError, LockTimeoutValue, parse_timeout_override};
pub use wait_observer::{ConsoleWaitObserver, LockWaitObserver, NoopLockWaitObserver};
