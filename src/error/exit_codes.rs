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

use crate::error::LotoError;

/// Exit code for failures of the wrapper itself, as opposed to the child.
pub const WRAPPER_FAILURE: i32 = 125;

/// Exit code when a pending lock wait is interrupted by SIGINT/SIGTERM.
pub const CANCELLED: i32 = 130;

pub fn get_exit_code(error: &LotoError) -> i32 {
    match error {
        LotoError::LockCancelled { .. } => CANCELLED,

        LotoError::ConfigError(_)
        | LotoError::LockFileUnavailable { .. }
        | LotoError::LockDenied { .. }
        | LotoError::LockTimeout { .. }
        | LotoError::LockingAcquire { .. }
        | LotoError::LockingRelease { .. }
        | LotoError::ForkFailure { .. }
        | LotoError::ExecFailure { .. }
        | LotoError::Io(_) => WRAPPER_FAILURE,
    }
}
