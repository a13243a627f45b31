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

//! Runs the child command while the lock is held.
//!
//! The supervisor spawns the child with inherited stdio and environment,
//! blocks until it exits, and releases the lock whatever the outcome.

mod executor;
mod result;

pub use executor::ProcessSupervisor;
pub use result::{ChildResult, Lifecycle, exit_code_from_status};
