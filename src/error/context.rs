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
use std::fmt;
use std::io::ErrorKind;

pub struct ErrorContext<'a> {
    pub error: &'a LotoError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a LotoError) -> Self {
        let (suggestion, details) = match error {
            LotoError::ConfigError(msg) => {
                let suggestion = Some(
                    "Usage: loto -L <lock_file> [-w] [-t <seconds>] [-v|-q] -- <command> [args...]"
                        .to_string(),
                );
                let details = Some(msg.clone());
                (suggestion, details)
            }
            LotoError::LockFileUnavailable { path, source } => {
                let suggestion = if source.kind() == ErrorKind::PermissionDenied {
                    Some(format!(
                        "Check that you can create or read {} and its parent directory.",
                        path.display()
                    ))
                } else {
                    Some(
                        "Ensure the lock file's parent directory exists, or use a shorthand \
                         resource name (cpu, net)."
                            .to_string(),
                    )
                };
                let details = Some(source.to_string());
                (suggestion, details)
            }
            LotoError::LockDenied { .. } => {
                let suggestion = Some(
                    "Another instance holds this lock. Use -w to wait for it, or -q to exit \
                     silently when the job is already running."
                        .to_string(),
                );
                (suggestion, None)
            }
            LotoError::LockTimeout { waited_secs, .. } => {
                let suggestion =
                    Some("Raise the -t timeout, or use -t 0 to wait indefinitely.".to_string());
                let details = Some(format!(
                    "The lock was still held after {waited_secs:.1}s of waiting."
                ));
                (suggestion, details)
            }
            LotoError::LockCancelled { .. } => {
                let suggestion = Some("Rerun when the resource is free.".to_string());
                (suggestion, None)
            }
            LotoError::LockingAcquire { details, .. } => {
                let suggestion = Some(
                    "The filesystem may not support advisory locks; choose a lock path on a \
                     local filesystem."
                        .to_string(),
                );
                (suggestion, Some(details.clone()))
            }
            LotoError::ExecFailure { command, source } => {
                let suggestion = match source.kind() {
                    ErrorKind::NotFound => Some(format!(
                        "Ensure '{command}' is installed and available in your PATH."
                    )),
                    ErrorKind::PermissionDenied => {
                        Some(format!("Ensure '{command}' is executable."))
                    }
                    _ => None,
                };
                (suggestion, None)
            }
            LotoError::ForkFailure { .. } => {
                let suggestion = Some(
                    "The system could not create a new process; check process and memory limits."
                        .to_string(),
                );
                (suggestion, None)
            }
            LotoError::Io(io_err) => match io_err.kind() {
                ErrorKind::PermissionDenied => {
                    let suggestion = Some("Check file and directory permissions.".to_string());
                    (suggestion, Some(io_err.to_string()))
                }
                _ => (None, None),
            },
            LotoError::LockingRelease { .. } => (None, None),
        };

        ErrorContext {
            error,
            suggestion,
            details,
        }
    }
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}
