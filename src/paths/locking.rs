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

//! Lock file locations, including the shorthand names for shared system resources.

use std::path::{Path, PathBuf};

/// Conventional directory for system-wide lock files.
pub const DEFAULT_LOCK_DIR: &str = "/var/lock";

/// Shorthand names for commonly shared resources.
pub const RESOURCES: &[&str] = &["cpu", "net"];

/// The lock path named on the command line, after shorthand expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockTarget {
    Resource { name: String, path: PathBuf },
    Literal(PathBuf),
}

impl LockTarget {
    pub fn path(&self) -> &Path {
        match self {
            LockTarget::Resource { path, .. } => path,
            LockTarget::Literal(path) => path,
        }
    }

    pub fn resource_name(&self) -> Option<&str> {
        match self {
            LockTarget::Resource { name, .. } => Some(name),
            LockTarget::Literal(_) => None,
        }
    }
}

pub fn is_resource(name: &str) -> bool {
    RESOURCES.contains(&name)
}

/// `<lock_dir>/loto.<resource>`
pub fn resource_lock_path(lock_dir: &Path, resource: &str) -> PathBuf {
    lock_dir.join(format!("{}.{resource}", crate::PROGRAM_NAME))
}

/// Expands a shorthand resource name; anything else is taken as a literal path.
pub fn resolve_lock_target(value: &str, lock_dir: &Path) -> LockTarget {
    if is_resource(value) {
        LockTarget::Resource {
            name: value.to_string(),
            path: resource_lock_path(lock_dir, value),
        }
    } else {
        LockTarget::Literal(PathBuf::from(value))
    }
}
