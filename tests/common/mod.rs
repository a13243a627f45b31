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

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub fn loto() -> Command {
    let mut cmd = Command::cargo_bin("loto").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("LOTO_LOCK_DIR");
    cmd
}

pub fn loto_path() -> PathBuf {
    assert_cmd::cargo::cargo_bin("loto")
}

/// Takes the lock on `path` the same way another cooperating process would.
pub fn hold_lock(path: &Path) -> File {
    let file = File::create(path).unwrap();
    file.try_lock().unwrap();
    file
}

/// Returns true if nobody holds the lock on `path`.
pub fn lock_is_free(path: &Path) -> bool {
    let file = File::open(path).unwrap();
    let free = file.try_lock().is_ok();
    if free {
        file.unlock().unwrap();
    }
    free
}

/// Holds the lock on `path` for `duration` from a background thread.
///
/// Returns once the lock is actually held.
pub fn hold_lock_for(path: &Path, duration: Duration) -> JoinHandle<()> {
    let path = path.to_path_buf();
    let (ready_tx, ready_rx) = mpsc::channel();
    let holder = thread::spawn(move || {
        let file = hold_lock(&path);
        ready_tx.send(()).unwrap();
        thread::sleep(duration);
        drop(file);
    });
    ready_rx.recv().unwrap();
    holder
}
