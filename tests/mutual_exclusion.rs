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

mod common;

use common::{lock_is_free, loto, loto_path};
use serial_test::serial;
use std::process::Command;
use tempfile::TempDir;

#[test]
#[serial]
fn racing_invocations_never_overlap() {
    let temp = TempDir::new().unwrap();
    let lock = temp.path().join("job.lock");
    let marker = temp.path().join("running");
    let violations = temp.path().join("violations");
    let script = format!(
        "if [ -e '{marker}' ]; then echo overlap >> '{violations}'; fi; \
         touch '{marker}'; sleep 0.3; rm '{marker}'",
        marker = marker.display(),
        violations = violations.display()
    );

    let children: Vec<_> = (0..4)
        .map(|_| {
            Command::new(loto_path())
                .env_remove("RUST_LOG")
                .args(["-w", "-t", "60", "-L"])
                .arg(&lock)
                .args(["--", "sh", "-c", &script])
                .spawn()
                .unwrap()
        })
        .collect();

    for mut child in children {
        assert!(child.wait().unwrap().success());
    }
    assert!(!violations.exists(), "two children held the lock at once");
    assert!(!marker.exists());
}

#[cfg(target_os = "linux")]
#[test]
fn child_does_not_inherit_lock_descriptor() {
    let temp = TempDir::new().unwrap();
    let lock = temp.path().join("job.lock");

    let output = loto()
        .arg("-L")
        .arg(&lock)
        .args(["--", "sh", "-c", "for fd in /proc/$$/fd/*; do readlink \"$fd\"; done"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let descriptors = String::from_utf8_lossy(&output.stdout);
    assert!(
        !descriptors.contains("job.lock"),
        "child holds lock file descriptor: {descriptors}"
    );
}

#[test]
fn lock_is_exclusive_while_child_runs() {
    let temp = TempDir::new().unwrap();
    let lock = temp.path().join("job.lock");
    let nested = format!(
        "'{}' -L '{}' -- true; echo $?",
        loto_path().display(),
        lock.display()
    );

    // A nested invocation on the same path must be denied.
    let output = loto()
        .arg("-L")
        .arg(&lock)
        .args(["--", "sh", "-c", &nested])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "125");
    assert!(lock_is_free(&lock));
}
