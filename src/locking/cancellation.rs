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

//! SIGINT/SIGTERM handling while a lock wait is pending.
//!
//! During the wait the signals only raise a flag so the retry sleep can end
//! early and the wait can be abandoned cleanly. Once the lock is held,
//! [`restore_default_signal_behavior`] makes both signals run their default
//! action again; nothing is forwarded to the child.

use log::warn;
use signal_hook::SigId;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::flag;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Token used to observe cancellation signals triggered by the user.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn from_shared(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Marks the token as cancelled. Intended for internal use and tests.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct CancellationRegistry {
    cancelled: Arc<AtomicBool>,
    passthrough: Arc<AtomicBool>,
    _handles: Vec<SigId>,
}

impl CancellationRegistry {
    fn new() -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let passthrough = Arc::new(AtomicBool::new(false));
        let mut handles = Vec::new();

        for signal in [SIGINT, SIGTERM] {
            // Registered first so the default action wins once passthrough is set.
            #[cfg(unix)]
            {
                match flag::register_conditional_default(signal, passthrough.clone()) {
                    Ok(handle) => handles.push(handle),
                    Err(err) => {
                        warn!("Failed to register default handler for signal {signal}: {err}")
                    }
                }
            }

            match flag::register(signal, cancelled.clone()) {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    warn!("Failed to register cancellation handler for signal {signal}: {err}")
                }
            }
        }

        Self {
            cancelled,
            passthrough,
            _handles: handles,
        }
    }

    fn token(&self) -> CancellationToken {
        CancellationToken::from_shared(self.cancelled.clone())
    }
}

static GLOBAL_REGISTRY: OnceLock<CancellationRegistry> = OnceLock::new();

/// Returns a cancellation token backed by global signal handlers.
pub fn global_token() -> CancellationToken {
    GLOBAL_REGISTRY
        .get_or_init(CancellationRegistry::new)
        .token()
}

/// Lets SIGINT/SIGTERM terminate the process as if no handler were installed.
pub fn restore_default_signal_behavior() {
    if let Some(registry) = GLOBAL_REGISTRY.get() {
        registry.passthrough.store(true, Ordering::SeqCst);
    }
}
