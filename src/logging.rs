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

use crate::config::Verbosity;

/// Initialize the logger with the specified verbosity level
///
/// `RUST_LOG` takes precedence when set.
///
/// # Arguments
/// * `verbosity` - Quiet mode keeps only errors
/// * `verbose` - Number of `-v` flags (1=warn, 2=info, 3=debug, 4+=trace)
pub fn setup_logger(verbosity: Verbosity, verbose: u8) {
    let env_filter = default_filter(verbosity, verbose);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(env_filter))
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();
}

fn default_filter(verbosity: Verbosity, verbose: u8) -> &'static str {
    if verbosity.is_quiet() {
        return "loto=error";
    }
    match verbose {
        0 | 1 => "loto=warn",
        2 => "loto=info",
        3 => "loto=debug",
        _ => "loto=trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_overrides_verbose_count() {
        assert_eq!(default_filter(Verbosity::Quiet, 3), "loto=error");
    }

    #[test]
    fn verbose_count_raises_level() {
        assert_eq!(default_filter(Verbosity::Normal, 0), "loto=warn");
        assert_eq!(default_filter(Verbosity::Chatty, 1), "loto=warn");
        assert_eq!(default_filter(Verbosity::Chatty, 2), "loto=info");
        assert_eq!(default_filter(Verbosity::Chatty, 3), "loto=debug");
        assert_eq!(default_filter(Verbosity::Chatty, 9), "loto=trace");
    }
}
