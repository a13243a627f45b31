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

use clap::Parser;
use loto::commands::run::RunCommand;
use loto::config::{CliOptions, LotoConfig, LotoSettings, Verbosity};
use loto::error::{
    LotoError, WRAPPER_FAILURE, format_error_chain, format_error_with_color, get_exit_code,
};
use loto::locking::{LockTimeoutValue, parse_timeout_override};
use loto::logging;
use std::ffi::OsString;
use std::io::IsTerminal;

#[derive(Parser)]
#[command(name = "loto")]
#[command(
    author,
    version,
    about = "Run a command while holding an exclusive lock on a file",
    long_about = "Run a command while holding an exclusive lock on a file

The lock is an advisory flock(2) on the given path, created if missing. The
shorthand names \"cpu\" and \"net\" refer to /var/lock/loto.cpu and
/var/lock/loto.net (directory overridable with LOTO_LOCK_DIR).

Examples:
  loto -L cpu -- make -j8
  loto -L /tmp/backup.lock -w -t 600 -- ./backup.sh
  loto -q -L net -- ./fetch-feeds   # silently skip if already running"
)]
struct Cli {
    /// Lock file path, or a shorthand resource (cpu, net)
    #[arg(short = 'L', long = "lock", value_name = "PATH")]
    lock: Vec<String>,

    /// Wait for the lock instead of failing immediately
    #[arg(short, long)]
    wait: bool,

    /// Give up waiting after this many seconds (implies --wait; 0 or "infinite" waits forever)
    #[arg(short, long, value_name = "SECONDS", value_parser = parse_timeout_override)]
    timeout: Option<LockTimeoutValue>,

    /// Report progress on stdout (repeat for more log detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Exit 0 without running the command when the lock is unavailable
    #[arg(short, long)]
    quiet: bool,

    /// Command to run while the lock is held
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    command: Vec<OsString>,
}

impl From<Cli> for CliOptions {
    fn from(cli: Cli) -> Self {
        CliOptions {
            locks: cli.lock,
            wait: cli.wait,
            timeout: cli.timeout,
            quiet: cli.quiet,
            verbose: cli.verbose,
            command: cli.command,
        }
    }
}

fn report_error(error: &LotoError) {
    if std::io::stderr().is_terminal() {
        eprintln!("{}", format_error_with_color(error, true));
    } else {
        eprintln!("{}", format_error_chain(error));
    }
}

fn main() {
    let cli = Cli::parse();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);

    logging::setup_logger(verbosity, cli.verbose);

    let config = match LotoConfig::from_options(cli.into(), &LotoSettings::from_env()) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e);
            std::process::exit(WRAPPER_FAILURE);
        }
    };

    let result = RunCommand::new(&config).and_then(|command| command.execute());

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) if verbosity.is_quiet() && e.is_contention() => {
            log::debug!("Lock unavailable in quiet mode: {e}");
            std::process::exit(0);
        }
        Err(e) => {
            report_error(&e);
            std::process::exit(get_exit_code(&e));
        }
    }
}
