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
use log::debug;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Chatty, human-readable progress lines on the informational stream.
///
/// Lines are prefixed with the program name and only emitted in chatty mode.
#[derive(Clone)]
pub struct StatusReporter {
    verbosity: Verbosity,
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl StatusReporter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self::with_writer(verbosity, Box::new(io::stdout()))
    }

    /// Creates a reporter writing to the provided sink (primarily for tests).
    pub fn with_writer(verbosity: Verbosity, writer: Box<dyn Write + Send>) -> Self {
        Self {
            verbosity,
            sink: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn is_chatty(&self) -> bool {
        self.verbosity.is_chatty()
    }

    pub fn info(&self, message: &str) {
        if !self.is_chatty() {
            return;
        }

        if let Ok(mut sink) = self.sink.lock()
            && let Err(err) = writeln!(sink, "{}: {message}", crate::PROGRAM_NAME)
        {
            debug!("Failed to write status line: {err}");
        }
    }

    /// Pushes buffered lines out before another process writes to the same stream.
    pub fn flush(&self) -> io::Result<()> {
        match self.sink.lock() {
            Ok(mut sink) => sink.flush(),
            Err(_) => Ok(()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    /// In-memory writer whose contents can be inspected after the reporter is done.
    #[derive(Clone, Default)]
    pub struct SharedBuffer {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl SharedBuffer {
        pub fn contents(&self) -> String {
            String::from_utf8(self.inner.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.inner.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::SharedBuffer;
    use super::*;

    #[test]
    fn chatty_reporter_prefixes_lines() {
        let buffer = SharedBuffer::default();
        let reporter = StatusReporter::with_writer(Verbosity::Chatty, Box::new(buffer.clone()));
        reporter.info("Waiting for child process 42");
        reporter.flush().unwrap();
        assert_eq!(buffer.contents(), "loto: Waiting for child process 42\n");
    }

    #[test]
    fn normal_and_quiet_reporters_stay_silent() {
        for verbosity in [Verbosity::Normal, Verbosity::Quiet] {
            let buffer = SharedBuffer::default();
            let reporter = StatusReporter::with_writer(verbosity, Box::new(buffer.clone()));
            reporter.info("should not appear");
            assert!(buffer.contents().is_empty());
        }
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn write_failures_do_not_abort_reporting() {
        let reporter = StatusReporter::with_writer(Verbosity::Chatty, Box::new(ClosedPipe));
        reporter.info("first");
        reporter.info("second");
        assert!(reporter.flush().is_err());
    }
}
