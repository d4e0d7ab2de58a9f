// Copyright (c) The cukeboard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logging setup and stdout handling for the command-line interface.

use clap::Args;
use std::{
    io::{self, BufWriter, Write},
    sync::Once,
};
use tracing_subscriber::EnvFilter;

static INIT_LOGGER: Once = Once::new();

#[derive(Copy, Clone, Debug, Args)]
#[must_use]
pub(crate) struct OutputOpts {
    /// Verbose output
    #[arg(long, short, global = true, env = "CUKEBOARD_VERBOSE")]
    pub(crate) verbose: bool,
}

impl OutputOpts {
    /// Initializes logging to stderr. `CUKEBOARD_LOG` overrides the level.
    pub(crate) fn init(self) {
        INIT_LOGGER.call_once(|| {
            let default_level = if self.verbose { "debug" } else { "info" };
            let filter = EnvFilter::try_from_env("CUKEBOARD_LOG")
                .unwrap_or_else(|_| EnvFilter::new(default_level));

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .without_time()
                .with_writer(io::stderr)
                .init();
        });
    }
}

/// Where subcommand output goes.
///
/// The default writer hands out buffered handles to the process stdout.
/// Tests build one with [`OutputWriter::test`] instead, which collects
/// everything into memory so assertions can read back what a command
/// printed. The capture field only exists under `#[cfg(test)]`, so the
/// shipped binary has a single, buffer-free code path.
#[derive(Debug, Default)]
pub struct OutputWriter {
    #[cfg(test)]
    capture: Option<Vec<u8>>,
}

impl OutputWriter {
    pub(crate) fn stdout_writer(&mut self) -> StdoutWriter<'_> {
        #[cfg(test)]
        if let Some(buffer) = &mut self.capture {
            return StdoutWriter { sink: Box::new(buffer) };
        }
        StdoutWriter {
            sink: Box::new(BufWriter::new(io::stdout())),
        }
    }
}

#[cfg(test)]
impl OutputWriter {
    pub(crate) fn test() -> Self {
        Self {
            capture: Some(Vec::new()),
        }
    }

    pub(crate) fn stdout(&self) -> &[u8] {
        self.capture.as_deref().unwrap_or(&[])
    }
}

/// A writing handle produced by [`OutputWriter::stdout_writer`], alive for
/// as long as the borrow on its parent.
pub(crate) struct StdoutWriter<'a> {
    sink: Box<dyn Write + 'a>,
}

impl Write for StdoutWriter<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.sink.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}
