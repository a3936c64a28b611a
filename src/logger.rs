//! Logging with colored module prefixes.
//!
//! A [`Logger`] is an explicit value handed to whatever needs to log, so the
//! pipeline never reaches for process-wide state:
//!
//! - `log!` for `[module] message` lines
//! - `debug!` for lines shown only in verbose mode
//! - [`Logger::discard`] for callers that want silence (tests, library use)
//!
//! # Example
//!
//! ```ignore
//! let logger = Logger::stdout(verbose);
//! log!(logger; "feed"; "collected {} items", count);
//! debug!(logger; "filter"; "skipped {}", key);
//! ```

use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{self, Write},
    sync::Arc,
};

// ============================================================================
// Log Macros
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!(logger; "module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr; $module:expr; $($arg:tt)*) => {{
        $logger.log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only written when the logger is verbose)
///
/// # Usage
/// ```ignore
/// debug!(logger; "module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr; $module:expr; $($arg:tt)*) => {{
        if $logger.is_verbose() {
            $logger.log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Logger
// ============================================================================

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Cheaply cloneable handle to a shared log sink.
#[derive(Clone)]
pub struct Logger {
    sink: Option<Sink>,
    verbose: bool,
    color: bool,
}

impl Logger {
    /// Log to stdout with colored prefixes.
    pub fn stdout(verbose: bool) -> Self {
        Self {
            sink: Some(Arc::new(Mutex::new(Box::new(io::stdout())))),
            verbose,
            color: true,
        }
    }

    /// Log to an arbitrary writer, without colors.
    pub fn to_writer(writer: impl Write + Send + 'static, verbose: bool) -> Self {
        Self {
            sink: Some(Arc::new(Mutex::new(Box::new(writer)))),
            verbose,
            color: false,
        }
    }

    /// Drop every message.
    pub const fn discard() -> Self {
        Self {
            sink: None,
            verbose: false,
            color: false,
        }
    }

    /// Check if verbose mode is enabled
    pub const fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Write one `[module] message` line.
    pub fn log(&self, module: &str, message: &str) {
        let Some(sink) = &self.sink else { return };

        let prefix = if self.color {
            colorize_prefix(module)
        } else {
            format!("[{module}]")
        };

        let mut out = sink.lock();
        writeln!(out, "{prefix} {message}").ok();
        out.flush().ok();
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("enabled", &self.sink.is_some())
            .field("verbose", &self.verbose)
            .finish()
    }
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "feed" => prefix.bright_blue().bold().to_string(),
        "done" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
