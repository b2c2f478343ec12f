//! Per-run logger with console, file and callback output.
//!
//! Each conversion gets its own logger that:
//! - Emits every message as a `tracing` event
//! - Optionally mirrors messages to a log file
//! - Sends messages to a callback (if provided)

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

/// Per-run logger.
pub struct RunLogger {
    /// Run label for identification.
    run_name: String,
    /// Path to log file, if mirroring to disk.
    log_path: Option<PathBuf>,
    /// File writer (buffered).
    file_writer: Mutex<Option<BufWriter<File>>>,
    /// Callback for forwarding messages.
    callback: Mutex<Option<LogCallback>>,
    /// Logging configuration.
    config: LogConfig,
}

impl RunLogger {
    /// Create a new run logger.
    ///
    /// # Arguments
    /// * `run_name` - Label of the run (usually the input file name)
    /// * `config` - Logging configuration
    /// * `log_file` - Optional file to mirror messages to (truncated)
    /// * `callback` - Optional callback receiving every message
    pub fn new(
        run_name: impl Into<String>,
        config: LogConfig,
        log_file: Option<&Path>,
        callback: Option<LogCallback>,
    ) -> std::io::Result<Self> {
        let writer = match log_file {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent)?;
                    }
                }
                Some(BufWriter::new(File::create(path)?))
            }
            None => None,
        };

        Ok(Self {
            run_name: run_name.into(),
            log_path: log_file.map(Path::to_path_buf),
            file_writer: Mutex::new(writer),
            callback: Mutex::new(callback),
            config,
        })
    }

    /// Logger that only emits tracing events.
    pub fn console(run_name: impl Into<String>) -> Self {
        Self {
            run_name: run_name.into(),
            log_path: None,
            file_writer: Mutex::new(None),
            callback: Mutex::new(None),
            config: LogConfig::default(),
        }
    }

    /// Get the run name.
    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    /// Get the log file path.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }

        match level {
            LogLevel::Trace => tracing::trace!(run = %self.run_name, "{}", message),
            LogLevel::Debug => tracing::debug!(run = %self.run_name, "{}", message),
            LogLevel::Info => tracing::info!(run = %self.run_name, "{}", message),
            LogLevel::Warn => tracing::warn!(run = %self.run_name, "{}", message),
            LogLevel::Error => tracing::error!(run = %self.run_name, "{}", message),
        }

        let formatted = self.format_message(message);
        self.output(level, &formatted);
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a debug message.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Log a warning message.
    pub fn warn(&self, message: &str) {
        let msg = MessagePrefix::Warning.format(message);
        self.log(LogLevel::Warn, &msg);
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        let msg = MessagePrefix::Error.format(message);
        self.log(LogLevel::Error, &msg);
    }

    /// Log a command being executed.
    pub fn command(&self, command: &str) {
        let msg = MessagePrefix::Command.format(command);
        self.log(LogLevel::Debug, &msg);
    }

    /// Log a phase marker.
    pub fn phase(&self, phase_name: &str) {
        let msg = MessagePrefix::Phase.format(phase_name);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a success message.
    pub fn success(&self, message: &str) {
        let msg = MessagePrefix::Success.format(message);
        self.log(LogLevel::Info, &msg);
    }

    /// Log captured output of an external tool, one entry per line.
    pub fn tool_output(&self, tool: &str, output: &str) {
        for line in output.lines().filter(|l| !l.trim().is_empty()) {
            self.log(LogLevel::Debug, &format!("[{}] {}", tool, line));
        }
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the logger and release resources.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    /// Format a message with timestamp (if enabled).
    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S");
            format!("[{}] {}", timestamp, message)
        } else {
            message.to_string()
        }
    }

    /// Output a formatted message to file and callback.
    fn output(&self, level: LogLevel, formatted: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", formatted);
        }

        if let Some(ref callback) = *self.callback.lock() {
            callback(level, formatted);
        }
    }
}

impl Drop for RunLogger {
    fn drop(&mut self) {
        self.close();
    }
}
