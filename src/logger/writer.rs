//! Log writer module
//!
//! Provides thread-safe log writing to files or stdout/stderr, filtered by
//! the configured level.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::OnceLock;

use super::LogLevel;

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    /// Write to stdout
    Stdout,
    /// Write to stderr
    Stderr,
    /// Write to file
    File(Mutex<File>),
}

/// Options the writer is built from
#[derive(Debug, Clone, Default)]
pub struct WriterOptions<'a> {
    pub level: LogLevel,
    pub access_log: bool,
    pub access_log_format: &'a str,
    pub access_log_file: Option<&'a str>,
    pub error_log_file: Option<&'a str>,
}

/// Thread-safe log writer
pub struct LogWriter {
    /// Access and info log target
    access: LogTarget,
    /// Error and warning log target
    error: LogTarget,
    level: LogLevel,
    access_log: bool,
    access_log_format: String,
}

impl LogWriter {
    /// Create a new log writer with optional file paths
    fn new(options: &WriterOptions<'_>) -> io::Result<Self> {
        let access = match options.access_log_file {
            Some(path) => LogTarget::File(Mutex::new(open_log_file(path)?)),
            None => LogTarget::Stdout,
        };

        let error = match options.error_log_file {
            Some(path) => LogTarget::File(Mutex::new(open_log_file(path)?)),
            None => LogTarget::Stderr,
        };

        Ok(Self {
            access,
            error,
            level: options.level,
            access_log: options.access_log,
            access_log_format: options.access_log_format.to_string(),
        })
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.access_log
    }

    pub fn access_log_format(&self) -> &str {
        &self.access_log_format
    }

    /// Write to access log
    pub fn write_access(&self, message: &str) {
        if self.access_log {
            write_to_target(&self.access, message);
        }
    }

    /// Write to error log if `level` is enabled
    pub fn write_error(&self, level: LogLevel, message: &str) {
        if self.level.enables(level) {
            write_to_target(&self.error, message);
        }
    }

    /// Write info message (to access log target) if `level` is enabled
    pub fn write_info(&self, level: LogLevel, message: &str) {
        if self.level.enables(level) {
            write_to_target(&self.access, message);
        }
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Write message to log target
fn write_to_target(target: &LogTarget, message: &str) {
    match target {
        LogTarget::Stdout => {
            println!("{message}");
        }
        LogTarget::Stderr => {
            eprintln!("{message}");
        }
        LogTarget::File(file) => {
            let _ = writeln!(file.lock(), "{message}");
        }
    }
}

/// Initialize the global log writer
///
/// This should be called once at application startup.
/// Returns error if log files cannot be opened.
pub fn init(options: &WriterOptions<'_>) -> io::Result<()> {
    let writer = LogWriter::new(options)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, if `init()` has been called
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_target_appends_lines() {
        let dir = std::env::temp_dir().join(format!("pathmux-log-{}", std::process::id()));
        let path = dir.join("access.log");
        let path_str = path.to_str().unwrap();

        let writer = LogWriter::new(&WriterOptions {
            level: LogLevel::Info,
            access_log: true,
            access_log_format: "text",
            access_log_file: Some(path_str),
            error_log_file: None,
        })
        .unwrap();
        writer.write_access("first");
        writer.write_info(LogLevel::Debug, "filtered out");
        writer.write_info(LogLevel::Info, "second");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_access_log_can_be_disabled() {
        let dir = std::env::temp_dir().join(format!("pathmux-noaccess-{}", std::process::id()));
        let path = dir.join("access.log");

        let writer = LogWriter::new(&WriterOptions {
            level: LogLevel::Debug,
            access_log: false,
            access_log_format: "json",
            access_log_file: path.to_str(),
            error_log_file: None,
        })
        .unwrap();
        writer.write_access("dropped");
        assert_eq!(writer.access_log_format(), "json");
        assert!(!writer.access_log_enabled());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.is_empty());
        std::fs::remove_dir_all(dir).unwrap();
    }
}
