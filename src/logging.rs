use std::{
    io::Write,
    sync::{Mutex, OnceLock},
};

use serde_json::Value;

use crate::error::ConvertError;

// Global JSON-lines sink for conversion logs.
static LOG_SINK: OnceLock<Mutex<Box<dyn Write + Send>>> = OnceLock::new();

/// ログレベル定義
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// Install a JSON-lines writer that receives every log record.
pub fn init_logging(sink: Box<dyn Write + Send>) {
    if LOG_SINK.set(Mutex::new(sink)).is_err() {
        eprintln!("Warning: Logging system already initialized");
    }
}

/// Build the structured record written to the JSON-lines sink.
pub fn log_record(level: LogLevel, message: &str) -> Value {
    serde_json::json!({
        "level": level.as_str(),
        "message": message,
        "timestamp": jiff::Zoned::now().to_string()
    })
}

/// Forward a log message to the `log` facade and the installed sink.
pub fn send_log(level: LogLevel, message: &str) {
    let log_level: log::Level = level.into();
    if log::log_enabled!(target: "meshport", log_level) {
        log::log!(target: "meshport", log_level, "{}", message);
    }

    match LOG_SINK.get() {
        Some(sink) => {
            let record = log_record(level, message);
            let Ok(mut writer) = sink.lock() else {
                eprintln!("Failed to send log message: sink poisoned");
                return;
            };
            if let Err(e) = writeln!(writer, "{}", record) {
                eprintln!("Failed to send log message: {}", e);
            }
        }
        None => {
            // Fallback to console when neither a sink nor a logger is listening
            if log::max_level() == log::LevelFilter::Off {
                eprintln!("[{}] {}", level.as_str().to_uppercase(), message);
            }
        }
    }
}

/// Log ConvertError with automatic error-level logging
pub fn log_convert_error(error: &ConvertError, context: Option<&str>) {
    let message = match context {
        Some(ctx) => format!("{}: {}", ctx, error),
        None => error.to_string(),
    };

    send_log(LogLevel::Error, &message);
}

/// Convenience macros for logging
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::logging::send_log($crate::logging::LogLevel::Debug, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logging::send_log($crate::logging::LogLevel::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logging::send_log($crate::logging::LogLevel::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logging::send_log($crate::logging::LogLevel::Error, &format!($($arg)*))
    };
}

/// Result extension for convenient error logging
pub trait ResultExt<T, E> {
    fn log_error(self, context: Option<&str>) -> Self;
}

impl<T> ResultExt<T, ConvertError> for Result<T, ConvertError> {
    fn log_error(self, context: Option<&str>) -> Self {
        if let Err(ref error) = self {
            log_convert_error(error, context);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_warn_level_when_building_record_then_fields_are_present() {
        let record = log_record(LogLevel::Warn, "joint index 12 is out of range");

        assert_eq!(record["level"], "warn");
        assert_eq!(record["message"], "joint index 12 is out of range");
        assert!(record["timestamp"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[test]
    fn given_log_levels_when_converting_then_facade_levels_match() {
        assert_eq!(log::Level::from(LogLevel::Debug), log::Level::Debug);
        assert_eq!(log::Level::from(LogLevel::Info), log::Level::Info);
        assert_eq!(log::Level::from(LogLevel::Warn), log::Level::Warn);
        assert_eq!(log::Level::from(LogLevel::Error), log::Level::Error);
    }

    #[test]
    fn given_failed_result_when_logging_error_then_result_is_unchanged() {
        let result: Result<(), ConvertError> = Err(ConvertError::NoSourceMesh("o1000".into()));
        let logged = result.clone().log_error(Some("convert"));
        assert_eq!(logged, result);
    }
}
