//! Logging bootstrap.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend once per process, either as rolling
//!   files in a log directory or on stderr.
//! - Record panics as single-line error events.
//!
//! # Invariants
//! - Repeating `init_logging` with the same settings is a no-op.
//! - A second call with a different level or destination is rejected.
//! - Initialization never panics.

use crate::config::LoggingConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use thiserror::Error;

const LOG_FILE_BASENAME: &str = "shopdesk";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    log_dir: Option<PathBuf>,
    _handle: LoggerHandle,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoggingError {
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error")]
    UnsupportedLevel(String),
    #[error("log directory must be an absolute path, got `{}`", .0.display())]
    RelativeLogDir(PathBuf),
    #[error("failed to create log directory `{}`: {message}", path.display())]
    CreateDir { path: PathBuf, message: String },
    #[error("failed to start logger: {0}")]
    Backend(String),
    #[error("logging already initialized with {active}; refusing to switch to {requested}")]
    Conflict { active: String, requested: String },
}

/// Initializes process logging from `config`.
///
/// # Errors
/// - Unsupported level or relative log directory.
/// - Log directory creation or backend start failure.
/// - A conflicting configuration after a successful first call.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let level = normalize_level(&config.level)?;
    if let Some(dir) = &config.log_dir {
        if !dir.is_absolute() {
            return Err(LoggingError::RelativeLogDir(dir.clone()));
        }
    }

    let state = LOGGING_STATE.get_or_try_init(|| start_backend(level, config.log_dir.clone()))?;
    if state.level != level || state.log_dir != config.log_dir {
        return Err(LoggingError::Conflict {
            active: describe(state.level, state.log_dir.as_ref()),
            requested: describe(level, config.log_dir.as_ref()),
        });
    }
    Ok(())
}

/// Returns `(level, log_dir)` once logging is active.
pub fn logging_status() -> Option<(&'static str, Option<PathBuf>)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_backend(level: &'static str, log_dir: Option<PathBuf>) -> Result<LoggingState, LoggingError> {
    let logger =
        Logger::try_with_str(level).map_err(|err| LoggingError::Backend(err.to_string()))?;

    let logger = match &log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| LoggingError::CreateDir {
                path: dir.clone(),
                message: err.to_string(),
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
        }
        None => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::default_format),
    };

    let handle = logger
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;
    install_panic_hook();

    info!(
        "event=app_start module=core status=ok platform={} version={} level={} sink={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        level,
        log_dir
            .as_ref()
            .map_or_else(|| "stderr".to_string(), |dir| dir.display().to_string())
    );

    Ok(LoggingState {
        level,
        log_dir,
        _handle: handle,
    })
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}

fn describe(level: &str, log_dir: Option<&PathBuf>) -> String {
    match log_dir {
        Some(dir) => format!("level `{level}` at `{}`", dir.display()),
        None => format!("level `{level}` on stderr"),
    }
}

// Runs inside `get_or_try_init`, so at most once per process.
fn install_panic_hook() {
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = if let Some(message) = panic_info.payload().downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = panic_info.payload().downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };
        error!(
            "event=panic_captured module=core status=error location={location} payload={}",
            single_line(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous_hook(panic_info);
    }));
}

fn single_line(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    let mut truncated: String = flattened.chars().take(max_chars).collect();
    if flattened.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, normalize_level, single_line, LoggingError};
    use crate::config::LoggingConfig;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(suffix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "shopdesk-logging-{suffix}-{}-{nanos}",
            std::process::id()
        ))
    }

    #[test]
    fn normalize_level_accepts_aliases_and_case() {
        assert_eq!(normalize_level("INFO"), Ok("info"));
        assert_eq!(normalize_level(" warning "), Ok("warn"));
        assert!(matches!(
            normalize_level("verbose"),
            Err(LoggingError::UnsupportedLevel(_))
        ));
    }

    #[test]
    fn relative_log_dir_is_rejected_before_start() {
        let config = LoggingConfig {
            level: "info".to_string(),
            log_dir: Some(PathBuf::from("logs/dev")),
        };
        assert!(matches!(
            init_logging(&config),
            Err(LoggingError::RelativeLogDir(_))
        ));
    }

    #[test]
    fn single_line_flattens_and_truncates() {
        let line = single_line("one\ntwo\rthree", 8);
        assert!(!line.contains('\n'));
        assert!(!line.contains('\r'));
        assert!(line.ends_with("..."));
    }

    #[test]
    fn init_is_idempotent_and_rejects_conflicts() {
        let dir = unique_temp_dir("idempotent");
        let config = LoggingConfig {
            level: "info".to_string(),
            log_dir: Some(dir.clone()),
        };

        init_logging(&config).unwrap();
        init_logging(&config).unwrap();

        let louder = LoggingConfig {
            level: "debug".to_string(),
            ..config.clone()
        };
        assert!(matches!(
            init_logging(&louder),
            Err(LoggingError::Conflict { .. })
        ));
        assert!(matches!(
            init_logging(&LoggingConfig {
                level: "info".to_string(),
                log_dir: None,
            }),
            Err(LoggingError::Conflict { .. })
        ));

        let (level, log_dir) = logging_status().unwrap();
        assert_eq!(level, "info");
        assert_eq!(log_dir, Some(dir));
    }
}
