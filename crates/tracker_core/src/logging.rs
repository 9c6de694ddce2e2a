//! Process-wide logging bootstrap.
//!
//! # Responsibility
//! - Start one `flexi_logger` backend per process, writing either to stderr
//!   or to size-rotated files under an absolute directory.
//! - Read logging settings from `TRACKER_LOG_LEVEL` / `TRACKER_LOG_DIR`.
//!
//! # Invariants
//! - Repeating init with the same settings is a no-op.
//! - Init with different settings after a successful start is rejected.
//! - Init never panics.
//! - Events are `key=value` lines carrying ids and counts, never user text.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable holding the log level.
pub const LOG_LEVEL_ENV: &str = "TRACKER_LOG_LEVEL";
/// Environment variable holding the absolute log directory.
pub const LOG_DIR_ENV: &str = "TRACKER_LOG_DIR";

const LOG_FILE_BASENAME: &str = "tracker";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    config: LogConfig,
    _handle: LoggerHandle,
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Rotated files named `tracker*.log` inside this absolute directory.
    Directory(PathBuf),
}

/// Normalized logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: &'static str,
    pub target: LogTarget,
}

impl LogConfig {
    /// Builds settings from raw level and optional directory strings.
    ///
    /// # Errors
    /// - Unknown level names.
    /// - A blank or relative directory.
    pub fn new(level: &str, log_dir: Option<&str>) -> Result<Self, LoggingError> {
        let level = normalize_level(level)?;
        let target = match log_dir {
            Some(dir) => LogTarget::Directory(normalize_log_dir(dir)?),
            None => LogTarget::Stderr,
        };
        Ok(Self { level, target })
    }

    /// Reads settings from the process environment.
    ///
    /// A missing level falls back to [`default_log_level`]; a missing
    /// directory logs to stderr.
    pub fn from_env() -> Result<Self, LoggingError> {
        let level = std::env::var(LOG_LEVEL_ENV).ok();
        let log_dir = std::env::var(LOG_DIR_ENV).ok();
        Self::new(
            level.as_deref().unwrap_or(default_log_level()),
            log_dir.as_deref(),
        )
    }
}

/// Logging bootstrap failures.
#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidDirectory(String),
    CreateDirectory { path: PathBuf, source: std::io::Error },
    Backend(FlexiLoggerError),
    /// A logger with different settings is already running.
    AlreadyInitialized { active: LogConfig },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDirectory(message) => write!(f, "invalid log directory: {message}"),
            Self::CreateDirectory { path, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                path.display()
            ),
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
            Self::AlreadyInitialized { active } => write!(
                f,
                "logging already initialized with level `{}` and target {:?}",
                active.level, active.target
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FlexiLoggerError> for LoggingError {
    fn from(value: FlexiLoggerError) -> Self {
        Self::Backend(value)
    }
}

/// Starts the process logger.
///
/// # Errors
/// - [`LoggingError::AlreadyInitialized`] when a logger with other settings
///   is running.
/// - Directory creation or backend failures.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let active = ACTIVE.get_or_try_init(|| start_logger(config))?;
    if &active.config != config {
        return Err(LoggingError::AlreadyInitialized {
            active: active.config.clone(),
        });
    }
    Ok(())
}

/// Returns the settings of the running logger, if any.
pub fn logging_status() -> Option<LogConfig> {
    ACTIVE.get().map(|active| active.config.clone())
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(config: &LogConfig) -> Result<ActiveLogger, LoggingError> {
    let logger = Logger::try_with_str(config.level)?;
    let handle = match &config.target {
        LogTarget::Stderr => logger
            .log_to_stderr()
            .format(flexi_logger::default_format)
            .start()?,
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDirectory {
                path: dir.clone(),
                source,
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
                .start()?
        }
    };

    install_panic_hook_once();
    info!(
        "event=logging_init module=core status=ok level={} target={} version={}",
        config.level,
        match config.target {
            LogTarget::Stderr => "stderr",
            LogTarget::Directory(_) => "file",
        },
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        config: config.clone(),
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

fn normalize_log_dir(log_dir: &str) -> Result<PathBuf, LoggingError> {
    let trimmed = log_dir.trim();
    if trimmed.is_empty() {
        return Err(LoggingError::InvalidDirectory(
            "path cannot be empty".to_string(),
        ));
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(LoggingError::InvalidDirectory(format!(
            "path must be absolute, got `{trimmed}`"
        )));
    }
    Ok(path.to_path_buf())
}

fn install_panic_hook_once() {
    PANIC_HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()))
                .unwrap_or_else(|| "unknown".to_string());
            let payload = panic_info
                .payload()
                .downcast_ref::<&str>()
                .map(|message| (*message).to_string())
                .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            error!(
                "event=panic module=core status=error location={} payload={}",
                location,
                single_line(&payload, MAX_PANIC_PAYLOAD_CHARS)
            );
            previous(panic_info);
        }));
    });
}

/// Flattens newlines and caps length at `max_chars`.
fn single_line(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    let mut capped: String = flattened.chars().take(max_chars).collect();
    if flattened.chars().count() > max_chars {
        capped.push_str("...");
    }
    capped
}

#[cfg(test)]
mod tests {
    use super::{
        default_log_level, init_logging, logging_status, single_line, LogConfig, LogTarget,
        LoggingError, LOG_DIR_ENV, LOG_LEVEL_ENV,
    };
    use std::path::PathBuf;

    #[test]
    fn config_normalizes_level_and_defaults_to_stderr() {
        let config = LogConfig::new(" Warning ", None).unwrap();
        assert_eq!(config.level, "warn");
        assert_eq!(config.target, LogTarget::Stderr);
    }

    #[test]
    fn config_from_env_reads_level_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        let dir_text = dir.path().to_str().unwrap().to_string();
        std::env::set_var(LOG_LEVEL_ENV, " ERROR ");
        std::env::set_var(LOG_DIR_ENV, &dir_text);
        let from_vars = LogConfig::from_env();

        std::env::remove_var(LOG_LEVEL_ENV);
        std::env::remove_var(LOG_DIR_ENV);
        let defaults = LogConfig::from_env();

        let from_vars = from_vars.unwrap();
        assert_eq!(from_vars.level, "error");
        assert_eq!(from_vars.target, LogTarget::Directory(PathBuf::from(dir_text)));

        let defaults = defaults.unwrap();
        assert_eq!(defaults.level, default_log_level());
        assert_eq!(defaults.target, LogTarget::Stderr);
    }

    #[test]
    fn config_rejects_unknown_level_and_relative_dir() {
        assert!(matches!(
            LogConfig::new("loud", None),
            Err(LoggingError::UnsupportedLevel(level)) if level == "loud"
        ));
        assert!(matches!(
            LogConfig::new("info", Some("logs/dev")),
            Err(LoggingError::InvalidDirectory(_))
        ));
        assert!(matches!(
            LogConfig::new("info", Some("   ")),
            Err(LoggingError::InvalidDirectory(_))
        ));
    }

    #[test]
    fn single_line_flattens_and_caps() {
        let flattened = single_line("line1\nline2\rline3", 8);
        assert_eq!(flattened, "line1 li...");
        assert_eq!(single_line("short", 8), "short");
    }

    #[test]
    fn init_is_idempotent_and_rejects_other_settings() {
        let dir = tempfile::tempdir().unwrap();
        let dir_text = dir.path().to_str().unwrap().to_string();
        let config = LogConfig::new("info", Some(&dir_text)).unwrap();

        init_logging(&config).unwrap();
        init_logging(&config).unwrap();

        let other_level = LogConfig::new("debug", Some(&dir_text)).unwrap();
        assert!(matches!(
            init_logging(&other_level),
            Err(LoggingError::AlreadyInitialized { .. })
        ));
        let to_stderr = LogConfig::new("info", None).unwrap();
        assert!(matches!(
            init_logging(&to_stderr),
            Err(LoggingError::AlreadyInitialized { .. })
        ));

        let active = logging_status().unwrap();
        assert_eq!(active.target, LogTarget::Directory(PathBuf::from(dir_text)));
    }
}
