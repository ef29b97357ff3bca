//! # Logging Utilities
//!
//! Logging setup for the linemap tools using `tracing`.
//!
//! Logs go to stderr so tool output on stdout stays clean, and optionally to a
//! daily-rolled file as well. Two formats are supported:
//! - `pretty`: human-readable, ANSI-colored on the console (default)
//! - `json`: one JSON object per event, for log collectors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use linemap_utils::init_logging;
//!
//! // Keep the guard alive until exit, or buffered file output is lost
//! let _guard = init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Retrieved 42 symbols");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Filter directives (e.g., `RUST_LOG=debug`, `RUST_LOG=linemap_core=trace`)
//! - `LINEMAP_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
//! - `LINEMAP_LOG_FILE`: Optional log file. If it names a directory, a dated
//!   `YYYY-MM-DD-linemap.log` is created inside it.
//!
//! An explicit level (from `--log-level`) overrides `RUST_LOG`.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use chrono::Utc;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format.
pub const FORMAT_ENV: &str = "LINEMAP_LOG_FORMAT";

/// Environment variable naming a log file or directory.
pub const FILE_ENV: &str = "LINEMAP_LOG_FILE";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format
    #[default]
    Pretty,
    /// JSON format
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(s.to_string())),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    Error,
    Warn,
    /// Default: build summaries and failures
    Info,
    /// Per-module resolver misses and store decisions
    Debug,
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(s.to_string())),
        }
    }
}

/// Where and how to log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingConfig
{
    /// Overrides `RUST_LOG` when set.
    pub level: Option<LogLevel>,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl LoggingConfig
{
    /// Read `LINEMAP_LOG_FORMAT` and `LINEMAP_LOG_FILE`.
    ///
    /// An unparsable format falls back to `pretty`.
    #[must_use]
    pub fn from_env() -> Self
    {
        let format = env::var(FORMAT_ENV)
            .ok()
            .and_then(|s| LogFormat::from_str(&s).ok())
            .unwrap_or_default();
        let file = env::var_os(FILE_ENV).filter(|s| !s.is_empty()).map(PathBuf::from);

        Self {
            level: None,
            format,
            file,
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Option<LogLevel>) -> Self
    {
        if level.is_some() {
            self.level = level;
        }
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: Option<LogFormat>) -> Self
    {
        if let Some(format) = format {
            self.format = format;
        }
        self
    }

    /// Filter priority: explicit level, then `RUST_LOG`, then `info`.
    fn filter(&self) -> EnvFilter
    {
        match self.level {
            Some(level) => EnvFilter::new(Level::from(level).to_string()),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string())),
        }
    }
}

/// Keeps the background file writer alive; dropping it flushes pending lines.
#[derive(Debug)]
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard
{
    _file: Option<WorkerGuard>,
}

/// Initialize logging from the environment
///
/// ## Errors
///
/// See [`init_logging_with_config`].
pub fn init_logging() -> Result<LoggingGuard, LoggingError>
{
    init_logging_with_config(&LoggingConfig::from_env())
}

/// Initialize logging with an explicit level and format
///
/// `LINEMAP_LOG_FILE` is still honored.
///
/// ```rust,no_run
/// use linemap_utils::{init_logging_with_level, LogFormat, LogLevel};
///
/// let _guard = init_logging_with_level(LogLevel::Debug, LogFormat::Json).expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// See [`init_logging_with_config`].
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<LoggingGuard, LoggingError>
{
    let config = LoggingConfig::from_env()
        .with_level(Some(level))
        .with_format(Some(format));
    init_logging_with_config(&config)
}

/// Install the global subscriber described by `config`
///
/// ## Errors
///
/// Returns [`LoggingError::FileError`] if the log directory cannot be created
/// and [`LoggingError::InitializationFailed`] if a global subscriber is
/// already installed.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError>
{
    let mut layers: Vec<BoxedLayer> = vec![console_layer(config.format)];

    let guard = match &config.file {
        Some(path) => {
            let (directory, file_name) = resolve_log_file(path)?;
            std::fs::create_dir_all(&directory)?;
            let appender = tracing_appender::rolling::daily(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(file_layer(config.format, writer));
            Some(guard)
        }
        None => None,
    };

    Registry::default()
        .with(layers)
        .with(config.filter())
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;

    Ok(LoggingGuard { _file: guard })
}

/// Split a configured log path into the appender's directory and file name.
fn resolve_log_file(path: &Path) -> Result<(PathBuf, String), LoggingError>
{
    if path.is_dir() || path.as_os_str().to_string_lossy().ends_with(['/', '\\']) {
        return Ok((path.to_path_buf(), dated_file_name()));
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| LoggingError::InvalidFile(path.display().to_string()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((directory, file_name))
}

fn dated_file_name() -> String
{
    format!("{}-linemap.log", Utc::now().format("%Y-%m-%d"))
}

fn console_layer(format: LogFormat) -> BoxedLayer
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(true)
            .with_writer(io::stderr)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_writer(io::stderr)
            .boxed(),
    }
}

fn file_layer(format: LogFormat, writer: NonBlocking) -> BoxedLayer
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false) // No ANSI in files
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    }
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    #[error("Unknown log format: {0}. Use 'pretty' or 'json'")]
    InvalidFormat(String),

    #[error("Unknown log level: {0}. Use 'error', 'warn', 'info', 'debug', or 'trace'")]
    InvalidLevel(String),

    #[error("Invalid log file path: {0}")]
    InvalidFile(String),

    /// A global subscriber is already installed
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
