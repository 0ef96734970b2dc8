//! Logging and metrics setup.
//!
//! Installs a `tracing-subscriber` registry with an [`EnvFilter`] and a single
//! fmt layer. Counters and histograms go through the `metrics` facade; without
//! an installed recorder they are no-ops.

use crate::config::LoggingSettings;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding a filter directive.
pub const LOG_ENV: &str = "AMEM_LOG";

static OBSERVABILITY_INIT: OnceLock<()> = OnceLock::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive passed to [`EnvFilter`].
    pub directive: String,
    /// Output format.
    pub format: LogFormat,
    /// Append to this file instead of writing to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directive: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Resolves the filter directive from, in order: `AMEM_LOG`, `--verbose`
    /// (`debug`), the configured level, then `info`.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        let env_directive = std::env::var(LOG_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());
        Self::resolve(settings, verbose, env_directive)
    }

    fn resolve(settings: &LoggingSettings, verbose: bool, env_directive: Option<String>) -> Self {
        let directive = env_directive
            .or_else(|| verbose.then(|| "debug".to_string()))
            .or_else(|| settings.level.clone())
            .unwrap_or_else(|| "info".to_string());
        Self {
            directive,
            format: settings.format,
            file: settings.file.clone(),
        }
    }

    /// Sets the output format.
    #[must_use]
    pub const fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the log file.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    fn filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.directive).map_err(|e| {
            Error::InvalidInput(format!("invalid log filter '{}': {e}", self.directive))
        })
    }
}

/// Installs the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if logging has already been initialized, the filter
/// directive is invalid, or the log file cannot be opened.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if OBSERVABILITY_INIT.get().is_some() {
        return Err(Error::failed(
            "observability_init",
            "observability already initialized",
        ));
    }

    let filter = config.filter()?;

    match (&config.file, config.format) {
        (Some(log_file), LogFormat::Json) => {
            let writer = open_log_file(log_file)?;
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_target(true),
                )
                .with(filter)
                .try_init()
                .map_err(init_error)?;
        },
        (Some(log_file), LogFormat::Pretty) => {
            let writer = open_log_file(log_file)?;
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_target(true),
                )
                .with(filter)
                .try_init()
                .map_err(init_error)?;
        },
        (None, LogFormat::Json) => {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(io::stderr)
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_target(true),
                )
                .with(filter)
                .try_init()
                .map_err(init_error)?;
        },
        (None, LogFormat::Pretty) => {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_writer(io::stderr)
                        .with_target(true),
                )
                .with(filter)
                .try_init()
                .map_err(init_error)?;
        },
    }

    OBSERVABILITY_INIT
        .set(())
        .map_err(|()| Error::failed("observability_init", "failed to mark observability initialized"))
}

/// Thread-safe file writer for logging.
#[derive(Clone)]
struct LogFileWriter {
    file: Arc<Mutex<File>>,
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        guard.flush()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogFileWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Opens a log file for appending, creating parent directories.
fn open_log_file(path: &Path) -> Result<LogFileWriter> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::failed("create_log_dir", e))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::failed("open_log_file", format!("{}: {e}", path.display())))?;

    Ok(LogFileWriter {
        file: Arc::new(Mutex::new(file)),
    })
}

#[allow(clippy::needless_pass_by_value)]
fn init_error(e: tracing_subscriber::util::TryInitError) -> Error {
    Error::failed("observability_init", e)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(level: Option<&str>) -> LoggingSettings {
        LoggingSettings {
            level: level.map(String::from),
            format: LogFormat::Json,
            file: None,
        }
    }

    #[test]
    fn test_directive_precedence() {
        let s = settings(Some("warn"));
        assert_eq!(
            LoggingConfig::resolve(&s, true, Some("amem=trace".to_string())).directive,
            "amem=trace"
        );
        assert_eq!(LoggingConfig::resolve(&s, true, None).directive, "debug");
        assert_eq!(LoggingConfig::resolve(&s, false, None).directive, "warn");
        assert_eq!(
            LoggingConfig::resolve(&settings(None), false, None).directive,
            "info"
        );
    }

    #[test]
    fn test_format_carried_over() {
        let config = LoggingConfig::resolve(&settings(None), false, None);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.file.is_none());
    }

    #[test]
    fn test_invalid_directive() {
        let config = LoggingConfig {
            directive: "amem=notalevel".to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(config.filter(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_log_file_writer_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("amem.log");
        let mut writer = open_log_file(&path).unwrap();
        writer.write_all(b"first\n").unwrap();
        let mut second = open_log_file(&path).unwrap();
        second.write_all(b"second\n").unwrap();
        second.flush().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_init_writes_to_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amem.log");
        let config = LoggingConfig::default()
            .with_format(LogFormat::Json)
            .with_file(&path);
        init(&config).unwrap();
        tracing::info!(component = "observability_test", "logging initialized");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("logging initialized"));
        assert!(contents.contains("observability_test"));

        assert!(init(&config).is_err());
    }

    #[test]
    fn test_log_format_serde() {
        let settings: LoggingSettings = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(settings.format, LogFormat::Json);
        assert!(toml::from_str::<LoggingSettings>("format = \"xml\"").is_err());
    }
}
