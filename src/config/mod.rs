//! Configuration management.
//!
//! Configuration is read from a TOML file. Every field is optional; missing
//! values fall back to defaults.
//!
//! ```toml
//! data_dir = "~/.local/share/amem"
//! dataset_path = "data/locomo10.json"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! file = "amem.log"
//!
//! [llm]
//! model = "gpt-4o-mini"
//! api_key = "${OPENAI_API_KEY}"
//! temperature = 0.7
//! ```

use crate::observability::LogFormat;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "AMEM_CONFIG_PATH";

/// Default file name of the interaction log inside the data directory.
pub const INTERACTION_LOG_FILE: &str = "llm_logs.db";

/// Main configuration for amem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmemConfig {
    /// Directory for generated files (interaction log, reports).
    pub data_dir: PathBuf,
    /// Default `LoCoMo` dataset path, used when a command omits one.
    pub dataset_path: Option<PathBuf>,
    /// Interaction log path override.
    pub interaction_log: Option<PathBuf>,
    /// Logging settings.
    pub logging: LoggingSettings,
    /// LLM provider settings.
    pub llm: LlmConfig,
    /// File the configuration was loaded from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Logging settings from the `[logging]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `amem=debug,warn`.
    pub level: Option<String>,
    /// Output format.
    pub format: LogFormat,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// LLM provider settings from the `[llm]` section.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmConfig {
    /// Model name.
    pub model: Option<String>,
    /// API key, or an environment variable reference like `${OPENAI_API_KEY}`.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Base URL of an `OpenAI`-compatible endpoint.
    pub base_url: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("timeout_ms", &self.timeout_ms)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Data directory.
    pub data_dir: Option<String>,
    /// Dataset path.
    pub dataset_path: Option<String>,
    /// Interaction log path.
    pub interaction_log: Option<String>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
    /// LLM section.
    pub llm: Option<LlmConfig>,
}

impl Default for AmemConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".amem"),
            dataset_path: None,
            interaction_log: None,
            logging: LoggingSettings::default(),
            llm: LlmConfig::default(),
            source: None,
        }
    }
}

impl AmemConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration, in order of precedence, from:
    ///
    /// 1. `path`, if given
    /// 2. the file named by `AMEM_CONFIG_PATH`
    /// 3. the default locations (see [`Self::load_default`])
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file is missing or cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_PATH_ENV) {
            if !env_path.trim().is_empty() {
                return Self::load_from_file(Path::new(env_path.trim()));
            }
        }

        Ok(Self::load_default())
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let contents =
            std::fs::read_to_string(path).map_err(|e| Error::failed("read_config_file", e))?;
        let mut config = Self::parse(&contents)?;
        config.source = Some(path.to_path_buf());
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the text is not valid configuration TOML.
    pub fn parse(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)
            .map_err(|e| Error::InvalidInput(format!("invalid config: {e}")))?;
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/amem/` on macOS)
    /// 2. XDG config dir (`~/.config/amem/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found or readable.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("amem").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("amem")
                .join("config.toml"),
        ];

        for candidate in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(candidate) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(
                    path = %candidate.display(),
                    error = %e,
                    "Ignoring unreadable config file"
                ),
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `AmemConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(data_dir) = file.data_dir {
            config.data_dir = expand_path(&data_dir);
        }
        config.dataset_path = file.dataset_path.as_deref().map(expand_path);
        config.interaction_log = file.interaction_log.as_deref().map(expand_path);
        if let Some(mut logging) = file.logging {
            logging.file = logging
                .file
                .map(|file| file.to_str().map_or_else(|| file.clone(), expand_path));
            config.logging = logging;
        }
        if let Some(mut llm) = file.llm {
            llm.api_key = llm.api_key.as_deref().and_then(expand_env);
            llm.base_url = llm.base_url.as_deref().and_then(expand_env);
            config.llm = llm;
        }

        config
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = path.into();
        self
    }

    /// Sets the default dataset path.
    #[must_use]
    pub fn with_dataset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset_path = Some(path.into());
        self
    }

    /// Sets the interaction log path.
    #[must_use]
    pub fn with_interaction_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.interaction_log = Some(path.into());
        self
    }

    /// Path of the interaction log database.
    ///
    /// Defaults to `llm_logs.db` inside the data directory.
    #[must_use]
    pub fn interaction_log_path(&self) -> PathBuf {
        self.interaction_log
            .clone()
            .unwrap_or_else(|| self.data_dir.join(INTERACTION_LOG_FILE))
    }
}

/// Expands `${VAR}` references and a leading `~/`.
fn expand_path(value: &str) -> PathBuf {
    let expanded = expand_env(value).unwrap_or_else(|| value.to_string());
    if let Some(rest) = expanded.strip_prefix("~/") {
        if let Some(base_dirs) = directories::BaseDirs::new() {
            return base_dirs.home_dir().join(rest);
        }
    }
    PathBuf::from(expanded)
}

/// Expands `${VAR}` references.
///
/// Returns `None` if a referenced variable is unset, so an unset key reads as
/// "not configured" rather than as an empty string.
fn expand_env(value: &str) -> Option<String> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let name = &rest[start + 2..start + 2 + len];
        out.push_str(&std::env::var(name).ok()?);
        rest = &rest[start + 3 + len..];
    }
    out.push_str(rest);
    Some(out)
}
