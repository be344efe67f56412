// emsctl - platform/config.rs
//
// Platform path resolution and config.toml loading with startup
// validation. Invalid values produce actionable warnings and fall back
// to defaults; a bad config file never stops the tool from running.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::model::LineCount;
use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for emsctl data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/emsctl/ or %APPDATA%\emsctl\)
    pub config_dir: PathBuf,

    /// Data directory for the persisted session.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be
    /// determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[api]` section.
    pub api: ApiSection,
    /// `[logs]` section.
    pub logs: LogsSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[api]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// Base URL of the employee service.
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// `[logs]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LogsSection {
    /// Default number of log lines to fetch.
    pub default_lines: Option<u32>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// All values are validated against named constants at load time.
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Service --
    /// Base URL of the employee service.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,

    // -- Log viewer --
    /// Default number of log lines to fetch.
    pub default_lines: LineCount,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            timeout_secs: constants::DEFAULT_HTTP_TIMEOUT_SECS,
            default_lines: LineCount::default(),
            log_level: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal
/// warnings. If the file does not exist, returns defaults with no
/// warnings (first run). If the file is unparseable, returns defaults
/// with an error warning -- the tool still runs but the user is informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::debug!(path = %config_path.display(), "Loaded config.toml");

    // Validate each field against named constants, accumulating all warnings.
    let mut config = AppConfig::default();

    // -- Api: base_url --
    if let Some(ref url) = raw.api.base_url {
        if url.starts_with("http://") || url.starts_with("https://") {
            config.base_url = url.clone();
        } else {
            warnings.push(format!(
                "[api] base_url = \"{url}\" is not an http(s) URL. Using default ({}).",
                constants::DEFAULT_BASE_URL,
            ));
        }
    }

    // -- Api: timeout_secs --
    if let Some(secs) = raw.api.timeout_secs {
        if (constants::MIN_HTTP_TIMEOUT_SECS..=constants::MAX_HTTP_TIMEOUT_SECS).contains(&secs) {
            config.timeout_secs = secs;
        } else {
            warnings.push(format!(
                "[api] timeout_secs = {secs} is out of range ({}-{}). Using default ({}).",
                constants::MIN_HTTP_TIMEOUT_SECS,
                constants::MAX_HTTP_TIMEOUT_SECS,
                constants::DEFAULT_HTTP_TIMEOUT_SECS,
            ));
        }
    }

    // -- Logs: default_lines --
    if let Some(lines) = raw.logs.default_lines {
        match LineCount::new(lines) {
            Some(count) => config.default_lines = count,
            None => {
                let allowed = constants::LOG_LINE_OPTIONS
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                warnings.push(format!(
                    "[logs] default_lines = {lines} is not one of the allowed values ({allowed}). \
                     Using default ({}).",
                    constants::DEFAULT_LOG_LINES,
                ));
            }
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default ({}).",
                constants::DEFAULT_LOG_LEVEL,
            ));
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

// =============================================================================
// Unit tests
// =============================================================================
