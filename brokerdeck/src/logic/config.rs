use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Console timing and window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Data table polling period in milliseconds (default: 5000)
    pub data_refresh_ms: u64,
    /// Terminal log polling period in milliseconds (default: 2000)
    pub terminal_refresh_ms: u64,
    /// How long a status message stays up in milliseconds (default: 3000)
    pub status_reset_ms: u64,
    /// Delay before the log refresh that follows a command (default: 100)
    pub command_refresh_delay_ms: u64,
    /// Per-request timeout in milliseconds (default: 10000)
    pub request_timeout_ms: u64,
    /// Data points shown in the live table (default: 100)
    pub live_window: usize,
    /// Data points written by the JSON download (default: 10000)
    pub export_window: usize,
    /// Command the service treats as "clear the terminal log"
    pub clear_command: String,
    /// Where JSON downloads go (supports `~`)
    pub download_dir: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            data_refresh_ms: 5000,
            terminal_refresh_ms: 2000,
            status_reset_ms: 3000,
            command_refresh_delay_ms: 100,
            request_timeout_ms: 10_000,
            live_window: 100,
            export_window: 10_000,
            clear_command: "clear".to_string(),
            download_dir: ".".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("environment variable {0} is invalid")]
    InvalidEnv(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("cannot render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Command-line values that beat both the file and the environment
#[derive(Debug, Clone, Default)]
pub struct ConsoleOverrides {
    pub data_refresh_ms: Option<u64>,
    pub terminal_refresh_ms: Option<u64>,
    pub live_window: Option<usize>,
    pub download_dir: Option<String>,
}

impl ConsoleConfig {
    /// `<config dir>/config.toml`, e.g. `~/.config/brokerdeck/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "example", "brokerdeck").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let expanded = shellexpand::tilde(path).into_owned();
        let text = std::fs::read_to_string(&expanded).map_err(|source| ConfigError::Read {
            path: expanded.clone(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path: expanded, source })
    }

    /// Defaults, then the config file (the explicit one, or the default
    /// location if it exists), then `BROKERDECK_*` variables.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default.to_string_lossy())?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment-style lookups
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        override_from(&lookup, "BROKERDECK_DATA_REFRESH_MS", &mut self.data_refresh_ms)?;
        override_from(&lookup, "BROKERDECK_TERMINAL_REFRESH_MS", &mut self.terminal_refresh_ms)?;
        override_from(&lookup, "BROKERDECK_STATUS_RESET_MS", &mut self.status_reset_ms)?;
        override_from(&lookup, "BROKERDECK_COMMAND_REFRESH_DELAY_MS", &mut self.command_refresh_delay_ms)?;
        override_from(&lookup, "BROKERDECK_REQUEST_TIMEOUT_MS", &mut self.request_timeout_ms)?;
        override_from(&lookup, "BROKERDECK_LIVE_WINDOW", &mut self.live_window)?;
        override_from(&lookup, "BROKERDECK_EXPORT_WINDOW", &mut self.export_window)?;
        if let Some(token) = lookup("BROKERDECK_CLEAR_COMMAND") {
            self.clear_command = token;
        }
        if let Some(dir) = lookup("BROKERDECK_DOWNLOAD_DIR") {
            self.download_dir = dir;
        }
        Ok(())
    }

    pub fn with_overrides(mut self, overrides: &ConsoleOverrides) -> Result<Self, ConfigError> {
        if let Some(ms) = overrides.data_refresh_ms {
            self.data_refresh_ms = ms;
        }
        if let Some(ms) = overrides.terminal_refresh_ms {
            self.terminal_refresh_ms = ms;
        }
        if let Some(window) = overrides.live_window {
            self.live_window = window;
        }
        if let Some(dir) = &overrides.download_dir {
            self.download_dir = dir.clone();
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("data_refresh_ms", self.data_refresh_ms),
            ("terminal_refresh_ms", self.terminal_refresh_ms),
            ("status_reset_ms", self.status_reset_ms),
            ("request_timeout_ms", self.request_timeout_ms),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, ms)| *ms == 0) {
            return Err(ConfigError::Invalid(format!("{} must be greater than zero", name)));
        }
        if self.live_window == 0 || self.export_window == 0 {
            return Err(ConfigError::Invalid("data point windows must be greater than zero".to_string()));
        }
        if self.clear_command.trim().is_empty() {
            return Err(ConfigError::Invalid("clear_command must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn data_refresh(&self) -> Duration {
        Duration::from_millis(self.data_refresh_ms)
    }

    pub fn terminal_refresh(&self) -> Duration {
        Duration::from_millis(self.terminal_refresh_ms)
    }

    pub fn status_reset(&self) -> Duration {
        Duration::from_millis(self.status_reset_ms)
    }

    pub fn command_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.command_refresh_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn download_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.download_dir).into_owned())
    }
}

fn override_from<F, T>(lookup: &F, key: &str, field: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        *field = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv(key.to_string()))?;
    }
    Ok(())
}
