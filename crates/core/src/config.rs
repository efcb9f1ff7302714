use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "agentspec.toml";
pub const NESTED_CONFIG_FILE: &str = "config/agentspec.toml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Effective runtime configuration. Layers apply in the order
/// defaults, config file, `AGENTSPEC_*` environment, explicit overrides.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

/// Every setting that can be supplied through the environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Setting {
    DatabaseUrl,
    DatabaseMaxConnections,
    DatabaseTimeoutSecs,
    ServerBindAddress,
    ServerPort,
    ServerGracefulShutdownSecs,
    LoggingLevel,
    LoggingFormat,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub bind_address: Option<String>,
    pub port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://agentspec.db?mode=rwc".to_string(), max_connections: 5, timeout_secs: 30 }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1".to_string(), port: 2022, graceful_shutdown_secs: 15 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: LogFormat::Compact }
    }
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl Setting {
    pub const ALL: [Setting; 8] = [
        Setting::DatabaseUrl,
        Setting::DatabaseMaxConnections,
        Setting::DatabaseTimeoutSecs,
        Setting::ServerBindAddress,
        Setting::ServerPort,
        Setting::ServerGracefulShutdownSecs,
        Setting::LoggingLevel,
        Setting::LoggingFormat,
    ];

    /// Dotted path of the setting inside the TOML file.
    pub fn key_path(self) -> &'static str {
        match self {
            Self::DatabaseUrl => "database.url",
            Self::DatabaseMaxConnections => "database.max_connections",
            Self::DatabaseTimeoutSecs => "database.timeout_secs",
            Self::ServerBindAddress => "server.bind_address",
            Self::ServerPort => "server.port",
            Self::ServerGracefulShutdownSecs => "server.graceful_shutdown_secs",
            Self::LoggingLevel => "logging.level",
            Self::LoggingFormat => "logging.format",
        }
    }

    /// Environment variables that set this value, highest priority first.
    pub fn env_names(self) -> &'static [&'static str] {
        match self {
            Self::DatabaseUrl => &["AGENTSPEC_DATABASE_URL"],
            Self::DatabaseMaxConnections => &["AGENTSPEC_DATABASE_MAX_CONNECTIONS"],
            Self::DatabaseTimeoutSecs => &["AGENTSPEC_DATABASE_TIMEOUT_SECS"],
            Self::ServerBindAddress => &["AGENTSPEC_SERVER_BIND_ADDRESS"],
            Self::ServerPort => &["AGENTSPEC_SERVER_PORT"],
            Self::ServerGracefulShutdownSecs => &["AGENTSPEC_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            Self::LoggingLevel => &["AGENTSPEC_LOGGING_LEVEL", "AGENTSPEC_LOG_LEVEL"],
            Self::LoggingFormat => &["AGENTSPEC_LOGGING_FORMAT", "AGENTSPEC_LOG_FORMAT"],
        }
    }

    /// First non-blank environment variable for this setting, with its name.
    pub fn env_value(self) -> Option<(&'static str, String)> {
        self.env_names().iter().find_map(|name| {
            env::var(name).ok().filter(|value| !value.trim().is_empty()).map(|value| (*name, value))
        })
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = match resolve_config_path(options.config_path.as_deref()) {
            Some(path) => Self::from_file(&path)?,
            None if options.require_file => {
                return Err(ConfigError::MissingConfigFile(
                    options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
                ));
            }
            None => Self::default(),
        };

        for setting in Setting::ALL {
            if let Some((name, raw)) = setting.env_value() {
                config.set(setting, name, &raw)?;
            }
        }
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

        toml::from_str(&interpolate_env_vars(&raw)?)
            .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    /// Current value of a setting, rendered the way it would be written in the file.
    pub fn display_value(&self, setting: Setting) -> String {
        match setting {
            Setting::DatabaseUrl => self.database.url.clone(),
            Setting::DatabaseMaxConnections => self.database.max_connections.to_string(),
            Setting::DatabaseTimeoutSecs => self.database.timeout_secs.to_string(),
            Setting::ServerBindAddress => self.server.bind_address.clone(),
            Setting::ServerPort => self.server.port.to_string(),
            Setting::ServerGracefulShutdownSecs => self.server.graceful_shutdown_secs.to_string(),
            Setting::LoggingLevel => self.logging.level.clone(),
            Setting::LoggingFormat => self.logging.format.as_str().to_string(),
        }
    }

    fn set(&mut self, setting: Setting, source: &str, raw: &str) -> Result<(), ConfigError> {
        match setting {
            Setting::DatabaseUrl => self.database.url = raw.to_string(),
            Setting::DatabaseMaxConnections => {
                self.database.max_connections = parse_env(source, raw)?;
            }
            Setting::DatabaseTimeoutSecs => self.database.timeout_secs = parse_env(source, raw)?,
            Setting::ServerBindAddress => self.server.bind_address = raw.to_string(),
            Setting::ServerPort => self.server.port = parse_env(source, raw)?,
            Setting::ServerGracefulShutdownSecs => {
                self.server.graceful_shutdown_secs = parse_env(source, raw)?;
            }
            Setting::LoggingLevel => self.logging.level = raw.to_string(),
            Setting::LoggingFormat => self.logging.format = raw.parse()?,
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
    }

    /// Reports the first failing rule, naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.logging.level.trim().to_ascii_lowercase();
        let rules = [
            (
                is_sqlite_url(&self.database.url),
                "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)",
            ),
            (self.database.max_connections > 0, "database.max_connections must be greater than zero"),
            (
                (1..=300).contains(&self.database.timeout_secs),
                "database.timeout_secs must be in range 1..=300",
            ),
            (!self.server.bind_address.trim().is_empty(), "server.bind_address must not be empty"),
            (self.server.port > 0, "server.port must be greater than zero"),
            (
                self.server.graceful_shutdown_secs > 0,
                "server.graceful_shutdown_secs must be greater than zero",
            ),
            (
                LOG_LEVELS.contains(&level.as_str()),
                "logging.level must be one of trace|debug|info|warn|error",
            ),
        ];

        match rules.into_iter().find(|(passed, _)| !passed) {
            Some((_, message)) => Err(ConfigError::Validation(message.to_string())),
            None => Ok(()),
        }
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    match explicit_path {
        Some(path) => path.exists().then(|| path.to_path_buf()),
        None => [DEFAULT_CONFIG_FILE, NESTED_CONFIG_FILE]
            .into_iter()
            .map(PathBuf::from)
            .find(|path| path.exists()),
    }
}

fn is_sqlite_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:"
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Expands `${VAR}` references before the file is parsed.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let var = &after[..end];
        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        output.push_str(&value);
        rest = &after[end + 1..];
    }
    output.push_str(rest);

    Ok(output)
}
