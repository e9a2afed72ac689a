//! Deployment environment and log output settings

use serde::{Deserialize, Serialize};
use std::env;

/// Variable selecting the deployment environment
pub const ENVIRONMENT_VAR: &str = "OTPMAIL_ENV";

/// Where the OTP engine is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local machine: in-memory store, mock mail, verbose logs
    #[default]
    Development,
    /// Automated test runs
    Test,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Read `OTPMAIL_ENV`; unset or unknown values mean development
    pub fn from_env() -> Self {
        env::var(ENVIRONMENT_VAR)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }

    /// Layered settings file for this environment, e.g. `config/otpmail.production.toml`
    pub fn config_file(&self) -> String {
        format!("config/otpmail.{}", self.as_str())
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "test" | "ci" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

/// How `om_infra::telemetry` renders tracing output
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `om_core=debug,info`
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// ANSI colors; only meaningful on a terminal
    #[serde(default = "default_colored")]
    pub colored: bool,

    /// Attach file and line to every event
    #[serde(default)]
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl LoggingConfig {
    /// Output suited to `env`
    ///
    /// Development traces the engine and its stores at debug level; production
    /// emits JSON lines for log shipping.
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Development => Self {
                level: String::from("om_core=debug,om_infra=debug,info"),
                format: LogFormat::Pretty,
                colored: true,
                source_location: true,
            },
            Environment::Test => Self {
                level: String::from("warn"),
                format: LogFormat::Compact,
                colored: false,
                source_location: false,
            },
            Environment::Production => Self {
                level: default_level(),
                format: LogFormat::Json,
                colored: false,
                source_location: false,
            },
        }
    }

    /// Apply `RUST_LOG` and `OTPMAIL_LOG_FORMAT` on top of the environment defaults
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = env::var("RUST_LOG") {
            if !level.trim().is_empty() {
                self.level = level;
            }
        }
        if let Some(format) = env::var("OTPMAIL_LOG_FORMAT")
            .ok()
            .and_then(|value| value.parse().ok())
        {
            self.format = format;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event
    Json,
    /// Multi-line human output
    Pretty,
    /// Single-line human output
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

fn default_level() -> String {
    String::from("info")
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_colored() -> bool {
    true
}
