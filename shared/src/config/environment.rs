//! Deployment environment and logging settings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Variable selecting the deployment environment
pub const ENVIRONMENT_VAR: &str = "TOKENGATE_ENV";

/// Where the token store is deployed
///
/// Decides which `tokengate.<env>.toml` overlay is read and how loud and
/// machine-readable the logs are by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub const ALL: [Environment; 3] = [
        Environment::Development,
        Environment::Staging,
        Environment::Production,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }

    /// Reads [`ENVIRONMENT_VAR`]; unset or unrecognised values mean development
    pub fn from_env() -> Self {
        std::env::var(ENVIRONMENT_VAR)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// Name of the optional overlay file for this environment
    pub fn config_file(&self) -> String {
        format!("tokengate.{}.toml", self.as_str())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "dev" => return Ok(Environment::Development),
            "stage" | "test" => return Ok(Environment::Staging),
            "prod" => return Ok(Environment::Production),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|env| env.as_str() == lowered)
            .ok_or_else(|| format!("unknown environment '{}'", s))
    }
}

/// Output layout of the fmt subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event
    Json,
    /// Multi-line human output
    #[default]
    Pretty,
    /// Single-line human output
    Compact,
}

/// Logging settings consumed by the infra telemetry setup
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `tg_infra=debug,warn`. `RUST_LOG` wins over it.
    pub level: String,

    pub format: LogFormat,

    /// ANSI colours, ignored by the JSON layout
    pub ansi: bool,

    /// Attach file and line of the emitting call site
    pub file_lines: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl LoggingConfig {
    /// Defaults for `env`: verbose and readable in development, JSON elsewhere
    pub fn for_environment(env: Environment) -> Self {
        let human = env == Environment::Development;
        Self {
            level: match env {
                Environment::Development => "debug",
                Environment::Staging => "info",
                Environment::Production => "warn",
            }
            .to_string(),
            format: if human { LogFormat::Pretty } else { LogFormat::Json },
            ansi: human,
            file_lines: human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_aliases() {
        assert_eq!("PROD".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!(" test ".parse::<Environment>().unwrap(), Environment::Staging);
        assert_eq!("development".parse::<Environment>().unwrap(), Environment::Development);
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn test_overlay_file_name() {
        assert_eq!(Environment::Staging.config_file(), "tokengate.staging.toml");
        assert_eq!(Environment::Production.to_string(), "production");
    }

    #[test]
    fn test_logging_defaults_follow_environment() {
        let dev = LoggingConfig::default();
        assert_eq!(dev.level, "debug");
        assert_eq!(dev.format, LogFormat::Pretty);
        assert!(dev.ansi && dev.file_lines);

        let prod = LoggingConfig::for_environment(Environment::Production);
        assert_eq!(prod.level, "warn");
        assert_eq!(prod.format, LogFormat::Json);
        assert!(!prod.ansi);
    }

    #[test]
    fn test_partial_logging_section() {
        let config: LoggingConfig = serde_json::from_str(r#"{"format": "compact"}"#).unwrap();
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.level, "debug");
    }
}
