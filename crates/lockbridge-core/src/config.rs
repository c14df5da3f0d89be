//! Bridge configuration.
//!
//! The option names follow the host's preference keys (`username`,
//! `password`, `updateFrequency`, `logLevel`), so a preferences dictionary
//! exported by the host deserializes directly:
//!
//! ```
//! use lockbridge_core::{BridgeConfig, LogLevel};
//!
//! let config = BridgeConfig::from_json_str(
//!     r#"{"username": "me@example.com", "password": "secret", "updateFrequency": 5}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.update_interval().as_secs(), 300);
//! assert_eq!(config.log_level, LogLevel::Info);
//! ```

use crate::constants::{
    DEFAULT_UPDATE_FREQUENCY_MINUTES, MAX_UPDATE_FREQUENCY_MINUTES, MIN_UPDATE_FREQUENCY_MINUTES,
};
use crate::{Credentials, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Verbosity of the bridge's log output.
///
/// Accepts either the level name or the host's numeric level code
/// (5, 10, 20, 30, 40, 50) when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "LogLevelRepr")]
pub enum LogLevel {
    /// Extra-verbose diagnostics, including raw preference dumps.
    ThreadDebug,
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LogLevelRepr {
    Code(u8),
    Name(String),
}

impl TryFrom<LogLevelRepr> for LogLevel {
    type Error = String;

    fn try_from(value: LogLevelRepr) -> std::result::Result<Self, String> {
        match value {
            LogLevelRepr::Code(code) => {
                LogLevel::from_code(code).ok_or_else(|| format!("unknown log level code {code}"))
            }
            LogLevelRepr::Name(name) => name.parse(),
        }
    }
}

impl LogLevel {
    /// Map the host's numeric level code onto a level.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            5 => Some(LogLevel::ThreadDebug),
            10 => Some(LogLevel::Debug),
            20 => Some(LogLevel::Info),
            30 => Some(LogLevel::Warning),
            40 => Some(LogLevel::Error),
            50 => Some(LogLevel::Critical),
            _ => None,
        }
    }

    /// Numeric level code understood by the host.
    pub fn code(&self) -> u8 {
        match self {
            LogLevel::ThreadDebug => 5,
            LogLevel::Debug => 10,
            LogLevel::Info => 20,
            LogLevel::Warning => 30,
            LogLevel::Error => 40,
            LogLevel::Critical => 50,
        }
    }

    /// Equivalent `tracing` filter directive.
    ///
    /// `tracing` has no level above `error`, so `Critical` collapses onto it.
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::ThreadDebug => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "threaddebug" | "trace" => Ok(LogLevel::ThreadDebug),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            "critical" => Ok(LogLevel::Critical),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::ThreadDebug => "threaddebug",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        };
        write!(f, "{name}")
    }
}

/// A single rejected configuration field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Preference key as the host names it.
    pub field: &'static str,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// User-facing bridge settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Vendor account user name.
    pub username: String,

    /// Vendor account password.
    pub password: String,

    /// Polling interval in minutes.
    pub update_frequency: u32,

    #[serde(default)]
    pub log_level: LogLevel,
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("update_frequency", &self.update_frequency)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            update_frequency: DEFAULT_UPDATE_FREQUENCY_MINUTES,
            log_level: LogLevel::default(),
        }
    }
}

impl BridgeConfig {
    /// Parse and validate a JSON preferences document.
    ///
    /// # Errors
    /// Returns `Error::Json` for malformed input and `Error::InvalidConfig`
    /// listing every rejected field otherwise.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BridgeConfig = serde_json::from_str(json)?;
        config.validate().map_err(Error::InvalidConfig)?;
        Ok(config)
    }

    /// Read, parse and validate a JSON preferences file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check every field, collecting all problems rather than stopping at
    /// the first one.
    pub fn validate(&self) -> std::result::Result<(), Vec<ConfigIssue>> {
        let mut issues = Vec::new();

        if self.username.trim().is_empty() {
            issues.push(ConfigIssue::new("username", "must not be empty"));
        }

        if self.password.is_empty() {
            issues.push(ConfigIssue::new("password", "must not be empty"));
        }

        if !(MIN_UPDATE_FREQUENCY_MINUTES..=MAX_UPDATE_FREQUENCY_MINUTES)
            .contains(&self.update_frequency)
        {
            issues.push(ConfigIssue::new(
                "updateFrequency",
                format!(
                    "must be between {MIN_UPDATE_FREQUENCY_MINUTES} and \
                     {MAX_UPDATE_FREQUENCY_MINUTES} minutes, got {}",
                    self.update_frequency
                ),
            ));
        }

        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }

    /// Polling interval as a duration.
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.update_frequency) * 60)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }

    /// Describe what changed between `self` and `updated`.
    pub fn delta(&self, updated: &BridgeConfig) -> ConfigDelta {
        ConfigDelta {
            interval_changed: self.update_frequency != updated.update_frequency,
            credentials_changed: self.username != updated.username
                || self.password != updated.password,
            log_level_changed: self.log_level != updated.log_level,
        }
    }
}

/// Which parts of the configuration a confirmed edit touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigDelta {
    pub interval_changed: bool,
    pub credentials_changed: bool,
    pub log_level_changed: bool,
}

impl ConfigDelta {
    pub fn is_empty(&self) -> bool {
        !(self.interval_changed || self.credentials_changed || self.log_level_changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn valid() -> BridgeConfig {
        BridgeConfig {
            username: "me@example.com".to_string(),
            password: "secret".to_string(),
            update_frequency: 5,
            log_level: LogLevel::Info,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[rstest]
    #[case(3)]
    #[case(30)]
    #[case(60)]
    fn test_frequency_bounds_accepted(#[case] minutes: u32) {
        let config = BridgeConfig {
            update_frequency: minutes,
            ..valid()
        };
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case(0)]
    #[case(2)]
    #[case(61)]
    fn test_frequency_out_of_range(#[case] minutes: u32) {
        let config = BridgeConfig {
            update_frequency: minutes,
            ..valid()
        };
        let issues = config.validate().unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "updateFrequency");
    }

    #[test]
    fn test_all_issues_reported() {
        let config = BridgeConfig {
            username: "  ".to_string(),
            password: String::new(),
            update_frequency: 1,
            log_level: LogLevel::Debug,
        };

        let fields: Vec<_> = config
            .validate()
            .unwrap_err()
            .into_iter()
            .map(|issue| issue.field)
            .collect();
        assert_eq!(fields, vec!["username", "password", "updateFrequency"]);
    }

    #[test]
    fn test_from_json_defaults_log_level() {
        let config = BridgeConfig::from_json_str(
            r#"{"username": "a", "password": "b", "updateFrequency": 10}"#,
        )
        .unwrap();
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.update_interval(), Duration::from_secs(600));
    }

    #[rstest]
    #[case(r#""debug""#, LogLevel::Debug)]
    #[case(r#""WARNING""#, LogLevel::Warning)]
    #[case("5", LogLevel::ThreadDebug)]
    #[case("50", LogLevel::Critical)]
    fn test_log_level_deserialize(#[case] json: &str, #[case] expected: LogLevel) {
        let level: LogLevel = serde_json::from_str(json).unwrap();
        assert_eq!(level, expected);
    }

    #[test]
    fn test_log_level_rejects_unknown_code() {
        assert!(serde_json::from_str::<LogLevel>("15").is_err());
        assert!(serde_json::from_str::<LogLevel>(r#""loud""#).is_err());
    }

    #[test]
    fn test_log_level_code_roundtrip() {
        for level in [
            LogLevel::ThreadDebug,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warning,
            LogLevel::Error,
            LogLevel::Critical,
        ] {
            assert_eq!(LogLevel::from_code(level.code()), Some(level));
        }
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        let result =
            BridgeConfig::from_json_str(r#"{"username": "", "password": "b", "updateFrequency": 2}"#);
        match result {
            Err(Error::InvalidConfig(issues)) => assert_eq!(issues.len(), 2),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_delta() {
        let old = valid();

        assert!(old.delta(&old.clone()).is_empty());

        let faster = BridgeConfig {
            update_frequency: 3,
            ..valid()
        };
        let delta = old.delta(&faster);
        assert!(delta.interval_changed);
        assert!(!delta.credentials_changed);

        let new_password = BridgeConfig {
            password: "changed".to_string(),
            ..valid()
        };
        assert!(old.delta(&new_password).credentials_changed);
    }

    #[test]
    fn test_debug_redacts_password() {
        let printed = format!("{:?}", valid());
        assert!(!printed.contains("secret"));
    }
}
