use crate::env::{self, APP_ENV_ENV, APP_NAME_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV, NODE_ENV_ENV};
use crate::level::Level;
use serde::Deserialize;
use std::path::PathBuf;

/// Application name used when none is configured.
pub const DEFAULT_APP_NAME: &str = "rs-logger";

/// Environment name used when none is configured.
pub const DEFAULT_ENV: &str = "development";

/// Environment in which pretty output is always off.
pub const PRODUCTION_ENV: &str = "production";

/// Facade configuration.
///
/// **Fields**
/// - `app_name`: identifies the emitting application; used as the service
///   name of every record without an explicit `service`.
/// - `env`: deployment environment; `"production"` forces structured
///   output regardless of `pretty`.
/// - `log_level`: minimum severity forwarded by the backend.
/// - `pretty`: opt in to colorized, human-oriented output.
/// - `log_dir`: advisory directory for backends that write files.
#[derive(Clone, Debug, PartialEq)]
pub struct LogConfig {
    pub app_name: String,
    pub env: String,
    pub log_level: Level,
    pub pretty: bool,
    pub log_dir: Option<PathBuf>,
}

impl LogConfig {
    /// Defaults, taking `APP_NAME`, `APP_ENV` (or `NODE_ENV`), `LOG_LEVEL`
    /// and `LOG_DIR` from the environment when set.
    ///
    /// An unparsable `LOG_LEVEL` falls back to `info`.
    pub fn from_env() -> Self {
        let env = env::env_var(APP_ENV_ENV)
            .or_else(|| env::env_var(NODE_ENV_ENV))
            .unwrap_or_else(|| DEFAULT_ENV.to_string());

        let log_level = match env::env_var(LOG_LEVEL_ENV) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring {}", LOG_LEVEL_ENV);
                Level::Info
            }),
            None => Level::Info,
        };

        LogConfig {
            app_name: env::env_or(APP_NAME_ENV, DEFAULT_APP_NAME),
            pretty: env != PRODUCTION_ENV,
            env,
            log_level,
            log_dir: Some(PathBuf::from(env::env_or(LOG_DIR_ENV, "./logs"))),
        }
    }

    /// Apply every field set in `partial` over `self`.
    pub fn merged(mut self, partial: PartialConfig) -> Self {
        if let Some(app_name) = partial.app_name {
            self.app_name = app_name;
        }
        if let Some(env) = partial.env {
            self.env = env;
        }
        if let Some(log_level) = partial.log_level {
            self.log_level = log_level;
        }
        if let Some(pretty) = partial.pretty {
            self.pretty = pretty;
        }
        if let Some(log_dir) = partial.log_dir {
            self.log_dir = Some(log_dir);
        }
        self
    }

    /// Whether records are rendered in colorized pretty mode.
    pub fn pretty_enabled(&self) -> bool {
        self.pretty && self.env != PRODUCTION_ENV
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig::from_env()
    }
}

/// Error returned when a configuration document cannot be read.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid logger configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration overrides passed to `init`; unset fields keep their
/// defaults.
///
/// Deserializes from documents such as
/// `{"appName": "billing", "env": "production", "logLevel": "debug"}`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialConfig {
    pub app_name: Option<String>,
    pub env: Option<String>,
    pub log_level: Option<Level>,
    pub pretty: Option<bool>,
    pub log_dir: Option<PathBuf>,
}

impl PartialConfig {
    pub fn new() -> Self {
        PartialConfig::default()
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = Some(pretty);
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [APP_NAME_ENV, APP_ENV_ENV, NODE_ENV_ENV, LOG_LEVEL_ENV, LOG_DIR_ENV] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial(env)]
    fn from_env_defaults_when_unset() {
        clear_env();
        let config = LogConfig::from_env();
        assert_eq!(config, base());
    }

    #[test]
    #[serial(env)]
    fn from_env_invalid_level_falls_back_to_info() {
        clear_env();
        std::env::set_var(LOG_LEVEL_ENV, "loud");
        assert_eq!(LogConfig::from_env().log_level, Level::Info);

        std::env::set_var(LOG_LEVEL_ENV, " Debug ");
        assert_eq!(LogConfig::from_env().log_level, Level::Debug);
        clear_env();
    }

    #[test]
    #[serial(env)]
    fn from_env_node_env_production_disables_pretty() {
        clear_env();
        std::env::set_var(NODE_ENV_ENV, PRODUCTION_ENV);
        let config = LogConfig::from_env();
        assert_eq!(config.env, PRODUCTION_ENV);
        assert!(!config.pretty);
        assert!(!config.pretty_enabled());
        clear_env();
    }

    #[test]
    #[serial(env)]
    fn from_env_app_env_takes_precedence() {
        clear_env();
        std::env::set_var(NODE_ENV_ENV, PRODUCTION_ENV);
        std::env::set_var(APP_ENV_ENV, "staging");
        let config = LogConfig::from_env();
        assert_eq!(config.env, "staging");
        assert!(config.pretty_enabled());
        clear_env();
    }

    #[test]
    #[serial(env)]
    fn from_env_reads_name_and_dir() {
        clear_env();
        std::env::set_var(APP_NAME_ENV, "billing");
        std::env::set_var(LOG_DIR_ENV, "/var/log/billing");
        std::env::set_var(APP_ENV_ENV, "");
        let config = LogConfig::from_env();
        assert_eq!(config.app_name, "billing");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/billing")));
        assert_eq!(config.env, DEFAULT_ENV);
        clear_env();
    }

    fn base() -> LogConfig {
        LogConfig {
            app_name: DEFAULT_APP_NAME.to_string(),
            env: DEFAULT_ENV.to_string(),
            log_level: Level::Info,
            pretty: true,
            log_dir: Some(PathBuf::from("./logs")),
        }
    }

    #[test]
    fn merge_is_field_wise() {
        let merged = base().merged(PartialConfig::new().app_name("billing").log_level(Level::Debug));
        assert_eq!(merged.app_name, "billing");
        assert_eq!(merged.log_level, Level::Debug);
        assert_eq!(merged.env, DEFAULT_ENV);
        assert!(merged.pretty);
        assert_eq!(merged.log_dir, Some(PathBuf::from("./logs")));
    }

    #[test]
    fn empty_partial_keeps_defaults() {
        assert_eq!(base().merged(PartialConfig::new()), base());
    }

    #[test]
    fn production_disables_pretty() {
        let prod = base().merged(PartialConfig::new().env(PRODUCTION_ENV).pretty(true));
        assert!(prod.pretty);
        assert!(!prod.pretty_enabled());

        let dev = base().merged(PartialConfig::new().pretty(false));
        assert!(!dev.pretty_enabled());
        assert!(base().pretty_enabled());
    }

    #[test]
    fn parses_camel_case_json() {
        let partial = PartialConfig::from_json(
            r#"{"appName": "Usage app", "logLevel": "debug", "env": "dev", "logDir": "./logs", "pretty": false}"#,
        )
        .unwrap();
        assert_eq!(
            partial,
            PartialConfig::new()
                .app_name("Usage app")
                .log_level(Level::Debug)
                .env("dev")
                .log_dir("./logs")
                .pretty(false)
        );
    }

    #[test]
    fn rejects_bad_json() {
        assert!(PartialConfig::from_json(r#"{"logLevel": "loud"}"#).is_err());
        assert!(PartialConfig::from_json(r#"{"colour": true}"#).is_err());
    }
}
