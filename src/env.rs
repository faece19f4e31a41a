//! Environment variable names read when the default configuration is
//! built.
//!
//! They are consulted only by [`LogConfig::from_env`](crate::config::LogConfig::from_env);
//! nothing else in the crate touches the environment.

/// Name of the emitting application.
pub const APP_NAME_ENV: &str = "APP_NAME";

/// Deployment environment; `production` disables pretty output.
pub const APP_ENV_ENV: &str = "APP_ENV";

/// Fallback for [`APP_ENV_ENV`], kept for services that already set it.
pub const NODE_ENV_ENV: &str = "NODE_ENV";

/// Minimum level forwarded to the backend.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Directory for file output, if a backend writes files.
pub const LOG_DIR_ENV: &str = "LOG_DIR";

/// Read an environment variable, treating an empty value as unset.
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    env_var(key).unwrap_or_else(|| default.to_string())
}
