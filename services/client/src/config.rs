use std::num::NonZeroU32;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Rough size of the published curriculum (topics + blocks + chapters).
const DEFAULT_CURRICULUM_SIZE: NonZeroU32 = NonZeroU32::new(45).unwrap();

/// Everything the session client reads from the environment at startup.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Backend root, without a trailing slash (e.g. `http://localhost:8000/api/v1`).
    pub api_base_url: String,
    pub student_id: i64,
    /// Denominator of the progress percentage.
    pub curriculum_size: NonZeroU32,
    /// Upper bound for every outbound request.
    pub request_timeout: Duration,
    pub log_level: Level,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api/v1".to_string(),
            student_id: 1,
            curriculum_size: DEFAULT_CURRICULUM_SIZE,
            request_timeout: Duration::from_secs(30),
            log_level: Level::INFO,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from environment variables, falling back to
    /// [`ClientConfig::default`] for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        let defaults = Self::default();

        let api_base_url = match std::env::var("MENTOR_API_BASE_URL") {
            Ok(url) => {
                let url = url.trim().trim_end_matches('/').to_string();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::InvalidValue(
                        "MENTOR_API_BASE_URL".to_string(),
                        format!("'{}' is not an http(s) URL", url),
                    ));
                }
                url
            }
            Err(_) => defaults.api_base_url,
        };

        let student_id = parse_var("MENTOR_STUDENT_ID")?.unwrap_or(defaults.student_id);

        let curriculum_size =
            parse_var::<NonZeroU32>("MENTOR_CURRICULUM_SIZE")?.unwrap_or(defaults.curriculum_size);

        let request_timeout = parse_var::<NonZeroU32>("MENTOR_REQUEST_TIMEOUT_SECS")?
            .map(|secs| Duration::from_secs(u64::from(secs.get())))
            .unwrap_or(defaults.request_timeout);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            api_base_url,
            student_id,
            curriculum_size,
            request_timeout,
            log_level,
        })
    }
}

fn parse_var<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn clear_env_vars() {
        unsafe {
            env::remove_var("MENTOR_API_BASE_URL");
            env::remove_var("MENTOR_STUDENT_ID");
            env::remove_var("MENTOR_CURRICULUM_SIZE");
            env::remove_var("MENTOR_REQUEST_TIMEOUT_SECS");
            env::remove_var("RUST_LOG");
        }
    }

    #[test]
    fn test_config_error_display() {
        let invalid_value =
            ConfigError::InvalidValue("TEST_VAR".to_string(), "bad_value".to_string());
        assert_eq!(
            format!("{}", invalid_value),
            "Invalid value for environment variable TEST_VAR: bad_value"
        );
    }

    #[test]
    #[serial]
    fn test_config_from_env_defaults() {
        clear_env_vars();

        let config = ClientConfig::from_env().expect("Config should load successfully");

        assert_eq!(config.api_base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.student_id, 1);
        assert_eq!(config.curriculum_size.get(), 45);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, Level::INFO);
    }

    #[test]
    #[serial]
    fn test_config_from_env_custom_values() {
        clear_env_vars();
        unsafe {
            env::set_var("MENTOR_API_BASE_URL", "https://mentor.example.com/api/v1/");
            env::set_var("MENTOR_STUDENT_ID", "42");
            env::set_var("MENTOR_CURRICULUM_SIZE", "60");
            env::set_var("MENTOR_REQUEST_TIMEOUT_SECS", "5");
            env::set_var("RUST_LOG", "debug");
        }

        let config = ClientConfig::from_env().expect("Config should load successfully");

        assert_eq!(config.api_base_url, "https://mentor.example.com/api/v1");
        assert_eq!(config.student_id, 42);
        assert_eq!(config.curriculum_size.get(), 60);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.log_level, Level::DEBUG);
        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_config_zero_curriculum_size_rejected() {
        clear_env_vars();
        unsafe {
            env::set_var("MENTOR_CURRICULUM_SIZE", "0");
        }

        let err = ClientConfig::from_env().unwrap_err();
        let ConfigError::InvalidValue(var, _) = err;
        assert_eq!(var, "MENTOR_CURRICULUM_SIZE");
        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_config_invalid_student_id() {
        clear_env_vars();
        unsafe {
            env::set_var("MENTOR_STUDENT_ID", "first");
        }

        let err = ClientConfig::from_env().unwrap_err();
        let ConfigError::InvalidValue(var, _) = err;
        assert_eq!(var, "MENTOR_STUDENT_ID");
        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_config_invalid_base_url() {
        clear_env_vars();
        unsafe {
            env::set_var("MENTOR_API_BASE_URL", "localhost:8000");
        }

        let err = ClientConfig::from_env().unwrap_err();
        let ConfigError::InvalidValue(var, _) = err;
        assert_eq!(var, "MENTOR_API_BASE_URL");
        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_config_invalid_log_level() {
        clear_env_vars();
        unsafe {
            env::set_var("RUST_LOG", "not-a-level");
        }

        let err = ClientConfig::from_env().unwrap_err();
        let ConfigError::InvalidValue(var, _) = err;
        assert_eq!(var, "RUST_LOG");
        clear_env_vars();
    }
}
