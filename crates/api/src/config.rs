use std::fmt::Display;
use std::str::FromStr;

use civicwatch_core::error::CoreError;
use civicwatch_core::scheduling::policy::{
    DEFAULT_MAX_SHIFTS_PER_DAY, DEFAULT_MAX_SHIFT_HOURS, DEFAULT_MIN_REST_HOURS,
};
use civicwatch_core::scheduling::SchedulingPolicy;
use civicwatch_events::DEFAULT_QUEUE_CAPACITY;

/// Error raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid scheduling policy: {0}")]
    Policy(#[from] CoreError),
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after a shutdown signal (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Pending notification tasks buffered before new ones are dropped (default: `256`).
    pub notification_queue_capacity: usize,
    /// Limits applied by the shift conflict validator.
    pub scheduling: SchedulingPolicy,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                 |
    /// |-------------------------------|-------------------------|
    /// | `HOST`                        | `0.0.0.0`               |
    /// | `PORT`                        | `3000`                  |
    /// | `CORS_ORIGINS`                | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`                    |
    /// | `NOTIFICATION_QUEUE_CAPACITY` | `256`                   |
    /// | `SHIFT_MAX_DURATION_HOURS`    | `12`                    |
    /// | `SHIFT_MIN_REST_HOURS`        | `8`                     |
    /// | `SHIFT_MAX_PER_DAY`           | `3`                     |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_var(&lookup, "PORT", 3000u16)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = parse_var(&lookup, "REQUEST_TIMEOUT_SECS", 30u64)?;
        let shutdown_timeout_secs = parse_var(&lookup, "SHUTDOWN_TIMEOUT_SECS", 30u64)?;
        let notification_queue_capacity = parse_var(
            &lookup,
            "NOTIFICATION_QUEUE_CAPACITY",
            DEFAULT_QUEUE_CAPACITY,
        )?;
        if notification_queue_capacity == 0 {
            return Err(ConfigError::Invalid {
                name: "NOTIFICATION_QUEUE_CAPACITY",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        let scheduling = SchedulingPolicy::from_hours(
            parse_var(&lookup, "SHIFT_MAX_DURATION_HOURS", DEFAULT_MAX_SHIFT_HOURS)?,
            parse_var(&lookup, "SHIFT_MIN_REST_HOURS", DEFAULT_MIN_REST_HOURS)?,
            parse_var(&lookup, "SHIFT_MAX_PER_DAY", DEFAULT_MAX_SHIFTS_PER_DAY)?,
        )?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            notification_queue_capacity,
            scheduling,
        })
    }
}

/// Read `DATABASE_URL`, which has no default.
pub fn database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))
}

fn parse_var<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError::Invalid {
                name,
                reason: e.to_string(),
                value,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;
    use chrono::Duration;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.notification_queue_capacity, 256);
        assert_eq!(config.scheduling, SchedulingPolicy::default());
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let config = load(&[("CORS_ORIGINS", "https://a.example, https://b.example,")]).unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn scheduling_limits_are_read() {
        let config = load(&[
            ("SHIFT_MAX_DURATION_HOURS", "24"),
            ("SHIFT_MIN_REST_HOURS", "10"),
            ("SHIFT_MAX_PER_DAY", "2"),
        ])
        .unwrap();
        assert_eq!(config.scheduling.max_shift_duration, Duration::hours(24));
        assert_eq!(config.scheduling.min_rest_period, Duration::hours(10));
        assert_eq!(config.scheduling.max_shifts_per_day, 2);
    }

    #[test]
    fn unparsable_port_is_reported() {
        assert_matches!(
            load(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        );
    }

    #[test]
    fn zero_daily_limit_is_rejected() {
        assert_matches!(
            load(&[("SHIFT_MAX_PER_DAY", "0")]),
            Err(ConfigError::Policy(CoreError::Validation(_)))
        );
    }

    #[test]
    fn zero_queue_capacity_is_rejected() {
        assert_matches!(
            load(&[("NOTIFICATION_QUEUE_CAPACITY", "0")]),
            Err(ConfigError::Invalid {
                name: "NOTIFICATION_QUEUE_CAPACITY",
                ..
            })
        );
    }
}
