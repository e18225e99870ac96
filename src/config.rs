use std::env;
use std::str::FromStr;

use chrono::Duration;

use crate::auth::session::DEFAULT_SESSION_TTL_HOURS;
use crate::auth::SessionSettings;
use crate::error::AppError;

pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database_url: required(&lookup, "DATABASE_URL")?,
            database_max_connections: parsed(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            server_port: parsed(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            session_secret: required(&lookup, "SESSION_SECRET")?,
            session_ttl_hours: parsed(&lookup, "SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS)?,
            bcrypt_cost: parsed(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            secure_cookies: parsed(&lookup, "SECURE_COOKIES", false)?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings::new(self.session_secret.clone())
            .with_ttl(Duration::hours(self.session_ttl_hours))
            .with_bcrypt_cost(self.bcrypt_cost)
            .with_secure_cookies(self.secure_cookies)
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::InternalServerError(format!("{} must be set", key)))
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            AppError::InternalServerError(format!("{} has an invalid value: {}", key, raw))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://test"),
            ("SESSION_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.session_ttl_hours, 168);
        assert_eq!(config.bcrypt_cost, 12);
        assert!(!config.secure_cookies);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_custom_values() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://test"),
            ("SESSION_SECRET", "secret"),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("SESSION_TTL_HOURS", "2"),
            ("BCRYPT_COST", "4"),
            ("SECURE_COOKIES", "true"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");

        let settings = config.session_settings();
        assert_eq!(settings.ttl, Duration::hours(2));
        assert_eq!(settings.bcrypt_cost, 4);
        assert!(settings.secure_cookies);
    }

    #[test]
    fn test_config_errors() {
        assert!(Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://test")])).is_err());

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://test"),
            ("SESSION_SECRET", "secret"),
            ("SERVER_PORT", "eighty"),
        ]))
        .err()
        .unwrap();
        assert!(err.to_string().contains("SERVER_PORT"));
    }
}
