use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub client_app_url: String,
    pub require_confirmed_email: bool,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub static_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub seed_database: bool,
    pub location_api_url: String,
    pub location_api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://reactivities.db".to_string(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            environment: Environment::Development,
            client_app_url: "https://localhost:3000".to_string(),
            require_confirmed_email: true,
            session_ttl_hours: 24 * 14,
            cookie_secure: false,
            static_dir: PathBuf::from("wwwroot"),
            upload_dir: PathBuf::from("uploads"),
            seed_database: true,
            location_api_url: "https://api.locationiq.com/v1".to_string(),
            location_api_key: None,
        }
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment, falling back to
    /// [`AppConfig::default`] for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let environment = match env::var("APP_ENV").ok().as_deref() {
            None => defaults.environment,
            Some(v) if v.eq_ignore_ascii_case("development") => Environment::Development,
            Some(v) if v.eq_ignore_ascii_case("production") => Environment::Production,
            Some(v) => {
                return Err(ConfigError::Invalid {
                    key: "APP_ENV",
                    value: v.to_string(),
                })
            }
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            environment,
            client_app_url: env::var("CLIENT_APP_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.client_app_url),
            require_confirmed_email: parse_bool(
                "REQUIRE_CONFIRMED_EMAIL",
                defaults.require_confirmed_email,
            )?,
            session_ttl_hours: check_session_ttl(parse_var(
                "SESSION_TTL_HOURS",
                defaults.session_ttl_hours,
            )?)?,
            cookie_secure: parse_bool("COOKIE_SECURE", defaults.cookie_secure)?,
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            seed_database: parse_bool("SEED_DATABASE", defaults.seed_database)?,
            location_api_url: env::var("LOCATION_API_URL").unwrap_or(defaults.location_api_url),
            location_api_key: env::var("LOCATION_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        })
    }
}

/// Sessions live between one hour and one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

fn check_session_ttl(hours: i64) -> Result<i64, ConfigError> {
    if (1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(ConfigError::Invalid {
            key: "SESSION_TTL_HOURS",
            value: hours.to_string(),
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}

fn parse_bool(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Ok(value) => match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value }),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ttl_must_be_positive_and_bounded() {
        assert_eq!(check_session_ttl(1).unwrap(), 1);
        assert_eq!(
            check_session_ttl(MAX_SESSION_TTL_HOURS).unwrap(),
            MAX_SESSION_TTL_HOURS
        );
        assert!(matches!(
            check_session_ttl(0),
            Err(ConfigError::Invalid { key: "SESSION_TTL_HOURS", .. })
        ));
        assert!(check_session_ttl(-5).is_err());
        assert!(check_session_ttl(i64::MAX).is_err());
    }

    #[test]
    fn default_session_ttl_is_accepted() {
        let defaults = AppConfig::default();
        assert!(check_session_ttl(defaults.session_ttl_hours).is_ok());
    }
}
