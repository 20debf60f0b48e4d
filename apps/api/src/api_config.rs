use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use tripcover_core::AppError;

const DEFAULT_SESSION_TTL_MINUTES: i64 = 720;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub database_max_connections: u32,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub session_ttl: chrono::Duration,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_non_empty_env("DATABASE_URL")?;
        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(10);
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        Ok(Self {
            migrate_only,
            database_url,
            database_max_connections,
            frontend_url,
            api_host,
            api_port,
            session_ttl: session_ttl_from_env()?,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

fn session_ttl_from_env() -> Result<chrono::Duration, AppError> {
    let minutes = match env::var("SESSION_TTL_MINUTES") {
        Ok(value) => parse_session_ttl_minutes(value.as_str())?,
        Err(_) => DEFAULT_SESSION_TTL_MINUTES,
    };

    Ok(chrono::Duration::minutes(minutes))
}

fn parse_session_ttl_minutes(value: &str) -> Result<i64, AppError> {
    let minutes = value
        .trim()
        .parse::<i64>()
        .map_err(|error| AppError::Validation(format!("invalid SESSION_TTL_MINUTES: {error}")))?;
    if minutes <= 0 {
        return Err(AppError::Validation(
            "SESSION_TTL_MINUTES must be positive".to_owned(),
        ));
    }

    Ok(minutes)
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use tripcover_core::AppError;

    use super::{ApiConfig, parse_session_ttl_minutes};

    #[test]
    fn session_ttl_accepts_positive_minutes() {
        assert!(matches!(parse_session_ttl_minutes(" 30 "), Ok(30)));
    }

    #[test]
    fn session_ttl_rejects_zero_and_garbage() {
        assert!(matches!(
            parse_session_ttl_minutes("0"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_session_ttl_minutes("soon"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn socket_address_rejects_hostnames() {
        let config = ApiConfig {
            migrate_only: false,
            database_url: "postgres://localhost/tripcover".to_owned(),
            database_max_connections: 1,
            frontend_url: "http://localhost:3000".to_owned(),
            api_host: "localhost".to_owned(),
            api_port: 3001,
            session_ttl: chrono::Duration::minutes(5),
        };

        assert!(matches!(
            config.socket_address(),
            Err(AppError::Validation(_))
        ));
    }
}
