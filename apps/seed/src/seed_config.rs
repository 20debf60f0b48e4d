use std::env;

use tripcover_application::SeedAdmin;
use tripcover_core::{AppError, AppResult};

const DEFAULT_SESSION_TTL_MINUTES: i64 = 720;

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub admin: Option<SeedAdmin>,
    pub issue_admin_session: bool,
    pub session_ttl: chrono::Duration,
}

impl SeedConfig {
    pub fn load() -> AppResult<Self> {
        let database_url = required_non_empty_env("DATABASE_URL")?;
        let database_max_connections = parse_env_u32("DATABASE_MAX_CONNECTIONS", 5)?;
        if database_max_connections == 0 {
            return Err(AppError::Validation(
                "DATABASE_MAX_CONNECTIONS must be greater than zero".to_owned(),
            ));
        }

        let admin = optional_env("SEED_ADMIN_EMAIL").map(|email| SeedAdmin {
            display_name: optional_env("SEED_ADMIN_DISPLAY_NAME")
                .unwrap_or_else(|| "Administrator".to_owned()),
            email,
        });

        let issue_admin_session = optional_env("SEED_ISSUE_ADMIN_SESSION")
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));
        if issue_admin_session && admin.is_none() {
            return Err(AppError::Validation(
                "SEED_ISSUE_ADMIN_SESSION requires SEED_ADMIN_EMAIL".to_owned(),
            ));
        }

        let session_ttl_minutes =
            parse_env_i64("SESSION_TTL_MINUTES", DEFAULT_SESSION_TTL_MINUTES)?;
        if session_ttl_minutes <= 0 {
            return Err(AppError::Validation(
                "SESSION_TTL_MINUTES must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            database_max_connections,
            admin,
            issue_admin_session,
            session_ttl: chrono::Duration::minutes(session_ttl_minutes),
        })
    }
}

fn required_non_empty_env(name: &str) -> AppResult<String> {
    optional_env(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_env_u32(name: &str, default: u32) -> AppResult<u32> {
    match env::var(name) {
        Ok(value) => value.trim().parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_i64(name: &str, default: i64) -> AppResult<i64> {
    match env::var(name) {
        Ok(value) => value.trim().parse::<i64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
