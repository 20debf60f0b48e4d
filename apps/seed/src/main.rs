//! One-shot seeding of the Tripcover permission catalog and system roles.
//!
//! Exits with status 0 when every step succeeded and 1 otherwise.

#![forbid(unsafe_code)]

mod seed_config;

use std::process::ExitCode;
use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tripcover_application::{SeedReport, SeedService, SessionService};
use tripcover_core::{AppError, AppResult};
use tripcover_infrastructure::{MIGRATOR, PostgresAccessControlRepository, PostgresSessionRepository};

use crate::seed_config::SeedConfig;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            error!(%failure, "seeding failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> AppResult<()> {
    let config = SeedConfig::load()?;
    let pool = connect_and_migrate(&config).await?;

    let access_control = Arc::new(PostgresAccessControlRepository::new(pool.clone()));
    let seed_service = SeedService::new(
        access_control.clone(),
        access_control.clone(),
        access_control.clone(),
    );

    let report = seed_service.run(config.admin.clone()).await?;
    log_report(&report);

    if config.issue_admin_session {
        let Some(admin) = report.admin.as_ref() else {
            return Err(AppError::Validation(
                "SEED_ISSUE_ADMIN_SESSION requires SEED_ADMIN_EMAIL".to_owned(),
            ));
        };

        let session_service = SessionService::new(
            Arc::new(PostgresSessionRepository::new(pool)),
            access_control,
            config.session_ttl,
        );
        let session = session_service.issue_session(admin.user_id).await?;

        info!(user_id = %admin.user_id, expires_at = %session.expires_at, "issued admin session");
        println!("{}", session.token);
    }

    Ok(())
}

async fn connect_and_migrate(config: &SeedConfig) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    MIGRATOR
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    Ok(pool)
}

fn log_report(report: &SeedReport) {
    info!(
        created = report.catalog.created,
        updated = report.catalog.updated,
        total = report.catalog.total,
        "permission catalog seeded"
    );
    info!(
        roles_created = report.roles.roles_created,
        roles_updated = report.roles.roles_updated,
        bindings_created = report.roles.bindings_created,
        bindings_updated = report.roles.bindings_updated,
        "system roles seeded"
    );
    if let Some(admin) = &report.admin {
        info!(user_id = %admin.user_id, email = %admin.email, "administrator ensured");
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
