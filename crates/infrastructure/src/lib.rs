//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_access_control_repository;
mod postgres_access_control_repository;
mod postgres_audit_log_repository;
mod postgres_audit_repository;
mod postgres_session_repository;

pub use in_memory_access_control_repository::InMemoryAccessControlRepository;
pub use postgres_access_control_repository::PostgresAccessControlRepository;
pub use postgres_audit_log_repository::PostgresAuditLogRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_session_repository::PostgresSessionRepository;

/// Embedded SQL migrations for the access control schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
