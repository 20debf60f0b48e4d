use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use tripcover_application::SessionRepository;
use tripcover_core::{AppError, AppResult, UserId, UserIdentity};

/// PostgreSQL-backed store for hashed bearer sessions.
#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SessionIdentityRow {
    user_id: uuid::Uuid,
    email: String,
    display_name: String,
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn create_session(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_sessions (token_hash, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(token_hash)
        .bind(user_id.as_uuid())
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create session: {error}")))?;

        Ok(())
    }

    async fn find_identity_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<UserIdentity>> {
        let row = sqlx::query_as::<_, SessionIdentityRow>(
            r#"
            SELECT users.id AS user_id, users.email, users.display_name
            FROM user_sessions AS sessions
            INNER JOIN users
                ON users.id = sessions.user_id
            WHERE sessions.token_hash = $1
                AND sessions.expires_at > $2
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve session: {error}")))?;

        Ok(row.map(|row| {
            UserIdentity::new(UserId::from_uuid(row.user_id), row.display_name, row.email)
        }))
    }

    async fn delete_session(&self, token_hash: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM user_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

        Ok(())
    }
}
