//! Bearer session issuance and validation.
//!
//! Raw tokens are handed out once and only their SHA-256 hashes are stored.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::info;
use tripcover_core::{AppError, AppResult, UserId, UserIdentity};

use crate::UserAccessRepository;

mod token_crypto;


use token_crypto::{generate_token, hash_token};

/// Repository port for session persistence.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Stores a session keyed by the token hash.
    async fn create_session(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Resolves the identity behind a session that has not expired at `now`.
    async fn find_identity_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<UserIdentity>>;

    /// Deletes a session. Deleting an unknown session is a no-op.
    async fn delete_session(&self, token_hash: &str) -> AppResult<()>;
}

/// Raw session token returned to the caller exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    /// Hex-encoded bearer token.
    pub token: String,
    /// Expiry of the session.
    pub expires_at: DateTime<Utc>,
}

/// Application service for bearer sessions.
#[derive(Clone)]
pub struct SessionService {
    session_repository: Arc<dyn SessionRepository>,
    user_repository: Arc<dyn UserAccessRepository>,
    ttl: Duration,
}

impl SessionService {
    /// Creates a new session service.
    #[must_use]
    pub fn new(
        session_repository: Arc<dyn SessionRepository>,
        user_repository: Arc<dyn UserAccessRepository>,
        ttl: Duration,
    ) -> Self {
        Self {
            session_repository,
            user_repository,
            ttl,
        }
    }

    /// Issues a new session for an existing user.
    pub async fn issue_session(&self, user_id: UserId) -> AppResult<IssuedSession> {
        if self.user_repository.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("user '{user_id}' was not found")));
        }

        let (token, token_hash) = generate_token()?;
        let expires_at = Utc::now() + self.ttl;
        self.session_repository
            .create_session(user_id, token_hash.as_str(), expires_at)
            .await?;

        info!(%user_id, %expires_at, "session issued");
        Ok(IssuedSession { token, expires_at })
    }

    /// Resolves the identity behind a raw bearer token.
    pub async fn authenticate(&self, token: &str) -> AppResult<UserIdentity> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::Unauthorized("missing session token".to_owned()));
        }

        self.session_repository
            .find_identity_by_token_hash(hash_token(token).as_str(), Utc::now())
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid or expired session".to_owned()))
    }

    /// Revokes the session behind a raw bearer token.
    pub async fn revoke_session(&self, token: &str) -> AppResult<()> {
        self.session_repository
            .delete_session(hash_token(token.trim()).as_str())
            .await
    }
}
