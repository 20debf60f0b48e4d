use async_trait::async_trait;

use tripcover_application::{
    AuditEvent, AuditLogQuery, AuditLogRepository, AuditRepository, SessionRepository,
};
use tripcover_core::UserIdentity;

use super::*;

#[async_trait]
impl SessionRepository for InMemoryAccessControlRepository {
    async fn create_session(
        &self,
        user_id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("user '{user_id}' was not found")));
        }
        if state.sessions.contains_key(token_hash) {
            return Err(AppError::Conflict("session token already exists".to_owned()));
        }

        state
            .sessions
            .insert(token_hash.to_owned(), (user_id, expires_at));
        Ok(())
    }

    async fn find_identity_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<UserIdentity>> {
        let state = self.state.read().await;
        Ok(state
            .sessions
            .get(token_hash)
            .filter(|(_, expires_at)| *expires_at > now)
            .and_then(|(user_id, _)| state.users.get(user_id))
            .map(|user| {
                UserIdentity::new(
                    user.user_id,
                    user.display_name.as_str(),
                    user.email.as_str(),
                )
            }))
    }

    async fn delete_session(&self, token_hash: &str) -> AppResult<()> {
        self.state.write().await.sessions.remove(token_hash);
        Ok(())
    }
}

#[async_trait]
impl AuditRepository for InMemoryAccessControlRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.write().await.audit_entries.push(AuditLogEntry {
            event_id: new_id(),
            subject: event.subject,
            action: event.action.as_str().to_owned(),
            resource_type: event.resource_type,
            resource_id: event.resource_id,
            detail: event.detail,
            created_at: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryAccessControlRepository {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .state
            .read()
            .await
            .audit_entries
            .iter()
            .rev()
            .filter(|entry| {
                query
                    .action
                    .as_deref()
                    .is_none_or(|action| entry.action == action)
            })
            .filter(|entry| {
                query
                    .subject
                    .as_deref()
                    .is_none_or(|subject| entry.subject == subject)
            })
            .skip(query.offset)
            .take(query.limit.clamp(1, 200))
            .cloned()
            .collect())
    }
}
