use crate::redis::RedisClient;
use async_trait::async_trait;
use derive_new::new;
use kernel::model::id::ChatId;
use kernel::model::session::RegistrationSession;
use kernel::repository::session::SessionRepository;
use shared::error::{AppError, AppResult};
use std::sync::Arc;

/// 登録フローのセッションを Redis に JSON で保存する
/// TTL を付けているため、放置されたセッションはプロセスを跨いでも
/// いずれ自動的に消える
#[derive(new)]
pub struct SessionRepositoryImpl {
    kv: Arc<RedisClient>,
    ttl: u64,
}

fn session_key(chat_id: ChatId) -> String {
    format!("registration_session:{chat_id}")
}

#[async_trait]
impl SessionRepository for SessionRepositoryImpl {
    async fn find(&self, chat_id: ChatId) -> AppResult<Option<RegistrationSession>> {
        let Some(raw) = self.kv.get(&session_key(chat_id)).await? else {
            return Ok(None);
        };
        let session = serde_json::from_str(&raw)
            .map_err(|e| AppError::ConversionEntityError(e.to_string()))?;
        Ok(Some(session))
    }

    async fn store(&self, chat_id: ChatId, session: &RegistrationSession) -> AppResult<()> {
        let raw = serde_json::to_string(session)
            .map_err(|e| AppError::ConversionEntityError(e.to_string()))?;
        self.kv.set_ex(&session_key(chat_id), &raw, self.ttl).await
    }

    async fn delete(&self, chat_id: ChatId) -> AppResult<()> {
        self.kv.delete(&session_key(chat_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_is_scoped_per_user() {
        assert_eq!(session_key(ChatId::new(42)), "registration_session:42");
    }
}
