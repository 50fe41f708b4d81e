use crate::model::id::ChatId;
use crate::model::session::RegistrationSession;
use async_trait::async_trait;
use shared::error::AppResult;

/// 登録フローのセッション保管
/// 実装側で TTL を付け、放置されたセッションを自動破棄する
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find(&self, chat_id: ChatId) -> AppResult<Option<RegistrationSession>>;
    async fn store(&self, chat_id: ChatId, session: &RegistrationSession) -> AppResult<()>;
    async fn delete(&self, chat_id: ChatId) -> AppResult<()>;
}
