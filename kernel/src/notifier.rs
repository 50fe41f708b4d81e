use crate::model::chat::OutboundMessage;
use crate::model::id::ChatId;
use async_trait::async_trait;

/// チャットへの送信チャネル
/// 実装はメッセージング API への HTTP 呼び出しを担う
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, chat_id: ChatId, message: OutboundMessage)
        -> shared::error::AppResult<()>;
    async fn answer_callback(&self, callback_id: &str) -> shared::error::AppResult<()>;
}
