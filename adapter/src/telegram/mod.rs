use async_trait::async_trait;
use kernel::model::chat::{InlineKeyboard, OutboundMessage};
use kernel::model::id::ChatId;
use kernel::notifier::Notifier;
use shared::config::BotConfig;
use shared::error::{AppError, AppResult};

/// Telegram Bot API への送信クライアント
pub struct TelegramNotifier {
    http: reqwest::Client,
    token: String,
}

impl TelegramNotifier {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: config.token.clone(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.token, method)
    }

    async fn post(&self, method: &str, payload: serde_json::Value) -> AppResult<()> {
        let res = self
            .http
            .post(self.endpoint(method))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("{method} request failed: {e}")))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::ExternalServiceError(format!(
                "{method} returned {status}: {body}"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, chat_id: ChatId, message: OutboundMessage) -> AppResult<()> {
        let mut payload = serde_json::json!({
            "chat_id": chat_id.raw(),
            "text": message.text,
        });
        if let Some(keyboard) = &message.keyboard {
            payload["reply_markup"] = reply_markup(keyboard);
        }
        self.post("sendMessage", payload).await
    }

    async fn answer_callback(&self, callback_id: &str) -> AppResult<()> {
        self.post(
            "answerCallbackQuery",
            serde_json::json!({ "callback_query_id": callback_id }),
        )
        .await
    }
}

// インラインキーボードを API の reply_markup 形式へ変換する
fn reply_markup(keyboard: &InlineKeyboard) -> serde_json::Value {
    let rows: Vec<Vec<serde_json::Value>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| {
                    serde_json::json!({
                        "text": button.label,
                        "callback_data": button.action.to_string(),
                    })
                })
                .collect()
        })
        .collect();
    serde_json::json!({ "inline_keyboard": rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::model::callback::CallbackAction;
    use kernel::model::chat::InlineButton;
    use kernel::model::id::EventId;

    #[test]
    fn reply_markup_encodes_callback_tokens() {
        let event_id = EventId::new();
        let keyboard = InlineKeyboard::single_column([InlineButton::new(
            "参加する".into(),
            CallbackAction::Register(event_id),
        )]);

        let markup = reply_markup(&keyboard);
        let button = &markup["inline_keyboard"][0][0];
        assert_eq!(button["text"], "参加する");
        assert_eq!(
            button["callback_data"],
            format!("register_{event_id}")
        );
    }
}
