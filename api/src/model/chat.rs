use kernel::model::id::ChatId;
use serde::Deserialize;

/// Webhook で受け取る更新イベント
/// Bot API のペイロードのうち、必要なフィールドだけを拾う
#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
    pub callback_query: Option<CallbackQuery>,
}

impl TelegramUpdate {
    /// 返信先のチャット ID
    pub fn chat_id(&self) -> Option<ChatId> {
        if let Some(message) = &self.message {
            return Some(ChatId::new(message.chat.id));
        }
        self.callback_query
            .as_ref()
            .map(|query| ChatId::new(query.from.id))
    }
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub from: Option<TelegramUser>,
    pub chat: TelegramChat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: TelegramUser,
    pub data: Option<String>,
}

/// テキストコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Start,
    Events,
    MyEvents,
    Help,
    Profile,
    EditProfile,
    Timezone(Option<String>),
}

impl ChatCommand {
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.trim().split_whitespace();
        let head = parts.next()?;
        // グループチャットでの /command@bot_name 形式にも対応する
        let command = head.split('@').next().unwrap_or(head);
        match command {
            "/start" => Some(Self::Start),
            "/events" => Some(Self::Events),
            "/my_events" => Some(Self::MyEvents),
            "/help" => Some(Self::Help),
            "/profile" => Some(Self::Profile),
            "/edit_profile" => Some(Self::EditProfile),
            "/timezone" => Some(Self::Timezone(parts.next().map(Into::into))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_commands_are_parsed() {
        assert_eq!(ChatCommand::parse("/start"), Some(ChatCommand::Start));
        assert_eq!(ChatCommand::parse("/events"), Some(ChatCommand::Events));
        assert_eq!(ChatCommand::parse("/my_events"), Some(ChatCommand::MyEvents));
        assert_eq!(ChatCommand::parse("/help"), Some(ChatCommand::Help));
        assert_eq!(ChatCommand::parse("/profile"), Some(ChatCommand::Profile));
        assert_eq!(
            ChatCommand::parse("/edit_profile"),
            Some(ChatCommand::EditProfile)
        );
    }

    #[test]
    fn timezone_takes_an_optional_argument() {
        assert_eq!(
            ChatCommand::parse("/timezone"),
            Some(ChatCommand::Timezone(None))
        );
        assert_eq!(
            ChatCommand::parse("/timezone Asia/Tokyo"),
            Some(ChatCommand::Timezone(Some("Asia/Tokyo".into())))
        );
    }

    #[test]
    fn bot_mention_suffix_is_ignored() {
        assert_eq!(
            ChatCommand::parse("/events@ai_community_bot"),
            Some(ChatCommand::Events)
        );
    }

    #[test]
    fn unknown_commands_are_rejected() {
        assert_eq!(ChatCommand::parse("/unknown"), None);
        assert_eq!(ChatCommand::parse("hello"), None);
    }
}
