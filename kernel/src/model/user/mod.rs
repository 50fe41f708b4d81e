use crate::model::id::{ChatId, UserId};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

pub mod event;

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub ai_experience: Option<AiExperience>,
    pub email: Option<String>,
    pub timezone: Tz,
    pub is_profile_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// 表示名。プロフィール未入力の間はチャット上のユーザー名で代用する
    pub fn display_name(&self) -> String {
        self.full_name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| self.chat_id.to_string())
    }
}

/// AI 経験のカテゴリ（固定 7 種）
/// 登録フローではフリーテキストではなく、この中から 1 つ選んでもらう
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum AiExperience {
    NoAiNoNeed,
    NoAiWantTo,
    BasicAi,
    AiAgents,
    AiProduct,
    IndustrialAi,
    Other,
}

impl AiExperience {
    pub fn label(self) -> &'static str {
        match self {
            AiExperience::NoAiNoNeed => "AIは使っていない（必要性も感じない）",
            AiExperience::NoAiWantTo => "AIは使っていないが、使ってみたい",
            AiExperience::BasicAi => "基本的な生成AIを使っている（ChatGPTなど）",
            AiExperience::AiAgents => "AIエージェントを作っている",
            AiExperience::AiProduct => "AIプロダクトを開発している",
            AiExperience::IndustrialAi => "産業向けのAIソリューションを開発している",
            AiExperience::Other => "その他",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn ai_experience_token_round_trip() {
        for option in AiExperience::iter() {
            let token = option.as_ref();
            assert_eq!(AiExperience::from_str(token).unwrap(), option);
        }
    }

    #[test]
    fn unknown_ai_experience_token_is_rejected() {
        assert!(AiExperience::from_str("quantum_ai").is_err());
    }
}
