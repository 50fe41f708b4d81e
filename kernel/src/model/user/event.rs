use crate::model::id::ChatId;
use crate::model::user::AiExperience;
use chrono_tz::Tz;
use derive_new::new;

/// 初回コンタクト時のユーザー作成
#[derive(new)]
pub struct CreateUser {
    pub chat_id: ChatId,
    pub username: Option<String>,
}

/// 登録フロー完了時にプロフィールを確定させる
#[derive(Debug, new)]
pub struct CompleteProfile {
    pub chat_id: ChatId,
    pub full_name: String,
    pub company: String,
    pub role: String,
    pub ai_experience: AiExperience,
    pub email: String,
}

#[derive(new)]
pub struct UpdateTimezone {
    pub chat_id: ChatId,
    pub timezone: Tz,
}
