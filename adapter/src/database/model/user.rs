use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use kernel::model::{
    id::{ChatId, UserId},
    user::User,
};

#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub ai_experience: Option<String>,
    pub email: Option<String>,
    pub timezone: String,
    pub is_profile_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        let UserRow {
            user_id,
            chat_id,
            username,
            full_name,
            company,
            role,
            ai_experience,
            email,
            timezone,
            is_profile_complete,
            created_at,
        } = value;
        User {
            user_id,
            chat_id,
            username,
            full_name,
            company,
            role,
            // カラムには列挙のトークン文字列が入っている
            // 解釈できない値は未設定として扱う
            ai_experience: ai_experience.and_then(|v| v.parse().ok()),
            email,
            timezone: timezone.parse().unwrap_or(Tz::UTC),
            is_profile_complete,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::model::user::AiExperience;

    fn row(ai_experience: Option<&str>, timezone: &str) -> UserRow {
        UserRow {
            user_id: UserId::new(),
            chat_id: ChatId::new(1),
            username: Some("taro".into()),
            full_name: Some("山田 太郎".into()),
            company: Some("Example Inc.".into()),
            role: Some("Backend Engineer".into()),
            ai_experience: ai_experience.map(Into::into),
            email: Some("taro@example.com".into()),
            timezone: timezone.into(),
            is_profile_complete: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn ai_experience_token_is_parsed() {
        let user = User::from(row(Some("ai_agents"), "Asia/Tokyo"));
        assert_eq!(user.ai_experience, Some(AiExperience::AiAgents));
        assert_eq!(user.timezone, chrono_tz::Asia::Tokyo);
    }

    #[test]
    fn unknown_values_fall_back_safely() {
        let user = User::from(row(Some("unknown_token"), "Not/AZone"));
        assert_eq!(user.ai_experience, None);
        assert_eq!(user.timezone, Tz::UTC);
    }
}
