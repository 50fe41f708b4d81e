use chrono::{DateTime, Utc};
use kernel::model::{
    id::{ChatId, UserId},
    user::User,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    pub items: Vec<UserResponse>,
}

impl From<Vec<User>> for UsersResponse {
    fn from(value: Vec<User>) -> Self {
        Self {
            items: value.into_iter().map(UserResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
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

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let User {
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
        Self {
            user_id,
            chat_id,
            username,
            full_name,
            company,
            role,
            ai_experience: ai_experience.map(|v| v.as_ref().to_string()),
            email,
            timezone: timezone.name().to_string(),
            is_profile_complete,
            created_at,
        }
    }
}
