use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use kernel::model::{
    id::{ChatId, EventId, RegistrationId, UserId},
    registration::{Registration, RegistrationEvent, RegistrationUser},
};

/// 参加登録一覧用の型。users・events を JOIN した結果を受ける
#[derive(sqlx::FromRow)]
pub struct RegistrationRow {
    pub registration_id: RegistrationId,
    pub registered_at: DateTime<Utc>,
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub timezone: String,
    pub event_id: EventId,
    pub title: String,
    pub event_datetime: DateTime<Utc>,
    pub description: Option<String>,
    pub webinar_link: Option<String>,
}

impl From<RegistrationRow> for Registration {
    fn from(value: RegistrationRow) -> Self {
        let RegistrationRow {
            registration_id,
            registered_at,
            user_id,
            chat_id,
            username,
            full_name,
            timezone,
            event_id,
            title,
            event_datetime,
            description,
            webinar_link,
        } = value;
        Registration {
            registration_id,
            registered_at,
            user: RegistrationUser {
                user_id,
                chat_id,
                display_name: full_name
                    .or(username)
                    .unwrap_or_else(|| chat_id.to_string()),
                timezone: timezone.parse().unwrap_or(Tz::UTC),
            },
            event: RegistrationEvent {
                event_id,
                title,
                event_datetime,
                description,
                webinar_link,
            },
        }
    }
}

/// 予約トランザクション内でのユーザー確認用
#[derive(sqlx::FromRow)]
pub struct BookingUserRow {
    pub user_id: UserId,
    pub timezone: String,
    pub is_profile_complete: bool,
}

/// 予約トランザクション内でロックするイベント行
#[derive(sqlx::FromRow)]
pub struct BookingEventRow {
    pub event_id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub event_datetime: DateTime<Utc>,
    pub webinar_link: Option<String>,
    pub capacity: i32,
}

impl From<BookingEventRow> for RegistrationEvent {
    fn from(value: BookingEventRow) -> Self {
        let BookingEventRow {
            event_id,
            title,
            description,
            event_datetime,
            webinar_link,
            capacity: _,
        } = value;
        RegistrationEvent {
            event_id,
            title,
            event_datetime,
            description,
            webinar_link,
        }
    }
}

/// キャンセル時に削除前の行から拾う情報
#[derive(sqlx::FromRow)]
pub struct CancelledRow {
    pub registration_id: RegistrationId,
    pub event_id: EventId,
    pub chat_id: ChatId,
    pub title: String,
}
