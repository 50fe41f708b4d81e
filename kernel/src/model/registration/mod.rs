use crate::model::id::{ChatId, EventId, RegistrationId, UserId};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub mod event;

/// ユーザーとイベントを結ぶ参加登録
/// 一覧表示で必要になる範囲のユーザー・イベント情報を同梱する
#[derive(Debug, Clone)]
pub struct Registration {
    pub registration_id: RegistrationId,
    pub registered_at: DateTime<Utc>,
    pub user: RegistrationUser,
    pub event: RegistrationEvent,
}

#[derive(Debug, Clone)]
pub struct RegistrationUser {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub display_name: String,
    pub timezone: Tz,
}

#[derive(Debug, Clone)]
pub struct RegistrationEvent {
    pub event_id: EventId,
    pub title: String,
    pub event_datetime: DateTime<Utc>,
    pub description: Option<String>,
    pub webinar_link: Option<String>,
}

/// 座席予約の結果
/// 永続化エラーは AppError で表現し、業務上の拒否理由はこの型で表現する
#[derive(Debug)]
pub enum BookingOutcome {
    Booked(NewBooking),
    UserNotFound,
    EventNotFound,
    AlreadyRegistered,
    EventFull,
}

#[derive(Debug)]
pub struct NewBooking {
    pub registration_id: RegistrationId,
    pub seats_left: i64,
    pub event: RegistrationEvent,
    /// 登録したユーザーのタイムゾーン（リマインダー表示用）
    pub timezone: Tz,
}

/// キャンセル済み登録。リマインダー解除に必要なキーを保持する
#[derive(Debug)]
pub struct CancelledRegistration {
    pub registration_id: RegistrationId,
    pub chat_id: ChatId,
    pub event_id: EventId,
    pub event_title: String,
}
