use chrono::{DateTime, Utc};
use kernel::model::{
    id::{ChatId, EventId, RegistrationId, UserId},
    registration::Registration,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationsResponse {
    pub items: Vec<RegistrationResponse>,
}

impl From<Vec<Registration>> for RegistrationsResponse {
    fn from(value: Vec<Registration>) -> Self {
        Self {
            items: value.into_iter().map(RegistrationResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub registration_id: RegistrationId,
    pub registered_at: DateTime<Utc>,
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub display_name: String,
    pub event_id: EventId,
    pub event_title: String,
    pub event_datetime: DateTime<Utc>,
}

impl From<Registration> for RegistrationResponse {
    fn from(value: Registration) -> Self {
        let Registration {
            registration_id,
            registered_at,
            user,
            event,
        } = value;
        Self {
            registration_id,
            registered_at,
            user_id: user.user_id,
            chat_id: user.chat_id,
            display_name: user.display_name,
            event_id: event.event_id,
            event_title: event.title,
            event_datetime: event.event_datetime,
        }
    }
}
