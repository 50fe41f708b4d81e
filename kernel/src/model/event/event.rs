use crate::model::id::EventId;
use chrono::{DateTime, Utc};
use derive_new::new;

#[derive(Debug, new)]
pub struct CreateEvent {
    pub title: String,
    pub description: Option<String>,
    pub event_datetime: DateTime<Utc>,
    pub webinar_link: Option<String>,
    pub capacity: i32,
    pub image_url: Option<String>,
}

/// None のフィールドは更新しない
#[derive(Debug)]
pub struct UpdateEvent {
    pub event_id: EventId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_datetime: Option<DateTime<Utc>>,
    pub webinar_link: Option<String>,
    pub capacity: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug)]
pub struct DeleteEvent {
    pub event_id: EventId,
}
