use chrono::{DateTime, Utc};
use kernel::model::{
    event::{Event, EventListing},
    id::EventId,
};

/// イベント 1 件と現在の登録数を一緒に取得するための型
#[derive(sqlx::FromRow)]
pub struct EventRow {
    pub event_id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub event_datetime: DateTime<Utc>,
    pub webinar_link: Option<String>,
    pub capacity: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub registration_count: i64,
}

impl From<EventRow> for EventListing {
    fn from(value: EventRow) -> Self {
        let EventRow {
            event_id,
            title,
            description,
            event_datetime,
            webinar_link,
            capacity,
            image_url,
            created_at,
            registration_count,
        } = value;
        EventListing {
            event: Event {
                event_id,
                title,
                description,
                event_datetime,
                webinar_link,
                capacity,
                image_url,
                created_at,
            },
            registration_count,
        }
    }
}
