use chrono::{DateTime, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    event::{
        event::{CreateEvent, UpdateEvent},
        EventListing, PaginatedEvents,
    },
    id::EventId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[garde(length(min = 1))]
    pub title: String,
    #[garde(skip)]
    pub description: Option<String>,
    #[garde(skip)]
    pub event_datetime: DateTime<Utc>,
    #[garde(skip)]
    pub webinar_link: Option<String>,
    #[garde(range(min = 1))]
    pub capacity: i32,
    #[garde(skip)]
    pub image_url: Option<String>,
}

impl From<CreateEventRequest> for CreateEvent {
    fn from(value: CreateEventRequest) -> Self {
        let CreateEventRequest {
            title,
            description,
            event_datetime,
            webinar_link,
            capacity,
            image_url,
        } = value;
        CreateEvent {
            title,
            description,
            event_datetime,
            webinar_link,
            capacity,
            image_url,
        }
    }
}

/// None のフィールドは変更しない
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[garde(inner(length(min = 1)))]
    pub title: Option<String>,
    #[garde(skip)]
    pub description: Option<String>,
    #[garde(skip)]
    pub event_datetime: Option<DateTime<Utc>>,
    #[garde(skip)]
    pub webinar_link: Option<String>,
    #[garde(inner(range(min = 1)))]
    pub capacity: Option<i32>,
    #[garde(skip)]
    pub image_url: Option<String>,
}

#[derive(new)]
pub struct UpdateEventRequestWithId(EventId, UpdateEventRequest);

impl From<UpdateEventRequestWithId> for UpdateEvent {
    fn from(value: UpdateEventRequestWithId) -> Self {
        let UpdateEventRequestWithId(
            event_id,
            UpdateEventRequest {
                title,
                description,
                event_datetime,
                webinar_link,
                capacity,
                image_url,
            },
        ) = value;
        UpdateEvent {
            event_id,
            title,
            description,
            event_datetime,
            webinar_link,
            capacity,
            image_url,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEventResponse {
    pub event_id: EventId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub event_id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub event_datetime: DateTime<Utc>,
    pub webinar_link: Option<String>,
    pub capacity: i32,
    pub image_url: Option<String>,
    pub registration_count: i64,
    pub seats_left: i64,
    pub is_full: bool,
    pub created_at: DateTime<Utc>,
}

impl From<EventListing> for EventResponse {
    fn from(value: EventListing) -> Self {
        let seats_left = value.seats_left();
        let is_full = value.is_full();
        let EventListing {
            event,
            registration_count,
        } = value;
        Self {
            event_id: event.event_id,
            title: event.title,
            description: event.description,
            event_datetime: event.event_datetime,
            webinar_link: event.webinar_link,
            capacity: event.capacity,
            image_url: event.image_url,
            registration_count,
            seats_left,
            is_full,
            created_at: event.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub items: Vec<EventResponse>,
}

impl From<Vec<EventListing>> for EventsResponse {
    fn from(value: Vec<EventListing>) -> Self {
        Self {
            items: value.into_iter().map(EventResponse::from).collect(),
        }
    }
}

/// per_page はこの値で頭打ちにする
const MAX_PER_PAGE: i64 = 100;
const DEFAULT_PER_PAGE: i64 = 50;

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    DEFAULT_PER_PAGE
}

#[derive(Debug, Deserialize, Validate)]
pub struct EventExportQuery {
    #[garde(range(min = 1))]
    #[serde(default = "default_page")]
    pub page: i64,
    #[garde(range(min = 1))]
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

impl EventExportQuery {
    pub fn limit(&self) -> i64 {
        self.per_page.min(MAX_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedEventsResponse {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub items: Vec<EventResponse>,
}

impl PaginatedEventsResponse {
    pub fn from_page(query: &EventExportQuery, page: PaginatedEvents) -> Self {
        Self {
            total: page.total,
            page: query.page,
            per_page: query.limit(),
            items: page.items.into_iter().map(EventResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_page_is_capped() {
        let query = EventExportQuery {
            page: 1,
            per_page: 10_000,
        };
        assert_eq!(query.limit(), MAX_PER_PAGE);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn offset_uses_the_capped_page_size() {
        let query = EventExportQuery {
            page: 3,
            per_page: 20,
        };
        assert_eq!(query.limit(), 20);
        assert_eq!(query.offset(), 40);
    }

    #[test]
    fn page_zero_is_a_validation_error() {
        let query = EventExportQuery {
            page: 0,
            per_page: 20,
        };
        assert!(query.validate(&()).is_err());
    }
}
