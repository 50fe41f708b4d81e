use crate::model::id::EventId;
use chrono::{DateTime, Utc};

pub mod event;

#[derive(Debug, Clone)]
pub struct Event {
    pub event_id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub event_datetime: DateTime<Utc>,
    pub webinar_link: Option<String>,
    pub capacity: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// イベントと現在の登録数をあわせて扱う型
/// 残席数・満席判定はここから導出する（保存はしない）
#[derive(Debug, Clone)]
pub struct EventListing {
    pub event: Event,
    pub registration_count: i64,
}

impl EventListing {
    pub fn seats_left(&self) -> i64 {
        (i64::from(self.event.capacity) - self.registration_count).max(0)
    }

    pub fn is_full(&self) -> bool {
        self.registration_count >= i64::from(self.event.capacity)
    }
}

/// エクスポート API のページネーション結果
#[derive(Debug)]
pub struct PaginatedEvents {
    pub total: i64,
    pub items: Vec<EventListing>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(capacity: i32, registration_count: i64) -> EventListing {
        EventListing {
            event: Event {
                event_id: EventId::new(),
                title: "Test Event".into(),
                description: None,
                event_datetime: Utc::now(),
                webinar_link: None,
                capacity,
                image_url: None,
                created_at: Utc::now(),
            },
            registration_count,
        }
    }

    #[test]
    fn seats_left_is_derived_from_capacity() {
        assert_eq!(listing(10, 3).seats_left(), 7);
        assert!(!listing(10, 3).is_full());
    }

    #[test]
    fn full_event_has_no_seats() {
        assert_eq!(listing(5, 5).seats_left(), 0);
        assert!(listing(5, 5).is_full());
        // 定員超過したデータがあっても負の残席にはしない
        assert_eq!(listing(5, 6).seats_left(), 0);
    }
}
