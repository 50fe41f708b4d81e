use crate::model::id::{ChatId, EventId};
use derive_new::new;

#[derive(Debug, new)]
pub struct CreateRegistration {
    pub chat_id: ChatId,
    pub event_id: EventId,
}
