use crate::model::event::{
    CreateEventRequest, CreatedEventResponse, EventResponse, EventsResponse, UpdateEventRequest,
    UpdateEventRequestWithId,
};
use adapter::scheduler::{ReminderKey, ReminderRequest};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{event::event::DeleteEvent, id::EventId};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn register_event(
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<CreatedEventResponse>)> {
    req.validate(&())?;

    registry
        .event_repository()
        .create(req.into())
        .await
        .map(|event_id| (StatusCode::CREATED, Json(CreatedEventResponse { event_id })))
}

pub async fn show_event_list(
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventsResponse>> {
    registry
        .event_repository()
        .find_all()
        .await
        .map(EventsResponse::from)
        .map(Json)
}

pub async fn show_event(
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<EventResponse>> {
    registry
        .event_repository()
        .find_by_id(event_id)
        .await
        .and_then(|listing| match listing {
            Some(listing) => Ok(Json(listing.into())),
            None => Err(AppError::EntityNotFound(format!(
                "イベント（{event_id}）が見つかりませんでした。"
            ))),
        })
}

pub async fn update_event(
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateEventRequest>,
) -> AppResult<StatusCode> {
    req.validate(&())?;

    let datetime_changed = req.event_datetime.is_some();
    let update_event = UpdateEventRequestWithId::new(event_id, req);
    registry
        .event_repository()
        .update(update_event.into())
        .await?;

    // 開催日時が変わった場合は、登録済みユーザーのリマインダーを
    // 新しい日時で登録し直す（同じキーへの schedule は置き換えになる）
    if datetime_changed {
        let registrations = registry
            .registration_repository()
            .find_by_event_id(event_id)
            .await?;
        let scheduler = registry.reminder_scheduler();
        for registration in registrations {
            scheduler.schedule(ReminderRequest::new(
                registration.user.chat_id,
                registration.event.clone(),
                registration.user.timezone,
            ));
        }
    }

    Ok(StatusCode::OK)
}

pub async fn delete_event(
    Path(event_id): Path<EventId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    // 削除前に参加登録を控えておき、削除後にリマインダーを解除する
    let registrations = registry
        .registration_repository()
        .find_by_event_id(event_id)
        .await?;

    registry
        .event_repository()
        .delete(DeleteEvent { event_id })
        .await?;

    let scheduler = registry.reminder_scheduler();
    for registration in registrations {
        scheduler.cancel(ReminderKey {
            chat_id: registration.user.chat_id,
            event_id,
        });
    }

    Ok(StatusCode::OK)
}
