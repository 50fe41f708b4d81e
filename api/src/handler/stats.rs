use crate::model::stats::StatsResponse;
use axum::{extract::State, Json};
use registry::AppRegistry;
use shared::error::AppResult;

pub async fn show_stats(State(registry): State<AppRegistry>) -> AppResult<Json<StatsResponse>> {
    let users = registry.user_repository().count().await?;
    let completed_profiles = registry.user_repository().count_profile_complete().await?;
    let events = registry.event_repository().count().await?;
    let registrations = registry.registration_repository().count().await?;

    Ok(Json(StatsResponse::new(
        users,
        completed_profiles,
        events,
        registrations,
    )))
}
