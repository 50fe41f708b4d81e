use crate::model::registration::RegistrationsResponse;
use axum::{extract::State, Json};
use registry::AppRegistry;
use shared::error::AppResult;

pub async fn show_registration_list(
    State(registry): State<AppRegistry>,
) -> AppResult<Json<RegistrationsResponse>> {
    registry
        .registration_repository()
        .find_all()
        .await
        .map(RegistrationsResponse::from)
        .map(Json)
}
