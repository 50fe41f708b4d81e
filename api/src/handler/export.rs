use crate::extractor::ExportCredential;
use crate::model::event::{EventExportQuery, PaginatedEventsResponse};
use axum::{
    extract::{Query, State},
    Json,
};
use garde::Validate;
use registry::AppRegistry;
use shared::error::AppResult;

/// 認証つきのイベント一覧エクスポート
pub async fn export_events(
    _credential: ExportCredential,
    Query(query): Query<EventExportQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PaginatedEventsResponse>> {
    query.validate(&())?;

    let page = registry
        .event_repository()
        .find_page(query.limit(), query.offset())
        .await?;

    Ok(Json(PaginatedEventsResponse::from_page(&query, page)))
}
