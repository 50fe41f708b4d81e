use axum::{routing::get, Router};
use registry::AppRegistry;

use crate::handler::export::export_events;

pub fn build_export_routers() -> Router<AppRegistry> {
    Router::new().route("/export/events", get(export_events))
}
