use axum::{routing::get, Router};
use registry::AppRegistry;

use crate::handler::stats::show_stats;

pub fn build_stats_routers() -> Router<AppRegistry> {
    Router::new().route("/stats", get(show_stats))
}
