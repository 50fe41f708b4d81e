use super::{
    event::build_event_routers, export::build_export_routers, health::build_health_check_routers,
    registration::build_registration_routers, stats::build_stats_routers, user::build_user_routers,
};
use axum::Router;
use registry::AppRegistry;

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(build_health_check_routers())
        .merge(build_event_routers())
        .merge(build_user_routers())
        .merge(build_registration_routers())
        .merge(build_stats_routers())
        .merge(build_export_routers());
    Router::new().nest("/api/v1", router)
}
