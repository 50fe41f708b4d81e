use axum::{routing::get, Router};
use registry::AppRegistry;

use crate::handler::registration::show_registration_list;

pub fn build_registration_routers() -> Router<AppRegistry> {
    Router::new().route("/registrations", get(show_registration_list))
}
