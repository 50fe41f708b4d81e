use axum::{routing::get, Router};
use registry::AppRegistry;

use crate::handler::user::show_user_list;

pub fn build_user_routers() -> Router<AppRegistry> {
    Router::new().route("/users", get(show_user_list))
}
