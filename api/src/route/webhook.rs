use axum::{routing::post, Router};
use registry::AppRegistry;

use crate::handler::webhook::handle_telegram_webhook;

pub fn build_webhook_routers() -> Router<AppRegistry> {
    Router::new().route("/webhook/telegram", post(handle_telegram_webhook))
}
