use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::home_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/", get(home_controller::get_home))
        .route("/trades", post(home_controller::post_trade))
        .route("/health", get(home_controller::health))
}
