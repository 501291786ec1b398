use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::dashboard_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/dashboard", get(dashboard_controller::get_dashboard_page))
        .route("/dashboard/data", get(dashboard_controller::get_dashboard_data))
        .route("/dashboard/filter", post(dashboard_controller::post_dashboard_filter))
        .route("/dashboard/reset", post(dashboard_controller::post_dashboard_reset))
}
