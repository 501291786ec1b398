use axum::{Router, routing::{get, post}};
use crate::{AppState, controllers::alerts_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/alerts", get(alerts_controller::get_alerts_page).post(alerts_controller::post_create_alert))
        .route("/alerts/list", get(alerts_controller::get_alerts_list))
        .route("/alerts/new", get(alerts_controller::get_new_alert))
        .route("/alerts/bulk", get(alerts_controller::get_bulk).post(alerts_controller::post_bulk_create))
        .route("/alerts/bulk/row", post(alerts_controller::post_bulk_row))
        .route("/alerts/bulk/sample", post(alerts_controller::post_bulk_sample))
        .route("/alerts/:id", post(alerts_controller::post_update_alert))
        .route("/alerts/:id/edit", get(alerts_controller::get_edit_alert))
        .route("/alerts/:id/delete", post(alerts_controller::post_delete_alert))
        .route("/alerts/:id/toggle", post(alerts_controller::post_toggle_alert))
}
