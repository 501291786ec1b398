use axum::{Router, routing::get};
use crate::{AppState, controllers::list_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/list", get(list_controller::get_list_page))
        .route("/list/trades", get(list_controller::get_list_trades))
        .route("/list/pnl", get(list_controller::get_list_pnl))
}
