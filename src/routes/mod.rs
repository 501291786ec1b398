use axum::Router;
use axum::middleware::from_fn_with_state;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{AppState, controllers::home_controller};

pub mod home_routes;
pub mod auth_routes;
pub mod dashboard_routes;
pub mod list_routes;
pub mod alerts_routes;

pub fn app(state: AppState) -> Router {
    let static_dir = state.settings.static_dir.clone();
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = auth_routes::add_routes(router);
    let router = dashboard_routes::add_routes(router);
    let router = list_routes::add_routes(router);
    let router = alerts_routes::add_routes(router);

    router
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(home_controller::not_found)
        .layer(from_fn_with_state(state.clone(), crate::auth::require_auth))
        .layer(from_fn_with_state(state.clone(), crate::auth::inject_token))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
