use std::net::SocketAddr;

use stock_panel::{config, routes, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stock_panel=info,tower_http=info")),
        )
        .init();

    let settings = config::load();

    let state = match AppState::new(settings.clone()) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("failed to load templates: {e}");
            std::process::exit(1);
        }
    };

    let ip = match settings.host.parse::<std::net::IpAddr>() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::error!(host = %settings.host, "invalid HOST: {e}");
            std::process::exit(1);
        }
    };
    let addr = SocketAddr::from((ip, settings.port));

    let app = routes::app(state);

    tracing::info!(backend = %settings.api_base_url, "listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("bind {addr} failed: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}
