pub mod api_client;
pub mod notifications;
pub mod session;

pub mod alerts_service;
pub mod auth_service;
pub mod dashboard_service;
pub mod list_service;
pub mod pnl_service;
pub mod trades_service;

pub mod workspace;
