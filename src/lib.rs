//! Library entrypoint for the stock panel.
//!
//! The binary only wires settings and the listener; integration tests under
//! `tests/` build the same router and state from here.

pub mod config;
pub mod error;
pub mod models;

// Request-level auth lives under `middleware/` but is addressed as `crate::auth`.
#[path = "middleware/auth.rs"]
pub mod auth;

pub mod services;
pub mod views;
pub use views::{render, templates};

pub mod commands;
pub mod controllers;
pub mod routes;

use std::time::Duration;

use services::{api_client::ApiClient, workspace::WorkspaceStore};

#[derive(Clone)]
pub struct AppState {
    pub hbs: templates::Hbs,
    pub settings: config::Settings,
    pub api: ApiClient,
    pub workspaces: WorkspaceStore,
}

impl AppState {
    pub fn new(settings: config::Settings) -> Result<Self, handlebars::TemplateError> {
        let api = ApiClient::new(
            &settings.api_base_url,
            settings.api_timeout_secs.map(Duration::from_secs),
        );

        Ok(Self {
            hbs: templates::build_handlebars()?,
            settings,
            api,
            workspaces: WorkspaceStore::default(),
        })
    }
}
