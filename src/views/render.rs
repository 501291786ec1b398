use serde_json::json;

use crate::{services::notifications::Toast, views::models::View, AppState};

/// Active navbar entry and whether the signed-in links are shown.
#[derive(Debug, Clone, Copy)]
pub struct Chrome<'a> {
    pub title: &'a str,
    pub nav: &'a str,
    pub signed_in: bool,
}

pub fn render_full(
    state: &AppState,
    chrome: Chrome<'_>,
    body_html: String,
    toasts: &[Toast],
) -> Result<String, String> {
    let mut nav = serde_json::Map::new();
    nav.insert(chrome.nav.to_string(), json!(true));

    let ctx = json!({
        "title": chrome.title,
        "body": body_html,
        "is_logged_in": chrome.signed_in,
        "nav": nav,
        "toasts": toasts,
    });

    state
        .hbs
        .render("layouts/base", &ctx)
        .map_err(|e| e.to_string())
}

/// A page template with the initial view already rendered into it.
pub fn render_page(state: &AppState, page: &str, view: Option<&View>) -> Result<String, String> {
    let mut ctx = json!({ "content": null, "modal": null });

    if let Some(v) = view {
        let html = render_view(state, v)?;
        let slot = if v.target() == "#modal" { "modal" } else { "content" };
        ctx[slot] = json!(html);
    }

    state.hbs.render(page, &ctx).map_err(|e| e.to_string())
}

pub fn render_view(state: &AppState, view: &View) -> Result<String, String> {
    view.render(&state.hbs).map_err(|e| {
        tracing::error!(template = view.template(), "render failed: {e}");
        e.to_string()
    })
}

/// Toasts appended to `#toasts` by htmx out of band.
pub fn render_toasts_oob(state: &AppState, toasts: &[Toast]) -> Result<String, String> {
    if toasts.is_empty() {
        return Ok(String::new());
    }

    state
        .hbs
        .render("partials/toasts", &json!({ "toasts": toasts }))
        .map_err(|e| e.to_string())
}
