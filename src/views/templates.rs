use handlebars::{Handlebars, TemplateError};
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

// Embedded at compile time.
const TEMPLATES: &[(&str, &str)] = &[
    ("layouts/base", include_str!("../../templates/layouts/base.hbs")),
    // pages
    ("pages/home", include_str!("../../templates/pages/home.hbs")),
    ("pages/login", include_str!("../../templates/pages/login.hbs")),
    ("pages/register", include_str!("../../templates/pages/register.hbs")),
    ("pages/forgot_password", include_str!("../../templates/pages/forgot_password.hbs")),
    ("pages/reset_password", include_str!("../../templates/pages/reset_password.hbs")),
    ("pages/dashboard", include_str!("../../templates/pages/dashboard.hbs")),
    ("pages/list", include_str!("../../templates/pages/list.hbs")),
    ("pages/alerts", include_str!("../../templates/pages/alerts.hbs")),
    ("pages/not_found", include_str!("../../templates/pages/not_found.hbs")),
    // partials
    ("partials/alerts_grid", include_str!("../../templates/partials/alerts_grid.hbs")),
    ("partials/alert_form", include_str!("../../templates/partials/alert_form.hbs")),
    ("partials/confirm", include_str!("../../templates/partials/confirm.hbs")),
    ("partials/bulk_table", include_str!("../../templates/partials/bulk_table.hbs")),
    ("partials/dashboard_body", include_str!("../../templates/partials/dashboard_body.hbs")),
    ("partials/trade_list", include_str!("../../templates/partials/trade_list.hbs")),
    ("partials/pnl_summary", include_str!("../../templates/partials/pnl_summary.hbs")),
    ("partials/trade_form", include_str!("../../templates/partials/trade_form.hbs")),
    ("partials/login_form", include_str!("../../templates/partials/login_form.hbs")),
    ("partials/register_form", include_str!("../../templates/partials/register_form.hbs")),
    ("partials/forgot_password_form", include_str!("../../templates/partials/forgot_password_form.hbs")),
    ("partials/reset_password_form", include_str!("../../templates/partials/reset_password_form.hbs")),
    ("partials/toasts", include_str!("../../templates/partials/toasts.hbs")),
];

const NAVBAR: &str = include_str!("../../templates/partials/navbar.hbs");

pub fn build_handlebars() -> Result<Hbs, TemplateError> {
    let mut hb = Handlebars::new();

    for (name, src) in TEMPLATES {
        hb.register_template_string(name, *src)?;
    }
    hb.register_partial("navbar", NAVBAR)?;

    Ok(Arc::new(hb))
}
