//! HTML pages rendered with Handlebars from templates embedded at build time.

use axum::http::StatusCode;
use handlebars::{Handlebars, RenderError};
use serde_json::json;
use std::sync::LazyLock;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.hbs");
const ERROR_TEMPLATE: &str = include_str!("../templates/error.hbs");

static HANDLEBARS: LazyLock<Handlebars<'static>> = LazyLock::new(|| {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars
});

/// Login page linking to the provider's consent screen.
pub fn render_home(google_auth_url: &str) -> Result<String, RenderError> {
    HANDLEBARS.render_template(
        INDEX_TEMPLATE,
        &json!({ "google_auth_url": google_auth_url }),
    )
}

/// The single error page used for every user-facing failure.
pub fn render_error(status: StatusCode, detail: &str) -> Result<String, RenderError> {
    HANDLEBARS.render_template(
        ERROR_TEMPLATE,
        &json!({ "status": status.as_u16(), "detail": detail }),
    )
}
