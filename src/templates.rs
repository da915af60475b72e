use axum::response::Html;
use serde::Serialize;
use tera::{Context, Tera};
use tracing::{debug, trace};

use crate::auth::Identity;
use crate::error::AppError;
use crate::schemas::AppState;

/// Templates compiled into the binary, keyed by the name handlers render.
const TEMPLATES: [(&str, &str); 8] = [
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("logout.html", include_str!("../templates/logout.html")),
    (
        "student_dashboard.html",
        include_str!("../templates/student_dashboard.html"),
    ),
    (
        "logentry_form.html",
        include_str!("../templates/logentry_form.html"),
    ),
    (
        "supervisor_dashboard.html",
        include_str!("../templates/supervisor_dashboard.html"),
    ),
    ("log_detail.html", include_str!("../templates/log_detail.html")),
];

/// Compile every page template. Fails on the first syntax error.
pub fn build_templates() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.to_vec())?;
    tera.autoescape_on(vec![".html"]);
    debug!("Compiled {} templates", TEMPLATES.len());
    Ok(tera)
}

/// The signed-in user as shown in the page header.
#[derive(Debug, Serialize)]
struct CurrentUser<'a> {
    username: &'a str,
    role_label: &'static str,
}

/// Start a template context carrying the header data every page needs.
pub fn page_context(identity: Option<&Identity>) -> Context {
    let mut context = Context::new();
    let current_user = identity.map(|identity| CurrentUser {
        username: &identity.user.username,
        role_label: identity.user.role.label(),
    });
    context.insert("current_user", &current_user);
    if let Some(identity) = identity {
        context.insert("csrf_token", &identity.csrf_token);
    }
    context
}

/// Render a page to an HTML response body
pub fn render(state: &AppState, template: &str, context: &Context) -> Result<Html<String>, AppError> {
    trace!("Rendering template {}", template);
    let html = state.templates.render(template, context)?;
    Ok(Html(html))
}
