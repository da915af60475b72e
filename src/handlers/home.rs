use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use model::Role;
use tracing::{debug, instrument};

use super::{STUDENT_DASHBOARD_PATH, SUPERVISOR_DASHBOARD_PATH};
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::schemas::AppState;
use crate::templates::{page_context, render};

/// Landing page. Signed-in users are sent straight to their dashboard.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Response, AppError> {
    if let Some(identity) = identity {
        let target = match identity.user.role {
            Role::Student => STUDENT_DASHBOARD_PATH,
            Role::AcademicSupervisor | Role::IndustrySupervisor => SUPERVISOR_DASHBOARD_PATH,
        };
        debug!("Sending '{}' to {}", identity.user.username, target);
        return Ok(Redirect::to(target).into_response());
    }

    let context = page_context(None);
    Ok(render(&state, "home.html", &context)?.into_response())
}
