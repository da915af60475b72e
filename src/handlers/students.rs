use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use chrono::NaiveDate;
use model::entities::log_entry;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use validator::Validate;

use super::{DISPLAY_DATE_FORMAT, STUDENT_DASHBOARD_PATH};
use crate::auth::{permissions::verify_csrf, Identity, StudentUser};
use crate::error::AppError;
use crate::forms::{field_messages, parse_iso_date, validate_iso_date, INVALID_DATE};
use crate::schemas::AppState;
use crate::templates::{page_context, render};

/// A log entry as shown on a page
#[derive(Debug, Serialize)]
pub struct LogEntryView {
    pub id: i32,
    pub date: String,
    pub activity_description: String,
    /// Display name of the student who wrote it
    pub student: String,
}

impl LogEntryView {
    pub fn new(model: log_entry::Model, student: String) -> Self {
        Self {
            id: model.id,
            date: model.date.format(DISPLAY_DATE_FORMAT).to_string(),
            activity_description: model.activity_description,
            student,
        }
    }
}

/// Body of the new log entry form.
/// The owning student is never read from the form.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct LogEntryForm {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "This field is required."),
        custom(function = "validate_iso_date")
    )]
    pub date: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub activity_description: String,
    #[serde(default)]
    pub csrf_token: String,
}

/// Per-field messages for a rejected log entry form
#[derive(Debug, Default, Serialize)]
pub struct LogEntryFormErrors {
    pub date: Vec<String>,
    pub activity_description: Vec<String>,
}

/// A log entry form that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanLogEntry {
    pub date: NaiveDate,
    pub activity_description: String,
}

impl LogEntryForm {
    /// Strip surrounding whitespace before validation.
    fn trimmed(self) -> Self {
        Self {
            date: self.date.trim().to_string(),
            activity_description: self.activity_description.trim().to_string(),
            csrf_token: self.csrf_token,
        }
    }

    pub fn clean(&self) -> Result<CleanLogEntry, LogEntryFormErrors> {
        if let Err(errors) = self.validate() {
            return Err(LogEntryFormErrors {
                date: field_messages(&errors, "date"),
                activity_description: field_messages(&errors, "activity_description"),
            });
        }

        match parse_iso_date(&self.date) {
            Some(date) => Ok(CleanLogEntry {
                date,
                activity_description: self.activity_description.clone(),
            }),
            None => Err(LogEntryFormErrors {
                date: vec![INVALID_DATE.to_string()],
                ..Default::default()
            }),
        }
    }
}

fn render_log_form(
    state: &AppState,
    identity: &Identity,
    form: &LogEntryForm,
    errors: &LogEntryFormErrors,
) -> Result<Response, AppError> {
    let mut context = page_context(Some(identity));
    context.insert("form", form);
    context.insert("errors", errors);
    Ok(render(state, "logentry_form.html", &context)?.into_response())
}

/// The signed-in student's own logs, newest first
#[instrument(skip_all)]
pub async fn student_dashboard(
    State(state): State<AppState>,
    StudentUser(identity): StudentUser,
) -> Result<Response, AppError> {
    trace!("Entering student_dashboard function");

    let logs = log_entry::Entity::find()
        .filter(log_entry::Column::StudentId.eq(identity.user.id))
        .order_by_desc(log_entry::Column::Date)
        .order_by_desc(log_entry::Column::Id)
        .all(&state.db)
        .await?;
    debug!("Retrieved {} log entries for '{}'", logs.len(), identity.user.username);

    let student = identity.user.display_name();
    let logs: Vec<LogEntryView> = logs
        .into_iter()
        .map(|log| LogEntryView::new(log, student.clone()))
        .collect();

    let mut context = page_context(Some(&identity));
    context.insert("logs", &logs);
    Ok(render(&state, "student_dashboard.html", &context)?.into_response())
}

/// Empty log entry form
#[instrument(skip_all)]
pub async fn logentry_form(
    State(state): State<AppState>,
    StudentUser(identity): StudentUser,
) -> Result<Response, AppError> {
    trace!("Entering logentry_form function");
    render_log_form(
        &state,
        &identity,
        &LogEntryForm::default(),
        &LogEntryFormErrors::default(),
    )
}

/// Save a new log entry for the signed-in student
#[instrument(skip_all)]
pub async fn logentry_create(
    State(state): State<AppState>,
    StudentUser(identity): StudentUser,
    Form(form): Form<LogEntryForm>,
) -> Result<Response, AppError> {
    trace!("Entering logentry_create function");
    verify_csrf(&identity, &form.csrf_token)?;

    let form = form.trimmed();
    let clean = match form.clean() {
        Ok(clean) => clean,
        Err(errors) => {
            debug!("Rejected log entry form: {:?}", errors);
            return render_log_form(&state, &identity, &form, &errors);
        }
    };

    let new_log = log_entry::ActiveModel {
        student_id: Set(identity.user.id),
        date: Set(clean.date),
        activity_description: Set(clean.activity_description),
        ..Default::default()
    };

    let log = new_log.insert(&state.db).await?;
    info!(
        "Log entry created successfully with ID: {}, student: {}, date: {}",
        log.id, identity.user.username, log.date
    );

    Ok(Redirect::to(STUDENT_DASHBOARD_PATH).into_response())
}
