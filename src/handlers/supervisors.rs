use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use model::entities::{comment, log_entry, user};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use validator::Validate;

use super::students::LogEntryView;
use super::{log_detail_path, DISPLAY_TIMESTAMP_FORMAT, SUPERVISOR_DASHBOARD_PATH};
use crate::auth::{
    permissions::{can_review, verify_csrf},
    Identity, SupervisorUser,
};
use crate::error::AppError;
use crate::forms::field_messages;
use crate::roster::{supervisor_roster, RosterEntry};
use crate::schemas::AppState;
use crate::templates::{page_context, render};

/// A rostered student as shown on the supervisor dashboard
#[derive(Debug, Serialize)]
pub struct StudentView {
    pub username: String,
    pub name: String,
    pub matric_no: Option<String>,
    pub course: String,
}

impl From<RosterEntry> for StudentView {
    fn from(entry: RosterEntry) -> Self {
        Self {
            name: entry.user.display_name(),
            username: entry.user.username,
            matric_no: entry.user.matric_no,
            course: entry.profile.course,
        }
    }
}

/// A comment as shown under a log entry
#[derive(Debug, Serialize)]
pub struct CommentView {
    pub author: String,
    pub comment_text: String,
    pub created_at: String,
}

impl CommentView {
    fn new(model: comment::Model, author: Option<user::Model>) -> Self {
        Self {
            author: author
                .map(|author| author.display_name())
                .unwrap_or_default(),
            comment_text: model.comment_text,
            created_at: model.created_at.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Body of the comment form.
/// The log entry comes from the path and the author from the session.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub comment_text: String,
    #[serde(default)]
    pub csrf_token: String,
}

/// Per-field messages for a rejected comment form
#[derive(Debug, Default, Serialize)]
pub struct CommentFormErrors {
    pub comment_text: Vec<String>,
}

/// Outcome of checking a supervisor against a log entry
enum LogAccess {
    Granted {
        log: log_entry::Model,
        student: Option<user::Model>,
    },
    Denied,
}

/// Only plain digit runs name a log entry; signs and blanks do not.
fn parse_log_id(raw: &str) -> Result<i32, AppError> {
    let not_found = || AppError::NotFound(format!("log entry '{}'", raw));
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_found());
    }
    raw.parse::<i32>().map_err(|_| not_found())
}

async fn authorize_log(
    state: &AppState,
    identity: &Identity,
    log_id: i32,
) -> Result<LogAccess, AppError> {
    let (log, student) = log_entry::Entity::find_by_id(log_id)
        .find_also_related(user::Entity)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("log entry {}", log_id)))?;

    if can_review(&state.db, identity.user.id, &log).await? {
        Ok(LogAccess::Granted { log, student })
    } else {
        warn!(
            "Supervisor '{}' is not assigned to the author of log {}",
            identity.user.username, log_id
        );
        Ok(LogAccess::Denied)
    }
}

async fn render_log_detail(
    state: &AppState,
    identity: &Identity,
    log: log_entry::Model,
    student: Option<user::Model>,
    form: &CommentForm,
    errors: &CommentFormErrors,
) -> Result<Response, AppError> {
    let comments = comment::Entity::find()
        .filter(comment::Column::LogEntryId.eq(log.id))
        .order_by_asc(comment::Column::CreatedAt)
        .order_by_asc(comment::Column::Id)
        .find_also_related(user::Entity)
        .all(&state.db)
        .await?;
    debug!("Log {} has {} comment(s)", log.id, comments.len());

    let comments: Vec<CommentView> = comments
        .into_iter()
        .map(|(comment, author)| CommentView::new(comment, author))
        .collect();

    let student_name = student
        .map(|student| student.display_name())
        .unwrap_or_default();

    let mut context = page_context(Some(identity));
    context.insert("log", &LogEntryView::new(log, student_name));
    context.insert("comments", &comments);
    context.insert("form", form);
    context.insert("errors", errors);
    Ok(render(state, "log_detail.html", &context)?.into_response())
}

/// Logs of every student on the supervisor's roster, newest first
#[instrument(skip_all)]
pub async fn supervisor_dashboard(
    State(state): State<AppState>,
    supervisor: SupervisorUser,
) -> Result<Response, AppError> {
    trace!("Entering supervisor_dashboard function");
    let SupervisorUser { identity, kind } = supervisor;

    let roster = supervisor_roster(&state.db, identity.user.id, kind).await?;
    let student_user_ids: Vec<i32> = roster.iter().map(|entry| entry.user.id).collect();

    let logs = if student_user_ids.is_empty() {
        Vec::new()
    } else {
        log_entry::Entity::find()
            .filter(log_entry::Column::StudentId.is_in(student_user_ids))
            .order_by_desc(log_entry::Column::Date)
            .order_by_desc(log_entry::Column::Id)
            .find_also_related(user::Entity)
            .all(&state.db)
            .await?
    };
    debug!(
        "Supervisor '{}' ({:?}) sees {} student(s) and {} log(s)",
        identity.user.username,
        kind,
        roster.len(),
        logs.len()
    );

    let logs: Vec<LogEntryView> = logs
        .into_iter()
        .map(|(log, student)| {
            let name = student
                .map(|student| student.display_name())
                .unwrap_or_default();
            LogEntryView::new(log, name)
        })
        .collect();
    let students: Vec<StudentView> = roster.into_iter().map(StudentView::from).collect();

    let mut context = page_context(Some(&identity));
    context.insert("students", &students);
    context.insert("logs", &logs);
    Ok(render(&state, "supervisor_dashboard.html", &context)?.into_response())
}

/// One log entry with its comments and an empty comment form
#[instrument(skip_all)]
pub async fn log_detail(
    State(state): State<AppState>,
    Path(raw_log_id): Path<String>,
    SupervisorUser { identity, .. }: SupervisorUser,
) -> Result<Response, AppError> {
    trace!("Entering log_detail function for log_id: {}", raw_log_id);
    let log_id = parse_log_id(&raw_log_id)?;

    match authorize_log(&state, &identity, log_id).await? {
        LogAccess::Granted { log, student } => {
            render_log_detail(
                &state,
                &identity,
                log,
                student,
                &CommentForm::default(),
                &CommentFormErrors::default(),
            )
            .await
        }
        LogAccess::Denied => Ok(Redirect::to(SUPERVISOR_DASHBOARD_PATH).into_response()),
    }
}

/// Add a comment to a log entry as the signed-in supervisor
#[instrument(skip_all)]
pub async fn log_comment(
    State(state): State<AppState>,
    Path(raw_log_id): Path<String>,
    SupervisorUser { identity, .. }: SupervisorUser,
    Form(form): Form<CommentForm>,
) -> Result<Response, AppError> {
    trace!("Entering log_comment function for log_id: {}", raw_log_id);
    let log_id = parse_log_id(&raw_log_id)?;

    let (log, student) = match authorize_log(&state, &identity, log_id).await? {
        LogAccess::Granted { log, student } => (log, student),
        LogAccess::Denied => return Ok(Redirect::to(SUPERVISOR_DASHBOARD_PATH).into_response()),
    };

    verify_csrf(&identity, &form.csrf_token)?;

    let form = CommentForm {
        comment_text: form.comment_text.trim().to_string(),
        csrf_token: form.csrf_token,
    };
    if let Err(errors) = form.validate() {
        let errors = CommentFormErrors {
            comment_text: field_messages(&errors, "comment_text"),
        };
        debug!("Rejected comment form: {:?}", errors);
        return render_log_detail(&state, &identity, log, student, &form, &errors).await;
    }

    let new_comment = comment::ActiveModel {
        log_entry_id: Set(log.id),
        author_id: Set(identity.user.id),
        comment_text: Set(form.comment_text),
        ..Default::default()
    };

    let created = new_comment.insert(&state.db).await?;
    info!(
        "Comment created successfully with ID: {}, log: {}, author: {}",
        created.id, log.id, identity.user.username
    );

    Ok(Redirect::to(&log_detail_path(log.id)).into_response())
}
