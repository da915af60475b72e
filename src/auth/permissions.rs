use model::entities::{academic_supervisor, industry_supervisor, log_entry, student};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tracing::{debug, trace};

use super::Identity;
use crate::error::AppError;

/// The users behind a student's supervisor references.
/// `None` means that kind of supervisor is not assigned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssignedSupervisors {
    pub academic_user_id: Option<i32>,
    pub industry_user_id: Option<i32>,
}

impl AssignedSupervisors {
    /// True when `user_id` is either assigned supervisor.
    pub fn includes(&self, user_id: i32) -> bool {
        self.academic_user_id == Some(user_id) || self.industry_user_id == Some(user_id)
    }
}

/// Follow a student user's profile to the users supervising them.
/// A user without a student profile has no supervisors.
pub async fn assigned_supervisors(
    db: &DatabaseConnection,
    student_user_id: i32,
) -> Result<AssignedSupervisors, DbErr> {
    trace!("Resolving supervisors of student user ID {}", student_user_id);
    let profile = student::Entity::find()
        .filter(student::Column::UserId.eq(student_user_id))
        .one(db)
        .await?;

    let Some(profile) = profile else {
        debug!("User ID {} has no student profile", student_user_id);
        return Ok(AssignedSupervisors::default());
    };

    let academic_user_id = match profile.academic_supervisor_id {
        Some(id) => academic_supervisor::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(|supervisor| supervisor.user_id),
        None => None,
    };

    let industry_user_id = match profile.industry_supervisor_id {
        Some(id) => industry_supervisor::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(|supervisor| supervisor.user_id),
        None => None,
    };

    Ok(AssignedSupervisors {
        academic_user_id,
        industry_user_id,
    })
}

/// May `reviewer_user_id` read and comment on `log`?
pub async fn can_review(
    db: &DatabaseConnection,
    reviewer_user_id: i32,
    log: &log_entry::Model,
) -> Result<bool, DbErr> {
    let supervisors = assigned_supervisors(db, log.student_id).await?;
    Ok(supervisors.includes(reviewer_user_id))
}

/// Reject a form post whose CSRF token does not belong to the session.
pub fn verify_csrf(identity: &Identity, submitted: &str) -> Result<(), AppError> {
    if !submitted.is_empty() && submitted == identity.csrf_token {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "CSRF token mismatch for user '{}'",
            identity.user.username
        )))
    }
}
