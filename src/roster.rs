//! Users, their role profiles and supervisor assignments.
//!
//! Handlers only read rosters; creating users and assigning supervisors is an
//! administrative job driven from the CLI.

use chrono::Utc;
use model::entities::{academic_supervisor, industry_supervisor, student, user};
use model::{Role, SupervisorKind};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use thiserror::Error;
use tracing::{debug, info, instrument, trace, warn};

use crate::auth::password::hash_password;

/// Error types for roster administration
#[derive(Error, Debug)]
pub enum RosterError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Error while hashing the new user's password
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    #[error("Username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("User '{0}' does not exist")]
    UnknownUser(String),

    #[error("User '{0}' is not a student")]
    NotAStudent(String),

    #[error("User '{0}' is not a supervisor")]
    NotASupervisor(String),

    #[error("User '{0}' has no {1} profile")]
    MissingProfile(String, &'static str),
}

/// Role specific data for a new user. The variant decides the user's role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NewProfile {
    Student { course: String },
    AcademicSupervisor { designation: String },
    IndustrySupervisor { company: String },
}

impl NewProfile {
    pub fn role(&self) -> Role {
        match self {
            NewProfile::Student { .. } => Role::Student,
            NewProfile::AcademicSupervisor { .. } => Role::AcademicSupervisor,
            NewProfile::IndustrySupervisor { .. } => Role::IndustrySupervisor,
        }
    }
}

/// Everything needed to create a user and their profile
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub matric_no: Option<String>,
    pub department: Option<String>,
    pub profile: NewProfile,
}

impl NewUser {
    /// A user with only the required fields filled in.
    pub fn new(username: impl Into<String>, password: impl Into<String>, profile: NewProfile) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            matric_no: None,
            department: None,
            profile,
        }
    }
}

/// A student on a supervisor's roster.
#[derive(Clone, Debug)]
pub struct RosterEntry {
    pub profile: student::Model,
    pub user: user::Model,
}

/// Create a user and the profile row matching their role, atomically.
#[instrument(skip(db, new_user), fields(username = %new_user.username))]
pub async fn create_user(
    db: &DatabaseConnection,
    new_user: NewUser,
) -> Result<user::Model, RosterError> {
    trace!("Entering create_user function");
    let role = new_user.profile.role();
    debug!("Creating user '{}' with role {}", new_user.username, role);

    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(new_user.username.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        warn!("Username '{}' is already taken", new_user.username);
        return Err(RosterError::DuplicateUsername(new_user.username));
    }

    let password_hash =
        hash_password(&new_user.password).map_err(|e| RosterError::PasswordHash(e.to_string()))?;

    let txn = db.begin().await?;

    let created = user::ActiveModel {
        username: Set(new_user.username.clone()),
        password_hash: Set(password_hash),
        first_name: Set(new_user.first_name),
        last_name: Set(new_user.last_name),
        email: Set(new_user.email),
        is_active: Set(true),
        date_joined: Set(Utc::now()),
        last_login: Set(None),
        role: Set(role),
        matric_no: Set(new_user.matric_no.filter(|m| !m.trim().is_empty())),
        department: Set(new_user.department.filter(|d| !d.trim().is_empty())),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    match new_user.profile {
        NewProfile::Student { course } => {
            student::ActiveModel {
                user_id: Set(created.id),
                course: Set(course),
                academic_supervisor_id: Set(None),
                industry_supervisor_id: Set(None),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
        NewProfile::AcademicSupervisor { designation } => {
            academic_supervisor::ActiveModel {
                user_id: Set(created.id),
                designation: Set(designation),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
        NewProfile::IndustrySupervisor { company } => {
            industry_supervisor::ActiveModel {
                user_id: Set(created.id),
                company: Set(company),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;
    info!(
        "User created successfully with ID: {}, username: {}, role: {}",
        created.id, created.username, created.role
    );
    Ok(created)
}

async fn find_user(db: &DatabaseConnection, username: &str) -> Result<user::Model, RosterError> {
    user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
        .ok_or_else(|| RosterError::UnknownUser(username.to_string()))
}

/// Point a student at a supervisor. The supervisor's role decides whether the
/// academic or the industry slot is written; any previous holder is replaced.
#[instrument(skip(db))]
pub async fn assign_supervisor(
    db: &DatabaseConnection,
    student_username: &str,
    supervisor_username: &str,
) -> Result<student::Model, RosterError> {
    trace!("Entering assign_supervisor function");
    let student_user = find_user(db, student_username).await?;
    if student_user.role != Role::Student {
        return Err(RosterError::NotAStudent(student_username.to_string()));
    }

    let supervisor_user = find_user(db, supervisor_username).await?;
    let kind = supervisor_user
        .role
        .supervisor_kind()
        .ok_or_else(|| RosterError::NotASupervisor(supervisor_username.to_string()))?;

    let profile = student::Entity::find()
        .filter(student::Column::UserId.eq(student_user.id))
        .one(db)
        .await?
        .ok_or_else(|| RosterError::MissingProfile(student_username.to_string(), "student"))?;

    let mut profile: student::ActiveModel = profile.into();
    match kind {
        SupervisorKind::Academic => {
            let supervisor = academic_supervisor::Entity::find()
                .filter(academic_supervisor::Column::UserId.eq(supervisor_user.id))
                .one(db)
                .await?
                .ok_or_else(|| {
                    RosterError::MissingProfile(supervisor_username.to_string(), "academic supervisor")
                })?;
            profile.academic_supervisor_id = Set(Some(supervisor.id));
        }
        SupervisorKind::Industry => {
            let supervisor = industry_supervisor::Entity::find()
                .filter(industry_supervisor::Column::UserId.eq(supervisor_user.id))
                .one(db)
                .await?
                .ok_or_else(|| {
                    RosterError::MissingProfile(supervisor_username.to_string(), "industry supervisor")
                })?;
            profile.industry_supervisor_id = Set(Some(supervisor.id));
        }
    }

    let updated = profile.update(db).await?;
    info!(
        "Assigned {:?} supervisor '{}' to student '{}'",
        kind, supervisor_username, student_username
    );
    Ok(updated)
}

/// Students assigned to a supervisor: `students` for academic supervisors,
/// `interns` for industry supervisors. A supervisor without a profile row has
/// an empty roster.
pub async fn supervisor_roster(
    db: &DatabaseConnection,
    supervisor_user_id: i32,
    kind: SupervisorKind,
) -> Result<Vec<RosterEntry>, DbErr> {
    trace!(
        "Loading {:?} roster for supervisor user ID {}",
        kind, supervisor_user_id
    );

    let roster_filter = match kind {
        SupervisorKind::Academic => academic_supervisor::Entity::find()
            .filter(academic_supervisor::Column::UserId.eq(supervisor_user_id))
            .one(db)
            .await?
            .map(|profile| student::Column::AcademicSupervisorId.eq(profile.id)),
        SupervisorKind::Industry => industry_supervisor::Entity::find()
            .filter(industry_supervisor::Column::UserId.eq(supervisor_user_id))
            .one(db)
            .await?
            .map(|profile| student::Column::IndustrySupervisorId.eq(profile.id)),
    };

    let Some(roster_filter) = roster_filter else {
        warn!(
            "Supervisor user ID {} has no {:?} profile, roster is empty",
            supervisor_user_id, kind
        );
        return Ok(Vec::new());
    };

    let rows = student::Entity::find()
        .filter(roster_filter)
        .order_by_asc(student::Column::Id)
        .find_also_related(user::Entity)
        .all(db)
        .await?;

    let roster: Vec<RosterEntry> = rows
        .into_iter()
        .filter_map(|(profile, user)| user.map(|user| RosterEntry { profile, user }))
        .collect();
    debug!("Roster has {} student(s)", roster.len());
    Ok(roster)
}
