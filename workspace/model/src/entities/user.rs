use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;

/// The role a user plays in the logbook.
/// Stored as its string value, matching the values the web forms and CLI accept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Role {
    #[default]
    #[sea_orm(string_value = "student")]
    Student,
    #[sea_orm(string_value = "academic_supervisor")]
    AcademicSupervisor,
    #[sea_orm(string_value = "industry_supervisor")]
    IndustrySupervisor,
}

/// Which roster a supervisor owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupervisorKind {
    Academic,
    Industry,
}

impl Role {
    /// `Some` for both supervisor roles, `None` for students.
    pub fn supervisor_kind(self) -> Option<SupervisorKind> {
        match self {
            Role::Student => None,
            Role::AcademicSupervisor => Some(SupervisorKind::Academic),
            Role::IndustrySupervisor => Some(SupervisorKind::Industry),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::AcademicSupervisor => "academic_supervisor",
            Role::IndustrySupervisor => "industry_supervisor",
        }
    }

    /// Human readable label used in page headers.
    pub fn label(self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::AcademicSupervisor => "Academic Supervisor",
            Role::IndustrySupervisor => "Industry Supervisor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "academic_supervisor" => Ok(Role::AcademicSupervisor),
            "industry_supervisor" => Ok(Role::IndustrySupervisor),
            other => Err(format!(
                "unknown role '{}', expected one of: student, academic_supervisor, industry_supervisor",
                other
            )),
        }
    }
}

/// An account that can log in.
/// Students, academic supervisors and industry supervisors all share this table;
/// the role specific data lives in the profile tables.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Inactive users cannot log in and their sessions are ignored.
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    pub date_joined: DateTimeUtc,
    pub last_login: Option<DateTimeUtc>,
    pub role: Role,
    #[sea_orm(unique)]
    pub matric_no: Option<String>,
    pub department: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::student::Entity")]
    Student,
    #[sea_orm(has_one = "super::academic_supervisor::Entity")]
    AcademicSupervisor,
    #[sea_orm(has_one = "super::industry_supervisor::Entity")]
    IndustrySupervisor,
    /// Logs written by this user (students only).
    #[sea_orm(has_many = "super::log_entry::Entity")]
    LogEntry,
    /// Comments authored by this user (supervisors only).
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::session::Entity")]
    Session,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::academic_supervisor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AcademicSupervisor.def()
    }
}

impl Related<super::industry_supervisor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IndustrySupervisor.def()
    }
}

impl Related<super::log_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LogEntry.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Model {
    /// Full name when one is recorded, username otherwise.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
