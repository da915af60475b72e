//! SeaORM entities for the internship logbook.
//! Users carry a role; the role specific data lives in one profile table per
//! role. Log entries and comments hang off the user rows.

pub mod academic_supervisor;
pub mod comment;
pub mod industry_supervisor;
pub mod log_entry;
pub mod session;
pub mod student;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::academic_supervisor::Entity as AcademicSupervisor;
    pub use super::comment::Entity as Comment;
    pub use super::industry_supervisor::Entity as IndustrySupervisor;
    pub use super::log_entry::Entity as LogEntry;
    pub use super::session::Entity as Session;
    pub use super::student::Entity as Student;
    pub use super::user::Entity as User;
}
