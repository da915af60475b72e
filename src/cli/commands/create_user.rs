use anyhow::{Context, Result};
use model::Role;
use sea_orm::Database;
use tracing::{debug, error, info, trace};

use crate::roster::{self, NewProfile, NewUser};

/// Command line input for a new user
#[derive(Debug, Clone)]
pub struct CreateUserArgs {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub matric_no: Option<String>,
    pub department: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub course: String,
    pub designation: String,
    pub company: String,
}

impl CreateUserArgs {
    /// Only the profile field that belongs to the chosen role is kept.
    pub fn into_new_user(self) -> NewUser {
        let profile = match self.role {
            Role::Student => NewProfile::Student {
                course: self.course,
            },
            Role::AcademicSupervisor => NewProfile::AcademicSupervisor {
                designation: self.designation,
            },
            Role::IndustrySupervisor => NewProfile::IndustrySupervisor {
                company: self.company,
            },
        };

        NewUser {
            username: self.username,
            password: self.password,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            matric_no: self.matric_no,
            department: self.department,
            profile,
        }
    }
}

pub async fn create_user(database_url: &str, args: CreateUserArgs) -> Result<()> {
    trace!("Entering create_user command");
    debug!("Database URL: {}", database_url);

    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("failed to connect to database '{}'", database_url))?;

    let new_user = args.into_new_user();
    let username = new_user.username.clone();
    match roster::create_user(&db, new_user).await {
        Ok(user) => {
            info!(
                "Created {} '{}' with ID {}",
                user.role.label(),
                user.username,
                user.id
            );
            Ok(())
        }
        Err(e) => {
            error!("Failed to create user '{}': {}", username, e);
            Err(e.into())
        }
    }
}
