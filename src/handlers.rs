pub mod health;
pub mod home;
pub mod login;
pub mod students;
pub mod supervisors;

pub const HOME_PATH: &str = "/";
pub const STUDENT_DASHBOARD_PATH: &str = "/dashboard/";
pub const SUPERVISOR_DASHBOARD_PATH: &str = "/supervisor/dashboard/";

/// Path of the detail page for one log entry.
pub fn log_detail_path(log_id: i32) -> String {
    format!("/log/{}/", log_id)
}

/// Date column format for pages.
pub(crate) const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d";
/// Comment timestamps on pages.
pub(crate) const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
