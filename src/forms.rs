//! Form binding helpers shared by the HTML handlers.

use chrono::NaiveDate;
use validator::{ValidationError, ValidationErrors};

pub const INVALID_DATE: &str = "Enter a valid date.";

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Messages for one field, in the order the validators reported them.
pub fn field_messages(errors: &ValidationErrors, field: &str) -> Vec<String> {
    errors
        .field_errors()
        .get(field)
        .map(|errors| {
            errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| error.code.to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Field validator for HTML date inputs. Blank values are left to the
/// `required` rule so the user sees a single message.
pub fn validate_iso_date(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || parse_iso_date(value).is_some() {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_date");
        error.message = Some(INVALID_DATE.into());
        Err(error)
    }
}

pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}
