//! Records, request payloads and response shapes

mod employee;
mod ticket;
mod user;

pub use employee::*;
pub use ticket::*;
pub use user::*;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Timestamp format stored in the `created` / `updated` columns
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current UTC time in [`TIMESTAMP_FORMAT`]
pub fn timestamp_now() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Payload length checks mirroring the column sizes
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub(crate) fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(Error::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

pub(crate) fn check_opt_len(field: &str, value: Option<&String>, max: usize) -> Result<()> {
    match value {
        Some(value) => check_len(field, value, max),
        None => Ok(()),
    }
}

/// `{"message": ...}` body returned by deletes and password changes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_shape() {
        let ts = timestamp_now();
        assert_eq!(ts.len(), 19);
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_check_len_counts_chars() {
        assert!(check_len("city", "Київ", 4).is_ok());
        let err = check_len("city", "Kyiv!", 4).unwrap_err();
        assert_eq!(err.to_string(), "city must be at most 4 characters");
    }
}
