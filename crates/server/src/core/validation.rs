//! Input validation
//!
//! Pure checks with no I/O. Each function reports every rule that was
//! broken so a client can fix all of them in one round trip.

use crate::core::error::{Error, Result};
use crate::core::models::MessageType;
use serde::Serialize;
use std::fmt;

/// A single broken rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Turn a list of violations into `Error::InvalidInput` if it is non-empty
pub fn ensure(violations: Vec<Violation>) -> Result<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidInput(violations))
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn validate_name(name: &str) -> Vec<Violation> {
    let mut violations = Vec::new();
    if is_blank(name) {
        violations.push(Violation::new("name", "must not be empty"));
    }
    violations
}

/// Checks the shape of a user-posted message and returns its parsed type.
///
/// `status` is rejected: only the server emits status messages.
pub fn validate_message(
    to: &str,
    text: &str,
    message_type: &str,
) -> std::result::Result<MessageType, Vec<Violation>> {
    let mut violations = Vec::new();

    if is_blank(to) {
        violations.push(Violation::new("to", "must not be empty"));
    }
    if is_blank(text) {
        violations.push(Violation::new("text", "must not be empty"));
    }

    let parsed = match message_type.parse::<MessageType>() {
        Ok(t) if t.is_user_generated() => Some(t),
        _ => {
            violations.push(Violation::new(
                "type",
                "must be one of 'message' or 'private_message'",
            ));
            None
        }
    };

    match parsed {
        Some(t) if violations.is_empty() => Ok(t),
        _ => Err(violations),
    }
}

/// Parses an optional `limit` query value. Must be a positive integer.
pub fn validate_limit(raw: Option<&str>) -> std::result::Result<Option<usize>, Violation> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(Some(usize::try_from(n).unwrap_or(usize::MAX))),
        Ok(_) => Err(Violation::new("limit", "must be greater than zero")),
        Err(_) => Err(Violation::new("limit", "must be an integer")),
    }
}

pub fn validate_requester(requester: &str) -> Vec<Violation> {
    let mut violations = Vec::new();
    if is_blank(requester) {
        violations.push(Violation::new("user", "User header is required"));
    }
    violations
}
