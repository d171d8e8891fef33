//! Alias name validation for Postmask.
//!
//! Alias names become the local part of a public email address, so the
//! accepted alphabet is deliberately narrow.

use thiserror::Error;

/// Minimum alias name length.
pub const MIN_ALIAS_NAME_LENGTH: usize = 2;

/// Maximum alias name length.
pub const MAX_ALIAS_NAME_LENGTH: usize = 50;

/// Validation errors for alias names.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AliasNameError {
    /// Name is empty after trimming.
    #[error("alias name cannot be empty")]
    Empty,

    /// Name is too short.
    #[error("alias name must be at least {MIN_ALIAS_NAME_LENGTH} characters")]
    TooShort,

    /// Name is too long.
    #[error("alias name must be at most {MAX_ALIAS_NAME_LENGTH} characters")]
    TooLong,

    /// Name contains invalid characters.
    #[error("alias name can only contain letters, digits, dots, underscores and dashes")]
    InvalidChars,

    /// Name is reserved.
    #[error("this alias name is reserved")]
    Reserved,
}

/// Reserved local parts that cannot be claimed as aliases.
const RESERVED_NAMES: &[&str] = &[
    "admin",
    "administrator",
    "postmaster",
    "hostmaster",
    "webmaster",
    "mailer-daemon",
    "abuse",
    "root",
    "support",
    "help",
    "info",
    "contact",
    "security",
    "billing",
    "noreply",
    "no-reply",
];

/// Check if an alias name is reserved.
pub fn is_reserved_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    RESERVED_NAMES.iter().any(|&r| r == lower)
}

/// Normalize a raw alias name: trim surrounding whitespace and lower-case.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Validate a normalized alias name.
///
/// Requirements:
/// - Length: 2-50 characters
/// - Characters: alphanumeric (a-z, A-Z, 0-9), dot, underscore and dash
/// - Not a reserved local part
pub fn validate_name(name: &str) -> Result<(), AliasNameError> {
    if name.is_empty() {
        return Err(AliasNameError::Empty);
    }
    if name.len() < MIN_ALIAS_NAME_LENGTH {
        return Err(AliasNameError::TooShort);
    }
    if name.len() > MAX_ALIAS_NAME_LENGTH {
        return Err(AliasNameError::TooLong);
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(AliasNameError::InvalidChars);
    }
    if is_reserved_name(name) {
        return Err(AliasNameError::Reserved);
    }
    Ok(())
}
