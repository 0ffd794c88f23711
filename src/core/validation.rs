//! Validation for account credentials and user-submitted content.
//!
//! Rules are checked before anything touches the database; handlers map
//! failures to 400 responses.

/// Minimum length for usernames
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum length for usernames
pub const MAX_USERNAME_LENGTH: usize = 31;

/// Minimum length for passwords
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum length for passwords
pub const MAX_PASSWORD_LENGTH: usize = 255;

/// Validation error types
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Username is outside the allowed length range
    UsernameLength { min: usize, max: usize, actual: usize },
    /// Username contains characters outside [A-Za-z0-9_-]
    UsernameInvalidCharacters,
    /// Password is outside the allowed length range
    PasswordLength { min: usize, max: usize, actual: usize },
    /// Password is missing a required character class
    PasswordMissingClass { class: &'static str },
    /// Submitted content is empty after trimming
    EmptyContent,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::UsernameLength { min, max, actual } => {
                write!(
                    f,
                    "Username must be between {} and {} characters ({} given)",
                    min, max, actual
                )
            }
            ValidationError::UsernameInvalidCharacters => {
                write!(
                    f,
                    "Username may only contain letters, numbers, underscores, and hyphens"
                )
            }
            ValidationError::PasswordLength { min, max, actual } => {
                write!(
                    f,
                    "Password must be between {} and {} characters ({} given)",
                    min, max, actual
                )
            }
            ValidationError::PasswordMissingClass { class } => {
                write!(f, "Password must contain at least one {}", class)
            }
            ValidationError::EmptyContent => write!(f, "Content cannot be empty"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validates a username: 3-31 characters from [A-Za-z0-9_-]
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if len < MIN_USERNAME_LENGTH || len > MAX_USERNAME_LENGTH {
        return Err(ValidationError::UsernameLength {
            min: MIN_USERNAME_LENGTH,
            max: MAX_USERNAME_LENGTH,
            actual: len,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ValidationError::UsernameInvalidCharacters);
    }

    Ok(())
}

/// Validates a password: 6-255 characters with at least one lowercase
/// letter, one uppercase letter, one digit, and one symbol
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH || len > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordLength {
            min: MIN_PASSWORD_LENGTH,
            max: MAX_PASSWORD_LENGTH,
            actual: len,
        });
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::PasswordMissingClass {
            class: "lowercase letter",
        });
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::PasswordMissingClass {
            class: "uppercase letter",
        });
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordMissingClass { class: "number" });
    }

    // Anything outside the alphanumeric range counts as a symbol
    if !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        return Err(ValidationError::PasswordMissingClass { class: "symbol" });
    }

    Ok(())
}

/// Validates user-submitted comment content: non-empty after trimming
pub fn validate_comment_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }

    Ok(())
}
