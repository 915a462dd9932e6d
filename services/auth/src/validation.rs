//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Canonical form of an identifier: trimmed and lower-cased
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

/// Validate an already-normalized identifier
///
/// Identifiers containing `@` must be email addresses; anything else must be
/// a username.
pub fn validate_identifier(identifier: &str) -> Result<(), String> {
    if identifier.is_empty() {
        return Err("Identifier is required".to_string());
    }

    if identifier.contains('@') {
        validate_email(identifier)
    } else {
        validate_username(identifier)
    }
}

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if username.len() > 32 {
        return Err("Username must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("Failed to compile username regex")
    });

    if !regex.is_match(username) {
        return Err(
            "Username can only contain letters, numbers, dots, dashes and underscores".to_string(),
        );
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Rules a secret must satisfy at registration
#[derive(Debug, Clone)]
pub struct SecretPolicy {
    /// Minimum length in characters
    pub min_length: usize,
    /// Maximum length in characters
    pub max_length: usize,
    /// Require an uppercase letter, a lowercase letter, a digit and a symbol
    pub require_mixed: bool,
}

impl Default for SecretPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_mixed: false,
        }
    }
}

impl SecretPolicy {
    /// Create a new SecretPolicy from environment variables
    ///
    /// # Environment Variables
    /// - `SECRET_MIN_LENGTH`: Minimum secret length (default: 8)
    /// - `SECRET_REQUIRE_MIXED`: Require mixed character classes (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let min_length = std::env::var("SECRET_MIN_LENGTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|len: &usize| *len > 0 && *len <= defaults.max_length)
            .unwrap_or(defaults.min_length);

        let require_mixed = std::env::var("SECRET_REQUIRE_MIXED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.require_mixed);

        Self {
            min_length,
            require_mixed,
            ..defaults
        }
    }

    /// Validate a secret against this policy
    pub fn validate(&self, secret: &str) -> Result<(), String> {
        if secret.is_empty() {
            return Err("Secret is required".to_string());
        }

        let length = secret.chars().count();

        if length < self.min_length {
            return Err(format!(
                "Secret must be at least {} characters long",
                self.min_length
            ));
        }

        if length > self.max_length {
            return Err(format!(
                "Secret must be at most {} characters long",
                self.max_length
            ));
        }

        if self.require_mixed {
            check_character_classes(secret)?;
        }

        Ok(())
    }
}

fn check_character_classes(secret: &str) -> Result<(), String> {
    let mut has_upper = false;
    let mut has_lower = false;
    let mut has_digit = false;
    let mut has_special = false;

    for c in secret.chars() {
        if c.is_ascii_uppercase() {
            has_upper = true;
        } else if c.is_ascii_lowercase() {
            has_lower = true;
        } else if c.is_ascii_digit() {
            has_digit = true;
        } else if !c.is_alphanumeric() {
            has_special = true;
        }
    }

    if !has_upper {
        return Err("Secret must contain at least one uppercase letter".to_string());
    }

    if !has_lower {
        return Err("Secret must contain at least one lowercase letter".to_string());
    }

    if !has_digit {
        return Err("Secret must contain at least one digit".to_string());
    }

    if !has_special {
        return Err("Secret must contain at least one special character".to_string());
    }

    Ok(())
}
