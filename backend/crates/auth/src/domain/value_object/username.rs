//! Username Value Object
//!
//! The login handle. Stored exactly as entered after NFKC normalization and
//! trimming; uniqueness is case-sensitive, so `Alice` and `alice` are two
//! different accounts.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Minimum length in characters
pub const USERNAME_MIN_LENGTH: usize = 3;

/// Maximum length in characters
pub const USERNAME_MAX_LENGTH: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsernameError {
    #[error("Username cannot be empty")]
    Empty,

    #[error("Username is too short ({length} chars, minimum {min})")]
    TooShort { length: usize, min: usize },

    #[error("Username is too long ({length} chars, maximum {max})")]
    TooLong { length: usize, max: usize },

    #[error("Username cannot contain whitespace")]
    ContainsWhitespace,

    #[error("Username contains a control character at position {position}")]
    ControlCharacter { position: usize },
}

/// Validated username
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub fn new(input: impl AsRef<str>) -> Result<Self, UsernameError> {
        let normalized: String = input.as_ref().nfkc().collect::<String>().trim().to_string();
        Self::validate(&normalized)?;
        Ok(Self(normalized))
    }

    fn validate(value: &str) -> Result<(), UsernameError> {
        if value.is_empty() {
            return Err(UsernameError::Empty);
        }

        let length = value.chars().count();
        if length < USERNAME_MIN_LENGTH {
            return Err(UsernameError::TooShort {
                length,
                min: USERNAME_MIN_LENGTH,
            });
        }
        if length > USERNAME_MAX_LENGTH {
            return Err(UsernameError::TooLong {
                length,
                max: USERNAME_MAX_LENGTH,
            });
        }

        for (position, ch) in value.chars().enumerate() {
            if ch.is_control() {
                return Err(UsernameError::ControlCharacter { position });
            }
            if ch.is_whitespace() {
                return Err(UsernameError::ContainsWhitespace);
            }
        }

        Ok(())
    }

    /// Create from a stored value, re-validating it
    pub fn from_db(value: impl AsRef<str>) -> Result<Self, UsernameError> {
        Self::new(value)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Username({})", self.0)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(Username::new("alice").is_ok());
        assert!(Username::new("Alice_99").is_ok());
        assert!(Username::new("yamada.taro").is_ok());
        assert!(Username::new("ユーザー名").is_ok());
    }

    #[test]
    fn test_trims_and_preserves_case() {
        let name = Username::new("  Alice ").unwrap();
        assert_eq!(name.as_str(), "Alice");
        assert_ne!(name, Username::new("alice").unwrap());
    }

    #[test]
    fn test_nfkc_normalization() {
        // Fullwidth letters collapse to ASCII
        let name = Username::new("ａｌｉｃｅ").unwrap();
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(Username::new("   "), Err(UsernameError::Empty));
        assert_eq!(
            Username::new("ab"),
            Err(UsernameError::TooShort { length: 2, min: 3 })
        );
        assert_eq!(
            Username::new("a".repeat(31)),
            Err(UsernameError::TooLong { length: 31, max: 30 })
        );
        assert!(Username::new("a".repeat(30)).is_ok());
    }

    #[test]
    fn test_rejects_inner_whitespace_and_control() {
        assert_eq!(
            Username::new("al ice"),
            Err(UsernameError::ContainsWhitespace)
        );
        assert_eq!(
            Username::new("ali\u{0000}ce"),
            Err(UsernameError::ControlCharacter { position: 3 })
        );
    }

    #[test]
    fn test_serde_validates() {
        let name: Username = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(name.as_str(), "alice");
        assert!(serde_json::from_str::<Username>("\"x\"").is_err());
    }
}
