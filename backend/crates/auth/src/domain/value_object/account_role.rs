use derive_more::Display;
use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Closed set of account roles
///
/// Assigned once at registration; `Administrator` is never self-assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum AccountRole {
    #[display("Administrator")]
    Administrator,
    #[display("Author")]
    Author,
    #[display("Tourist")]
    Tourist,
}

impl AccountRole {
    /// Canonical text form, as stored and as carried in session tokens
    #[inline]
    pub const fn code(&self) -> &'static str {
        use AccountRole::*;
        match self {
            Administrator => "Administrator",
            Author => "Author",
            Tourist => "Tourist",
        }
    }

    /// Parse a role requested at registration (case-insensitive)
    pub fn parse_registrable(input: &str) -> AppResult<Self> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("author") {
            Ok(AccountRole::Author)
        } else if input.eq_ignore_ascii_case("tourist") {
            Ok(AccountRole::Tourist)
        } else {
            Err(AppError::bad_request(format!("Invalid role: {}", input))
                .with_action("Role must be either Author or Tourist"))
        }
    }

    /// Parse a stored role code
    pub fn from_code(code: &str) -> Option<Self> {
        use AccountRole::*;
        match code {
            "Administrator" => Some(Administrator),
            "Author" => Some(Author),
            "Tourist" => Some(Tourist),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registrable_ignores_case() {
        assert_eq!(AccountRole::parse_registrable("Author").unwrap(), AccountRole::Author);
        assert_eq!(AccountRole::parse_registrable("author").unwrap(), AccountRole::Author);
        assert_eq!(AccountRole::parse_registrable("TOURIST").unwrap(), AccountRole::Tourist);
        assert_eq!(AccountRole::parse_registrable("tourist").unwrap(), AccountRole::Tourist);
    }

    #[test]
    fn test_parse_registrable_rejects_others() {
        for input in ["Administrator", "admin", "", "guest"] {
            let err = AccountRole::parse_registrable(input).unwrap_err();
            assert_eq!(err.status_code(), 400);
        }
    }

    #[test]
    fn test_code_roundtrip() {
        for role in [AccountRole::Administrator, AccountRole::Author, AccountRole::Tourist] {
            assert_eq!(AccountRole::from_code(role.code()), Some(role));
            assert_eq!(role.to_string(), role.code());
        }
        assert_eq!(AccountRole::from_code("author"), None);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&AccountRole::Tourist).unwrap(), "\"Tourist\"");
        let role: AccountRole = serde_json::from_str("\"Author\"").unwrap();
        assert_eq!(role, AccountRole::Author);
    }
}
