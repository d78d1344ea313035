//! SQL identifier validation.
//!
//! Table and column names are interpolated into SQL text, so every name that
//! reaches the builder goes through these checks. Values never do; they are
//! always bound as parameters.

/// Maximum length for SQL identifiers (`PostgreSQL` limit is 63).
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Why a string is not a usable SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum IdentifierError {
    /// Empty string.
    #[error("identifier is empty")]
    Empty,
    /// Longer than 63 bytes.
    #[error("identifier '{0}' exceeds {max} characters", max = MAX_IDENTIFIER_LENGTH)]
    TooLong(String),
    /// Starts with something other than an ASCII letter or underscore.
    #[error("identifier '{0}' must start with a letter or underscore")]
    InvalidStart(String),
    /// Contains a character outside `[A-Za-z0-9_]`.
    #[error("identifier '{name}' contains invalid character {found:?}")]
    InvalidChar {
        /// The rejected identifier.
        name: String,
        /// First offending character.
        found: char,
    },
}

/// Check that `s` is a safe SQL identifier.
///
/// ```
/// use cursorpage::validate_sql_identifier;
///
/// assert!(validate_sql_identifier("created_at").is_ok());
/// assert!(validate_sql_identifier("created-at").is_err());
/// ```
pub fn validate_sql_identifier(s: &str) -> Result<(), IdentifierError> {
    let mut chars = s.chars();
    match chars.next() {
        None => return Err(IdentifierError::Empty),
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {},
        Some(_) => return Err(IdentifierError::InvalidStart(s.to_string())),
    }
    if let Some(found) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Err(IdentifierError::InvalidChar {
            name: s.to_string(),
            found,
        });
    }
    if s.len() > MAX_IDENTIFIER_LENGTH {
        return Err(IdentifierError::TooLong(s.to_string()));
    }
    Ok(())
}

/// Whether `s` is a safe SQL identifier.
#[inline]
#[must_use]
pub fn is_valid_sql_identifier(s: &str) -> bool {
    validate_sql_identifier(s).is_ok()
}

/// Assert that a code-supplied name is a valid SQL identifier.
///
/// # Panics
///
/// Panics if the identifier is invalid. Names come from application code,
/// so a bad one is a programming error rather than bad input.
#[inline]
pub fn assert_valid_sql_identifier(s: &str, context: &str) {
    if let Err(err) = validate_sql_identifier(s) {
        panic!("Invalid SQL {context} name: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        for name in ["orders", "created_at", "_private", "Table123", "a", "_", "createdAt"] {
            assert!(is_valid_sql_identifier(name), "{name}");
        }
    }

    #[test]
    fn test_invalid_identifiers() {
        assert_eq!(validate_sql_identifier(""), Err(IdentifierError::Empty));
        assert_eq!(
            validate_sql_identifier("1st"),
            Err(IdentifierError::InvalidStart("1st".into()))
        );
        assert_eq!(
            validate_sql_identifier("created-at"),
            Err(IdentifierError::InvalidChar {
                name: "created-at".into(),
                found: '-'
            })
        );
        for name in ["user.id", "a b", "x;drop", "t'", "t\"", "t`", "(SELECT 1)", "users--"] {
            assert!(!is_valid_sql_identifier(name), "{name}");
        }
    }

    #[test]
    fn test_unicode_rejected() {
        assert!(!is_valid_sql_identifier("users\u{0000}"));
        assert!(!is_valid_sql_identifier("users\u{200B}"));
        assert!(!is_valid_sql_identifier("usërs"));
        assert!(!is_valid_sql_identifier("ｕｓｅｒｓ"));
    }

    #[test]
    fn test_length_limit() {
        assert!(is_valid_sql_identifier(&"a".repeat(63)));
        assert!(matches!(
            validate_sql_identifier(&"a".repeat(64)),
            Err(IdentifierError::TooLong(_))
        ));
    }

    #[test]
    fn test_too_long_message_names_limit() {
        let name = "a".repeat(64);
        let err = validate_sql_identifier(&name).unwrap_err();
        assert_eq!(err.to_string(), format!("identifier '{name}' exceeds 63 characters"));
    }

    #[test]
    #[should_panic(expected = "Invalid SQL table name")]
    fn test_assert_panics() {
        assert_valid_sql_identifier("users; DROP TABLE", "table");
    }
}
