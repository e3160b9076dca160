//! Input rules shared by the HTTP validators and the repositories.

/// A field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Blank { field: &'static str },
}

/// Reject empty or whitespace-only values. The value itself is not modified.
pub fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values_rejected() {
        for value in ["", " ", "\t\n", "   "] {
            assert_eq!(
                require_non_blank("text", value),
                Err(ValidationError::Blank { field: "text" })
            );
        }
    }

    #[test]
    fn test_padded_value_accepted() {
        assert!(require_non_blank("user_id", "  user123 ").is_ok());
    }

    #[test]
    fn test_message_names_field() {
        let err = require_non_blank("user_id", "").unwrap_err();
        assert_eq!(err.to_string(), "user_id cannot be empty");
    }
}
