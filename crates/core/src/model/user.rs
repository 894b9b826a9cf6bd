use thiserror::Error;

use crate::model::ids::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("email address is not valid: {0}")]
    InvalidEmail(String),

    #[error("display name cannot exceed {max} characters")]
    DisplayNameTooLong { max: usize },
}

const MAX_DISPLAY_NAME_CHARS: usize = 80;

/// The signed-in account as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: String,
    display_name: Option<String>,
}

impl User {
    /// # Errors
    ///
    /// Returns `UserError` for a malformed email or an oversized display name.
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        display_name: Option<String>,
    ) -> Result<Self, UserError> {
        let email = email.into().trim().to_owned();
        let valid = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !valid {
            return Err(UserError::InvalidEmail(email));
        }
        Ok(Self {
            id,
            email,
            display_name: normalize_display_name(display_name)?,
        })
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// What the header shows: the display name, falling back to the email.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }

    /// # Errors
    ///
    /// Returns `UserError::DisplayNameTooLong` if the trimmed name is too long.
    pub fn set_display_name(&mut self, name: Option<String>) -> Result<(), UserError> {
        self.display_name = normalize_display_name(name)?;
        Ok(())
    }
}

fn normalize_display_name(name: Option<String>) -> Result<Option<String>, UserError> {
    let Some(name) = name else {
        return Ok(None);
    };
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err(UserError::DisplayNameTooLong {
            max: MAX_DISPLAY_NAME_CHARS,
        });
    }
    Ok(Some(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_falls_back_to_email() {
        let mut user = User::new(UserId::random(), "ada@example.com", None).unwrap();
        assert_eq!(user.label(), "ada@example.com");
        user.set_display_name(Some("  Ada ".into())).unwrap();
        assert_eq!(user.label(), "Ada");
        user.set_display_name(Some("   ".into())).unwrap();
        assert_eq!(user.display_name(), None);
    }

    #[test]
    fn rejects_malformed_email() {
        assert!(User::new(UserId::random(), "ada", None).is_err());
        assert!(User::new(UserId::random(), "@example.com", None).is_err());
        assert!(User::new(UserId::random(), "ada@localhost", None).is_err());
    }

    #[test]
    fn rejects_long_display_name() {
        let long = "x".repeat(81);
        assert_eq!(
            User::new(UserId::random(), "ada@example.com", Some(long)),
            Err(UserError::DisplayNameTooLong { max: 80 })
        );
    }
}
