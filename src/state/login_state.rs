//! Sign-in form state and input validation

/// Form contents of the sign-in screen.
///
/// Edits replace the whole value rather than mutating a field in place, so a
/// snapshot taken by a running task never observes a later keystroke.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginUiState {
    pub email: String,
    pub password: String,
}

impl LoginUiState {
    pub fn with_email(&self, email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..self.clone()
        }
    }

    pub fn with_password(&self, password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            ..self.clone()
        }
    }
}

/// Which field of the sign-in form receives keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

impl LoginField {
    pub fn toggle(self) -> Self {
        match self {
            Self::Email => Self::Password,
            Self::Password => Self::Email,
        }
    }
}

/// Syntactic email check: exactly one `@`, non-empty local part, and a
/// non-empty domain that contains a `.`
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty() && !domain.is_empty() && domain.contains('.')
}

/// Empty or whitespace-only
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
