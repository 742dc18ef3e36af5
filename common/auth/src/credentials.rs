use serde::Deserialize;

use crate::claims::Subject;
use crate::error::{AuthError, AuthResult};

/// Credential set submitted to a password-based login flow.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub id: Option<Subject>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "secret")]
    pub password: Option<String>,
}

/// The two shapes a credential set may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialShape<'a> {
    EmailSecret { email: &'a str, password: &'a str },
    Identifier { id: &'a Subject, password: Option<&'a str> },
}

impl Credentials {
    pub fn with_email(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: None,
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    pub fn with_id(id: impl Into<Subject>) -> Self {
        Self {
            id: Some(id.into()),
            email: None,
            password: None,
        }
    }

    /// Email + password wins over an id; blank strings count as absent.
    pub fn shape(&self) -> AuthResult<CredentialShape<'_>> {
        let email = non_blank(self.email.as_deref());
        let password = self.password.as_deref().filter(|value| !value.is_empty());
        let id = self.id.as_ref().filter(|id| match id {
            Subject::Key(key) => !key.trim().is_empty(),
            Subject::Id(_) => true,
        });

        match (email, password, id) {
            (Some(email), Some(password), _) => Ok(CredentialShape::EmailSecret { email, password }),
            (_, password, Some(id)) => Ok(CredentialShape::Identifier { id, password }),
            _ => Err(AuthError::InvalidCredentialShape),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
