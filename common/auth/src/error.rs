use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::Level;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("invalid guard configuration: {0}")]
    InvalidConfig(String),
    #[error("no bearer header or token cookie presented")]
    TokenAbsent,
    #[error("token has expired")]
    TokenExpired,
    #[error("token is not valid yet")]
    TokenNotYetValid,
    #[error("token signature does not match")]
    TokenSignatureInvalid,
    #[error("malformed token: {0}")]
    TokenMalformed(String),
    #[error("token carries no subject claim")]
    MissingSubject,
    #[error("no principal found for subject '{0}'")]
    PrincipalNotFound(String),
    #[error("credentials must carry an id, or both email and password")]
    InvalidCredentialShape,
    #[error("principal store failure: {0}")]
    Store(String),
    #[error("authentication required")]
    Unauthenticated,
}

impl AuthError {
    /// Stable label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidConfig(_) => "invalid_config",
            AuthError::TokenAbsent => "absent",
            AuthError::TokenExpired => "expired",
            AuthError::TokenNotYetValid => "not_yet_valid",
            AuthError::TokenSignatureInvalid => "signature_invalid",
            AuthError::TokenMalformed(_) => "malformed",
            AuthError::MissingSubject => "missing_subject",
            AuthError::PrincipalNotFound(_) => "principal_not_found",
            AuthError::InvalidCredentialShape => "invalid_credential_shape",
            AuthError::Store(_) => "store_error",
            AuthError::Unauthenticated => "unauthenticated",
        }
    }

    /// Severity a rejection should be logged at. Expected outcomes (no token,
    /// stale token) stay quiet; anything hinting at tampering or a broken
    /// deployment is raised.
    pub fn log_level(&self) -> Level {
        match self {
            AuthError::TokenAbsent
            | AuthError::TokenExpired
            | AuthError::TokenNotYetValid
            | AuthError::InvalidCredentialShape
            | AuthError::Unauthenticated => Level::DEBUG,
            AuthError::MissingSubject | AuthError::PrincipalNotFound(_) => Level::INFO,
            AuthError::TokenSignatureInvalid | AuthError::TokenMalformed(_) => Level::WARN,
            AuthError::InvalidConfig(_) | AuthError::Store(_) => Level::ERROR,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match value.kind() {
            ErrorKind::InvalidSignature => Self::TokenSignatureInvalid,
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            ErrorKind::ImmatureSignature => Self::TokenNotYetValid,
            ErrorKind::InvalidAlgorithm => {
                Self::TokenMalformed("unsupported signing algorithm".to_string())
            }
            _ => Self::TokenMalformed(value.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Token failures all look the same from outside; the reason only
        // reaches the logs.
        let (status, code, message) = match &self {
            AuthError::InvalidConfig(_) | AuthError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_UNAVAILABLE",
                "authentication is temporarily unavailable".to_string(),
            ),
            AuthError::InvalidCredentialShape => (
                StatusCode::BAD_REQUEST,
                "AUTH_CREDENTIALS",
                self.to_string(),
            ),
            _ => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                AuthError::Unauthenticated.to_string(),
            ),
        };

        (status, Json(ErrorBody { code, message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tampering_is_louder_than_expiry() {
        assert_eq!(AuthError::TokenExpired.log_level(), Level::DEBUG);
        assert_eq!(AuthError::TokenNotYetValid.log_level(), Level::DEBUG);
        assert_eq!(AuthError::TokenSignatureInvalid.log_level(), Level::WARN);
        assert_eq!(
            AuthError::TokenMalformed("bad".into()).log_level(),
            Level::WARN
        );
    }

    #[test]
    fn token_failures_render_identically() {
        let expired = AuthError::TokenExpired.into_response();
        let forged = AuthError::TokenSignatureInvalid.into_response();
        assert_eq!(expired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
    }
}
