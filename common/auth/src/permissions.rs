use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::roles::rank;

/// Principals that carry role names.
pub trait HasRoles {
    fn roles(&self) -> &[String];
}

#[derive(Debug, Clone, Error)]
pub enum PermissionError {
    #[error("insufficient role")]
    Forbidden { required: Vec<String> },
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for PermissionError {
    fn into_response(self) -> Response {
        let message = match &self {
            PermissionError::Forbidden { required } if required.is_empty() => {
                "Insufficient role".to_string()
            }
            PermissionError::Forbidden { required } => format!(
                "Insufficient role. Required one of: {}",
                required.join(", ")
            ),
        };

        (
            StatusCode::FORBIDDEN,
            Json(ErrorBody {
                code: "FORBIDDEN",
                message,
            }),
        )
            .into_response()
    }
}

/// Any-of check. An empty `allowed` list admits everyone.
pub fn ensure_role<P: HasRoles + ?Sized>(
    principal: &P,
    allowed: &[&str],
) -> Result<(), PermissionError> {
    if allowed.is_empty() {
        return Ok(());
    }

    let has_role = principal.roles().iter().any(|role| {
        allowed
            .iter()
            .any(|required| role.trim().eq_ignore_ascii_case(required))
    });

    if has_role {
        Ok(())
    } else {
        Err(PermissionError::Forbidden {
            required: allowed.iter().map(|value| value.to_string()).collect(),
        })
    }
}

/// Hierarchy check: passes when any held role ranks at or above `minimum`.
pub fn ensure_at_least<P: HasRoles + ?Sized>(
    principal: &P,
    minimum: &str,
) -> Result<(), PermissionError> {
    let forbidden = || PermissionError::Forbidden {
        required: crate::roles::ROLE_HIERARCHY
            .iter()
            .take(rank(minimum).map_or(0, |position| position + 1))
            .map(|role| role.to_string())
            .collect(),
    };

    let Some(threshold) = rank(minimum) else {
        return Err(forbidden());
    };

    let best = principal.roles().iter().filter_map(|role| rank(role)).min();
    match best {
        Some(held) if held <= threshold => Ok(()),
        _ => Err(forbidden()),
    }
}
