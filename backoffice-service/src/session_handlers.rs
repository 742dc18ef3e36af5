use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use common_auth::{
    ensure_at_least, Authenticated, CredentialShape, Credentials, PermissionError, RequestContext,
    UserRecord, ROLE_HIERARCHY, ROLE_MANAGER,
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

use crate::app::AppState;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Counts the outcome of the identity resolution done by the outer
/// `resolve_identity` layer.
pub async fn record_resolution(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let outcome = request
        .extensions()
        .get::<RequestContext<UserRecord>>()
        .and_then(RequestContext::resolution)
        .map(|resolution| resolution.outcome())
        .unwrap_or("unresolved");
    state.record_resolution_metric(outcome);
    next.run(request).await
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserRecord,
    pub session_expires_at: Option<DateTime<Utc>>,
}

pub async fn me(
    Authenticated(user): Authenticated<UserRecord>,
    context: Option<Extension<RequestContext<UserRecord>>>,
) -> Json<ProfileResponse> {
    let session_expires_at = context
        .as_ref()
        .and_then(|Extension(context)| context.claims())
        .map(|claims| claims.expires_at);
    Json(ProfileResponse {
        user,
        session_expires_at,
    })
}

pub async fn list_roles(
    Authenticated(user): Authenticated<UserRecord>,
) -> Result<Json<Vec<&'static str>>, PermissionError> {
    ensure_at_least(&user, ROLE_MANAGER)?;
    Ok(Json(ROLE_HIERARCHY.to_vec()))
}

/// Public credential check. A bare id proves nothing, so it is refused
/// before any store lookup.
pub async fn validate_session(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Response {
    let secretless_id = matches!(
        credentials.shape(),
        Ok(CredentialShape::Identifier { password: None, .. })
    );

    if !secretless_id && state.guard.validate_credentials(&credentials).await {
        state.record_credential_metric("valid");
        return Json(json!({ "valid": true })).into_response();
    }

    state.record_credential_metric("invalid");
    info!(secretless_id, "credential validation rejected");
    state.emit_login_rejected(credentials.email.clone());
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "code": "INVALID_CREDENTIALS",
            "message": "invalid credentials",
        })),
    )
        .into_response()
}
