use axum::http::HeaderMap;

use crate::claims::Claims;
use crate::error::AuthError;
use crate::token_source::RequestCredentials;

/// Terminal outcome of resolving one request's identity.
#[derive(Debug, Clone)]
pub struct Resolution<P> {
    principal: Option<P>,
    claims: Option<Claims>,
    rejection: Option<AuthError>,
}

impl<P> Resolution<P> {
    pub fn authenticated(principal: P, claims: Claims) -> Self {
        Self {
            principal: Some(principal),
            claims: Some(claims),
            rejection: None,
        }
    }

    /// No principal and nothing decoded: absent or unverifiable token.
    pub fn anonymous(reason: AuthError) -> Self {
        Self {
            principal: None,
            claims: None,
            rejection: Some(reason),
        }
    }

    /// Verified token whose subject did not lead to a principal.
    pub fn unmatched(claims: Claims, reason: AuthError) -> Self {
        Self {
            principal: None,
            claims: Some(claims),
            rejection: Some(reason),
        }
    }

    pub fn principal(&self) -> Option<&P> {
        self.principal.as_ref()
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    /// Why no principal was produced; `None` when authenticated.
    pub fn rejection(&self) -> Option<&AuthError> {
        self.rejection.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Metric label: `authenticated`, or the rejection kind.
    pub fn outcome(&self) -> &'static str {
        match &self.rejection {
            None => "authenticated",
            Some(reason) => reason.kind(),
        }
    }
}

/// Per-request identity context: the raw credential carriers plus the
/// lazily resolved identity. A fresh context is required for every request;
/// contexts must never be reused across requests.
///
/// `resolved == None` is the unresolved state. Resolution runs while a guard
/// holds `&mut RequestContext`, so a request can never start a second,
/// overlapping resolution.
#[derive(Debug, Clone)]
pub struct RequestContext<P> {
    credentials: RequestCredentials,
    resolved: Option<Resolution<P>>,
}

impl<P> RequestContext<P> {
    pub fn new(credentials: RequestCredentials) -> Self {
        Self {
            credentials,
            resolved: None,
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::new(RequestCredentials::from_headers(headers))
    }

    pub fn credentials(&self) -> &RequestCredentials {
        &self.credentials
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    pub fn resolution(&self) -> Option<&Resolution<P>> {
        self.resolved.as_ref()
    }

    pub fn principal(&self) -> Option<&P> {
        self.resolution().and_then(Resolution::principal)
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.resolution().and_then(Resolution::claims)
    }

    /// Record the outcome. `RESOLVED` is terminal: if the context already
    /// holds a resolution, `resolution` is discarded and the cached one is
    /// returned.
    pub fn settle(&mut self, resolution: Resolution<P>) -> &Resolution<P> {
        self.resolved.get_or_insert(resolution)
    }
}
