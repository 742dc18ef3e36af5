use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::context::RequestContext;
use crate::error::AuthError;
use crate::guard::Guard;

/// Middleware that resolves the caller's identity once per request.
///
/// A fresh [`RequestContext`] is built from the request headers, resolved
/// through the guard and stored in the request extensions, where the
/// extractors below read it. Install with
/// `axum::middleware::from_fn_with_state(guard, resolve_identity::<G>)`.
pub async fn resolve_identity<G>(
    State(guard): State<Arc<G>>,
    mut request: Request,
    next: Next,
) -> Response
where
    G: Guard + ?Sized + 'static,
{
    let mut context = RequestContext::<G::Principal>::from_headers(request.headers());
    guard.current_principal(&mut context).await;
    request.extensions_mut().insert(context);
    next.run(request).await
}

fn resolved_context<'a, P>(parts: &'a Parts) -> Option<&'a RequestContext<P>>
where
    P: Clone + Send + Sync + 'static,
{
    let context = parts.extensions.get::<RequestContext<P>>();
    if context.is_none() {
        warn!("identity middleware is not installed; treating request as anonymous");
    }
    context
}

/// The resolved principal, or `None` for anonymous requests. Never rejects.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal<P>(pub Option<P>);

#[async_trait]
impl<S, P> FromRequestParts<S> for CurrentPrincipal<P>
where
    S: Send + Sync,
    P: Clone + Send + Sync + 'static,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = resolved_context::<P>(parts).and_then(|context| context.principal().cloned());
        Ok(Self(principal))
    }
}

/// Requires an authenticated principal; anonymous requests get a 401 that
/// does not say why the token, if any, was refused.
#[derive(Debug, Clone)]
pub struct Authenticated<P>(pub P);

impl<P> Authenticated<P> {
    pub fn into_inner(self) -> P {
        self.0
    }
}

#[async_trait]
impl<S, P> FromRequestParts<S> for Authenticated<P>
where
    S: Send + Sync,
    P: Clone + Send + Sync + 'static,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        resolved_context::<P>(parts)
            .and_then(|context| context.principal().cloned())
            .map(Self)
            .ok_or(AuthError::Unauthenticated)
    }
}
