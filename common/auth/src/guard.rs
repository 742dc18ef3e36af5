use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn, Level};

use crate::context::{RequestContext, Resolution};
use crate::credentials::{CredentialShape, Credentials};
use crate::error::AuthError;
use crate::store::PrincipalStore;
use crate::token_source::{RequestCredentials, TokenSource};
use crate::verifier::JwtVerifier;

/// Authentication strategy consulted before protected handlers run.
///
/// Both operations are infallible from the caller's point of view: every
/// failure inside a guard degrades to "anonymous" or `false`.
#[async_trait]
pub trait Guard: Send + Sync {
    type Principal: Clone + Send + Sync + 'static;

    /// Resolve the principal of the request owning `request`. The first call
    /// does the work; later calls on the same context return the cached
    /// outcome.
    async fn current_principal(
        &self,
        request: &mut RequestContext<Self::Principal>,
    ) -> Option<Self::Principal>;

    /// Check an explicit credential set without touching any request's
    /// cached identity.
    async fn validate_credentials(&self, credentials: &Credentials) -> bool;
}

/// Guard backed by HMAC-signed JWTs, read from the bearer header or the
/// configured cookie, and a [`PrincipalStore`] for subject lookup.
pub struct JwtGuard<S> {
    verifier: Arc<JwtVerifier>,
    store: Arc<S>,
}

impl<S> Clone for JwtGuard<S> {
    fn clone(&self) -> Self {
        Self {
            verifier: Arc::clone(&self.verifier),
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: PrincipalStore> JwtGuard<S> {
    pub fn new(verifier: Arc<JwtVerifier>, store: Arc<S>) -> Self {
        Self { verifier, store }
    }

    pub fn verifier(&self) -> &JwtVerifier {
        &self.verifier
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn resolve(&self, credentials: &RequestCredentials) -> Resolution<S::Principal> {
        let cookie_name = self.verifier.config().cookie_name();
        let Some((source, token)) = credentials.token(cookie_name) else {
            debug!("no bearer header or token cookie; request is anonymous");
            return Resolution::anonymous(AuthError::TokenAbsent);
        };

        let claims = match self.verifier.verify(token) {
            Ok(claims) => claims,
            Err(err) => {
                log_rejection(source, &err);
                return Resolution::anonymous(err);
            }
        };

        let Some(subject) = claims.subject.clone() else {
            let err = AuthError::MissingSubject;
            log_rejection(source, &err);
            return Resolution::unmatched(claims, err);
        };

        match self.store.find_by_subject(&subject).await {
            Ok(Some(principal)) => {
                debug!(%source, %subject, "resolved principal from token");
                Resolution::authenticated(principal, claims)
            }
            Ok(None) => {
                let err = AuthError::PrincipalNotFound(subject.as_key());
                log_rejection(source, &err);
                Resolution::unmatched(claims, err)
            }
            Err(err) => {
                log_rejection(source, &err);
                Resolution::unmatched(claims, err)
            }
        }
    }
}

#[async_trait]
impl<S: PrincipalStore> Guard for JwtGuard<S> {
    type Principal = S::Principal;

    async fn current_principal(
        &self,
        request: &mut RequestContext<S::Principal>,
    ) -> Option<S::Principal> {
        if let Some(resolution) = request.resolution() {
            return resolution.principal().cloned();
        }

        let resolution = self.resolve(request.credentials()).await;
        request.settle(resolution).principal().cloned()
    }

    async fn validate_credentials(&self, credentials: &Credentials) -> bool {
        let shape = match credentials.shape() {
            Ok(shape) => shape,
            Err(err) => {
                debug!(error = %err, "rejecting credential set without a store lookup");
                return false;
            }
        };

        match shape {
            CredentialShape::EmailSecret { email, password } => {
                match self.store.find_by_email(email).await {
                    Ok(Some(principal)) => {
                        let valid = self.store.verify_secret(&principal, password);
                        if !valid {
                            info!("password mismatch during credential validation");
                        }
                        valid
                    }
                    Ok(None) => {
                        info!("no principal registered for submitted email");
                        self.store.verify_unknown_secret(password)
                    }
                    Err(err) => {
                        error!(error = %err, "principal lookup by email failed");
                        false
                    }
                }
            }
            CredentialShape::Identifier { id, password } => {
                match self.store.find_by_subject(id).await {
                    Ok(Some(principal)) => match password {
                        Some(password) => self.store.verify_secret(&principal, password),
                        None => true,
                    },
                    Ok(None) => {
                        info!(subject = %id, "no principal registered for submitted id");
                        match password {
                            Some(password) => self.store.verify_unknown_secret(password),
                            None => false,
                        }
                    }
                    Err(err) => {
                        error!(error = %err, subject = %id, "principal lookup by id failed");
                        false
                    }
                }
            }
        }
    }
}

fn log_rejection(source: TokenSource, err: &AuthError) {
    let kind = err.kind();
    let level = err.log_level();
    if level == Level::ERROR {
        error!(%source, kind, error = %err, "token rejected");
    } else if level == Level::WARN {
        warn!(%source, kind, error = %err, "token rejected");
    } else if level == Level::INFO {
        info!(%source, kind, error = %err, "token rejected");
    } else {
        debug!(%source, kind, error = %err, "token rejected");
    }
}
