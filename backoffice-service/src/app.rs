use std::sync::Arc;

use anyhow::Result;
use axum::extract::FromRef;
use common_audit::{AuditActor, AuditProducer, DomainEvent};
use common_auth::{Guard, UserRecord};

use crate::metrics::AuthMetrics;

pub const SERVICE_NAME: &str = "backoffice-service";

pub type BackofficeGuard = dyn Guard<Principal = UserRecord>;

#[derive(Clone)]
pub struct AppState {
    pub guard: Arc<BackofficeGuard>,
    pub metrics: Arc<AuthMetrics>,
    pub audit: AuditProducer,
}

impl FromRef<AppState> for Arc<BackofficeGuard> {
    fn from_ref(state: &AppState) -> Self {
        state.guard.clone()
    }
}

impl FromRef<AppState> for AuditProducer {
    fn from_ref(state: &AppState) -> Self {
        state.audit.clone()
    }
}

impl AppState {
    pub fn new(guard: Arc<BackofficeGuard>, audit: AuditProducer) -> Result<Self> {
        Ok(Self {
            guard,
            metrics: Arc::new(AuthMetrics::new()?),
            audit,
        })
    }

    pub fn record_resolution_metric(&self, outcome: &str) {
        self.metrics.resolution(outcome);
    }

    pub fn record_credential_metric(&self, outcome: &str) {
        self.metrics.credential_check(outcome);
    }

    pub fn emit_login_rejected(&self, email: Option<String>) {
        self.audit
            .emit_detached(AuditActor::system(), DomainEvent::LoginRejected { email });
    }
}
