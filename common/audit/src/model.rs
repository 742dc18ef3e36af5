use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::changes::FieldChange;

/// Who caused an event. `id` is the principal's canonical subject string.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AuditActor {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl AuditActor {
    pub fn new(id: impl Into<String>, name: Option<String>, email: Option<String>) -> Self {
        Self {
            id: Some(id.into()),
            name,
            email,
        }
    }

    /// Actor for events raised by the service itself.
    pub fn system() -> Self {
        Self {
            id: None,
            name: Some("system".to_string()),
            email: None,
        }
    }
}

pub const AUDIT_EVENT_VERSION: i32 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    #[default]
    Info,
    Warning,
    Security,
    Compliance,
}

/// Back-office occurrences worth recording or notifying about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    UserCreated {
        user_id: String,
        email: String,
    },
    UserUpdated {
        user_id: String,
        changes: Vec<FieldChange>,
    },
    LowStock {
        product_id: Uuid,
        store_id: Uuid,
        quantity: i32,
        threshold: i32,
    },
    NewSale {
        sale_id: Uuid,
        store_id: Uuid,
        total_cents: i64,
        item_count: u32,
    },
    LoginRejected {
        email: Option<String>,
    },
}

impl DomainEvent {
    pub fn action(&self) -> &'static str {
        match self {
            DomainEvent::UserCreated { .. } => "user.created",
            DomainEvent::UserUpdated { .. } => "user.updated",
            DomainEvent::LowStock { .. } => "inventory.low_stock",
            DomainEvent::NewSale { .. } => "sale.created",
            DomainEvent::LoginRejected { .. } => "session.login_rejected",
        }
    }

    pub fn severity(&self) -> AuditSeverity {
        match self {
            DomainEvent::LoginRejected { .. } => AuditSeverity::Security,
            DomainEvent::LowStock { .. } => AuditSeverity::Warning,
            DomainEvent::UserUpdated { .. } => AuditSeverity::Compliance,
            DomainEvent::UserCreated { .. } | DomainEvent::NewSale { .. } => AuditSeverity::Info,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: Uuid,
    pub event_version: i32,
    pub actor: AuditActor,
    pub action: String,
    pub occurred_at: DateTime<Utc>,
    pub source_service: String,
    pub severity: AuditSeverity,
    pub trace_id: Option<Uuid>,
    pub payload: DomainEvent,
}

impl AuditEvent {
    pub fn new(
        source_service: impl Into<String>,
        actor: AuditActor,
        payload: DomainEvent,
        trace_id: Option<Uuid>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_version: AUDIT_EVENT_VERSION,
            actor,
            action: payload.action().to_string(),
            occurred_at: Utc::now(),
            source_service: source_service.into(),
            severity: payload.severity(),
            trace_id,
            payload,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("sink error: {0}")]
    Sink(String),
}

pub type AuditResult<T> = Result<T, AuditError>;
