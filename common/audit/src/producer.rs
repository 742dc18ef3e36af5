use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{AuditActor, AuditError, AuditEvent, AuditResult, DomainEvent};

/// Destination for audit events.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn publish(&self, event: &AuditEvent) -> AuditResult<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn publish(&self, _event: &AuditEvent) -> AuditResult<()> {
        Ok(())
    }
}

/// Writes each event as one structured log line under the `audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn publish(&self, event: &AuditEvent) -> AuditResult<()> {
        let payload = serde_json::to_string(&event.payload)
            .map_err(|err| AuditError::Serialization(err.to_string()))?;
        info!(
            target: "audit",
            event_id = %event.event_id,
            action = %event.action,
            severity = ?event.severity,
            actor_id = event.actor.id.as_deref().unwrap_or("-"),
            source_service = %event.source_service,
            payload = %payload,
            "audit event"
        );
        Ok(())
    }
}

/// Keeps events in memory; used by tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct BufferedAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl BufferedAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.events.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.lock().await.is_empty()
    }

    pub async fn drain(&self) -> Vec<AuditEvent> {
        std::mem::take(&mut *self.events.lock().await)
    }
}

#[async_trait]
impl AuditSink for BufferedAuditSink {
    async fn publish(&self, event: &AuditEvent) -> AuditResult<()> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

/// Stamps domain events with the envelope and hands them to a sink.
#[derive(Clone)]
pub struct AuditProducer {
    sink: Arc<dyn AuditSink>,
    source_service: String,
}

impl AuditProducer {
    pub fn new(source_service: impl Into<String>, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            sink,
            source_service: source_service.into(),
        }
    }

    pub fn noop(source_service: impl Into<String>) -> Self {
        Self::new(source_service, Arc::new(NoopAuditSink))
    }

    pub fn source_service(&self) -> &str {
        &self.source_service
    }

    pub async fn emit(
        &self,
        actor: AuditActor,
        payload: DomainEvent,
        trace_id: Option<Uuid>,
    ) -> AuditResult<AuditEvent> {
        let event = AuditEvent::new(self.source_service.clone(), actor, payload, trace_id);
        self.sink.publish(&event).await?;
        Ok(event)
    }

    /// Fire-and-forget. Publishing runs on its own task and failures are
    /// only logged; outside a tokio runtime the event is dropped with a
    /// warning.
    pub fn emit_detached(&self, actor: AuditActor, payload: DomainEvent) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(action = payload.action(), "no runtime available; audit event dropped");
            return;
        };
        let producer = self.clone();
        handle.spawn(async move {
            let action = payload.action();
            if let Err(err) = producer.emit(actor, payload, None).await {
                warn!(error = %err, action, "failed to publish audit event");
            }
        });
    }
}
