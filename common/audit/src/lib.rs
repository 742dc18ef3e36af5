pub mod changes;
pub mod model;
pub mod producer;
pub mod stock;

pub use changes::{diff_fields, FieldChange, REDACTED};
pub use model::{
    AuditActor, AuditError, AuditEvent, AuditResult, AuditSeverity, DomainEvent,
    AUDIT_EVENT_VERSION,
};
pub use producer::{
    AuditProducer, AuditSink, BufferedAuditSink, NoopAuditSink, TracingAuditSink,
};
pub use stock::{LowStockMonitor, DEFAULT_LOW_STOCK_THRESHOLD};
