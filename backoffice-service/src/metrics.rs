use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct AuthMetrics {
    registry: Registry,
    resolutions: IntCounterVec,
    credential_checks: IntCounterVec,
}

impl AuthMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let resolutions = IntCounterVec::new(
            Opts::new(
                "auth_resolutions_total",
                "Count of request identity resolutions grouped by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(resolutions.clone()))?;

        let credential_checks = IntCounterVec::new(
            Opts::new(
                "auth_credential_checks_total",
                "Count of explicit credential validations grouped by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(credential_checks.clone()))?;

        Ok(Self {
            registry,
            resolutions,
            credential_checks,
        })
    }

    pub fn resolution(&self, outcome: &str) {
        self.resolutions.with_label_values(&[outcome]).inc();
    }

    pub fn credential_check(&self, outcome: &str) {
        self.credential_checks.with_label_values(&[outcome]).inc();
    }

    pub fn render(&self) -> Result<Response> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            )
            .body(Body::from(buffer))?;
        Ok(response)
    }
}
