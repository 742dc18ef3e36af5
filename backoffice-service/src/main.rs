use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use backoffice_service::config::{load_seed_users, load_service_config};
use backoffice_service::{build_router, AppState, SERVICE_NAME};
use common_audit::{AuditProducer, AuditSink, NoopAuditSink, TracingAuditSink};
use common_auth::{InMemoryPrincipalStore, JwtGuard, JwtVerifier};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_service_config()?;

    let store = InMemoryPrincipalStore::new();
    match &config.seed_users_path {
        Some(path) => {
            let users = load_seed_users(path)?;
            info!(count = users.len(), path = %path.display(), "loaded seed users");
            store.replace_all(users);
        }
        None => warn!("BACKOFFICE_SEED_USERS not set; no principal will resolve"),
    }

    let verifier = Arc::new(JwtVerifier::new(config.jwt.clone()));
    let guard = Arc::new(JwtGuard::new(verifier, Arc::new(store)));

    let sink: Arc<dyn AuditSink> = if config.audit_log_events {
        Arc::new(TracingAuditSink)
    } else {
        Arc::new(NoopAuditSink)
    };
    let state = AppState::new(guard, AuditProducer::new(SERVICE_NAME, sink))?;

    let origins = config
        .cors_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("Invalid CORS origin '{origin}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true);

    let app = build_router(state).layer(cors);

    let ip: std::net::IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((ip, config.port));

    info!(%addr, algorithm = ?config.jwt.algorithm(), "starting {SERVICE_NAME}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
