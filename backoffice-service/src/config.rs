use anyhow::{anyhow, Context, Result};
use common_auth::{hash_secret, parse_algorithm, JwtConfig, UserRecord, DEFAULT_COOKIE_NAME};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:5173",
];

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub jwt: JwtConfig,
    pub seed_users_path: Option<PathBuf>,
    pub audit_log_events: bool,
    pub cors_origins: Vec<String>,
    pub host: String,
    pub port: u16,
}

pub fn load_service_config() -> Result<ServiceConfig> {
    service_config_from(|key| env::var(key).ok())
}

/// Builds the configuration from an arbitrary key lookup so it can be
/// exercised without touching the process environment.
pub fn service_config_from<F>(lookup: F) -> Result<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let secret = lookup("JWT_SECRET")
        .and_then(|value| normalize_optional(&value))
        .ok_or_else(|| anyhow!("JWT_SECRET must be set"))?;

    let algorithm = lookup("JWT_ALGORITHM")
        .and_then(|value| normalize_optional(&value))
        .map(|value| parse_algorithm(&value))
        .transpose()
        .context("Failed to parse JWT_ALGORITHM")?
        .unwrap_or(common_auth::Algorithm::HS256);

    let cookie_name = lookup("AUTH_COOKIE_NAME")
        .and_then(|value| normalize_optional(&value))
        .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string());

    let leeway_seconds = lookup("JWT_LEEWAY_SECONDS")
        .and_then(|value| normalize_optional(&value))
        .map(|value| {
            value
                .parse::<u32>()
                .map_err(|err| anyhow!("Invalid JWT_LEEWAY_SECONDS '{value}': {err}"))
        })
        .transpose()?
        .unwrap_or(0);

    let jwt = JwtConfig::new(secret, algorithm)?
        .with_cookie_name(cookie_name)?
        .with_leeway(leeway_seconds);

    let seed_users_path = lookup("BACKOFFICE_SEED_USERS")
        .and_then(|value| normalize_optional(&value))
        .map(PathBuf::from);

    let audit_log_events = lookup("AUDIT_LOG_EVENTS")
        .map(|value| parse_bool(&value))
        .unwrap_or(true);

    let cors_origins = lookup("CORS_ALLOWED_ORIGINS")
        .map(|value| parse_list(&value))
        .filter(|origins| !origins.is_empty())
        .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect());

    let host = lookup("HOST")
        .and_then(|value| normalize_optional(&value))
        .unwrap_or_else(|| "0.0.0.0".to_string());
    let port = lookup("PORT")
        .and_then(|value| normalize_optional(&value))
        .map(|value| {
            value
                .parse::<u16>()
                .map_err(|err| anyhow!("Invalid PORT '{value}': {err}"))
        })
        .transpose()?
        .unwrap_or(8090);

    Ok(ServiceConfig {
        jwt,
        seed_users_path,
        audit_log_events,
        cors_origins,
        host,
        port,
    })
}

/// Seed file entry. A plaintext `password` is hashed on load and takes
/// precedence over any `password_hash` in the file.
#[derive(Debug, Deserialize)]
struct SeedUser {
    #[serde(flatten)]
    record: UserRecord,
    #[serde(default)]
    password: Option<String>,
}

pub fn load_seed_users(path: &Path) -> Result<Vec<UserRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed users from {}", path.display()))?;
    parse_seed_users(&raw).with_context(|| format!("Invalid seed users in {}", path.display()))
}

fn parse_seed_users(raw: &str) -> Result<Vec<UserRecord>> {
    let seeds: Vec<SeedUser> = serde_json::from_str(raw)?;
    seeds
        .into_iter()
        .map(|seed| -> Result<UserRecord> {
            let mut record = seed.record;
            if let Some(password) = seed.password.as_deref().and_then(normalize_optional) {
                record.password_hash = hash_secret(&password)?;
            }
            Ok(record)
        })
        .collect()
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(|c| c == ',' || c == ';' || c == ' ')
        .filter_map(normalize_optional)
        .collect()
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
