use std::fmt;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

use crate::error::{AuthError, AuthResult};

/// Cookie consulted when no bearer header is present.
pub const DEFAULT_COOKIE_NAME: &str = "token";

/// Runtime configuration for JWT verification. Built once at startup and
/// shared read-only across requests.
#[derive(Clone)]
pub struct JwtConfig {
    secret: Vec<u8>,
    algorithm: Algorithm,
    cookie_name: String,
    /// Allowable clock skew in seconds when validating exp/nbf.
    pub leeway_seconds: u32,
}

impl JwtConfig {
    /// Validates the signing material up front so a broken deployment fails
    /// at process start rather than on every request.
    pub fn new(secret: impl Into<Vec<u8>>, algorithm: Algorithm) -> AuthResult<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(AuthError::InvalidConfig(
                "signing secret must not be empty".to_string(),
            ));
        }
        ensure_hmac(algorithm)?;

        Ok(Self {
            secret,
            algorithm,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            leeway_seconds: 0,
        })
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> AuthResult<Self> {
        let name = name.into();
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::InvalidConfig(
                "token cookie name must not be empty".to_string(),
            ));
        }
        self.cookie_name = name.to_string();
        Ok(self)
    }

    /// Adjust the allowed leeway.
    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[redacted]")
            .field("algorithm", &self.algorithm)
            .field("cookie_name", &self.cookie_name)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

/// Parse an algorithm identifier such as `HS256`, accepting only the
/// symmetric HMAC family.
pub fn parse_algorithm(value: &str) -> AuthResult<Algorithm> {
    let algorithm = Algorithm::from_str(value.trim().to_ascii_uppercase().as_str())
        .map_err(|_| AuthError::InvalidConfig(format!("unknown signing algorithm '{value}'")))?;
    ensure_hmac(algorithm)?;
    Ok(algorithm)
}

fn ensure_hmac(algorithm: Algorithm) -> AuthResult<()> {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(()),
        other => Err(AuthError::InvalidConfig(format!(
            "signing algorithm {other:?} is not supported; use HS256, HS384 or HS512"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_secret() {
        let err = JwtConfig::new(Vec::new(), Algorithm::HS256).expect_err("empty secret");
        assert!(matches!(err, AuthError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_asymmetric_algorithm() {
        let err = JwtConfig::new("secret", Algorithm::RS256).expect_err("rsa not allowed");
        assert!(matches!(err, AuthError::InvalidConfig(_)));
    }

    #[test]
    fn parse_algorithm_normalises_case() {
        assert_eq!(parse_algorithm(" hs512 ").expect("hs512"), Algorithm::HS512);
        assert!(parse_algorithm("ES256").is_err());
        assert!(parse_algorithm("none").is_err());
    }

    #[test]
    fn defaults_and_overrides() {
        let config = JwtConfig::new("secret", Algorithm::HS256).expect("config");
        assert_eq!(config.cookie_name(), DEFAULT_COOKIE_NAME);
        assert_eq!(config.leeway_seconds, 0);

        let config = config
            .with_cookie_name(" pos_session ")
            .expect("cookie name")
            .with_leeway(5);
        assert_eq!(config.cookie_name(), "pos_session");
        assert_eq!(config.leeway_seconds, 5);
        assert!(config.clone().with_cookie_name("  ").is_err());
    }

    #[test]
    fn debug_hides_secret() {
        let config = JwtConfig::new("super-secret", Algorithm::HS256).expect("config");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[redacted]"));
    }
}
