use jsonwebtoken::{decode, DecodingKey, Validation};
use serde_json::Value;
use tracing::debug;

use crate::claims::Claims;
use crate::config::JwtConfig;
use crate::error::AuthResult;

/// Decodes and verifies HMAC-signed tokens against a fixed secret.
///
/// `jsonwebtoken` checks the signature before it looks at any claim, then
/// `exp`, then `nbf`; claim typing is checked last when the payload is mapped
/// onto [`Claims`]. Every failure comes back as a distinct
/// [`AuthError`](crate::AuthError) variant.
#[derive(Clone)]
pub struct JwtVerifier {
    config: JwtConfig,
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: JwtConfig) -> Self {
        let key = DecodingKey::from_secret(config.secret());

        let mut validation = Validation::new(config.algorithm());
        validation.leeway = config.leeway_seconds.into();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            config,
            key,
            validation,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let token_data = decode::<Value>(token, &self.key, &self.validation)?;
        let claims = Claims::try_from(token_data.claims)?;
        debug!(subject = ?claims.subject, "verified JWT successfully");
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use chrono::Utc;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &[u8] = b"test-secret-key-for-testing";

    fn verifier() -> JwtVerifier {
        JwtVerifier::new(JwtConfig::new(SECRET, Algorithm::HS256).expect("config"))
    }

    fn sign(claims: &Value, secret: &[u8], algorithm: Algorithm) -> String {
        encode(
            &Header::new(algorithm),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .expect("sign token")
    }

    #[test]
    fn verifier_accepts_valid_token() {
        let now = Utc::now().timestamp();
        let token = sign(
            &json!({"sub": "user-1", "iat": now, "exp": now + 600}),
            SECRET,
            Algorithm::HS256,
        );

        let claims = verifier().verify(&token).expect("verification succeeds");
        assert_eq!(claims.subject.map(|s| s.as_key()).as_deref(), Some("user-1"));
        assert_eq!(claims.expires_at.timestamp(), now + 600);
    }

    #[test]
    fn signature_is_checked_before_expiry() {
        let now = Utc::now().timestamp();
        let token = sign(
            &json!({"sub": "user-1", "iat": now - 100, "exp": now - 50}),
            b"another-secret",
            Algorithm::HS256,
        );

        let err = verifier().verify(&token).expect_err("forged token");
        assert!(matches!(err, AuthError::TokenSignatureInvalid), "{err:?}");
    }

    #[test]
    fn expired_by_one_second_is_rejected() {
        let now = Utc::now().timestamp();
        let token = sign(
            &json!({"sub": "user-1", "iat": now - 60, "exp": now - 1}),
            SECRET,
            Algorithm::HS256,
        );

        let err = verifier().verify(&token).expect_err("expired token");
        assert!(matches!(err, AuthError::TokenExpired), "{err:?}");
    }

    #[test]
    fn expiry_is_checked_before_not_before() {
        let now = Utc::now().timestamp();
        let token = sign(
            &json!({"sub": "user-1", "exp": now - 10, "nbf": now + 600}),
            SECRET,
            Algorithm::HS256,
        );

        let err = verifier().verify(&token).expect_err("expired and immature");
        assert!(matches!(err, AuthError::TokenExpired), "{err:?}");
    }

    #[test]
    fn future_not_before_is_rejected() {
        let now = Utc::now().timestamp();
        let token = sign(
            &json!({"sub": "user-1", "iat": now, "exp": now + 600, "nbf": now + 300}),
            SECRET,
            Algorithm::HS256,
        );

        let err = verifier().verify(&token).expect_err("immature token");
        assert!(matches!(err, AuthError::TokenNotYetValid), "{err:?}");
    }

    #[test]
    fn leeway_absorbs_small_clock_skew() {
        let now = Utc::now().timestamp();
        let token = sign(
            &json!({"sub": "user-1", "exp": now - 2}),
            SECRET,
            Algorithm::HS256,
        );
        let lenient = JwtVerifier::new(
            JwtConfig::new(SECRET, Algorithm::HS256)
                .expect("config")
                .with_leeway(30),
        );
        assert!(lenient.verify(&token).is_ok());
    }

    #[test]
    fn other_algorithms_are_malformed() {
        let now = Utc::now().timestamp();
        let token = sign(
            &json!({"sub": "user-1", "exp": now + 600}),
            SECRET,
            Algorithm::HS512,
        );

        let err = verifier().verify(&token).expect_err("algorithm mismatch");
        assert!(matches!(err, AuthError::TokenMalformed(_)), "{err:?}");
    }

    #[test]
    fn garbage_and_missing_exp_are_malformed() {
        let err = verifier().verify("invalid-token").expect_err("garbage");
        assert!(matches!(err, AuthError::TokenMalformed(_)), "{err:?}");

        let token = sign(&json!({"sub": "user-1"}), SECRET, Algorithm::HS256);
        let err = verifier().verify(&token).expect_err("no exp claim");
        assert!(matches!(err, AuthError::TokenMalformed(_)), "{err:?}");
    }

    #[test]
    fn wrongly_typed_subject_is_malformed() {
        let now = Utc::now().timestamp();
        let token = sign(
            &json!({"sub": ["user-1"], "exp": now + 600}),
            SECRET,
            Algorithm::HS256,
        );

        let err = verifier().verify(&token).expect_err("array subject");
        assert!(matches!(err, AuthError::TokenMalformed(_)), "{err:?}");
    }
}
