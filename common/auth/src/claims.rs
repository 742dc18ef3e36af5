use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Stable identifier of a principal as carried in the `sub` claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    Id(i64),
    Key(String),
}

impl Subject {
    /// Canonical string form; `42` and `"42"` name the same principal.
    pub fn as_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Id(id) => write!(f, "{id}"),
            Subject::Key(key) => f.write_str(key),
        }
    }
}

impl From<i64> for Subject {
    fn from(value: i64) -> Self {
        Subject::Id(value)
    }
}

impl From<&str> for Subject {
    fn from(value: &str) -> Self {
        Subject::Key(value.to_string())
    }
}

impl From<String> for Subject {
    fn from(value: String) -> Self {
        Subject::Key(value)
    }
}

/// Application-focused representation of verified JWT claims.
#[derive(Debug, Clone, Serialize)]
pub struct Claims {
    pub subject: Option<Subject>,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub not_before: Option<DateTime<Utc>>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ClaimsRepr {
    #[serde(default)]
    sub: Option<Subject>,
    exp: i64,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    nbf: Option<i64>,
}

fn timestamp(claim: &'static str, value: i64) -> AuthResult<DateTime<Utc>> {
    Utc.timestamp_opt(value, 0)
        .single()
        .ok_or_else(|| AuthError::TokenMalformed(format!("claim '{claim}' out of range: {value}")))
}

impl TryFrom<ClaimsRepr> for Claims {
    type Error = AuthError;

    fn try_from(value: ClaimsRepr) -> AuthResult<Self> {
        let subject = match value.sub {
            Some(Subject::Key(key)) if key.trim().is_empty() => None,
            other => other,
        };

        Ok(Self {
            subject,
            issued_at: value.iat.map(|iat| timestamp("iat", iat)).transpose()?,
            expires_at: timestamp("exp", value.exp)?,
            not_before: value.nbf.map(|nbf| timestamp("nbf", nbf)).transpose()?,
            raw: serde_json::Value::Null,
        })
    }
}

impl TryFrom<serde_json::Value> for Claims {
    type Error = AuthError;

    fn try_from(value: serde_json::Value) -> AuthResult<Self> {
        let repr: ClaimsRepr = serde_json::from_value(value.clone())
            .map_err(|err| AuthError::TokenMalformed(err.to_string()))?;
        let mut claims = Claims::try_from(repr)?;
        claims.raw = value;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_string_and_integer_subjects() {
        let claims = Claims::try_from(json!({"sub": "abc", "exp": 2_000_000_000}))
            .expect("string subject");
        assert_eq!(claims.subject, Some(Subject::Key("abc".into())));

        let claims =
            Claims::try_from(json!({"sub": 42, "exp": 2_000_000_000, "iat": 1_700_000_000}))
                .expect("integer subject");
        assert_eq!(claims.subject, Some(Subject::Id(42)));
        assert!(claims.issued_at.is_some());
        assert!(claims.raw.get("sub").is_some());
    }

    #[test]
    fn numeric_strings_share_a_key_with_integers() {
        assert_eq!(Subject::from("42").as_key(), Subject::from(42_i64).as_key());
    }

    #[test]
    fn blank_subject_reads_as_missing() {
        let claims = Claims::try_from(json!({"sub": "  ", "exp": 2_000_000_000}))
            .expect("blank subject");
        assert!(claims.subject.is_none());
    }

    #[test]
    fn wrong_claim_types_are_malformed() {
        let err = Claims::try_from(json!({"sub": true, "exp": 2_000_000_000}))
            .expect_err("boolean subject");
        assert!(matches!(err, AuthError::TokenMalformed(_)));

        let err = Claims::try_from(json!({"sub": "abc", "exp": "tomorrow"}))
            .expect_err("string exp");
        assert!(matches!(err, AuthError::TokenMalformed(_)));
    }
}
