use std::collections::HashMap;
use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::claims::Subject;
use crate::error::{AuthError, AuthResult};
use crate::permissions::HasRoles;

/// Lookup contract the guard uses to turn a subject or email into a
/// principal. Implementations own the records; the guard never mutates them.
#[async_trait]
pub trait PrincipalStore: Send + Sync {
    type Principal: Clone + Send + Sync + 'static;

    async fn find_by_subject(&self, subject: &Subject) -> AuthResult<Option<Self::Principal>>;

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<Self::Principal>>;

    /// Compare `plaintext` against the principal's stored hash. Must not use
    /// plain equality.
    fn verify_secret(&self, principal: &Self::Principal, plaintext: &str) -> bool;

    /// Hash work for a lookup that found nobody, so unknown accounts cost
    /// the same as a wrong password. Always `false`.
    fn verify_unknown_secret(&self, plaintext: &str) -> bool {
        let _ = verify_secret_hash(UNKNOWN_PRINCIPAL_HASH, plaintext);
        false
    }
}

/// Well-formed argon2id PHC string with the default cost parameters. No
/// password hashes to its all-zero digest.
pub const UNKNOWN_PRINCIPAL_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Staff account as held by [`InMemoryPrincipalStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Subject,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

fn default_active() -> bool {
    true
}

impl HasRoles for UserRecord {
    fn roles(&self) -> &[String] {
        &self.roles
    }
}

/// Thread-safe principal store keyed by the subject's canonical string.
#[derive(Clone, Default)]
pub struct InMemoryPrincipalStore {
    inner: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: UserRecord) {
        self.inner.write().insert(user.id.as_key(), user);
    }

    pub fn remove(&self, subject: &Subject) -> Option<UserRecord> {
        self.inner.write().remove(&subject.as_key())
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn replace_all<I>(&self, users: I)
    where
        I: IntoIterator<Item = UserRecord>,
    {
        let mut guard = self.inner.write();
        guard.clear();
        for user in users {
            guard.insert(user.id.as_key(), user);
        }
    }
}

#[async_trait]
impl PrincipalStore for InMemoryPrincipalStore {
    type Principal = UserRecord;

    async fn find_by_subject(&self, subject: &Subject) -> AuthResult<Option<UserRecord>> {
        let guard = self.inner.read();
        Ok(guard
            .get(&subject.as_key())
            .filter(|user| user.active)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<UserRecord>> {
        let email = email.trim();
        let guard = self.inner.read();
        Ok(guard
            .values()
            .find(|user| user.active && user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn verify_secret(&self, principal: &UserRecord, plaintext: &str) -> bool {
        verify_secret_hash(&principal.password_hash, plaintext)
    }
}

/// Produce an argon2 PHC string for `plaintext`.
pub fn hash_secret(plaintext: &str) -> AuthResult<String> {
    if plaintext.trim().is_empty() {
        return Err(AuthError::InvalidConfig(
            "password must not be empty".to_string(),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Store(format!("failed to hash password: {err}")))
}

/// Argon2 verification; the digest comparison inside is constant-time.
/// Hashes that do not parse as PHC strings never verify.
pub fn verify_secret_hash(stored_hash: &str, plaintext: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: impl Into<Subject>, email: &str, password: &str) -> UserRecord {
        UserRecord {
            id: id.into(),
            name: "Test User".to_string(),
            email: email.to_string(),
            roles: vec!["cashier".to_string()],
            active: true,
            password_hash: hash_secret(password).expect("hash"),
        }
    }

    #[tokio::test]
    async fn finds_by_subject_regardless_of_representation() {
        let store = InMemoryPrincipalStore::new();
        store.insert(user(42_i64, "cashier@example.com", "pw"));

        let found = store
            .find_by_subject(&Subject::from("42"))
            .await
            .expect("lookup");
        assert_eq!(found.map(|u| u.email).as_deref(), Some("cashier@example.com"));
    }

    #[tokio::test]
    async fn email_lookup_is_case_insensitive() {
        let store = InMemoryPrincipalStore::new();
        store.insert(user("u-1", "Manager@Example.com", "pw"));

        let found = store
            .find_by_email(" manager@example.com ")
            .await
            .expect("lookup");
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn inactive_users_are_invisible() {
        let store = InMemoryPrincipalStore::new();
        let mut record = user("u-2", "gone@example.com", "pw");
        record.active = false;
        store.insert(record);

        assert!(store
            .find_by_subject(&Subject::from("u-2"))
            .await
            .expect("lookup")
            .is_none());
        assert!(store
            .find_by_email("gone@example.com")
            .await
            .expect("lookup")
            .is_none());
    }

    #[test]
    fn verify_secret_uses_hash() {
        let store = InMemoryPrincipalStore::new();
        let record = user("u-3", "a@b.com", "correct");
        assert!(store.verify_secret(&record, "correct"));
        assert!(!store.verify_secret(&record, "wrong"));

        let mut plaintext_hash = record.clone();
        plaintext_hash.password_hash = "correct".to_string();
        assert!(!store.verify_secret(&plaintext_hash, "correct"));
    }

    #[test]
    fn unknown_principal_hash_runs_real_verification() {
        let parsed = PasswordHash::new(UNKNOWN_PRINCIPAL_HASH).expect("valid PHC string");
        assert_eq!(parsed.algorithm.as_str(), "argon2id");

        let store = InMemoryPrincipalStore::new();
        assert!(!store.verify_unknown_secret("correct"));
        assert!(!store.verify_unknown_secret(""));
    }

    #[test]
    fn replace_all_swaps_contents() {
        let store = InMemoryPrincipalStore::new();
        store.insert(user("old", "old@example.com", "pw"));
        store.replace_all(vec![user("new", "new@example.com", "pw")]);
        assert_eq!(store.len(), 1);
        assert!(store.remove(&Subject::from("old")).is_none());
        assert!(store.remove(&Subject::from("new")).is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let record = user("u-4", "a@b.com", "pw");
        let json = serde_json::to_value(&record).expect("serialize");
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "a@b.com");
    }
}
