pub mod claims;
pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod extractors;
pub mod guard;
pub mod permissions;
pub mod roles;
pub mod store;
pub mod token_source;
pub mod verifier;

pub use claims::{Claims, Subject};
pub use config::{parse_algorithm, JwtConfig, DEFAULT_COOKIE_NAME};
pub use context::{RequestContext, Resolution};
pub use credentials::{CredentialShape, Credentials};
pub use error::{AuthError, AuthResult};
pub use extractors::{resolve_identity, Authenticated, CurrentPrincipal};
pub use guard::{Guard, JwtGuard};
pub use jsonwebtoken::Algorithm;
pub use permissions::{ensure_at_least, ensure_role, HasRoles, PermissionError};
pub use roles::{ROLE_ADMIN, ROLE_CASHIER, ROLE_HIERARCHY, ROLE_MANAGER, ROLE_SUPER_ADMIN};
pub use store::{
    hash_secret, verify_secret_hash, InMemoryPrincipalStore, PrincipalStore, UserRecord,
    UNKNOWN_PRINCIPAL_HASH,
};
pub use token_source::{RequestCredentials, TokenSource};
pub use verifier::JwtVerifier;
