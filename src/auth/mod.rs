//! Password hashing and signed session tokens.

mod password;
pub use password::{hash_password, verify_password};

mod jwt;
pub use jwt::{SESSION_TTL, SessionClaims, issue_session, verify_session};

mod error;
pub use error::{CryptError, CryptResult};
