use thiserror::Error;

pub type CryptResult<T> = std::result::Result<T, CryptError>;

#[derive(Debug, Error)]
pub enum CryptError {
    /// Hashing failed or a stored hash could not be parsed.
    #[error("password hash error: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("session token error: {0}")]
    SessionToken(#[from] jsonwebtoken::errors::Error),
}
