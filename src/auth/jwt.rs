use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifetime of a sign-in session cookie.
pub const SESSION_TTL: Duration = Duration::days(1);

/// Claims of the session cookie. The role is not part of the token, it is
/// looked up on every request so a revoked profile link takes effect at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

pub fn issue_session<K: AsRef<[u8]>>(
    claims: &SessionClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(key.as_ref()),
    )
}

/// Checks signature and expiry, returns the user id the session belongs to.
pub fn verify_session<K: AsRef<[u8]>>(token: &str, key: K) -> jsonwebtoken::errors::Result<Uuid> {
    let data = jsonwebtoken::decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(key.as_ref()),
        &Validation::default(),
    )?;
    Ok(data.claims.sub)
}

#[cfg(test)]
mod test {
    use jsonwebtoken::errors::ErrorKind;

    use super::*;

    #[test]
    fn session_carries_user_id() {
        let id = Uuid::new_v4();
        let token = issue_session(&SessionClaims::new(id, SESSION_TTL), "key").unwrap();
        assert_eq!(verify_session(&token, "key").unwrap(), id);
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token = issue_session(&SessionClaims::new(Uuid::new_v4(), SESSION_TTL), "key").unwrap();
        let err = verify_session(&token, "other").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidSignature);
    }

    #[test]
    fn expired_session_is_rejected() {
        let claims = SessionClaims::new(Uuid::new_v4(), Duration::hours(-2));
        let token = issue_session(&claims, "key").unwrap();
        let err = verify_session(&token, "key").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::ExpiredSignature);
    }
}
