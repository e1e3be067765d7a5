use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use payables_core::UserId;

/// Session token claims.
///
/// Timestamps are seconds since the Unix epoch, as registered JWT claims
/// expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the authenticated user.
    pub sub: UserId,

    /// Issued-at (seconds).
    pub iat: i64,

    /// Expiration (seconds).
    pub exp: i64,
}

impl SessionClaims {
    /// Claims valid for `ttl` from `now`. Fails when the expiry is not a
    /// representable timestamp.
    pub fn new(sub: UserId, now: DateTime<Utc>, ttl: Duration) -> Result<Self, TokenValidationError> {
        let expires = now
            .checked_add_signed(ttl)
            .ok_or(TokenValidationError::ExpiryOutOfRange)?;
        Ok(Self {
            sub,
            iat: now.timestamp(),
            exp: expires.timestamp(),
        })
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("session lifetime puts expiry out of range")]
    ExpiryOutOfRange,
}

/// Deterministically validate the claim time window against `now`.
///
/// Signature verification happens in [`crate::token`]; this only looks at the
/// decoded claims.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
