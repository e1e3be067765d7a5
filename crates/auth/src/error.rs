use thiserror::Error;

use crate::token::TokenError;

/// Authentication failures.
///
/// `InvalidCredentials` and `Unauthenticated` are client-facing; the rest are
/// infrastructure failures and map to an internal error at the edge.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("authentication required")]
    Unauthenticated,

    #[error("invalid bcrypt cost {0} (expected 4..=31)")]
    InvalidCost(u32),

    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Token(#[from] TokenError),
}
