//! `payables-auth`: user accounts, password hashing and session tokens.
//!
//! This crate is decoupled from HTTP and storage: it knows how to hash and
//! verify passwords and how to issue/validate signed session tokens, nothing
//! more.

pub mod claims;
pub mod error;
pub mod password;
pub mod token;
pub mod user;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use error::AuthError;
pub use password::{DEFAULT_BCRYPT_COST, MIN_PASSWORD_LEN, PasswordHasher, check_password_policy};
pub use token::{Hs256Jwt, JwtValidator, TokenError};
pub use user::{Credentials, UserAccount, UserSummary};
