//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use payables_core::{DomainError, DomainResult, Record, UserId};

/// Stored user account. Carries the bcrypt hash; never hand this to a client,
/// use [`UserAccount::summary`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    id: UserId,
    /// Unique across accounts (enforced by the account service).
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

/// Client-facing view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Username/password pair as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Trimmed username, or `Validation` if either field is blank.
    pub fn require(&self) -> DomainResult<&str> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            return Err(DomainError::validation("Username and password are required"));
        }
        Ok(username)
    }
}

impl UserAccount {
    pub fn register(
        id: UserId,
        username: &str,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("Username and password are required"));
        }
        Ok(Self {
            id,
            username: username.to_string(),
            password_hash,
            created_at: now,
        })
    }

    pub fn id_typed(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            created_at: self.created_at,
        }
    }
}

impl Record for UserAccount {
    const COLLECTION: &'static str = "users";
    const KIND: &'static str = "user";
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
