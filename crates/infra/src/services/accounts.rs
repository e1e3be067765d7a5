//! User accounts and login sessions.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tracing::{info, instrument, warn};

use payables_auth::{
    AuthError, Credentials, Hs256Jwt, PasswordHasher, UserAccount, UserSummary,
    check_password_policy,
};
use payables_core::{DomainError, UserId};

use super::{ServiceError, ServiceResult};
use crate::store::RecordStore;

/// A freshly issued login session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: UserSummary,
    pub ttl: Duration,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn RecordStore<UserAccount>>,
    hasher: PasswordHasher,
    jwt: Arc<Hs256Jwt>,
    session_ttl: Duration,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn RecordStore<UserAccount>>,
        hasher: PasswordHasher,
        jwt: Arc<Hs256Jwt>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            users,
            hasher,
            jwt,
            session_ttl,
        }
    }

    async fn find_by_username(&self, username: &str) -> ServiceResult<Option<UserAccount>> {
        let mut found = self
            .users
            .find_by("username", &Value::String(username.to_string()))
            .await?;
        Ok(found.pop())
    }

    /// bcrypt is CPU-bound; run it off the async workers.
    async fn blocking<T, F>(f: F) -> ServiceResult<T>
    where
        F: FnOnce() -> Result<T, AuthError> + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| ServiceError::Internal(format!("password task failed: {e}")))?
            .map_err(ServiceError::from)
    }

    /// Create an account. Used by both self-registration and user management.
    #[instrument(skip_all)]
    pub async fn register(&self, credentials: Credentials, now: DateTime<Utc>) -> ServiceResult<UserAccount> {
        let username = credentials.require()?.to_string();
        check_password_policy(&credentials.password)?;

        if self.find_by_username(&username).await?.is_some() {
            warn!(username = %username, "username already taken");
            return Err(DomainError::conflict("User already exists").into());
        }

        let hasher = self.hasher;
        let password = credentials.password;
        let hash = Self::blocking(move || hasher.hash(&password)).await?;

        let account = UserAccount::register(UserId::new(), &username, hash, now)?;
        let account = self.users.insert(account).await?;
        info!(user_id = %account.id_typed(), username = account.username(), "user registered");
        Ok(account)
    }

    /// Verify credentials and issue a signed session token.
    #[instrument(skip_all)]
    pub async fn login(&self, credentials: Credentials, now: DateTime<Utc>) -> ServiceResult<Session> {
        let username = credentials.require()?.to_string();

        let Some(account) = self.find_by_username(&username).await? else {
            warn!(username = %username, "login for unknown user");
            return Err(AuthError::InvalidCredentials.into());
        };

        let hasher = self.hasher;
        let password = credentials.password;
        let hash = account.password_hash().to_string();
        let valid = Self::blocking(move || hasher.verify(&password, &hash)).await?;
        if !valid {
            warn!(user_id = %account.id_typed(), "login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self
            .jwt
            .issue(account.id_typed(), now, self.session_ttl)
            .map_err(AuthError::from)?;
        info!(user_id = %account.id_typed(), "user logged in");
        Ok(Session {
            token,
            user: account.summary(),
            ttl: self.session_ttl,
        })
    }

    /// All accounts, newest first, without password hashes.
    pub async fn list_users(&self) -> ServiceResult<Vec<UserSummary>> {
        Ok(self
            .users
            .list()
            .await?
            .iter()
            .map(UserAccount::summary)
            .collect())
    }
}
