use payables_core::{DomainError, DomainResult};

use crate::error::AuthError;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const DEFAULT_BCRYPT_COST: u32 = 12;

const COST_RANGE: core::ops::RangeInclusive<u32> = 4..=31;

/// Reject passwords shorter than [`MIN_PASSWORD_LEN`] characters.
pub fn check_password_policy(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

/// bcrypt with a fixed work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        if !COST_RANGE.contains(&cost) {
            return Err(AuthError::InvalidCost(cost));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(bcrypt::verify(password, hash)?)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: DEFAULT_BCRYPT_COST,
        }
    }
}
