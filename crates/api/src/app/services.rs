use std::sync::Arc;

use payables_auth::{AuthError, Hs256Jwt, PasswordHasher};
use payables_infra::services::{AccountService, BranchService, InvoiceLedger, SupplierService};
use payables_infra::{Config, Stores};

/// Everything the handlers need, built once at startup.
#[derive(Clone)]
pub struct AppServices {
    pub suppliers: SupplierService,
    pub branches: BranchService,
    pub ledger: InvoiceLedger,
    pub accounts: AccountService,
    pub jwt: Arc<Hs256Jwt>,
    pub cookie_secure: bool,
}

impl AppServices {
    pub fn from_config(config: &Config, stores: Stores) -> Result<Self, AuthError> {
        let jwt = Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes()));
        let hasher = PasswordHasher::new(config.bcrypt_cost)?;

        Ok(Self {
            suppliers: SupplierService::new(stores.suppliers.clone()),
            branches: BranchService::new(stores.branches.clone(), stores.invoices.clone()),
            ledger: InvoiceLedger::new(&stores),
            accounts: AccountService::new(stores.users.clone(), hasher, jwt.clone(), config.session_ttl),
            jwt,
            cookie_secure: config.cookie_secure,
        })
    }
}
