use std::str::FromStr;

use axum::{routing::get, Router};

use payables_core::DomainError;

use crate::app::errors::ApiError;

pub mod auth;
pub mod branches;
pub mod dashboard;
pub mod payments;
pub mod suppliers;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/auth/logout", axum::routing::post(auth::logout))
        .route("/dashboard", get(dashboard::summary))
        .nest("/users", users::router())
        .nest("/suppliers", suppliers::router())
        .nest("/sucursales", branches::router())
        .nest("/payments", payments::router())
}

/// Parse a path id; malformed ids are a 400.
pub(crate) fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    Ok(raw.parse::<T>()?)
}
