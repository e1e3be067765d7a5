use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use payables_auth::{Credentials, UserSummary};

use crate::app::dto::{ApiJson, Items};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", get(list_users).post(create_user))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Items<UserSummary>>, ApiError> {
    let users = services.accounts.list_users().await?;
    Ok(Json(users.into()))
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<Credentials>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    let account = services.accounts.register(body, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(account.summary())))
}
