use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde_json::{json, Value};

use payables_auth::Credentials;

use crate::app::dto::ApiJson;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::middleware::SESSION_COOKIE;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<Credentials>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let account = services.accounts.register(body, Utc::now()).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": account.summary(),
        })),
    ))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    ApiJson(body): ApiJson<Credentials>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let session = services.accounts.login(body, Utc::now()).await?;

    let cookie = Cookie::build((SESSION_COOKIE, session.token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(services.cookie_secure)
        .path("/")
        .max_age(time::Duration::seconds(session.ttl.num_seconds()))
        .build();

    Ok((
        jar.add(cookie),
        Json(json!({
            "message": "Login successful",
            "user": session.user,
        })),
    ))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    (jar.remove(removal), Json(json!({ "message": "Logout successful" })))
}
