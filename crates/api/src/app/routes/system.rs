use axum::{extract::Extension, response::IntoResponse, Json};

use crate::context::SessionContext;

pub async fn health() -> &'static str {
    "OK"
}

pub async fn whoami(Extension(session): Extension<SessionContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": session.user_id().to_string(),
    }))
}
