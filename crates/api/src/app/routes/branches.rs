use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use payables_core::BranchId;
use payables_directory::{Branch, BranchUpdate, NewBranch};
use payables_infra::services::SeedReport;

use crate::app::dto::{ApiJson, Items};
use crate::app::errors::ApiError;
use crate::app::routes::parse_id;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_branches).post(create_branch))
        .route("/init", post(seed_branches))
        .route("/:id", put(update_branch).delete(delete_branch))
}

pub async fn list_branches(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Items<Branch>>, ApiError> {
    Ok(Json(services.branches.list().await?.into()))
}

pub async fn create_branch(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<NewBranch>,
) -> Result<(StatusCode, Json<Branch>), ApiError> {
    let branch = services.branches.create(body, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

pub async fn update_branch(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<BranchUpdate>,
) -> Result<Json<Branch>, ApiError> {
    let id: BranchId = parse_id(&id)?;
    Ok(Json(services.branches.update(id, body).await?))
}

pub async fn delete_branch(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id: BranchId = parse_id(&id)?;
    services.branches.delete(id).await?;
    Ok(Json(json!({ "message": "Branch deleted successfully", "id": id })))
}

pub async fn seed_branches(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<SeedReport>, ApiError> {
    Ok(Json(services.branches.seed_defaults(Utc::now()).await?))
}
