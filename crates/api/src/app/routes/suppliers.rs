use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use payables_core::SupplierId;
use payables_directory::{NewSupplier, Supplier, SupplierUpdate};

use crate::app::dto::{ApiJson, Items};
use crate::app::errors::ApiError;
use crate::app::routes::parse_id;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route("/:id", put(update_supplier).delete(delete_supplier))
}

pub async fn list_suppliers(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Items<Supplier>>, ApiError> {
    Ok(Json(services.suppliers.list().await?.into()))
}

pub async fn create_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<NewSupplier>,
) -> Result<(StatusCode, Json<Supplier>), ApiError> {
    let supplier = services.suppliers.create(body, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn update_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<SupplierUpdate>,
) -> Result<Json<Supplier>, ApiError> {
    let id: SupplierId = parse_id(&id)?;
    Ok(Json(services.suppliers.update(id, body).await?))
}

pub async fn delete_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id: SupplierId = parse_id(&id)?;
    services.suppliers.delete(id).await?;
    Ok(Json(json!({ "message": "Supplier deleted successfully", "id": id })))
}
