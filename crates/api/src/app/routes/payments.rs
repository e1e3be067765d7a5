use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use payables_core::InvoiceId;
use payables_infra::services::{InvoiceListing, InvoiceUpdate};
use payables_invoicing::{Invoice, InvoiceFilter, NewInvoice};

use crate::app::dto::{ApiJson, Items, PayRequest};
use crate::app::errors::ApiError;
use crate::app::routes::parse_id;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/discrepancies", get(list_discrepancies))
        .route(
            "/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/:id/pay", post(pay_invoice))
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<InvoiceFilter>, QueryRejection>,
) -> Result<Json<InvoiceListing>, ApiError> {
    let Query(filter) = query?;
    Ok(Json(services.ledger.list(&filter, Utc::now()).await?))
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<NewInvoice>,
) -> Result<(StatusCode, Json<Invoice>), ApiError> {
    let invoice = services.ledger.create(body, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn list_discrepancies(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Items<Invoice>>, ApiError> {
    Ok(Json(services.ledger.discrepancies().await?.into()))
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Invoice>, ApiError> {
    let id: InvoiceId = parse_id(&id)?;
    Ok(Json(services.ledger.get(id).await?))
}

pub async fn update_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<InvoiceUpdate>,
) -> Result<Json<Invoice>, ApiError> {
    let id: InvoiceId = parse_id(&id)?;
    Ok(Json(services.ledger.update(id, body).await?))
}

pub async fn delete_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id: InvoiceId = parse_id(&id)?;
    services.ledger.delete(id).await?;
    Ok(Json(json!({ "message": "Invoice deleted successfully", "id": id })))
}

pub async fn pay_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<PayRequest>,
) -> Result<Json<Invoice>, ApiError> {
    let id: InvoiceId = parse_id(&id)?;
    let payment = body.into_entry()?;
    Ok(Json(services.ledger.apply_payment(id, payment).await?))
}
