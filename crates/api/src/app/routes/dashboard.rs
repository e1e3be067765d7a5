use std::sync::Arc;

use axum::{extract::Extension, Json};

use payables_invoicing::LedgerSummary;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<LedgerSummary>, ApiError> {
    Ok(Json(services.ledger.summary().await?))
}
