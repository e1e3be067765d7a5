use axum::extract::{FromRequest, Request};
use axum::Json;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use payables_core::DomainError;
use payables_invoicing::{PaymentEntry, PaymentMethod};

use crate::app::errors::ApiError;

/// `Json<T>` whose rejections render as `{"error": ...}` with status 400.
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /payments/:id/pay`. Fields are optional so that a missing
/// one yields a readable validation message instead of a decoder error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PayRequest {
    pub amount: Option<u64>,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
}

impl PayRequest {
    pub fn into_entry(self) -> Result<PaymentEntry, DomainError> {
        match (self.amount, self.payment_date, self.payment_method) {
            (Some(amount), Some(payment_date), Some(payment_method)) => {
                if amount == 0 {
                    return Err(DomainError::validation("payment amount must be positive"));
                }
                Ok(PaymentEntry {
                    payment_date,
                    amount,
                    payment_method,
                })
            }
            _ => Err(DomainError::validation(
                "amount, payment_date and payment_method are required",
            )),
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for Items<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pay_request_requires_every_field() {
        let partial: PayRequest = serde_json::from_str(r#"{"amount": 100}"#).unwrap();
        assert!(partial.into_entry().is_err());

        let zero: PayRequest = serde_json::from_str(
            r#"{"amount": 0, "payment_date": "2024-05-02", "payment_method": "cash"}"#,
        )
        .unwrap();
        assert!(zero.into_entry().is_err());

        let ok: PayRequest = serde_json::from_str(
            r#"{"amount": 250, "payment_date": "2024-05-02", "payment_method": "mercado_pago"}"#,
        )
        .unwrap();
        let entry = ok.into_entry().unwrap();
        assert_eq!(entry.amount, 250);
        assert_eq!(entry.payment_method, PaymentMethod::MercadoPago);
    }
}
