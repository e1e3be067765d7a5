use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use payables_core::{DomainError, SupplierId};
use payables_directory::{NewSupplier, Supplier, SupplierUpdate};

use super::ServiceResult;
use crate::store::RecordStore;

#[derive(Clone)]
pub struct SupplierService {
    store: Arc<dyn RecordStore<Supplier>>,
}

impl SupplierService {
    pub fn new(store: Arc<dyn RecordStore<Supplier>>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Supplier>> {
        Ok(self.store.list().await?)
    }

    #[instrument(skip_all)]
    pub async fn create(&self, input: NewSupplier, now: DateTime<Utc>) -> ServiceResult<Supplier> {
        let supplier = Supplier::register(SupplierId::new(), input, now)?;
        let supplier = self.store.insert(supplier).await?;
        info!(supplier_id = %supplier.id_typed(), name = supplier.name(), "supplier created");
        Ok(supplier)
    }

    #[instrument(skip(self, update), fields(supplier_id = %id))]
    pub async fn update(&self, id: SupplierId, update: SupplierUpdate) -> ServiceResult<Supplier> {
        let mut supplier = self
            .store
            .get(id)
            .await?
            .ok_or(DomainError::not_found("supplier"))?;
        supplier.apply_update(update)?;
        if !self.store.replace(supplier.clone()).await? {
            return Err(DomainError::not_found("supplier").into());
        }
        info!("supplier updated");
        Ok(supplier)
    }

    /// Invoices keep their copied supplier name, so deletion is not guarded.
    #[instrument(skip(self), fields(supplier_id = %id))]
    pub async fn delete(&self, id: SupplierId) -> ServiceResult<Supplier> {
        let supplier = self
            .store
            .delete(id)
            .await?
            .ok_or(DomainError::not_found("supplier"))?;
        info!("supplier deleted");
        Ok(supplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{ServiceError, Stores};
    use payables_directory::SupplierStatus;

    fn service() -> SupplierService {
        SupplierService::new(Stores::in_memory().suppliers)
    }

    #[tokio::test]
    async fn create_update_delete_lifecycle() {
        let svc = service();
        let created = svc
            .create(
                NewSupplier {
                    name: "  Frigorífico Oeste ".into(),
                    ..Default::default()
                },
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(created.name(), "Frigorífico Oeste");
        assert_eq!(created.status(), SupplierStatus::Active);

        let updated = svc
            .update(
                created.id_typed(),
                SupplierUpdate {
                    status: Some(SupplierStatus::Inactive),
                    must_issue_invoice_a: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!updated.is_active());
        assert!(updated.must_issue_invoice_a());
        assert_eq!(svc.list().await.unwrap(), vec![updated.clone()]);

        svc.delete(created.id_typed()).await.unwrap();
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let err = service()
            .create(NewSupplier::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn unknown_supplier_is_not_found() {
        let svc = service();
        let id = SupplierId::new();
        assert!(matches!(
            svc.update(id, SupplierUpdate::default()).await,
            Err(ServiceError::Domain(DomainError::NotFound("supplier")))
        ));
        assert!(matches!(
            svc.delete(id).await,
            Err(ServiceError::Domain(DomainError::NotFound("supplier")))
        ));
    }
}
