use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use payables_core::{DomainError, DomainResult, Record, SupplierId};

/// Supplier status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplierStatus {
    #[default]
    Active,
    Inactive,
}

/// A supplier record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    id: SupplierId,
    name: String,
    phone: String,
    status: SupplierStatus,
    additional_info: String,
    /// Whether this supplier is required to hand in "Invoice A" documents.
    must_issue_invoice_a: bool,
    created_at: DateTime<Utc>,
}

/// Input for registering a supplier. Omitted fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub phone: Option<String>,
    pub status: Option<SupplierStatus>,
    pub additional_info: Option<String>,
    pub must_issue_invoice_a: Option<bool>,
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SupplierUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub status: Option<SupplierStatus>,
    pub additional_info: Option<String>,
    pub must_issue_invoice_a: Option<bool>,
}

fn normalize_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("supplier name is required"));
    }
    Ok(name.to_string())
}

impl Supplier {
    pub fn register(id: SupplierId, input: NewSupplier, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: normalize_name(&input.name)?,
            phone: input.phone.unwrap_or_default(),
            status: input.status.unwrap_or_default(),
            additional_info: input.additional_info.unwrap_or_default(),
            must_issue_invoice_a: input.must_issue_invoice_a.unwrap_or(false),
            created_at: now,
        })
    }

    /// Apply a partial update. Validation happens before any field changes.
    pub fn apply_update(&mut self, update: SupplierUpdate) -> DomainResult<()> {
        let name = match update.name {
            Some(ref n) => Some(normalize_name(n)?),
            None => None,
        };

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(info) = update.additional_info {
            self.additional_info = info;
        }
        if let Some(flag) = update.must_issue_invoice_a {
            self.must_issue_invoice_a = flag;
        }
        Ok(())
    }

    pub fn id_typed(&self) -> SupplierId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn status(&self) -> SupplierStatus {
        self.status
    }

    pub fn additional_info(&self) -> &str {
        &self.additional_info
    }

    pub fn must_issue_invoice_a(&self) -> bool {
        self.must_issue_invoice_a
    }

    pub fn is_active(&self) -> bool {
        self.status == SupplierStatus::Active
    }
}

impl Record for Supplier {
    const COLLECTION: &'static str = "suppliers";
    const KIND: &'static str = "supplier";
    type Id = SupplierId;

    fn id(&self) -> SupplierId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_supplier(name: &str) -> NewSupplier {
        NewSupplier {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn register_applies_defaults_and_trims_name() {
        let s = Supplier::register(SupplierId::new(), new_supplier("  Lácteos Sur  "), Utc::now()).unwrap();
        assert_eq!(s.name(), "Lácteos Sur");
        assert_eq!(s.phone(), "");
        assert_eq!(s.status(), SupplierStatus::Active);
        assert!(!s.must_issue_invoice_a());
    }

    #[test]
    fn register_rejects_blank_name() {
        let err = Supplier::register(SupplierId::new(), new_supplier("   "), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn update_changes_only_supplied_fields() {
        let mut s = Supplier::register(
            SupplierId::new(),
            NewSupplier {
                name: "Panadería".into(),
                phone: Some("221-555".into()),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();

        s.apply_update(SupplierUpdate {
            must_issue_invoice_a: Some(true),
            status: Some(SupplierStatus::Inactive),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(s.name(), "Panadería");
        assert_eq!(s.phone(), "221-555");
        assert!(s.must_issue_invoice_a());
        assert!(!s.is_active());
    }

    #[test]
    fn rejected_update_leaves_record_untouched() {
        let mut s = Supplier::register(SupplierId::new(), new_supplier("Carnes"), Utc::now()).unwrap();
        let before = s.clone();

        let err = s
            .apply_update(SupplierUpdate {
                name: Some(" ".into()),
                phone: Some("000".into()),
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(s, before);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_value(SupplierStatus::Inactive).unwrap();
        assert_eq!(json, "inactive");
    }
}
