use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use payables_core::{BranchId, DomainError, DomainResult, Record};

/// A store location ("sucursal") invoices are recorded against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    id: BranchId,
    /// Unique across branches (enforced by the branch service).
    name: String,
    address: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewBranch {
    pub name: String,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BranchUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

/// Entry of the built-in branch catalogue used for first-time seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultBranch {
    pub name: &'static str,
    pub address: &'static str,
}

pub const DEFAULT_BRANCHES: [DefaultBranch; 4] = [
    DefaultBranch {
        name: "Calle 59",
        address: "Calle 59 - Sucursal Principal",
    },
    DefaultBranch {
        name: "Calle 50",
        address: "Calle 50 - Sucursal Secundaria",
    },
    DefaultBranch {
        name: "Calle 13",
        address: "Calle 13 - Sucursal Norte",
    },
    DefaultBranch {
        name: "Cocina",
        address: "Área de Cocina - Departamento Gastronómico",
    },
];

impl DefaultBranch {
    pub fn to_new_branch(self) -> NewBranch {
        NewBranch {
            name: self.name.to_string(),
            address: Some(self.address.to_string()),
            is_active: Some(true),
        }
    }
}

fn normalize_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("branch name is required"));
    }
    Ok(name.to_string())
}

fn normalize_address(address: Option<String>) -> Option<String> {
    address
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
}

impl Branch {
    pub fn open(id: BranchId, input: NewBranch, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: normalize_name(&input.name)?,
            address: normalize_address(input.address),
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
        })
    }

    /// Apply a partial update.
    ///
    /// Returns the previous name when the update renamed the branch, so callers
    /// can propagate the new name to records that copy it.
    pub fn apply_update(&mut self, update: BranchUpdate) -> DomainResult<Option<String>> {
        let name = match update.name {
            Some(ref n) => Some(normalize_name(n)?),
            None => None,
        };

        let mut previous = None;
        if let Some(name) = name {
            if name != self.name {
                previous = Some(std::mem::replace(&mut self.name, name));
            }
        }
        if let Some(address) = update.address {
            self.address = normalize_address(Some(address));
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        Ok(previous)
    }

    pub fn id_typed(&self) -> BranchId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Record for Branch {
    const COLLECTION: &'static str = "branches";
    const KIND: &'static str = "branch";
    type Id = BranchId;

    fn id(&self) -> BranchId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(name: &str) -> Branch {
        Branch::open(
            BranchId::new(),
            NewBranch {
                name: name.to_string(),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn open_defaults_to_active_without_address() {
        let b = branch("Calle 7");
        assert!(b.is_active());
        assert_eq!(b.address(), None);
    }

    #[test]
    fn blank_address_is_stored_as_none() {
        let b = Branch::open(
            BranchId::new(),
            NewBranch {
                name: "Centro".into(),
                address: Some("   ".into()),
                is_active: None,
            },
            Utc::now(),
        )
        .unwrap();
        assert_eq!(b.address(), None);
    }

    #[test]
    fn rename_reports_previous_name() {
        let mut b = branch("Calle 59");
        let previous = b
            .apply_update(BranchUpdate {
                name: Some("Calle 60".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(previous.as_deref(), Some("Calle 59"));
        assert_eq!(b.name(), "Calle 60");
    }

    #[test]
    fn same_name_is_not_a_rename() {
        let mut b = branch("Cocina");
        let previous = b
            .apply_update(BranchUpdate {
                name: Some(" Cocina ".into()),
                is_active: Some(false),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(previous, None);
        assert!(!b.is_active());
    }

    #[test]
    fn blank_rename_is_rejected() {
        let mut b = branch("Cocina");
        let err = b
            .apply_update(BranchUpdate {
                name: Some("".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(b.name(), "Cocina");
    }

    #[test]
    fn default_catalogue_names_are_unique() {
        let mut names: Vec<_> = DEFAULT_BRANCHES.iter().map(|b| b.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DEFAULT_BRANCHES.len());
    }
}
