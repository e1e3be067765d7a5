use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info, instrument, warn};

use payables_core::{BranchId, DomainError};
use payables_directory::{Branch, BranchUpdate, DEFAULT_BRANCHES, NewBranch};
use payables_invoicing::Invoice;

use super::{ServiceError, ServiceResult, id_value};
use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedStatus {
    Created,
    Exists,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedOutcome {
    pub name: String,
    pub status: SeedStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchBrief {
    pub name: String,
    pub is_active: bool,
}

/// Result of seeding the default branch catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub results: Vec<SeedOutcome>,
    pub total: usize,
    pub branches: Vec<BranchBrief>,
}

/// Branch directory. Renames cascade onto invoices; deletion is blocked while
/// invoices reference the branch.
#[derive(Clone)]
pub struct BranchService {
    branches: Arc<dyn RecordStore<Branch>>,
    invoices: Arc<dyn RecordStore<Invoice>>,
}

impl BranchService {
    pub fn new(branches: Arc<dyn RecordStore<Branch>>, invoices: Arc<dyn RecordStore<Invoice>>) -> Self {
        Self { branches, invoices }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Branch>> {
        Ok(self.branches.list().await?)
    }

    async fn ensure_name_free(&self, name: &str, except: Option<BranchId>) -> ServiceResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        let taken = self
            .branches
            .find_by("name", &Value::String(name.to_string()))
            .await?
            .iter()
            .any(|b| Some(b.id_typed()) != except);
        if taken {
            warn!(name, "branch name already in use");
            return Err(DomainError::conflict("A branch with this name already exists").into());
        }
        Ok(())
    }

    #[instrument(skip_all)]
    pub async fn create(&self, input: NewBranch, now: DateTime<Utc>) -> ServiceResult<Branch> {
        let branch = Branch::open(BranchId::new(), input, now)?;
        self.ensure_name_free(branch.name(), None).await?;
        let branch = self.branches.insert(branch).await?;
        info!(branch_id = %branch.id_typed(), name = branch.name(), "branch created");
        Ok(branch)
    }

    /// Apply a partial update. A rename is propagated to the `branch_name` of
    /// every invoice of this branch after the branch itself is written; if that
    /// second write fails the branch stays renamed and the error is returned.
    #[instrument(skip(self, update), fields(branch_id = %id))]
    pub async fn update(&self, id: BranchId, update: BranchUpdate) -> ServiceResult<Branch> {
        let mut branch = self
            .branches
            .get(id)
            .await?
            .ok_or(DomainError::not_found("branch"))?;

        if let Some(name) = update.name.as_deref() {
            self.ensure_name_free(name, Some(id)).await?;
        }

        let previous_name = branch.apply_update(update)?;
        if !self.branches.replace(branch.clone()).await? {
            return Err(DomainError::not_found("branch").into());
        }

        if let Some(previous_name) = previous_name {
            let mut set = Map::new();
            set.insert("branch_name".to_string(), Value::String(branch.name().to_string()));

            match self.invoices.update_many("branch_id", &id_value(id), &set).await {
                Ok(touched) => info!(
                    from = %previous_name,
                    to = branch.name(),
                    invoices = touched,
                    "branch renamed"
                ),
                Err(err) => {
                    error!(
                        error = %err,
                        from = %previous_name,
                        to = branch.name(),
                        "branch renamed but invoice names were not updated"
                    );
                    return Err(err.into());
                }
            }
        } else {
            info!("branch updated");
        }

        Ok(branch)
    }

    #[instrument(skip(self), fields(branch_id = %id))]
    pub async fn delete(&self, id: BranchId) -> ServiceResult<Branch> {
        let count = self.invoices.count_by("branch_id", &id_value(id)).await?;
        if count > 0 {
            warn!(invoices = count, "branch deletion blocked");
            return Err(ServiceError::BranchInUse { count });
        }

        let branch = self
            .branches
            .delete(id)
            .await?
            .ok_or(DomainError::not_found("branch"))?;
        info!(name = branch.name(), "branch deleted");
        Ok(branch)
    }

    /// Create whichever default branches are missing (matched by name).
    #[instrument(skip_all)]
    pub async fn seed_defaults(&self, now: DateTime<Utc>) -> ServiceResult<SeedReport> {
        let mut results = Vec::with_capacity(DEFAULT_BRANCHES.len());

        for default in DEFAULT_BRANCHES {
            let existing = self
                .branches
                .count_by("name", &Value::String(default.name.to_string()))
                .await?;
            let status = if existing > 0 {
                SeedStatus::Exists
            } else {
                let branch = Branch::open(BranchId::new(), default.to_new_branch(), now)?;
                self.branches.insert(branch).await?;
                SeedStatus::Created
            };
            results.push(SeedOutcome {
                name: default.name.to_string(),
                status,
            });
        }

        let branches: Vec<BranchBrief> = self
            .branches
            .list()
            .await?
            .into_iter()
            .map(|b| BranchBrief {
                name: b.name().to_string(),
                is_active: b.is_active(),
            })
            .collect();

        let created = results.iter().filter(|r| r.status == SeedStatus::Created).count();
        info!(created, total = branches.len(), "default branches seeded");

        Ok(SeedReport {
            results,
            total: branches.len(),
            branches,
        })
    }
}
