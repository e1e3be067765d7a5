use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};

use payables_core::Record;

use super::{RecordStore, StoreError};

/// In-memory record store for tests/dev.
#[derive(Debug)]
pub struct InMemoryRecordStore<R: Record> {
    inner: RwLock<HashMap<R::Id, R>>,
}

impl<R: Record> InMemoryRecordStore<R> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<R: Record> Default for InMemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(operation: &'static str) -> StoreError {
    StoreError::backend(operation, "lock poisoned")
}

fn newest_first<R: Record>(records: &mut [R]) {
    records.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| b.id().to_string().cmp(&a.id().to_string()))
    });
}

fn field_matches<R: Record>(record: &R, field: &str, value: &Value) -> Result<bool, StoreError> {
    let doc = serde_json::to_value(record).map_err(StoreError::codec::<R>)?;
    Ok(doc.get(field) == Some(value))
}

#[async_trait]
impl<R: Record> RecordStore<R> for InMemoryRecordStore<R> {
    async fn insert(&self, record: R) -> Result<R, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("insert"))?;
        let id = record.id();
        if map.contains_key(&id) {
            return Err(StoreError::Duplicate {
                kind: R::KIND,
                id: id.to_string(),
            });
        }
        map.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: R::Id) -> Result<Option<R>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("get"))?;
        Ok(map.get(&id).cloned())
    }

    async fn replace(&self, record: R) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("replace"))?;
        match map.get_mut(&record.id()) {
            Some(slot) => {
                *slot = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: R::Id) -> Result<Option<R>, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("delete"))?;
        Ok(map.remove(&id))
    }

    async fn list(&self) -> Result<Vec<R>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("list"))?;
        let mut records: Vec<R> = map.values().cloned().collect();
        newest_first(&mut records);
        Ok(records)
    }

    async fn find_by(&self, field: &str, value: &Value) -> Result<Vec<R>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned("find_by"))?;
        let mut records = Vec::new();
        for record in map.values() {
            if field_matches(record, field, value)? {
                records.push(record.clone());
            }
        }
        newest_first(&mut records);
        Ok(records)
    }

    async fn update_many(
        &self,
        field: &str,
        value: &Value,
        set: &Map<String, Value>,
    ) -> Result<u64, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned("update_many"))?;

        // Decode everything before writing so a bad patch leaves the map untouched.
        let mut updated = Vec::new();
        for (id, record) in map.iter() {
            let mut doc = serde_json::to_value(record).map_err(StoreError::codec::<R>)?;
            if doc.get(field) != Some(value) {
                continue;
            }
            if let Value::Object(obj) = &mut doc {
                for (k, v) in set {
                    obj.insert(k.clone(), v.clone());
                }
            }
            let record: R = serde_json::from_value(doc).map_err(StoreError::codec::<R>)?;
            updated.push((*id, record));
        }

        let count = updated.len() as u64;
        for (id, record) in updated {
            map.insert(id, record);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use payables_core::{BranchId, SupplierId};
    use payables_directory::{Branch, NewBranch, NewSupplier, Supplier};
    use serde_json::json;

    fn branch(name: &str, offset_secs: i64) -> Branch {
        Branch::open(
            BranchId::new(),
            NewBranch {
                name: name.to_string(),
                ..Default::default()
            },
            Utc::now() + Duration::seconds(offset_secs),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_get_replace_delete() {
        let store = InMemoryRecordStore::<Branch>::new();
        let b = branch("Calle 59", 0);
        let id = b.id_typed();

        store.insert(b.clone()).await.unwrap();
        assert!(matches!(
            store.insert(b.clone()).await,
            Err(StoreError::Duplicate { kind: "branch", .. })
        ));
        assert_eq!(store.get(id).await.unwrap(), Some(b.clone()));

        let mut renamed = b.clone();
        renamed
            .apply_update(payables_directory::BranchUpdate {
                name: Some("Calle 60".into()),
                ..Default::default()
            })
            .unwrap();
        assert!(store.replace(renamed.clone()).await.unwrap());
        assert_eq!(store.get(id).await.unwrap().unwrap().name(), "Calle 60");

        assert!(!store.replace(branch("ghost", 0)).await.unwrap());

        assert_eq!(store.delete(id).await.unwrap(), Some(renamed));
        assert_eq!(store.delete(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = InMemoryRecordStore::<Branch>::new();
        store.insert(branch("old", -60)).await.unwrap();
        store.insert(branch("new", 60)).await.unwrap();
        store.insert(branch("mid", 0)).await.unwrap();

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .iter()
            .map(|b| b.name().to_string())
            .collect();
        assert_eq!(names, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn find_count_and_update_many_work_on_top_level_fields() {
        let store = InMemoryRecordStore::<Supplier>::new();
        for (name, flagged) in [("a", true), ("b", true), ("c", false)] {
            let s = Supplier::register(
                SupplierId::new(),
                NewSupplier {
                    name: name.into(),
                    must_issue_invoice_a: Some(flagged),
                    ..Default::default()
                },
                Utc::now(),
            )
            .unwrap();
            store.insert(s).await.unwrap();
        }

        assert_eq!(store.count_by("must_issue_invoice_a", &json!(true)).await.unwrap(), 2);

        let mut set = Map::new();
        set.insert("phone".into(), json!("555-0100"));
        let touched = store
            .update_many("must_issue_invoice_a", &json!(true), &set)
            .await
            .unwrap();
        assert_eq!(touched, 2);

        let with_phone = store.find_by("phone", &json!("555-0100")).await.unwrap();
        assert_eq!(with_phone.len(), 2);
        assert!(with_phone.iter().all(|s| s.must_issue_invoice_a()));
        assert_eq!(store.count_by("name", &json!("zzz")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn shared_handle_delegates() {
        let store: std::sync::Arc<dyn RecordStore<Branch>> =
            std::sync::Arc::new(InMemoryRecordStore::<Branch>::new());
        let b = branch("x", 0);
        store.insert(b.clone()).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
