// RecordStore abstracts the document store holding union records.
//
// The pipeline itself never calls it; the editor session does, after an
// operator approves a proposal. JsonFileStore keeps the same `{ id: record }`
// document the hosted store uses, in a local file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use unionwatch_common::{StoreError, UnionRecord};

const UNNAMED_UNION: &str = "Unnamed union";

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list(&self) -> Result<Vec<UnionRecord>, StoreError>;

    /// Create or replace the record stored under `record.id`.
    async fn upsert(&self, record: &UnionRecord) -> Result<(), StoreError>;

    /// Remove the record entirely. Missing ids are not an error.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() || text.trim() == "null" => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, document: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), records = document.len(), "Store written");
        Ok(())
    }
}

/// Fill the fields the hosted store drops when they are empty, then decode.
pub fn sanitize_stored(key: &str, mut value: Value) -> Option<UnionRecord> {
    let Value::Object(map) = &mut value else {
        warn!(key, "Stored union is not an object, skipping");
        return None;
    };
    if !non_blank(map, "id") {
        map.insert("id".to_string(), Value::String(key.to_string()));
    }
    if !non_blank(map, "name") {
        map.insert("name".to_string(), Value::String(UNNAMED_UNION.to_string()));
    }

    match serde_json::from_value(value) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(key, error = %e, "Stored union failed to decode, skipping");
            None
        }
    }
}

fn non_blank(map: &serde_json::Map<String, Value>, field: &str) -> bool {
    map.get(field)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<UnionRecord>, StoreError> {
        let document = self.read_document().await?;
        Ok(document
            .into_iter()
            .filter_map(|(key, value)| sanitize_stored(&key, value))
            .collect())
    }

    async fn upsert(&self, record: &UnionRecord) -> Result<(), StoreError> {
        if record.id.trim().is_empty() {
            return Err(StoreError::Rejected("record has no id".to_string()));
        }
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        document.insert(record.id.clone(), serde_json::to_value(record)?);
        self.write_document(&document).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        if document.remove(id).is_some() {
            self.write_document(&document).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unionwatch_common::{ActionRecord, EntryKey, UnionIdentity};

    fn record(id: &str) -> UnionRecord {
        UnionRecord::stub(&UnionIdentity {
            name: id.to_uppercase(),
            id: id.to_string(),
        })
    }

    #[tokio::test]
    async fn missing_file_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("unions.json"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("unions.json"));

        store.upsert(&record("ate")).await.unwrap();
        let mut updated = record("ate");
        updated
            .actions
            .insert(EntryKey::from("k"), ActionRecord::default());
        store.upsert(&updated).await.unwrap();
        store.upsert(&record("uom")).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        let ate = listed.iter().find(|r| r.id == "ate").unwrap();
        assert_eq!(ate.actions.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_entirely() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("unions.json"));
        store.upsert(&record("ate")).await.unwrap();
        store.delete("ate").await.unwrap();
        store.delete("never-existed").await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_sanitizes_sparse_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unions.json");
        tokio::fs::write(&path, r#"{"uocra": {"name": "UOCRA"}, "ghost": {}, "bad": 3}"#)
            .await
            .unwrap();

        let store = JsonFileStore::new(&path);
        let mut listed = store.list().await.unwrap();
        listed.sort_by(|a, b| a.id.cmp(&b.id));

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "ghost");
        assert_eq!(listed[0].name, UNNAMED_UNION);
        assert_eq!(listed[1].id, "uocra");
        assert!(listed[1].actions.is_empty());
    }

    #[tokio::test]
    async fn upsert_without_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("unions.json"));
        let err = store.upsert(&record("")).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
    }
}
