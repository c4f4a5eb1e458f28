//! Operator-side view of the record store.
//!
//! Writes are optimistic: the local snapshot changes first, then the store
//! is asked to commit. If the commit fails the authoritative list is
//! re-fetched and the local guess is thrown away.

use std::collections::BTreeMap;

use tracing::{info, warn};
use unionwatch_common::{StoreError, UnionRecord};

use crate::store::RecordStore;

pub struct EditorSession<S: RecordStore> {
    store: S,
    unions: Vec<UnionRecord>,
}

impl<S: RecordStore> EditorSession<S> {
    pub async fn open(store: S) -> Result<Self, StoreError> {
        let unions = store.list().await?;
        info!(unions = unions.len(), "Editor session opened");
        Ok(Self { store, unions })
    }

    /// Snapshot handed to the resolver and merge engine.
    pub fn unions(&self) -> &[UnionRecord] {
        &self.unions
    }

    pub fn get(&self, id: &str) -> Option<&UnionRecord> {
        self.unions.iter().find(|u| u.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Case-insensitive match on name, or substring match on id.
    pub fn search(&self, term: &str) -> Vec<&UnionRecord> {
        let term = term.trim().to_lowercase();
        self.unions
            .iter()
            .filter(|u| u.name.to_lowercase().contains(&term) || u.id.contains(&term))
            .collect()
    }

    /// The whole store as one `{id: record}` document.
    pub fn export(&self) -> BTreeMap<&str, &UnionRecord> {
        self.unions.iter().map(|u| (u.id.as_str(), u)).collect()
    }

    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        self.unions = self.store.list().await?;
        Ok(())
    }

    /// Commit a record for a union that is not stored yet. An existing union
    /// is left untouched and the write is rejected.
    pub async fn create(&mut self, record: UnionRecord) -> Result<(), StoreError> {
        if self.contains(&record.id) {
            warn!(id = record.id.as_str(), "Refusing to overwrite existing union");
            return Err(StoreError::Rejected(format!(
                "union {} already exists",
                record.id
            )));
        }
        self.approve(record).await
    }

    /// Commit a reviewed record, replacing any stored union with its id.
    pub async fn approve(&mut self, record: UnionRecord) -> Result<(), StoreError> {
        let previous = self.unions.clone();
        match self.unions.iter_mut().find(|u| u.id == record.id) {
            Some(slot) => *slot = record.clone(),
            None => self.unions.push(record.clone()),
        }

        match self.store.upsert(&record).await {
            Ok(()) => {
                info!(id = record.id.as_str(), "Union saved");
                Ok(())
            }
            Err(e) => {
                warn!(id = record.id.as_str(), error = %e, "Save failed, reverting");
                self.revert(previous).await;
                Err(e)
            }
        }
    }

    /// Delete a union outright. There is no soft delete.
    pub async fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        let previous = self.unions.clone();
        self.unions.retain(|u| u.id != id);

        match self.store.delete(id).await {
            Ok(()) => {
                info!(id, "Union deleted");
                Ok(())
            }
            Err(e) => {
                warn!(id, error = %e, "Delete failed, reverting");
                self.revert(previous).await;
                Err(e)
            }
        }
    }

    async fn revert(&mut self, previous: Vec<UnionRecord>) {
        match self.store.list().await {
            Ok(authoritative) => self.unions = authoritative,
            Err(e) => {
                warn!(error = %e, "Re-fetch failed, restoring pre-write snapshot");
                self.unions = previous;
            }
        }
    }
}
