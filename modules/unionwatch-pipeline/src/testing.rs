// Test doubles for the pipeline's external collaborators.
//
// - MockGenerator (TextGenerator): prompt substring to canned reply
// - MockStore (RecordStore): in-memory map with write-failure injection
//
// No network, no disk.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use ai_client::{AiError, GenerationRequest, TextGenerator};
use async_trait::async_trait;
use unionwatch_common::{StoreError, UnionRecord};

use crate::store::RecordStore;

// ---------------------------------------------------------------------------
// MockGenerator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    MissingKey,
    Network(String),
}

impl MockReply {
    fn produce(&self) -> Result<String, AiError> {
        match self {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::MissingKey => Err(AiError::Config("API key not found".to_string())),
            MockReply::Network(msg) => Err(AiError::Network(msg.clone())),
        }
    }
}

/// Replies are chosen by the first registered needle found in the prompt.
/// Unmatched prompts get the default reply, or a network error.
#[derive(Default)]
pub struct MockGenerator {
    replies: Vec<(String, MockReply)>,
    default_reply: Option<MockReply>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_prompt(mut self, needle: &str, reply: &str) -> Self {
        self.replies
            .push((needle.to_string(), MockReply::Text(reply.to_string())));
        self
    }

    pub fn on_prompt_fail(mut self, needle: &str, reply: MockReply) -> Self {
        self.replies.push((needle.to_string(), reply));
        self
    }

    pub fn with_default(mut self, reply: MockReply) -> Self {
        self.default_reply = Some(reply);
        self
    }

    /// Every request seen so far, in call order.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, AiError> {
        let reply = self
            .replies
            .iter()
            .find(|(needle, _)| request.prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .or_else(|| self.default_reply.clone());

        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request);
        }

        match reply {
            Some(reply) => reply.produce(),
            None => Err(AiError::Network("no canned reply for prompt".to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockStore {
    records: Mutex<BTreeMap<String, UnionRecord>>,
    fail_writes: AtomicBool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = UnionRecord>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.records.lock() {
            for record in records {
                map.insert(record.id.clone(), record);
            }
        }
        store
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> BTreeMap<String, UnionRecord> {
        self.records
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("injected write failure".to_string()));
        }
        Ok(())
    }

    fn poisoned() -> StoreError {
        StoreError::Rejected("mock store lock poisoned".to_string())
    }
}

#[async_trait]
impl RecordStore for MockStore {
    async fn list(&self) -> Result<Vec<UnionRecord>, StoreError> {
        let map = self.records.lock().map_err(|_| Self::poisoned())?;
        Ok(map.values().cloned().collect())
    }

    async fn upsert(&self, record: &UnionRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut map = self.records.lock().map_err(|_| Self::poisoned())?;
        map.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut map = self.records.lock().map_err(|_| Self::poisoned())?;
        map.remove(id);
        Ok(())
    }
}
