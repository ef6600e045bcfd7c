//! In-memory document store, used as a test double and for offline demos

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::store::{compare_values, Document, FilterOperator, Store};

#[derive(Default)]
struct Collections {
    /// Documents per collection path, in insertion order
    documents: HashMap<String, Vec<Document>>,
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
}

/// A `Store` kept in process memory.
///
/// Collections keep insertion order. Per-collection latency and failures can
/// be injected to exercise ordering and error paths.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document
    pub fn insert(&self, collection: &str, id: &str, fields: Value) {
        let document = Document::from_json(id, fields);
        self.write(|c| upsert(c.documents.entry(collection.to_string()).or_default(), document));
    }

    /// Delay every request touching `collection`
    pub fn set_delay(&self, collection: &str, delay: Duration) {
        self.write(|c| {
            c.delays.insert(collection.to_string(), delay);
        });
    }

    /// Make every request touching `collection` fail
    pub fn fail_collection(&self, collection: &str) {
        self.write(|c| {
            c.failing.insert(collection.to_string());
        });
    }

    /// Number of requests served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn read<T>(&self, f: impl FnOnce(&Collections) -> T) -> T {
        match self.inner.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write<T>(&self, f: impl FnOnce(&mut Collections) -> T) -> T {
        match self.inner.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    /// Count the request, wait out any injected delay, then fail if asked to
    async fn enter(&self, collection: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (delay, failing) =
            self.read(|c| (c.delays.get(collection).copied(), c.failing.contains(collection)));
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            return Err(Error::fetch(format!("{} is unavailable", collection)));
        }
        Ok(())
    }
}

fn upsert(documents: &mut Vec<Document>, document: Document) {
    match documents.iter_mut().find(|d| d.id == document.id) {
        Some(existing) => *existing = document,
        None => documents.push(document),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>> {
        self.enter(collection).await?;
        Ok(self.read(|c| c.documents.get(collection).cloned().unwrap_or_default()))
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.enter(collection).await?;
        Ok(self.read(|c| {
            c.documents
                .get(collection)
                .and_then(|docs| docs.iter().find(|d| d.id == id).cloned())
        }))
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<()> {
        self.enter(collection).await?;
        let document = Document::new(id, fields);
        self.write(|c| upsert(c.documents.entry(collection.to_string()).or_default(), document));
        Ok(())
    }

    async fn query_range(
        &self,
        collection: &str,
        field: &str,
        op: FilterOperator,
        value: Value,
    ) -> Result<Vec<Document>> {
        self.enter(collection).await?;
        let mut matches: Vec<Document> = self.read(|c| {
            c.documents
                .get(collection)
                .map(|docs| {
                    docs.iter()
                        .filter(|d| d.fields.get(field).is_some_and(|f| op.matches(f, &value)))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        });
        // stable sort keeps insertion order among equal keys
        matches.sort_by(|a, b| {
            compare_values(&a.fields[field], &b.fields[field]).unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(matches)
    }
}
