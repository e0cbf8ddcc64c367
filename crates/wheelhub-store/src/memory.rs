//! In-memory document store
//!
//! Emulates the cloud SDK's document database inside the process. Each
//! collection is an ordered map keyed by document id, so `list` returns
//! documents in id order the way the real store does.
//!
//! Single writes hold the shared side of `write_gate`; a batch commit holds
//! the exclusive side, so no other write lands between its validation and
//! its application.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{PoisonError, RwLock};

use anyhow::{bail, Result};
use chrono::{SecondsFormat, Utc};
use dashmap::DashMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use wheelhub_core::domain::BestEffort;
use wheelhub_core::ports::{
    BatchWrite, DocPath, Document, FieldValue, Fields, IDocumentStore, WriteBatch,
};

type Collection = BTreeMap<String, Map<String, Value>>;

/// Document store backed by concurrent in-memory maps
pub struct MemoryDocumentStore {
    /// collection name -> documents ordered by id
    collections: DashMap<String, Collection>,
    write_gate: RwLock<()>,
    /// Reason offline persistence is refused, if it is
    persistence_unsupported: Option<String>,
    persistence_enabled: AtomicBool,
    /// Simulates a lost connection; every read and write fails
    offline: AtomicBool,
}

impl MemoryDocumentStore {
    /// Creates an empty store that supports offline persistence
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
            write_gate: RwLock::new(()),
            persistence_unsupported: None,
            persistence_enabled: AtomicBool::new(false),
            offline: AtomicBool::new(false),
        }
    }

    /// Creates an empty store whose environment refuses offline persistence
    pub fn without_persistence(reason: impl Into<String>) -> Self {
        Self {
            persistence_unsupported: Some(reason.into()),
            ..Self::new()
        }
    }

    /// Returns true once offline persistence has been enabled
    pub fn is_persistent(&self) -> bool {
        self.persistence_enabled.load(AtomicOrdering::SeqCst)
    }

    /// Toggles the simulated connection loss
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    /// Number of documents across all collections
    pub fn document_count(&self) -> usize {
        self.collections.iter().map(|c| c.value().len()).sum()
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            bail!("Document store is unreachable");
        }
        Ok(())
    }

    fn read(&self, path: &DocPath) -> Option<Map<String, Value>> {
        self.collections
            .get(path.collection())
            .and_then(|c| c.get(path.id()).cloned())
    }

    fn write(&self, path: &DocPath, fields: Fields, mode: WriteMode) -> Result<()> {
        self.ensure_online()?;
        let _shared = self.write_gate.read().unwrap_or_else(PoisonError::into_inner);

        let mut collection = self
            .collections
            .entry(path.collection().to_string())
            .or_default();
        let data = written(path, mode, collection.get(path.id()), fields)?;

        collection.insert(path.id().to_string(), data);
        debug!(%path, ?mode, "Wrote document");
        Ok(())
    }

    fn remove(&self, path: &DocPath) {
        if let Some(mut collection) = self.collections.get_mut(path.collection()) {
            collection.remove(path.id());
        }
    }

    fn commit_batch(&self, batch: WriteBatch) -> Result<()> {
        self.ensure_online()?;
        let _exclusive = self.write_gate.write().unwrap_or_else(PoisonError::into_inner);

        // Stage every write first; nothing is applied unless all succeed
        let writes = batch.len();
        let mut staged: BTreeMap<DocPath, Option<Map<String, Value>>> = BTreeMap::new();
        for write in batch {
            let path = write.path().clone();
            let current = match staged.get(&path) {
                Some(doc) => doc.clone(),
                None => self.read(&path),
            };
            let next = match write {
                BatchWrite::Set(_, fields) => {
                    Some(written(&path, WriteMode::Replace, current.as_ref(), fields)?)
                }
                BatchWrite::Merge(_, fields) => {
                    Some(written(&path, WriteMode::Merge, current.as_ref(), fields)?)
                }
                BatchWrite::Update(_, fields) => {
                    Some(written(&path, WriteMode::Update, current.as_ref(), fields)?)
                }
                BatchWrite::Delete(_) => None,
            };
            staged.insert(path, next);
        }

        for (path, data) in staged {
            match data {
                Some(data) => {
                    self.collections
                        .entry(path.collection().to_string())
                        .or_default()
                        .insert(path.id().to_string(), data);
                }
                None => self.remove(&path),
            }
        }
        debug!(writes, "Committed batch");
        Ok(())
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
enum WriteMode {
    Replace,
    Merge,
    Update,
}

/// Computes the document produced by writing `fields` over `existing`
fn written(
    path: &DocPath,
    mode: WriteMode,
    existing: Option<&Map<String, Value>>,
    fields: Fields,
) -> Result<Map<String, Value>> {
    let mut data = match (mode, existing) {
        (WriteMode::Update, None) => bail!("No document to update at {path}"),
        (WriteMode::Replace, _) | (WriteMode::Merge, None) => Map::new(),
        (WriteMode::Merge | WriteMode::Update, Some(current)) => current.clone(),
    };
    apply(&mut data, fields);
    Ok(data)
}

/// Resolves server markers against the current field values
fn apply(data: &mut Map<String, Value>, fields: Fields) {
    for (name, value) in fields {
        let resolved = match value {
            FieldValue::Value(value) => value,
            FieldValue::ServerTimestamp => Value::from(server_now()),
            FieldValue::Increment(by) => increment(data.get(&name), by),
        };
        data.insert(name, resolved);
    }
}

fn server_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn increment(current: Option<&Value>, by: i64) -> Value {
    match current {
        Some(Value::Number(n)) if n.is_i64() => Value::from(n.as_i64().unwrap_or(0) + by),
        Some(Value::Number(n)) => Value::from(n.as_f64().unwrap_or(0.0) + by as f64),
        _ => Value::from(by),
    }
}

/// Orders values of the same kind; missing or mixed values sort last
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn to_document(id: &str, data: &Map<String, Value>) -> Document {
    Document {
        id: id.to_string(),
        data: data.clone(),
    }
}

#[async_trait::async_trait]
impl IDocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>> {
        self.ensure_online()?;
        Ok(self
            .collections
            .get(path.collection())
            .and_then(|c| c.get(path.id()).map(|data| to_document(path.id(), data))))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>> {
        self.ensure_online()?;
        Ok(self
            .collections
            .get(collection)
            .map(|c| c.iter().map(|(id, data)| to_document(id, data)).collect())
            .unwrap_or_default())
    }

    async fn set(&self, path: &DocPath, fields: Fields) -> Result<()> {
        self.write(path, fields, WriteMode::Replace)
    }

    async fn merge(&self, path: &DocPath, fields: Fields) -> Result<()> {
        self.write(path, fields, WriteMode::Merge)
    }

    async fn update(&self, path: &DocPath, fields: Fields) -> Result<()> {
        self.write(path, fields, WriteMode::Update)
    }

    async fn delete(&self, path: &DocPath) -> Result<()> {
        self.ensure_online()?;
        let _shared = self.write_gate.read().unwrap_or_else(PoisonError::into_inner);
        self.remove(path);
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        self.commit_batch(batch)
    }

    async fn first_where(
        &self,
        collection: &str,
        field: &str,
        equals: &Value,
        order_by: &str,
    ) -> Result<Option<Document>> {
        self.ensure_online()?;
        let Some(documents) = self.collections.get(collection) else {
            return Ok(None);
        };

        Ok(documents
            .iter()
            .filter(|(_, data)| data.get(field) == Some(equals))
            .min_by(|(_, a), (_, b)| compare_values(a.get(order_by), b.get(order_by)))
            .map(|(id, data)| to_document(id, data)))
    }

    async fn enable_persistence(&self) -> BestEffort {
        if let Some(reason) = &self.persistence_unsupported {
            warn!(reason = %reason, "Offline persistence unavailable");
            return BestEffort::skipped(reason.clone());
        }
        self.persistence_enabled.store(true, AtomicOrdering::SeqCst);
        BestEffort::Succeeded
    }
}
