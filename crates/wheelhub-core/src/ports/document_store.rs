//! Document store port (driven/secondary port)
//!
//! Models the persistent-connection database client of the cloud SDK:
//! named collections of JSON documents, server-assigned timestamps and
//! atomic counter increments.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because failures at this boundary are
//!   SDK-specific; the facade classifies them as backend errors.
//! - `commit` is the only multi-document write; a failure leaves every
//!   document of the batch untouched.
//! - Ordering of `list` and `first_where` is the store's natural order
//!   (document id, or the `order_by` field); it is not re-implemented above.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde_json::{Map, Value};

use crate::domain::BestEffort;

/// Address of a single document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath {
    collection: String,
    id: String,
}

impl DocPath {
    /// Creates a path for document `id` in `collection`
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Creates a path inside a sub-collection, e.g. `users/{uid}/wheels`
    pub fn nested(segments: &[&str], id: impl Into<String>) -> Self {
        Self::new(segments.join("/"), id)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Display for DocPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A value written to a document field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A literal JSON value
    Value(Value),
    /// Replaced by the server's clock at commit time
    ServerTimestamp,
    /// Atomically added to the current numeric value (missing counts as 0)
    Increment(i64),
}

/// An ordered set of field writes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), FieldValue::Value(value.into()));
        self
    }

    pub fn server_timestamp(mut self, name: impl Into<String>) -> Self {
        self.0.insert(name.into(), FieldValue::ServerTimestamp);
        self
    }

    pub fn increment(mut self, name: impl Into<String>, by: i64) -> Self {
        self.0.insert(name.into(), FieldValue::Increment(by));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}

impl IntoIterator for Fields {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// One write inside a [`WriteBatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum BatchWrite {
    Set(DocPath, Fields),
    Merge(DocPath, Fields),
    Update(DocPath, Fields),
    Delete(DocPath),
}

impl BatchWrite {
    pub fn path(&self) -> &DocPath {
        match self {
            Self::Set(path, _) | Self::Merge(path, _) | Self::Update(path, _) => path,
            Self::Delete(path) => path,
        }
    }
}

/// Writes committed together: either all of them apply or none does
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch(Vec<BatchWrite>);

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, path: DocPath, fields: Fields) -> Self {
        self.0.push(BatchWrite::Set(path, fields));
        self
    }

    pub fn merge(mut self, path: DocPath, fields: Fields) -> Self {
        self.0.push(BatchWrite::Merge(path, fields));
        self
    }

    /// Fails the whole batch if the document does not exist
    pub fn update(mut self, path: DocPath, fields: Fields) -> Self {
        self.0.push(BatchWrite::Update(path, fields));
        self
    }

    pub fn delete(mut self, path: DocPath) -> Self {
        self.0.push(BatchWrite::Delete(path));
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for WriteBatch {
    type Item = BatchWrite;
    type IntoIter = std::vec::IntoIter<BatchWrite>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A document read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id within its collection
    pub id: String,
    /// Field values with server markers already resolved
    pub data: Map<String, Value>,
}

impl Document {
    /// Reads a string field
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }

    /// Reads an integer field, treating missing values as 0
    pub fn int_field(&self, name: &str) -> i64 {
        self.data.get(name).and_then(Value::as_i64).unwrap_or(0)
    }
}

/// Port trait for the cloud SDK's document database client
#[async_trait::async_trait]
pub trait IDocumentStore: Send + Sync {
    /// Reads one document; `None` if it does not exist
    async fn get(&self, path: &DocPath) -> anyhow::Result<Option<Document>>;

    /// Reads every document of a collection in the store's natural order
    async fn list(&self, collection: &str) -> anyhow::Result<Vec<Document>>;

    /// Creates or fully replaces a document
    async fn set(&self, path: &DocPath, fields: Fields) -> anyhow::Result<()>;

    /// Creates a document or merges fields into an existing one
    async fn merge(&self, path: &DocPath, fields: Fields) -> anyhow::Result<()>;

    /// Merges fields into an existing document; fails if it does not exist
    async fn update(&self, path: &DocPath, fields: Fields) -> anyhow::Result<()>;

    /// Removes a document; succeeds if it is already absent
    async fn delete(&self, path: &DocPath) -> anyhow::Result<()>;

    /// Applies every write of the batch atomically
    ///
    /// If any write fails (e.g. an `Update` of a missing document) no write
    /// of the batch is applied.
    async fn commit(&self, batch: WriteBatch) -> anyhow::Result<()>;

    /// Returns the first document whose `field` equals `equals`, ordered
    /// ascending by `order_by`
    async fn first_where(
        &self,
        collection: &str,
        field: &str,
        equals: &Value,
        order_by: &str,
    ) -> anyhow::Result<Option<Document>>;

    /// Tries to turn on local/offline persistence
    ///
    /// Unsupported environments report `BestEffort::Skipped`; this never fails.
    async fn enable_persistence(&self) -> BestEffort;
}
