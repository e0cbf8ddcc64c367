//! Document store over the cloud database's REST API
//!
//! Documents live under
//! `{database_url}/v1/projects/{project}/databases/(default)/documents`.
//! Every write, single or batched, is sent through `documents:commit`, so a
//! batch is applied atomically by the server. Server timestamps and counter
//! increments travel as field transforms rather than literal values.
//!
//! Requests carry the API key as the `key` query parameter and, when an
//! identity provider is attached and someone is signed in, the user's ID
//! token as a bearer token.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use wheelhub_core::config::BackendConfig;
use wheelhub_core::domain::BestEffort;
use wheelhub_core::ports::{
    BatchWrite, DocPath, Document, FieldValue, Fields, IDocumentStore, IIdentityProvider,
    WriteBatch,
};

/// Public endpoint of the hosted document database
pub const DEFAULT_DATABASE_URL: &str = "https://firestore.googleapis.com";

const PAGE_SIZE: &str = "300";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Document store speaking the database's REST API
pub struct RestDocumentStore {
    client: Client,
    /// Scheme and host, without trailing slash
    base_url: String,
    project_id: String,
    api_key: String,
    /// Source of bearer tokens; requests go out unauthenticated without it
    identity: Option<Arc<dyn IIdentityProvider>>,
}

impl RestDocumentStore {
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            api_key: api_key.into(),
            identity: None,
        }
    }

    /// Creates a store from the `backend` config section
    ///
    /// `api_key` and `project_id` are required; `database_url` defaults to
    /// [`DEFAULT_DATABASE_URL`].
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let api_key = required(config.api_key.as_deref(), "backend.api_key")?;
        let project_id = required(config.project_id.as_deref(), "backend.project_id")?;
        let base_url = config
            .database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_DATABASE_URL);
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            ..Self::new(base_url, project_id, api_key)
        })
    }

    /// Authenticates requests as the provider's current user
    pub fn with_identity(mut self, identity: Arc<dyn IIdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ------------------------------------------------------------------
    // URLs and names
    // ------------------------------------------------------------------

    fn root_segments(&self) -> Vec<String> {
        vec![
            "projects".to_string(),
            self.project_id.clone(),
            "databases".to_string(),
            "(default)".to_string(),
            "documents".to_string(),
        ]
    }

    fn collection_segments(&self, collection: &str) -> Vec<String> {
        let mut segments = self.root_segments();
        segments.extend(collection.split('/').map(str::to_string));
        segments
    }

    fn document_segments(&self, path: &DocPath) -> Vec<String> {
        let mut segments = self.collection_segments(path.collection());
        segments.push(path.id().to_string());
        segments
    }

    /// Resource name used inside request bodies
    fn document_name(&self, path: &DocPath) -> String {
        self.document_segments(path).join("/")
    }

    fn url(&self, segments: &[String]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid database URL {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("{} cannot be a base URL", self.base_url))?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    async fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let Some(identity) = &self.identity else {
            return builder;
        };
        let Some(user) = identity.current_user().await else {
            return builder;
        };
        match identity.id_token(&user).await {
            Ok(token) => builder.bearer_auth(token),
            Err(e) => {
                warn!(uid = %user.uid, error = %e, "Sending document request without a token");
                builder
            }
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        self.authorize(builder)
            .await
            .send()
            .await
            .context("Document API request failed")
    }

    async fn commit_writes(&self, batch: WriteBatch) -> Result<()> {
        let writes: Vec<Value> = batch
            .into_iter()
            .map(|write| self.encode_write(write))
            .collect();
        let count = writes.len();

        let url = self.url(&with_method(self.root_segments(), ":commit"))?;
        let request = self.client.post(url).json(&json!({ "writes": writes }));
        read_json(self.send(request).await?).await?;

        debug!(writes = count, "Committed writes");
        Ok(())
    }

    fn encode_write(&self, write: BatchWrite) -> Value {
        match write {
            BatchWrite::Set(path, fields) => self.encode_update(&path, fields, false, false),
            BatchWrite::Merge(path, fields) => self.encode_update(&path, fields, true, false),
            BatchWrite::Update(path, fields) => self.encode_update(&path, fields, true, true),
            BatchWrite::Delete(path) => json!({ "delete": self.document_name(&path) }),
        }
    }

    /// Literal values go into `update`; markers become `updateTransforms`.
    /// Without a mask the document is replaced.
    fn encode_update(
        &self,
        path: &DocPath,
        fields: Fields,
        masked: bool,
        must_exist: bool,
    ) -> Value {
        let mut literals = Map::new();
        let mut transforms = Vec::new();
        for (name, value) in fields {
            match value {
                FieldValue::Value(value) => {
                    literals.insert(name, encode_value(&value));
                }
                FieldValue::ServerTimestamp => transforms.push(json!({
                    "fieldPath": field_path(&name),
                    "setToServerValue": "REQUEST_TIME",
                })),
                FieldValue::Increment(by) => transforms.push(json!({
                    "fieldPath": field_path(&name),
                    "increment": { "integerValue": by.to_string() },
                })),
            }
        }

        let mut write = Map::new();
        if masked {
            let paths: Vec<String> = literals.keys().map(|name| field_path(name)).collect();
            write.insert("updateMask".to_string(), json!({ "fieldPaths": paths }));
        }
        if must_exist {
            write.insert("currentDocument".to_string(), json!({ "exists": true }));
        }
        if !transforms.is_empty() {
            write.insert("updateTransforms".to_string(), Value::Array(transforms));
        }
        write.insert(
            "update".to_string(),
            json!({ "name": self.document_name(path), "fields": literals }),
        );
        Value::Object(write)
    }
}

#[async_trait::async_trait]
impl IDocumentStore for RestDocumentStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>> {
        let url = self.url(&self.document_segments(path))?;
        let response = self.send(self.client.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = read_json(response).await?;
        decode_document(&body).map(Some)
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.url(&self.collection_segments(collection))?;
            url.query_pairs_mut().append_pair("pageSize", PAGE_SIZE);
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let body = read_json(self.send(self.client.get(url)).await?).await?;
            if let Some(items) = body.get("documents").and_then(Value::as_array) {
                for item in items {
                    documents.push(decode_document(item)?);
                }
            }

            match body.get("nextPageToken").and_then(Value::as_str) {
                Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(collection, count = documents.len(), "Listed documents");
        Ok(documents)
    }

    async fn set(&self, path: &DocPath, fields: Fields) -> Result<()> {
        self.commit_writes(WriteBatch::new().set(path.clone(), fields))
            .await
    }

    async fn merge(&self, path: &DocPath, fields: Fields) -> Result<()> {
        self.commit_writes(WriteBatch::new().merge(path.clone(), fields))
            .await
    }

    async fn update(&self, path: &DocPath, fields: Fields) -> Result<()> {
        self.commit_writes(WriteBatch::new().update(path.clone(), fields))
            .await
    }

    async fn delete(&self, path: &DocPath) -> Result<()> {
        self.commit_writes(WriteBatch::new().delete(path.clone()))
            .await
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        self.commit_writes(batch).await
    }

    async fn first_where(
        &self,
        collection: &str,
        field: &str,
        equals: &Value,
        order_by: &str,
    ) -> Result<Option<Document>> {
        // Queries run against the parent of the collection
        let (parent, collection_id) = collection
            .rsplit_once('/')
            .map_or((None, collection), |(parent, id)| (Some(parent), id));
        let mut segments = self.root_segments();
        if let Some(parent) = parent {
            segments.extend(parent.split('/').map(str::to_string));
        }
        let url = self.url(&with_method(segments, ":runQuery"))?;

        let query = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection_id }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field_path(field) },
                        "op": "EQUAL",
                        "value": encode_value(equals),
                    }
                },
                "orderBy": [{
                    "field": { "fieldPath": field_path(order_by) },
                    "direction": "ASCENDING",
                }],
                "limit": 1,
            }
        });
        let body = read_json(self.send(self.client.post(url).json(&query)).await?).await?;

        body.as_array()
            .into_iter()
            .flatten()
            .find_map(|row| row.get("document"))
            .map(decode_document)
            .transpose()
    }

    async fn enable_persistence(&self) -> BestEffort {
        debug!("REST document store has no offline cache");
        BestEffort::skipped("the REST transport keeps no local cache")
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    value
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("{field} is required for the cloud document store"))
}

fn with_method(mut segments: Vec<String>, method: &str) -> Vec<String> {
    if let Some(last) = segments.last_mut() {
        last.push_str(method);
    }
    segments
}

async fn read_json(response: Response) -> Result<Value> {
    let status = response.status();
    let text = response
        .text()
        .await
        .context("Failed to read document API response")?;
    if !status.is_success() {
        let parsed: Option<Value> = serde_json::from_str(&text).ok();
        let message = parsed
            .as_ref()
            .and_then(|body| body.pointer("/error/message"))
            .and_then(Value::as_str)
            .unwrap_or(&text);
        bail!("Document API returned {status}: {message}");
    }
    serde_json::from_str(&text).context("Document API returned invalid JSON")
}

/// Quotes field names that are not plain identifiers
fn field_path(name: &str) -> String {
    let mut chars = name.chars();
    let simple = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => {
            let fields: Map<String, Value> = map
                .iter()
                .map(|(name, value)| (name.clone(), encode_value(value)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

fn decode_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|typed| typed.iter().next()) else {
        return Value::Null;
    };
    match kind.as_str() {
        "integerValue" => inner
            .as_i64()
            .or_else(|| inner.as_str().and_then(|s| s.parse().ok()))
            .map(Value::from)
            .unwrap_or(Value::Null),
        "doubleValue" => inner.as_f64().map(Value::from).unwrap_or(Value::Null),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(decode_fields(inner.get("fields"))),
        "nullValue" => Value::Null,
        // strings, booleans, timestamps, references, bytes and geo points
        _ => inner.clone(),
    }
}

fn decode_fields(fields: Option<&Value>) -> Map<String, Value> {
    fields
        .and_then(Value::as_object)
        .map(|fields| {
            fields
                .iter()
                .map(|(name, value)| (name.clone(), decode_value(value)))
                .collect()
        })
        .unwrap_or_default()
}

fn decode_document(doc: &Value) -> Result<Document> {
    let name = doc
        .get("name")
        .and_then(Value::as_str)
        .context("Document API returned a document without a name")?;
    let id = name.rsplit('/').next().unwrap_or(name).to_string();
    Ok(Document {
        id,
        data: decode_fields(doc.get("fields")),
    })
}
