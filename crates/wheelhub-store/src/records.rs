//! Record store adapter
//!
//! Document layout:
//!
//! | Path | Fields |
//! |------|--------|
//! | `userActivity/{uid}` | `lastActive` |
//! | `users/{uid}/wheels/{title}` | `config`, `lastWrite`, `lastRead`, `readCount` |
//! | `settings/dirtyWords` | `words` |
//! | `settings/earnings` | `earningsPerReview` |
//! | `admins/{uid}` | `name`, `reviewCount`, `sessionReviews` |
//! | `carousels/{id}` | carousel fields |
//! | `sharedWheels/{path}` | `config`, `copyable`, `reviewStatus`, `created`, `reviewedBy`, `reviewedAt` |

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::{debug, info};
use wheelhub_core::domain::{Admin, BestEffort, Carousel, SavedWheel, SharedWheel, WheelConfig};
use wheelhub_core::ports::{DocPath, Document, Fields, IDocumentStore, WriteBatch};

const USER_ACTIVITY: &str = "userActivity";
const USERS: &str = "users";
const WHEELS: &str = "wheels";
const SETTINGS: &str = "settings";
const DIRTY_WORDS_DOC: &str = "dirtyWords";
const EARNINGS_DOC: &str = "earnings";
const ADMINS: &str = "admins";
const CAROUSELS: &str = "carousels";
const SHARED_WHEELS: &str = "sharedWheels";

/// Review status of a shared wheel waiting for moderation
pub const STATUS_PENDING: &str = "pending";
/// Review status of an approved shared wheel
pub const STATUS_APPROVED: &str = "approved";
/// Review status of a rejected shared wheel
pub const STATUS_DELETED: &str = "deleted";

/// Application records on top of a document store
#[derive(Clone)]
pub struct RecordStore {
    store: Arc<dyn IDocumentStore>,
}

impl RecordStore {
    pub fn new(store: Arc<dyn IDocumentStore>) -> Self {
        Self { store }
    }

    /// The raw document store, for callers that need direct access
    pub fn document_store(&self) -> Arc<dyn IDocumentStore> {
        Arc::clone(&self.store)
    }

    // ------------------------------------------------------------------
    // User activity and saved wheels
    // ------------------------------------------------------------------

    /// Stamps `lastActive` for the user
    pub async fn log_activity(&self, uid: &str) -> Result<()> {
        let path = DocPath::new(USER_ACTIVITY, uid);
        self.store
            .merge(&path, Fields::new().server_timestamp("lastActive"))
            .await
            .with_context(|| format!("Failed to log activity for {uid}"))
    }

    /// Lists the user's saved wheels ordered by title
    pub async fn list_saved(&self, uid: &str) -> Result<Vec<SavedWheel>> {
        let collection = wheels_collection(uid);
        let documents = self
            .store
            .list(&collection)
            .await
            .with_context(|| format!("Failed to list {collection}"))?;

        documents.iter().map(saved_wheel_from_doc).collect()
    }

    /// Saves a wheel under its title, replacing any wheel with the same title
    pub async fn save(&self, uid: &str, config: &WheelConfig) -> Result<()> {
        let title = config.title();
        if title.is_empty() {
            bail!("Cannot save a wheel without a title");
        }

        let path = saved_wheel_path(uid, title);
        let fields = Fields::new()
            .value("config", config.clone().into_value())
            .server_timestamp("lastWrite");
        self.store
            .merge(&path, fields)
            .await
            .with_context(|| format!("Failed to save {path}"))?;

        debug!(uid, title, "Saved wheel");
        Ok(())
    }

    /// Deletes a saved wheel; succeeds if no wheel has that title
    pub async fn delete_saved(&self, uid: &str, title: &str) -> Result<()> {
        let path = saved_wheel_path(uid, title);
        self.store
            .delete(&path)
            .await
            .with_context(|| format!("Failed to delete {path}"))
    }

    /// Counts an opening of a saved wheel
    pub async fn log_wheel_read(&self, uid: &str, title: &str) -> Result<BestEffort> {
        let path = saved_wheel_path(uid, title);
        if self.store.get(&path).await?.is_none() {
            return Ok(BestEffort::skipped(format!("{title} is not a saved wheel")));
        }

        let fields = Fields::new()
            .server_timestamp("lastRead")
            .increment("readCount", 1);
        self.store
            .update(&path, fields)
            .await
            .with_context(|| format!("Failed to log read of {path}"))?;
        Ok(BestEffort::Succeeded)
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Words rejected in shared wheels
    pub async fn dirty_words(&self) -> Result<Vec<String>> {
        let path = DocPath::new(SETTINGS, DIRTY_WORDS_DOC);
        let Some(doc) = self.store.get(&path).await? else {
            return Ok(Vec::new());
        };

        Ok(doc
            .data
            .get("words")
            .and_then(Value::as_array)
            .map(|words| {
                words
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    pub async fn set_dirty_words(&self, words: &[String]) -> Result<()> {
        let path = DocPath::new(SETTINGS, DIRTY_WORDS_DOC);
        self.store
            .set(&path, Fields::new().value("words", words.to_vec()))
            .await
            .context("Failed to store dirty words")?;
        info!(count = words.len(), "Updated dirty words");
        Ok(())
    }

    /// Amount paid per review; 0 when unset
    pub async fn earnings_per_review(&self) -> Result<f64> {
        let path = DocPath::new(SETTINGS, EARNINGS_DOC);
        Ok(self
            .store
            .get(&path)
            .await?
            .and_then(|doc| doc.data.get("earningsPerReview").and_then(Value::as_f64))
            .unwrap_or(0.0))
    }

    // ------------------------------------------------------------------
    // Admins
    // ------------------------------------------------------------------

    pub async fn admins(&self) -> Result<Vec<Admin>> {
        let documents = self.store.list(ADMINS).await.context("Failed to list admins")?;
        Ok(documents
            .iter()
            .map(|doc| Admin {
                uid: doc.id.clone(),
                name: doc.str_field("name").unwrap_or_default().to_string(),
                review_count: doc.int_field("reviewCount"),
                session_reviews: doc.int_field("sessionReviews"),
            })
            .collect())
    }

    /// Grants admin rights; existing counters are kept
    pub async fn add_admin(&self, uid: &str, name: &str) -> Result<()> {
        let fields = Fields::new()
            .value("name", name)
            .increment("reviewCount", 0)
            .increment("sessionReviews", 0);
        self.store
            .merge(&DocPath::new(ADMINS, uid), fields)
            .await
            .with_context(|| format!("Failed to add admin {uid}"))?;
        info!(uid, name, "Added admin");
        Ok(())
    }

    pub async fn delete_admin(&self, uid: &str) -> Result<()> {
        self.store
            .delete(&DocPath::new(ADMINS, uid))
            .await
            .with_context(|| format!("Failed to delete admin {uid}"))?;
        info!(uid, "Deleted admin");
        Ok(())
    }

    /// Resets the admin's lifetime review counter after a payout
    pub async fn set_admins_wheels_to_zero(&self, uid: &str) -> Result<()> {
        self.store
            .update(&DocPath::new(ADMINS, uid), Fields::new().value("reviewCount", 0))
            .await
            .with_context(|| format!("Failed to reset review count of {uid}"))
    }

    pub async fn reset_session_reviews(&self, uid: &str) -> Result<()> {
        self.store
            .update(&DocPath::new(ADMINS, uid), Fields::new().value("sessionReviews", 0))
            .await
            .with_context(|| format!("Failed to reset session reviews of {uid}"))
    }

    // ------------------------------------------------------------------
    // Carousels
    // ------------------------------------------------------------------

    pub async fn save_carousel(&self, carousel: &Carousel) -> Result<()> {
        if carousel.id.is_empty() {
            bail!("Cannot save a carousel without an id");
        }

        let fields = carousel
            .fields
            .iter()
            .fold(Fields::new(), |fields, (name, value)| {
                fields.value(name.as_str(), value.clone())
            });
        self.store
            .set(&DocPath::new(CAROUSELS, carousel.id.as_str()), fields)
            .await
            .with_context(|| format!("Failed to save carousel {}", carousel.id))
    }

    // ------------------------------------------------------------------
    // Shared wheel review
    // ------------------------------------------------------------------

    /// Approves a shared wheel and credits the reviewer
    pub async fn approve_shared(&self, path: &str, reviewer: &str) -> Result<()> {
        self.review_shared(path, STATUS_APPROVED, reviewer, 1).await
    }

    /// Rejects a shared wheel; the reviewer is credited only if
    /// `count_as_review` is set
    pub async fn delete_shared(
        &self,
        path: &str,
        count_as_review: bool,
        reviewer: &str,
    ) -> Result<()> {
        let credit = i64::from(count_as_review);
        self.review_shared(path, STATUS_DELETED, reviewer, credit).await
    }

    /// Moves the wheel out of the queue and credits the reviewer in one
    /// commit. The reviewer must already be an admin.
    async fn review_shared(
        &self,
        path: &str,
        status: &str,
        reviewer: &str,
        credit: i64,
    ) -> Result<()> {
        let wheel = DocPath::new(SHARED_WHEELS, path);
        let review = Fields::new()
            .value("reviewStatus", status)
            .value("reviewedBy", reviewer)
            .server_timestamp("reviewedAt");
        let counters = Fields::new()
            .increment("reviewCount", credit)
            .increment("sessionReviews", credit);
        let batch = WriteBatch::new()
            .update(wheel.clone(), review)
            .update(DocPath::new(ADMINS, reviewer), counters);

        self.store
            .commit(batch)
            .await
            .with_context(|| format!("Failed to review {wheel} as {reviewer}"))?;

        info!(path, status, reviewer, credit, "Reviewed shared wheel");
        Ok(())
    }

    pub async fn shared_wheel(&self, path: &str) -> Result<Option<SharedWheel>> {
        self.store
            .get(&DocPath::new(SHARED_WHEELS, path))
            .await?
            .as_ref()
            .map(shared_wheel_from_doc)
            .transpose()
    }

    /// Oldest shared wheel still waiting for review
    pub async fn next_for_review(&self) -> Result<Option<SharedWheel>> {
        self.store
            .first_where(
                SHARED_WHEELS,
                "reviewStatus",
                &Value::from(STATUS_PENDING),
                "created",
            )
            .await
            .context("Failed to query the review queue")?
            .as_ref()
            .map(shared_wheel_from_doc)
            .transpose()
    }
}

fn wheels_collection(uid: &str) -> String {
    format!("{USERS}/{uid}/{WHEELS}")
}

fn saved_wheel_path(uid: &str, title: &str) -> DocPath {
    DocPath::nested(&[USERS, uid, WHEELS], title)
}

fn config_field(doc: &Document) -> Result<WheelConfig> {
    doc.data
        .get("config")
        .cloned()
        .and_then(WheelConfig::from_value)
        .with_context(|| format!("Document {} has no wheel config", doc.id))
}

fn optional_str(doc: &Document, name: &str) -> Option<String> {
    doc.str_field(name).map(str::to_string)
}

fn saved_wheel_from_doc(doc: &Document) -> Result<SavedWheel> {
    Ok(SavedWheel {
        config: config_field(doc)?,
        last_write: optional_str(doc, "lastWrite"),
        last_read: optional_str(doc, "lastRead"),
        read_count: doc.int_field("readCount"),
    })
}

fn shared_wheel_from_doc(doc: &Document) -> Result<SharedWheel> {
    Ok(SharedWheel {
        path: doc.id.clone(),
        config: config_field(doc)?,
        copyable: doc.data.get("copyable").and_then(Value::as_bool).unwrap_or(false),
        review_status: doc.str_field("reviewStatus").unwrap_or(STATUS_PENDING).to_string(),
        created: optional_str(doc, "created"),
        reviewed_by: optional_str(doc, "reviewedBy"),
    })
}
