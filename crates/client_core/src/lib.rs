use std::{collections::HashMap, sync::Arc};

use anyhow::{ensure, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{Annotation, AnnotationId, Category, CategoryAssignment},
    protocol::{CategoryAssignRequest, CategoryUpsertRequest},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{error, warn};
use url::Url;

pub mod annotations;
pub mod config;
pub mod error;
mod transport;

pub use annotations::AnnotatorClient;

use error::{ApiError, StoreError};
use transport::{endpoint, expect_success, read_json};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Sink for failures that must reach the end user, not just the diagnostic
/// log. A UI wires a dialog here; tests inject a capturing sink.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn alert(&self, message: &str);
}

/// Default sink for headless callers: the alert becomes a WARN log line.
pub struct TracingAlertSink;

#[async_trait]
impl AlertSink for TracingAlertSink {
    async fn alert(&self, message: &str) {
        warn!("{message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryStoreEvent {
    CategoriesChanged,
}

/// Pure derivation of the annotation → category-labels index. Labels appear
/// in collection order. The store memoizes this per collection revision; the
/// index is recomputed whole, never patched incrementally.
pub fn derive_index(categories: &[Category]) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for category in categories {
        for assignment in &category.annotations {
            map.entry(assignment.index_key())
                .or_default()
                .push(category.label.clone());
        }
    }
    map
}

struct CachedIndex {
    revision: u64,
    map: HashMap<String, Vec<String>>,
}

struct CategoryStoreState {
    categories: Vec<Category>,
    revision: u64,
    index: Option<CachedIndex>,
}

impl CategoryStoreState {
    fn find(&self, label: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.label == label)
    }

    fn mark_changed(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Client-side cache of the server's category collection.
///
/// The collection is the local source of truth between fetches. Every
/// mutation issues the matching REST command and reconciles local state with
/// the server's response; failures are logged (and, for the two
/// annotation-assignment operations, surfaced through the [`AlertSink`])
/// rather than propagated, so callers never have to handle a rejection.
///
/// Operations are not serialized against each other: state is locked only
/// across local reads and writes, never across a request await, so two
/// overlapping edits to the same category race with last-write-wins
/// reconciliation.
pub struct CategoryStore {
    http: Client,
    base_url: Url,
    alerts: Arc<dyn AlertSink>,
    inner: Mutex<CategoryStoreState>,
    events: broadcast::Sender<CategoryStoreEvent>,
}

impl CategoryStore {
    pub fn new(base_url: Url, alerts: Arc<dyn AlertSink>) -> Result<Arc<Self>> {
        ensure!(
            matches!(base_url.scheme(), "http" | "https"),
            "server address must be an http:// or https:// url"
        );
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Arc::new(Self {
            http: Client::new(),
            base_url,
            alerts,
            inner: Mutex::new(CategoryStoreState {
                categories: Vec::new(),
                revision: 0,
                index: None,
            }),
            events,
        }))
    }

    /// Snapshot of the primary collection, in server order.
    pub async fn categories(&self) -> Vec<Category> {
        self.inner.lock().await.categories.clone()
    }

    /// Derived annotation → labels index for the current collection,
    /// recomputed via [`derive_index`] whenever the collection has changed
    /// since the last read. Never stale relative to [`categories`](Self::categories).
    pub async fn categories_map(&self) -> HashMap<String, Vec<String>> {
        let mut guard = self.inner.lock().await;
        if let Some(cached) = &guard.index {
            if cached.revision == guard.revision {
                return cached.map.clone();
            }
        }
        let map = derive_index(&guard.categories);
        let revision = guard.revision;
        guard.index = Some(CachedIndex {
            revision,
            map: map.clone(),
        });
        map
    }

    /// Observers receive [`CategoryStoreEvent::CategoriesChanged`] after
    /// every collection change.
    pub fn subscribe(&self) -> broadcast::Receiver<CategoryStoreEvent> {
        self.events.subscribe()
    }

    fn notify_changed(&self) {
        let _ = self.events.send(CategoryStoreEvent::CategoriesChanged);
    }

    /// Replaces the local collection with the server's current state.
    pub async fn fetch_all(&self) {
        if let Err(err) = self.try_fetch_all().await {
            error!("failed to fetch categories: {err}");
        }
    }

    async fn try_fetch_all(&self) -> Result<(), ApiError> {
        let fetched: Vec<Category> =
            read_json(self.http.get(endpoint(&self.base_url, &["categories"]))).await?;
        {
            let mut guard = self.inner.lock().await;
            guard.categories = fetched;
            guard.mark_changed();
        }
        self.notify_changed();
        Ok(())
    }

    /// Creates a category with no assignments. A label that is empty after
    /// trimming is a no-op, not an error.
    pub async fn add(&self, new_label: &str) {
        let label = new_label.trim();
        if label.is_empty() {
            return;
        }
        if let Err(err) = self.try_add(label).await {
            error!("failed to add category \"{label}\": {err}");
        }
    }

    async fn try_add(&self, label: &str) -> Result<(), ApiError> {
        let body = CategoryUpsertRequest {
            label: label.to_string(),
            annotations: Vec::new(),
        };
        // The server owns the canonical form of the label; append what it
        // returned, not what was sent.
        let created: Category = read_json(
            self.http
                .post(endpoint(&self.base_url, &["categories"]))
                .json(&body),
        )
        .await?;
        {
            let mut guard = self.inner.lock().await;
            guard.categories.push(created);
            guard.mark_changed();
        }
        self.notify_changed();
        Ok(())
    }

    /// Renames the category currently keyed by `label`. The label is the
    /// category's identity, so the rename is a single atomic remote call to
    /// the old label's resource path; the local key only changes once the
    /// server has confirmed.
    pub async fn rename(&self, label: &str, edit_draft: &str) {
        let label = label.trim();
        let new_label = edit_draft.trim();
        if new_label.is_empty() {
            return;
        }
        if let Err(err) = self.try_rename(label, new_label).await {
            error!("failed to rename category \"{label}\": {err}");
        }
    }

    async fn try_rename(&self, label: &str, new_label: &str) -> Result<(), StoreError> {
        let annotations = {
            let guard = self.inner.lock().await;
            let category = guard
                .find(label)
                .ok_or_else(|| StoreError::CategoryNotFound(label.to_string()))?;
            category.annotations.clone()
        };

        let body = CategoryUpsertRequest {
            label: new_label.to_string(),
            annotations,
        };
        let updated: Category = read_json(
            self.http
                .put(endpoint(&self.base_url, &["categories", label]))
                .json(&body),
        )
        .await?;

        {
            let mut guard = self.inner.lock().await;
            for category in &mut guard.categories {
                if category.label == label {
                    *category = updated.clone();
                }
            }
            guard.mark_changed();
        }
        self.notify_changed();
        Ok(())
    }

    /// Deletes every category carrying `label`.
    pub async fn delete(&self, label: &str) {
        let label = label.trim();
        if label.is_empty() {
            return;
        }
        if let Err(err) = self.try_delete(label).await {
            error!("failed to delete category \"{label}\": {err}");
        }
    }

    async fn try_delete(&self, label: &str) -> Result<(), ApiError> {
        expect_success(
            self.http
                .delete(endpoint(&self.base_url, &["categories", label])),
        )
        .await?;
        {
            let mut guard = self.inner.lock().await;
            guard.categories.retain(|c| c.label != label);
            guard.mark_changed();
        }
        self.notify_changed();
        Ok(())
    }

    /// Adds `annotation` (taken from `transcript_file`) to the category's
    /// assignment list. The locally-computed list is applied before the
    /// remote call resolves and is kept even if that call fails; duplicate
    /// pairs are rejected before any network traffic. Both outcomes that the
    /// user must know about go through the [`AlertSink`].
    pub async fn assign_annotation(
        &self,
        category_label: &str,
        transcript_file: &str,
        annotation: &Annotation,
    ) {
        let label = category_label.trim();
        if label.is_empty() {
            return;
        }
        match self
            .try_assign(label, transcript_file.trim(), annotation)
            .await
        {
            Ok(()) => {}
            Err(err @ StoreError::DuplicateAssignment { .. }) => {
                warn!("{err}");
                self.alerts.alert(&err.to_string()).await;
            }
            Err(err) => {
                error!("failed to add annotation to category \"{label}\": {err}");
                self.alerts
                    .alert("Failed to add annotation to category")
                    .await;
            }
        }
    }

    async fn try_assign(
        &self,
        label: &str,
        transcript_file: &str,
        annotation: &Annotation,
    ) -> Result<(), StoreError> {
        let updated = {
            let mut guard = self.inner.lock().await;
            let position = guard
                .categories
                .iter()
                .position(|c| c.label == label)
                .ok_or_else(|| StoreError::CategoryNotFound(label.to_string()))?;

            let duplicate = guard.categories[position].annotations.iter().any(|a| {
                a.transcript_file == transcript_file && a.annotation_id == annotation.id
            });
            if duplicate {
                return Err(StoreError::DuplicateAssignment {
                    label: label.to_string(),
                    transcript_file: transcript_file.to_string(),
                    annotation_id: annotation.id,
                });
            }

            let mut updated = guard.categories[position].annotations.clone();
            updated.push(CategoryAssignment {
                transcript_file: transcript_file.to_string(),
                annotation_id: annotation.id,
            });

            // Optimistic: visible before the request is even sent, and not
            // reverted if the request fails (see DESIGN.md).
            guard.categories[position].annotations = updated.clone();
            guard.mark_changed();
            updated
        };
        self.notify_changed();

        let body = CategoryAssignRequest {
            label: label.to_string(),
            category: Category {
                label: label.to_string(),
                annotations: updated,
            },
        };
        expect_success(
            self.http
                .put(endpoint(&self.base_url, &["categories"]))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    /// Removes the exact (transcript, annotation) pair from the category's
    /// assignment list. Other pairs sharing the same annotation id but a
    /// different transcript stay untouched.
    pub async fn unassign_annotation(
        &self,
        category_label: &str,
        transcript_file: &str,
        annotation_id: AnnotationId,
    ) {
        let label = category_label.trim();
        if label.is_empty() {
            return;
        }
        if let Err(err) = self
            .try_unassign(label, transcript_file.trim(), annotation_id)
            .await
        {
            error!("failed to remove annotation from category \"{label}\": {err}");
            self.alerts
                .alert("Failed to remove annotation from category")
                .await;
        }
    }

    async fn try_unassign(
        &self,
        label: &str,
        transcript_file: &str,
        annotation_id: AnnotationId,
    ) -> Result<(), StoreError> {
        let updated = {
            let guard = self.inner.lock().await;
            let category = guard
                .find(label)
                .ok_or_else(|| StoreError::CategoryNotFound(label.to_string()))?;
            category
                .annotations
                .iter()
                .filter(|a| {
                    !(a.transcript_file == transcript_file && a.annotation_id == annotation_id)
                })
                .cloned()
                .collect::<Vec<_>>()
        };

        let body = CategoryUpsertRequest {
            label: label.to_string(),
            annotations: updated,
        };
        let confirmed: Category = read_json(
            self.http
                .put(endpoint(&self.base_url, &["categories", label]))
                .json(&body),
        )
        .await?;

        {
            let mut guard = self.inner.lock().await;
            for category in &mut guard.categories {
                if category.label == label {
                    *category = confirmed.clone();
                }
            }
            guard.mark_changed();
        }
        self.notify_changed();
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
