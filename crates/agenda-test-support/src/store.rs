//! Test stores — deterministic `DocumentStore` implementations for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use agenda_core::document::{Document, DocumentKey, Kind};
use agenda_core::error::DomainError;
use agenda_core::store::{DocumentStore, Filter, Query, QueryPage};
use async_trait::async_trait;
use serde_json::Value;

fn value_text(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), ToOwned::to_owned)
}

fn matches_filter(document: &Document, filter: &Filter) -> bool {
    let (property, want, ordering) = match filter {
        Filter::Equal(property, value) => (property, value, None),
        Filter::GreaterOrEqual(property, value) => (property, value, Some(false)),
        Filter::LessThan(property, value) => (property, value, Some(true)),
    };
    let Some(have) = document.get(property) else {
        return false;
    };
    match ordering {
        None => have == want,
        // ISO date strings compare lexicographically in calendar order.
        Some(false) => value_text(have) >= value_text(want),
        Some(true) => value_text(have) < value_text(want),
    }
}

/// An in-memory document store with the same observable semantics as the
/// PostgreSQL-backed one: upserts, monotonic id assignment, ordered queries
/// with resume-after pagination.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    documents: BTreeMap<DocumentKey, Document>,
    next_id: i64,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                documents: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Returns the number of stored documents of `kind`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn count(&self, kind: Kind) -> usize {
        self.state
            .lock()
            .unwrap()
            .documents
            .keys()
            .filter(|key| key.kind() == kind)
            .count()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn put(&self, document: &Document) -> Result<DocumentKey, DomainError> {
        let mut state = self.state.lock().map_err(|e| DomainError::Store(e.to_string()))?;
        let key = match &document.key {
            DocumentKey::Unassigned(kind) => {
                let id = state.next_id;
                state.next_id += 1;
                DocumentKey::Numeric(*kind, id)
            }
            DocumentKey::Numeric(kind, id) => {
                // Keep fresh assignments clear of explicitly chosen ids.
                state.next_id = state.next_id.max(id + 1);
                DocumentKey::Numeric(*kind, *id)
            }
            other => other.clone(),
        };
        state.documents.insert(
            key.clone(),
            Document {
                key: key.clone(),
                properties: document.properties.clone(),
            },
        );
        Ok(key)
    }

    async fn get(&self, key: &DocumentKey) -> Result<Document, DomainError> {
        let state = self.state.lock().map_err(|e| DomainError::Store(e.to_string()))?;
        state
            .documents
            .get(key)
            .cloned()
            .ok_or_else(|| DomainError::not_found(key.kind(), key.to_string()))
    }

    async fn get_many(&self, keys: &[DocumentKey]) -> Result<Vec<Document>, DomainError> {
        let state = self.state.lock().map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(keys
            .iter()
            .filter_map(|key| state.documents.get(key).cloned())
            .collect())
    }

    async fn delete(&self, key: &DocumentKey) -> Result<(), DomainError> {
        let mut state = self.state.lock().map_err(|e| DomainError::Store(e.to_string()))?;
        state.documents.remove(key);
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<QueryPage, DomainError> {
        let state = self.state.lock().map_err(|e| DomainError::Store(e.to_string()))?;
        let mut documents: Vec<Document> = state
            .documents
            .values()
            .filter(|doc| doc.key.kind() == query.kind)
            .filter(|doc| query.filters.iter().all(|f| matches_filter(doc, f)))
            .cloned()
            .collect();
        documents.sort_by_key(|doc| {
            (
                doc.get(query.order_by).map(value_text).unwrap_or_default(),
                doc.key.clone(),
            )
        });
        if let Some(resume) = &query.resume_after {
            let resume_text = value_text(&resume.sort_value);
            documents.retain(|doc| {
                let text = doc.get(query.order_by).map(value_text).unwrap_or_default();
                let id = doc.key.numeric_id().unwrap_or(i64::MIN);
                (text, id) > (resume_text.clone(), resume.id)
            });
        }
        if let Some(limit) = query.limit {
            documents.truncate(limit);
        }
        Ok(QueryPage::from_documents(
            documents,
            query.order_by,
            query.limit,
        ))
    }
}

/// A document store that always fails with a store error. Useful for
/// testing error-handling paths.
#[derive(Debug, Default)]
pub struct FailingDocumentStore;

fn refused() -> DomainError {
    DomainError::Store("connection refused".to_owned())
}

#[async_trait]
impl DocumentStore for FailingDocumentStore {
    async fn put(&self, _document: &Document) -> Result<DocumentKey, DomainError> {
        Err(refused())
    }

    async fn get(&self, _key: &DocumentKey) -> Result<Document, DomainError> {
        Err(refused())
    }

    async fn get_many(&self, _keys: &[DocumentKey]) -> Result<Vec<Document>, DomainError> {
        Err(refused())
    }

    async fn delete(&self, _key: &DocumentKey) -> Result<(), DomainError> {
        Err(refused())
    }

    async fn query(&self, _query: &Query) -> Result<QueryPage, DomainError> {
        Err(refused())
    }
}

/// A store that behaves like [`InMemoryDocumentStore`] except that writes
/// of one document kind fail. Exercises the partial-failure window between
/// persisting an event and its canonical translation.
#[derive(Debug)]
pub struct FailingKindStore {
    inner: InMemoryDocumentStore,
    fail_kind: Kind,
}

impl FailingKindStore {
    /// Creates a store whose `put` fails for documents of `fail_kind`.
    #[must_use]
    pub fn new(fail_kind: Kind) -> Self {
        Self {
            inner: InMemoryDocumentStore::new(),
            fail_kind,
        }
    }
}

#[async_trait]
impl DocumentStore for FailingKindStore {
    async fn put(&self, document: &Document) -> Result<DocumentKey, DomainError> {
        if document.key.kind() == self.fail_kind {
            return Err(refused());
        }
        self.inner.put(document).await
    }

    async fn get(&self, key: &DocumentKey) -> Result<Document, DomainError> {
        self.inner.get(key).await
    }

    async fn get_many(&self, keys: &[DocumentKey]) -> Result<Vec<Document>, DomainError> {
        self.inner.get_many(keys).await
    }

    async fn delete(&self, key: &DocumentKey) -> Result<(), DomainError> {
        self.inner.delete(key).await
    }

    async fn query(&self, query: &Query) -> Result<QueryPage, DomainError> {
        self.inner.query(query).await
    }
}
