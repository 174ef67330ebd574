//! Document store abstraction.
//!
//! The persistence backend is reached exclusively through the
//! [`DocumentStore`] trait: point lookups by key plus a single-kind query
//! with equality and range predicates on one indexed property.

use async_trait::async_trait;
use serde_json::Value;

use crate::document::{Document, DocumentKey, Kind};
use crate::error::DomainError;

/// A predicate over one indexed document property.
///
/// Date-valued properties are stored as ISO-8601 strings, so lexicographic
/// comparison is calendar comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `property == value`
    Equal(&'static str, Value),
    /// `property >= value`
    GreaterOrEqual(&'static str, Value),
    /// `property < value`
    LessThan(&'static str, Value),
}

/// Position after which a paged query resumes, strictly exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumePoint {
    /// Value of the ordering property of the last returned document.
    pub sort_value: Value,
    /// Numeric id of the last returned document (ordering tie-break).
    pub id: i64,
}

/// A query over one document kind: a conjunction of filters, single-field
/// ascending order with numeric-id tie-break, an optional page limit, and
/// an optional resume point.
#[derive(Debug, Clone)]
pub struct Query {
    /// Kind of documents to return.
    pub kind: Kind,
    /// Conjunction of property predicates.
    pub filters: Vec<Filter>,
    /// Property the results are ordered by, ascending.
    pub order_by: &'static str,
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
    /// When set, only documents strictly after this position are returned.
    pub resume_after: Option<ResumePoint>,
}

impl Query {
    /// Creates a query over `kind` ordered ascending by `order_by`.
    #[must_use]
    pub fn new(kind: Kind, order_by: &'static str) -> Self {
        Self {
            kind,
            filters: Vec::new(),
            order_by,
            limit: None,
            resume_after: None,
        }
    }

    /// Adds a filter to the conjunction.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Caps the number of returned documents.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resumes strictly after the given position.
    #[must_use]
    pub fn resume_after(mut self, resume: ResumePoint) -> Self {
        self.resume_after = Some(resume);
        self
    }
}

/// One page of query results.
#[derive(Debug, Clone)]
pub struct QueryPage {
    /// The documents of this page, in query order.
    pub documents: Vec<Document>,
    /// Resume position for the next page; `None` when the page was short,
    /// i.e. the query is exhausted.
    pub resume: Option<ResumePoint>,
}

impl QueryPage {
    /// Builds a page from raw results, deriving the resume position from
    /// the last document when a full page was returned.
    #[must_use]
    pub fn from_documents(
        documents: Vec<Document>,
        order_by: &str,
        limit: Option<usize>,
    ) -> Self {
        let resume = match limit {
            Some(limit) if documents.len() == limit => documents.last().and_then(|doc| {
                let id = doc.key.numeric_id()?;
                Some(ResumePoint {
                    sort_value: doc.get(order_by).cloned().unwrap_or(Value::Null),
                    id,
                })
            }),
            _ => None,
        };
        Self { documents, resume }
    }
}

/// Generic get/put/delete/query primitives over the persistence backend.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Upserts a document, assigning a fresh numeric id to unassigned keys.
    /// Returns the (possibly newly assigned) key of the stored document.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Store` on backend failure.
    async fn put(&self, document: &Document) -> Result<DocumentKey, DomainError>;

    /// Fetches one document by key.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` on a miss and `DomainError::Store`
    /// on backend failure.
    async fn get(&self, key: &DocumentKey) -> Result<Document, DomainError>;

    /// Batch fetch. Keys that resolve to nothing are silently omitted from
    /// the result; partial misses are never an error.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Store` on backend failure.
    async fn get_many(&self, keys: &[DocumentKey]) -> Result<Vec<Document>, DomainError>;

    /// Unconditional delete. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Store` on backend failure.
    async fn delete(&self, key: &DocumentKey) -> Result<(), DomainError>;

    /// Runs a filtered, ordered, optionally paged query.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Store` on backend failure.
    async fn query(&self, query: &Query) -> Result<QueryPage, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, DocumentKey, Kind};

    fn event_doc(id: i64, date: &str) -> Document {
        Document::new(DocumentKey::Numeric(Kind::Event, id)).with("date", date)
    }

    #[test]
    fn test_full_page_derives_resume_from_last_document() {
        let docs = vec![event_doc(1, "2024-03-01"), event_doc(2, "2024-03-05")];
        let page = QueryPage::from_documents(docs, "date", Some(2));
        let resume = page.resume.expect("full page must carry a resume point");
        assert_eq!(resume.id, 2);
        assert_eq!(resume.sort_value, Value::from("2024-03-05"));
    }

    #[test]
    fn test_short_page_is_exhausted() {
        let page = QueryPage::from_documents(vec![event_doc(1, "2024-03-01")], "date", Some(2));
        assert!(page.resume.is_none());
    }

    #[test]
    fn test_unlimited_query_never_resumes() {
        let docs = vec![event_doc(1, "2024-03-01")];
        let page = QueryPage::from_documents(docs, "date", None);
        assert!(page.resume.is_none());
    }
}
