//! `PostgreSQL` implementation of the `DocumentStore` trait.
//!
//! All documents live in one `documents` table; the key shape decides
//! which columns identify a row. Properties are a JSONB blob, and query
//! filters compare the text rendering of a property so that ISO dates
//! order the same way here and in the in-memory store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row as _};
use tracing::instrument;

use agenda_core::document::{Document, DocumentKey, Kind};
use agenda_core::error::DomainError;
use agenda_core::store::{DocumentStore, Filter, Query, QueryPage};

/// PostgreSQL-backed document store.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Creates a new `PgDocumentStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_error(err: sqlx::Error) -> DomainError {
    DomainError::Store(err.to_string())
}

/// Text rendering used for filter and ordering comparisons; strings
/// compare by content, everything else by its JSON rendering.
fn value_text(value: &Value) -> String {
    match value.as_str() {
        Some(text) => text.to_owned(),
        None => value.to_string(),
    }
}

fn parse_kind(name: &str) -> Result<Kind, DomainError> {
    Kind::parse(name).ok_or_else(|| DomainError::Store(format!("unknown document kind {name}")))
}

fn row_to_document(row: &PgRow) -> Result<Document, DomainError> {
    let kind_name: String = row.try_get("kind").map_err(store_error)?;
    let kind = parse_kind(&kind_name)?;
    let id: Option<i64> = row.try_get("id").map_err(store_error)?;
    let parent_kind: Option<String> = row.try_get("parent_kind").map_err(store_error)?;
    let parent_id: Option<i64> = row.try_get("parent_id").map_err(store_error)?;
    let name: Option<String> = row.try_get("name").map_err(store_error)?;

    let key = match (id, parent_id, name) {
        (Some(id), None, _) => DocumentKey::Numeric(kind, id),
        (None, Some(parent_id), Some(name)) => DocumentKey::Child {
            kind,
            parent_kind: parse_kind(parent_kind.as_deref().unwrap_or_default())?,
            parent_id,
            name,
        },
        (None, None, Some(name)) => DocumentKey::Named(kind, name),
        _ => {
            return Err(DomainError::Store(
                "document row has no recognizable key".to_owned(),
            ));
        }
    };
    let properties: Json<BTreeMap<String, Value>> =
        row.try_get("properties").map_err(store_error)?;
    Ok(Document {
        key,
        properties: properties.0,
    })
}

/// Builds the SELECT for a [`Query`]. `$1` is the kind, `$2` the ordering
/// property; filters and the resume position bind from `$3` on.
fn query_sql(query: &Query) -> String {
    let mut sql = String::from(
        "SELECT kind, id, parent_kind, parent_id, name, properties \
         FROM documents WHERE kind = $1",
    );
    let mut next = 3;
    for filter in &query.filters {
        let op = match filter {
            Filter::Equal(..) => "=",
            Filter::GreaterOrEqual(..) => ">=",
            Filter::LessThan(..) => "<",
        };
        sql.push_str(&format!(
            " AND COALESCE(properties->>${next}, '') {op} ${}",
            next + 1
        ));
        next += 2;
    }
    if query.resume_after.is_some() {
        sql.push_str(&format!(
            " AND (COALESCE(properties->>$2, ''), id) > (${next}, ${})",
            next + 1
        ));
    }
    sql.push_str(" ORDER BY COALESCE(properties->>$2, ''), id ASC NULLS FIRST, name");
    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    sql
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[instrument(skip(self, document), fields(key = %document.key))]
    async fn put(&self, document: &Document) -> Result<DocumentKey, DomainError> {
        let properties = Json(&document.properties);
        match &document.key {
            DocumentKey::Unassigned(kind) => {
                let row = sqlx::query(
                    "INSERT INTO documents (kind, id, properties) \
                     VALUES ($1, nextval('documents_id_seq'), $2) RETURNING id",
                )
                .bind(kind.as_str())
                .bind(properties)
                .fetch_one(&self.pool)
                .await
                .map_err(store_error)?;
                let id: i64 = row.try_get("id").map_err(store_error)?;
                Ok(DocumentKey::Numeric(*kind, id))
            }
            DocumentKey::Numeric(kind, id) => {
                sqlx::query(
                    "INSERT INTO documents (kind, id, properties) VALUES ($1, $2, $3) \
                     ON CONFLICT (kind, id) WHERE id IS NOT NULL \
                     DO UPDATE SET properties = EXCLUDED.properties",
                )
                .bind(kind.as_str())
                .bind(id)
                .bind(properties)
                .execute(&self.pool)
                .await
                .map_err(store_error)?;
                // Keep the sequence ahead of explicitly assigned ids.
                sqlx::query(
                    "SELECT setval('documents_id_seq', GREATEST($1, last_value)) \
                     FROM documents_id_seq",
                )
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(store_error)?;
                Ok(document.key.clone())
            }
            DocumentKey::Child {
                kind,
                parent_kind,
                parent_id,
                name,
            } => {
                sqlx::query(
                    "INSERT INTO documents (kind, parent_kind, parent_id, name, properties) \
                     VALUES ($1, $2, $3, $4, $5) \
                     ON CONFLICT (kind, parent_kind, parent_id, name) \
                     WHERE parent_id IS NOT NULL \
                     DO UPDATE SET properties = EXCLUDED.properties",
                )
                .bind(kind.as_str())
                .bind(parent_kind.as_str())
                .bind(parent_id)
                .bind(name)
                .bind(properties)
                .execute(&self.pool)
                .await
                .map_err(store_error)?;
                Ok(document.key.clone())
            }
            DocumentKey::Named(kind, name) => {
                sqlx::query(
                    "INSERT INTO documents (kind, name, properties) VALUES ($1, $2, $3) \
                     ON CONFLICT (kind, name) WHERE parent_id IS NULL AND name IS NOT NULL \
                     DO UPDATE SET properties = EXCLUDED.properties",
                )
                .bind(kind.as_str())
                .bind(name)
                .bind(properties)
                .execute(&self.pool)
                .await
                .map_err(store_error)?;
                Ok(document.key.clone())
            }
        }
    }

    #[instrument(skip(self, key), fields(key = %key))]
    async fn get(&self, key: &DocumentKey) -> Result<Document, DomainError> {
        let row = match key {
            DocumentKey::Unassigned(kind) => {
                return Err(DomainError::not_found(*kind, key.to_string()));
            }
            DocumentKey::Numeric(kind, id) => {
                sqlx::query(
                    "SELECT kind, id, parent_kind, parent_id, name, properties \
                     FROM documents WHERE kind = $1 AND id = $2",
                )
                .bind(kind.as_str())
                .bind(id)
                .fetch_optional(&self.pool)
                .await
            }
            DocumentKey::Child {
                kind,
                parent_kind,
                parent_id,
                name,
            } => {
                sqlx::query(
                    "SELECT kind, id, parent_kind, parent_id, name, properties \
                     FROM documents \
                     WHERE kind = $1 AND parent_kind = $2 AND parent_id = $3 AND name = $4",
                )
                .bind(kind.as_str())
                .bind(parent_kind.as_str())
                .bind(parent_id)
                .bind(name)
                .fetch_optional(&self.pool)
                .await
            }
            DocumentKey::Named(kind, name) => {
                sqlx::query(
                    "SELECT kind, id, parent_kind, parent_id, name, properties \
                     FROM documents \
                     WHERE kind = $1 AND name = $2 AND parent_id IS NULL",
                )
                .bind(kind.as_str())
                .bind(name)
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(store_error)?;

        match row {
            Some(row) => row_to_document(&row),
            None => Err(DomainError::not_found(key.kind(), key.to_string())),
        }
    }

    async fn get_many(&self, keys: &[DocumentKey]) -> Result<Vec<Document>, DomainError> {
        let mut documents = Vec::with_capacity(keys.len());
        for key in keys {
            match self.get(key).await {
                Ok(document) => documents.push(document),
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err),
            }
        }
        Ok(documents)
    }

    #[instrument(skip(self, key), fields(key = %key))]
    async fn delete(&self, key: &DocumentKey) -> Result<(), DomainError> {
        match key {
            DocumentKey::Unassigned(_) => Ok(()),
            DocumentKey::Numeric(kind, id) => {
                sqlx::query("DELETE FROM documents WHERE kind = $1 AND id = $2")
                    .bind(kind.as_str())
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(store_error)?;
                Ok(())
            }
            DocumentKey::Child {
                kind,
                parent_kind,
                parent_id,
                name,
            } => {
                sqlx::query(
                    "DELETE FROM documents \
                     WHERE kind = $1 AND parent_kind = $2 AND parent_id = $3 AND name = $4",
                )
                .bind(kind.as_str())
                .bind(parent_kind.as_str())
                .bind(parent_id)
                .bind(name)
                .execute(&self.pool)
                .await
                .map_err(store_error)?;
                Ok(())
            }
            DocumentKey::Named(kind, name) => {
                sqlx::query(
                    "DELETE FROM documents WHERE kind = $1 AND name = $2 AND parent_id IS NULL",
                )
                .bind(kind.as_str())
                .bind(name)
                .execute(&self.pool)
                .await
                .map_err(store_error)?;
                Ok(())
            }
        }
    }

    #[instrument(skip(self, query), fields(kind = %query.kind, order_by = query.order_by))]
    async fn query(&self, query: &Query) -> Result<QueryPage, DomainError> {
        let sql = query_sql(query);
        let mut statement = sqlx::query(&sql)
            .bind(query.kind.as_str())
            .bind(query.order_by);
        for filter in &query.filters {
            let (field, value) = match filter {
                Filter::Equal(field, value)
                | Filter::GreaterOrEqual(field, value)
                | Filter::LessThan(field, value) => (*field, value),
            };
            statement = statement.bind(field).bind(value_text(value));
        }
        if let Some(resume) = &query.resume_after {
            statement = statement.bind(value_text(&resume.sort_value)).bind(resume.id);
        }

        let rows = statement.fetch_all(&self.pool).await.map_err(store_error)?;
        let documents = rows
            .iter()
            .map(row_to_document)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(QueryPage::from_documents(
            documents,
            query.order_by,
            query.limit,
        ))
    }
}
