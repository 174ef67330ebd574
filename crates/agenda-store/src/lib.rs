//! PostgreSQL-backed implementation of the generic document store.

pub mod pg_document_store;
pub mod schema;

pub use pg_document_store::PgDocumentStore;
