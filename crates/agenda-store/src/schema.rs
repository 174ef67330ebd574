//! Document store database schema.

/// SQL to create the documents table and its key-shape indexes. Mirrors
/// the migration; used by tooling that provisions throwaway databases.
pub const CREATE_DOCUMENTS_TABLE: &str = r"
CREATE SEQUENCE IF NOT EXISTS documents_id_seq;

CREATE TABLE IF NOT EXISTS documents (
    kind        TEXT NOT NULL,
    id          BIGINT,
    parent_kind TEXT,
    parent_id   BIGINT,
    name        TEXT,
    properties  JSONB NOT NULL DEFAULT '{}'::jsonb
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_documents_numeric
    ON documents (kind, id) WHERE id IS NOT NULL;

CREATE UNIQUE INDEX IF NOT EXISTS idx_documents_child
    ON documents (kind, parent_kind, parent_id, name) WHERE parent_id IS NOT NULL;

CREATE UNIQUE INDEX IF NOT EXISTS idx_documents_named
    ON documents (kind, name) WHERE parent_id IS NULL AND name IS NOT NULL;

CREATE INDEX IF NOT EXISTS idx_documents_date
    ON documents (kind, (properties->>'date'), id);
";
