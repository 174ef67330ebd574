//! Generic document model for the persistence layer.
//!
//! Entities are persisted as schemaless documents: a typed key plus a JSON
//! property bag. Child keys express the ancestor relationship between a
//! translation and its event as an explicit `(parent id, name)` composite.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Document kinds known to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    /// A calendar event.
    Event,
    /// A per-language translation, child of an event.
    Translation,
    /// Read-only language reference data.
    Language,
    /// A newsletter subscriber.
    Subscriber,
}

impl Kind {
    /// Returns the stable storage name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Kind::Event => "Event",
            Kind::Translation => "Translation",
            Kind::Language => "Language",
            Kind::Subscriber => "Subscriber",
        }
    }

    /// Parses a storage name back into a kind.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Event" => Some(Kind::Event),
            "Translation" => Some(Kind::Translation),
            "Language" => Some(Kind::Language),
            "Subscriber" => Some(Kind::Subscriber),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a single document in the store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentKey {
    /// A new root document that has not been assigned an identifier yet.
    Unassigned(Kind),
    /// A root document with a store-assigned numeric identifier.
    Numeric(Kind, i64),
    /// A child document scoped under a numeric parent, named by a string.
    Child {
        /// Kind of the child document.
        kind: Kind,
        /// Kind of the parent document.
        parent_kind: Kind,
        /// Numeric identifier of the parent document.
        parent_id: i64,
        /// Name of the child within its parent, e.g. a language code.
        name: String,
    },
    /// A root document keyed by a string name, e.g. an email address.
    Named(Kind, String),
}

impl DocumentKey {
    /// Returns the kind of the document this key identifies.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            DocumentKey::Unassigned(kind) | DocumentKey::Numeric(kind, _) => *kind,
            DocumentKey::Child { kind, .. } => *kind,
            DocumentKey::Named(kind, _) => *kind,
        }
    }

    /// Returns the numeric identifier, if this key carries one.
    #[must_use]
    pub const fn numeric_id(&self) -> Option<i64> {
        match self {
            DocumentKey::Numeric(_, id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKey::Unassigned(kind) => write!(f, "{kind}(?)"),
            DocumentKey::Numeric(kind, id) => write!(f, "{kind}({id})"),
            DocumentKey::Child {
                kind,
                parent_kind,
                parent_id,
                name,
            } => write!(f, "{kind}({parent_kind}({parent_id})/{name})"),
            DocumentKey::Named(kind, name) => write!(f, "{kind}({name})"),
        }
    }
}

/// A schemaless document: a key plus a JSON property bag.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The key identifying this document.
    pub key: DocumentKey,
    /// Named properties, serialized as JSON values.
    pub properties: BTreeMap<String, Value>,
}

impl Document {
    /// Creates an empty document under `key`.
    #[must_use]
    pub fn new(key: DocumentKey) -> Self {
        Self {
            key,
            properties: BTreeMap::new(),
        }
    }

    /// Sets a property, consuming and returning the document.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(name.to_owned(), value.into());
        self
    }

    /// Returns a property value, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Returns a string property, defaulting to `""` when absent or not a
    /// string.
    #[must_use]
    pub fn str_or_default(&self, name: &str) -> String {
        self.properties
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned()
    }

    /// Returns a boolean property, defaulting to `false`.
    #[must_use]
    pub fn bool_or_default(&self, name: &str) -> bool {
        self.properties
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or_default()
    }

    /// Returns a string-array property, skipping non-string elements.
    #[must_use]
    pub fn str_array(&self, name: &str) -> Vec<String> {
        self.properties
            .get(name)
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }
}
