//! Per-language event translations.

use agenda_core::document::{Document, DocumentKey, Kind};

use crate::event::{EventId, Validity};

/// The text content of one event in one language, stored as a child
/// document of the event. The composite key `(event id, language code)`
/// guarantees at most one translation per language per event.
///
/// `location`, `transit` and `url` are denormalized copies of the event's
/// shared fields, taken at write time.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    event_id: Option<EventId>,
    lang: String,
    title: String,
    body: String,
    location: String,
    transit: String,
    url: String,
    validity: Validity,
}

impl Translation {
    /// Creates a new translation, accumulating all validation errors
    /// (empty language code, empty title) instead of stopping at the
    /// first.
    #[must_use]
    pub fn new(
        event_id: Option<EventId>,
        lang: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        location: impl Into<String>,
        transit: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let lang = lang.into();
        let title = title.into();
        let mut errors = Vec::new();
        if lang.is_empty() {
            errors.push("language is not defined".to_owned());
        }
        if title.is_empty() {
            errors.push("title is not defined".to_owned());
        }
        Self {
            event_id,
            lang,
            title,
            body: body.into(),
            location: location.into(),
            transit: transit.into(),
            url: url.into(),
            validity: Validity::from_errors(errors),
        }
    }

    /// Returns the composite child key for `(event_id, lang)`.
    #[must_use]
    pub fn document_key(event_id: EventId, lang: &str) -> DocumentKey {
        DocumentKey::Child {
            kind: Kind::Translation,
            parent_kind: Kind::Event,
            parent_id: event_id,
            name: lang.to_owned(),
        }
    }

    /// Exports this translation into a document under its parent event.
    #[must_use]
    pub fn to_document(&self, event_id: EventId) -> Document {
        Document::new(Self::document_key(event_id, &self.lang))
            .with("lang", self.lang.as_str())
            .with("title", self.title.as_str())
            .with("body", self.body.as_str())
            .with("location", self.location.as_str())
            .with("transit", self.transit.as_str())
            .with("url", self.url.as_str())
    }

    /// Parses a translation from a stored document. The parent id and
    /// language come from the key; missing text fields default to `""`.
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        let (event_id, lang) = match &document.key {
            DocumentKey::Child {
                parent_id, name, ..
            } => (Some(*parent_id), name.clone()),
            _ => (None, document.str_or_default("lang")),
        };
        Self::new(
            event_id,
            lang,
            document.str_or_default("title"),
            document.str_or_default("body"),
            document.str_or_default("location"),
            document.str_or_default("transit"),
            document.str_or_default("url"),
        )
    }

    /// Returns the parent event id, `None` until the event is persisted.
    #[must_use]
    pub const fn event_id(&self) -> Option<EventId> {
        self.event_id
    }

    pub(crate) fn set_event_id(&mut self, event_id: EventId) {
        self.event_id = Some(event_id);
    }

    /// Returns the language code.
    #[must_use]
    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the body text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the denormalized location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the denormalized transit directions.
    #[must_use]
    pub fn transit(&self) -> &str {
        &self.transit
    }

    /// Returns the denormalized URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the validation result produced at construction.
    #[must_use]
    pub const fn validity(&self) -> &Validity {
        &self.validity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_accumulates_all_violations() {
        let translation = Translation::new(None, "", "", "body", "", "", "");
        assert!(!translation.validity().is_ok());
        assert_eq!(
            translation.validity().errors(),
            ["language is not defined", "title is not defined"]
        );
    }

    #[test]
    fn test_document_round_trip_keeps_key_and_fields() {
        let translation = Translation::new(
            Some(42),
            "fr",
            "Fête du printemps",
            "Une fête.",
            "Kanzlei",
            "Tram 8",
            "https://example.ch",
        );
        let document = translation.to_document(42);
        assert_eq!(
            document.key,
            Translation::document_key(42, "fr"),
        );

        let restored = Translation::from_document(&document);
        assert_eq!(restored, translation);
        assert_eq!(restored.event_id(), Some(42));
        assert_eq!(restored.lang(), "fr");
        assert_eq!(restored.location(), "Kanzlei");
    }
}
