//! Calendar events.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use agenda_core::document::{Document, DocumentKey, Kind};
use chrono::NaiveDate;

/// Numeric event identifier, assigned by the store on first persist.
pub type EventId = i64;

pub(crate) const DATE_PROPERTY: &str = "date";
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validation outcome, produced once at construction and immutable after.
/// All violations are accumulated; validation never stops at the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validity {
    errors: Vec<String>,
}

impl Validity {
    pub(crate) fn from_errors(errors: Vec<String>) -> Self {
        Self { errors }
    }

    /// Returns true when the entity has no validation errors.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the accumulated validation messages.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// Single-language overlay text for an event. Built in memory (from a
/// submitted form or by the fallback resolver); never persisted on the
/// event document itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDescription {
    /// Language code of the overlay.
    pub lang: String,
    /// Event title in that language.
    pub title: String,
    /// Event body text in that language.
    pub body: String,
}

/// A dated calendar event.
///
/// The date and the shared fields (`location`, `transit`, `url`, `tags`)
/// are language independent; per-language text lives in
/// [`Translation`](crate::translation::Translation) documents keyed under
/// the event.
#[derive(Debug, Clone)]
pub struct Event {
    id: Option<EventId>,
    date: Option<NaiveDate>,
    location: String,
    transit: String,
    url: String,
    tags: BTreeSet<String>,
    description: Option<EventDescription>,
    validity: Validity,
}

impl Event {
    /// Creates a new, not-yet-persisted event. A missing date is recorded
    /// as a validation error rather than rejected outright, so callers can
    /// report every problem of a submitted form at once.
    #[must_use]
    pub fn new(
        date: Option<NaiveDate>,
        location: impl Into<String>,
        transit: impl Into<String>,
        url: impl Into<String>,
        tags: BTreeSet<String>,
    ) -> Self {
        let mut errors = Vec::new();
        if date.is_none() {
            errors.push("date is not defined".to_owned());
        }
        Self {
            id: None,
            date,
            location: location.into(),
            transit: transit.into(),
            url: url.into(),
            tags,
            description: None,
            validity: Validity::from_errors(errors),
        }
    }

    /// Attaches a single-language description overlay.
    #[must_use]
    pub fn with_description(mut self, description: EventDescription) -> Self {
        self.description = Some(description);
        self
    }

    /// Parses an event from a stored document. Never fails: missing or
    /// malformed fields are recorded on the validity result and defaulted.
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        let mut errors = Vec::new();
        let date = match document.get(DATE_PROPERTY) {
            None => {
                errors.push("date is not defined".to_owned());
                None
            }
            Some(value) => {
                let text = value.as_str().unwrap_or_default();
                match NaiveDate::parse_from_str(text, DATE_FORMAT) {
                    Ok(date) => Some(date),
                    Err(_) => {
                        errors.push(format!("date is malformed: {value}"));
                        None
                    }
                }
            }
        };
        Self {
            id: document.key.numeric_id(),
            date,
            location: document.str_or_default("location"),
            transit: document.str_or_default("transit"),
            url: document.str_or_default("url"),
            tags: document.str_array("tags").into_iter().collect(),
            description: None,
            validity: Validity::from_errors(errors),
        }
    }

    /// Exports this event into a document, keyed by its id when assigned.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let key = match self.id {
            Some(id) => DocumentKey::Numeric(Kind::Event, id),
            None => DocumentKey::Unassigned(Kind::Event),
        };
        let mut document = Document::new(key)
            .with("location", self.location.as_str())
            .with("transit", self.transit.as_str())
            .with("url", self.url.as_str())
            .with("tags", self.tags.iter().cloned().collect::<Vec<_>>());
        if let Some(date) = self.date {
            document = document.with(DATE_PROPERTY, date.format(DATE_FORMAT).to_string());
        }
        document
    }

    /// Total-order comparator over events: date ascending, ties broken by
    /// id ascending; missing values sort first. Used instead of `Ord`
    /// because equality is only defined for persisted events.
    #[must_use]
    pub fn order(&self, other: &Self) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.id.cmp(&other.id))
    }

    /// Returns the assigned identifier, `None` until first persisted.
    #[must_use]
    pub const fn id(&self) -> Option<EventId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: EventId) {
        self.id = Some(id);
    }

    /// Returns the calendar day, `None` only for invalid stored data.
    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Returns the event location, `""` when absent.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the public-transit directions, `""` when absent.
    #[must_use]
    pub fn transit(&self) -> &str {
        &self.transit
    }

    /// Returns the event URL, `""` when absent.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the tag set.
    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Returns the current description overlay, if any.
    #[must_use]
    pub const fn description(&self) -> Option<&EventDescription> {
        self.description.as_ref()
    }

    pub(crate) fn set_description(&mut self, description: Option<EventDescription>) {
        self.description = description;
    }

    /// Returns the validation result produced at construction.
    #[must_use]
    pub const fn validity(&self) -> &Validity {
        &self.validity
    }
}

/// Two events are equal iff both have an assigned id and identical
/// `(date, id)`. An event without an id is never equal to anything,
/// including itself, so `Eq` is deliberately not implemented.
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        match (self.id, other.id) {
            (Some(a), Some(b)) => a == b && self.date == other.date,
            _ => false,
        }
    }
}
