//! CRUD and range/cursor queries over event documents.

use std::sync::Arc;

use agenda_core::document::{DocumentKey, Kind};
use agenda_core::error::DomainError;
use agenda_core::store::{DocumentStore, Filter, Query, ResumePoint};
use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

use crate::cursor::PageCursor;
use crate::event::{DATE_FORMAT, DATE_PROPERTY, Event, EventDescription, EventId};
use crate::translation::Translation;

/// Failure modes of [`EventRepository::create`]. The two-document write is
/// not atomic; the variants tell the caller which half succeeded.
#[derive(Debug, Error)]
pub enum CreateError {
    /// The event or its canonical translation failed validation; every
    /// violation is listed.
    #[error("validation failed: {}", .0.join("; "))]
    Invalid(Vec<String>),

    /// The event write failed; nothing was persisted.
    #[error("event write failed: {0}")]
    Event(#[source] DomainError),

    /// The event was persisted but the canonical translation write failed.
    /// The caller may retry just the translation write for `event_id`.
    #[error("translation write failed for event {event_id}: {source}")]
    Translation {
        /// Id assigned to the already-persisted event.
        event_id: EventId,
        /// The underlying store failure.
        #[source]
        source: DomainError,
    },
}

/// One page of the event feed, with the cursor to continue from.
#[derive(Debug, Clone)]
pub struct EventPage {
    /// The events of this page, date-ascending.
    pub events: Vec<Event>,
    /// Continuation cursor; the terminal sentinel when exhausted.
    pub cursor: PageCursor,
}

/// Repository for event documents.
#[derive(Clone)]
pub struct EventRepository {
    store: Arc<dyn DocumentStore>,
    canonical: String,
}

impl EventRepository {
    /// Creates a repository over `store` with the given canonical language
    /// code.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, canonical: impl Into<String>) -> Self {
        Self {
            store,
            canonical: canonical.into(),
        }
    }

    /// Persists a new event together with its mandatory canonical
    /// translation. The event is written first and assigned its id; the
    /// translation (with the event's shared fields denormalized onto it)
    /// is written second under that id.
    ///
    /// There is no cross-document transaction: a translation-write failure
    /// leaves the event persisted and is reported as
    /// [`CreateError::Translation`] so the caller can retry the second
    /// write.
    ///
    /// # Errors
    ///
    /// Returns [`CreateError::Invalid`] listing all validation problems,
    /// or the write-failure variants described above.
    pub async fn create(
        &self,
        event: Event,
        canonical: Translation,
    ) -> Result<(Event, Translation), CreateError> {
        let mut errors: Vec<String> = Vec::new();
        errors.extend(event.validity().errors().iter().cloned());
        errors.extend(canonical.validity().errors().iter().cloned());
        if canonical.lang() != self.canonical && !canonical.lang().is_empty() {
            errors.push(format!(
                "canonical translation must be in '{}', got '{}'",
                self.canonical,
                canonical.lang()
            ));
        }
        if !errors.is_empty() {
            return Err(CreateError::Invalid(errors));
        }

        let mut event = event;
        let key = self
            .store
            .put(&event.to_document())
            .await
            .map_err(CreateError::Event)?;
        let event_id = key.numeric_id().ok_or_else(|| {
            CreateError::Event(DomainError::Store(format!(
                "store returned non-numeric key {key}"
            )))
        })?;
        event.set_id(event_id);

        // Denormalize the event's shared fields onto the translation at
        // write time.
        let mut stored = Translation::new(
            None,
            canonical.lang(),
            canonical.title(),
            canonical.body(),
            event.location(),
            event.transit(),
            event.url(),
        );
        stored.set_event_id(event_id);
        self.store
            .put(&stored.to_document(event_id))
            .await
            .map_err(|source| CreateError::Translation { event_id, source })?;

        event.set_description(Some(EventDescription {
            lang: stored.lang().to_owned(),
            title: stored.title().to_owned(),
            body: stored.body().to_owned(),
        }));
        Ok((event, stored))
    }

    /// Full scan ordered by date ascending. Admin/export paths only.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Store` on backend failure.
    pub async fn get_all(&self) -> Result<Vec<Event>, DomainError> {
        let page = self
            .store
            .query(&Query::new(Kind::Event, DATE_PROPERTY))
            .await?;
        Ok(page.documents.iter().map(Event::from_document).collect())
    }

    /// Batch fetch, sorted. Unresolved ids are silently omitted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Store` on backend failure.
    pub async fn get_by_ids(&self, ids: &[EventId]) -> Result<Vec<Event>, DomainError> {
        let keys: Vec<DocumentKey> = ids
            .iter()
            .map(|&id| DocumentKey::Numeric(Kind::Event, id))
            .collect();
        let documents = self.store.get_many(&keys).await?;
        let mut events: Vec<Event> = documents.iter().map(Event::from_document).collect();
        events.sort_by(Event::order);
        Ok(events)
    }

    /// Fetches one event by id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` when the id is absent.
    pub async fn get_by_key(&self, id: EventId) -> Result<Event, DomainError> {
        let document = self
            .store
            .get(&DocumentKey::Numeric(Kind::Event, id))
            .await?;
        Ok(Event::from_document(&document))
    }

    /// Unconditional delete by id. No existence check, and child
    /// translations are not cascaded; orphaned translations are a known
    /// defect class of this layout.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Store` on backend failure.
    pub async fn delete(&self, id: EventId) -> Result<(), DomainError> {
        self.store
            .delete(&DocumentKey::Numeric(Kind::Event, id))
            .await
    }

    /// Returns up to `page_size` events with `date >= from`, ascending,
    /// resuming after `cursor` when given. The returned page always
    /// carries a cursor: active after a full page, the terminal sentinel
    /// otherwise.
    ///
    /// Cursors are not isolated against concurrent writes: rows inserted
    /// before the resume position after a page was fetched may be skipped,
    /// and rows inserted after it may appear. No snapshot semantics.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCursor` for malformed or foreign
    /// tokens and `DomainError::Store` on backend failure.
    pub async fn query_page(
        &self,
        from: NaiveDate,
        page_size: usize,
        cursor: Option<&str>,
    ) -> Result<EventPage, DomainError> {
        let resume = match cursor {
            None => None,
            Some(token) => match PageCursor::decode_for(token, from)? {
                PageCursor::Exhausted => {
                    return Ok(EventPage {
                        events: Vec::new(),
                        cursor: PageCursor::Exhausted,
                    });
                }
                PageCursor::Active {
                    after_date,
                    after_id,
                    ..
                } => Some(ResumePoint {
                    sort_value: Value::from(after_date.format(DATE_FORMAT).to_string()),
                    id: after_id,
                }),
            },
        };

        let mut query = Query::new(Kind::Event, DATE_PROPERTY)
            .filter(Filter::GreaterOrEqual(
                DATE_PROPERTY,
                Value::from(from.format(DATE_FORMAT).to_string()),
            ))
            .limit(page_size);
        if let Some(resume) = resume {
            query = query.resume_after(resume);
        }

        let page = self.store.query(&query).await?;
        let events: Vec<Event> = page.documents.iter().map(Event::from_document).collect();
        let cursor = match page.resume {
            None => PageCursor::Exhausted,
            Some(resume) => {
                let after_date = resume
                    .sort_value
                    .as_str()
                    .and_then(|text| NaiveDate::parse_from_str(text, DATE_FORMAT).ok())
                    .ok_or_else(|| {
                        DomainError::Store("resume position carries no valid date".to_owned())
                    })?;
                PageCursor::Active {
                    from,
                    after_date,
                    after_id: resume.id,
                }
            }
        };
        Ok(EventPage { events, cursor })
    }

    /// Returns all events in the half-open interval `[from, to)`,
    /// ascending.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Store` on backend failure.
    pub async fn query_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Event>, DomainError> {
        let query = Query::new(Kind::Event, DATE_PROPERTY)
            .filter(Filter::GreaterOrEqual(
                DATE_PROPERTY,
                Value::from(from.format(DATE_FORMAT).to_string()),
            ))
            .filter(Filter::LessThan(
                DATE_PROPERTY,
                Value::from(to.format(DATE_FORMAT).to_string()),
            ));
        let page = self.store.query(&query).await?;
        Ok(page.documents.iter().map(Event::from_document).collect())
    }

    /// Returns all events of one calendar month, i.e. the interval
    /// `[first of month, first of next month)`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an impossible year/month and
    /// `DomainError::Store` on backend failure.
    pub async fn for_month(&self, year: i32, month: u32) -> Result<Vec<Event>, DomainError> {
        let (from, to) = month_bounds(year, month)?;
        self.query_range(from, to).await
    }
}

/// Computes the half-open `[first of month, first of next month)` bounds.
pub(crate) fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), DomainError> {
    let from = NaiveDate::from_ymd_opt(year, month, 1);
    let to = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (from, to) {
        (Some(from), Some(to)) => Ok((from, to)),
        _ => Err(DomainError::Validation(vec![format!(
            "invalid month {year}-{month:02}"
        )])),
    }
}
