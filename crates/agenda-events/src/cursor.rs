//! Opaque pagination cursors for the event feed.
//!
//! A cursor is either *active* (it records the ordering key of the last
//! returned event plus the query's from-date filter) or *exhausted* (the
//! terminal sentinel, encoded as the empty string). Exhausted is
//! absorbing: feeding the sentinel back yields an empty page and the
//! sentinel again.

use agenda_core::error::DomainError;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::event::EventId;

/// Continuation token for [`query_page`](crate::event_repository::EventRepository::query_page).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCursor {
    /// More results may follow strictly after the recorded position.
    Active {
        /// The from-date filter of the query this cursor belongs to.
        from: NaiveDate,
        /// Date of the last returned event.
        after_date: NaiveDate,
        /// Id of the last returned event (ordering tie-break).
        after_id: EventId,
    },
    /// No further results.
    Exhausted,
}

/// Wire form of an active token.
#[derive(Serialize, Deserialize)]
struct Token {
    f: NaiveDate,
    d: NaiveDate,
    i: EventId,
}

impl PageCursor {
    /// Returns true for the terminal sentinel.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, PageCursor::Exhausted)
    }

    /// Serializes the cursor into an opaque token. The terminal sentinel
    /// encodes as the empty string.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            PageCursor::Exhausted => String::new(),
            PageCursor::Active {
                from,
                after_date,
                after_id,
            } => {
                let token = Token {
                    f: *from,
                    d: *after_date,
                    i: *after_id,
                };
                let bytes =
                    serde_json::to_vec(&token).expect("cursor token serialization is infallible");
                URL_SAFE_NO_PAD.encode(bytes)
            }
        }
    }

    /// Deserializes a token. The same token always decodes to the same
    /// resume position.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCursor` for malformed tokens.
    pub fn decode(token: &str) -> Result<Self, DomainError> {
        if token.is_empty() {
            return Ok(PageCursor::Exhausted);
        }
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| DomainError::InvalidCursor("token is not valid base64".to_owned()))?;
        let token: Token = serde_json::from_slice(&bytes)
            .map_err(|_| DomainError::InvalidCursor("token payload is malformed".to_owned()))?;
        Ok(PageCursor::Active {
            from: token.f,
            after_date: token.d,
            after_id: token.i,
        })
    }

    /// Decodes a token for a query starting at `from`, rejecting tokens
    /// that belong to a different query instead of silently changing the
    /// result set.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCursor` for malformed or foreign
    /// tokens.
    pub fn decode_for(token: &str, from: NaiveDate) -> Result<Self, DomainError> {
        let cursor = Self::decode(token)?;
        if let PageCursor::Active { from: f, .. } = &cursor {
            if *f != from {
                return Err(DomainError::InvalidCursor(
                    "token belongs to a different query".to_owned(),
                ));
            }
        }
        Ok(cursor)
    }
}
