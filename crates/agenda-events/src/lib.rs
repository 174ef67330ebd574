//! Agenda Events — the event storage and translation-resolution domain.
//!
//! Events are dated entries with language-independent shared fields; their
//! text lives in per-language translation documents keyed under the event.
//! The repositories in this crate provide CRUD, date-range and cursor-paged
//! queries, and the fallback resolution that merges an event set with a
//! requested language's translations.

pub mod collection;
pub mod cursor;
pub mod event;
pub mod event_repository;
pub mod newsletter;
pub mod subscriber;
pub mod translation;
pub mod translation_repository;
