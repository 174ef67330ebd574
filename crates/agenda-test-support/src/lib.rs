//! Shared test doubles and utilities for the Maps Agenda backend.

mod clock;
mod store;

pub use clock::FixedClock;
pub use store::{FailingDocumentStore, FailingKindStore, InMemoryDocumentStore};
