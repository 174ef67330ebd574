//! Agenda Core — shared storage and domain abstractions.
//!
//! This crate defines the document model, the `DocumentStore` seam over the
//! persistence backend, the error taxonomy, and the read-only language
//! reference data. It contains no backend-specific code.

pub mod clock;
pub mod document;
pub mod error;
pub mod language;
pub mod store;
