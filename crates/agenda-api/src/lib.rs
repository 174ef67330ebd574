//! HTTP transport shell for the agenda backend.

pub mod error;
pub mod renderer;
pub mod routes;
pub mod state;
