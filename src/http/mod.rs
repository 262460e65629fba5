//! HTTP endpoint
//!
//! Single-route axum adapter between the wire protocol and the
//! dispatcher: merges query/form/multipart parameters, spools upload
//! payloads to temporary files, and streams download responses.

pub mod endpoint;

pub use endpoint::{AppState, router};
