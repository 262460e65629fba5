//! Error handling
//!
//! Defines error types and wire codes for the file manager backend.

pub mod types;

pub use types::{DispatchError, ErrorCode, ProviderError};
