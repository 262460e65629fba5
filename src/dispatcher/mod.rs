//! Request dispatching
//!
//! Parses wire actions, enforces capability flags, and maps requests onto
//! provider operations, producing the uniform response envelope.

pub mod action;
pub mod handlers;
pub mod request;
pub mod response;

pub use action::{Action, parse_action};
pub use handlers::Dispatcher;
pub use request::{FmRequest, UploadPart};
pub use response::{Envelope, Outcome};
