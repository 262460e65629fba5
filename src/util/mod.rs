//! Shared helpers
//!
//! Size formatting and HTTP date handling used across the crate.

pub mod format;
pub mod httpdate;

pub use format::format_size;
pub use httpdate::{format_http_date, parse_http_date};
