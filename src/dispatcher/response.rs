//! Response envelope
//!
//! The uniform success/error payload every non-streaming action returns,
//! and the outcome type the transport consumes.

use serde::Serialize;

use crate::error::ErrorCode;
use crate::provider::{Download, EntryDto};

/// JSON body shared by every non-streaming response.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<EntryDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<EntryDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Raw diagnostic detail, attached only when the debug flag is on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn success() -> Self {
        Self {
            status: "success",
            file: None,
            files: None,
            message: None,
            error: None,
        }
    }

    pub fn error(code: ErrorCode, detail: Option<String>) -> Self {
        Self {
            status: "error",
            file: None,
            files: None,
            message: Some(code.wire_code().to_string()),
            error: detail,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

/// What the transport should do with a completed request.
pub enum Outcome {
    /// Serialize the envelope; errors additionally carry HTTP 500
    Json(Envelope),
    /// Stream file content (or answer 304) instead of JSON
    Stream(Download),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_is_minimal() {
        let json = serde_json::to_value(Envelope::success()).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success"}));
    }

    #[test]
    fn error_envelope_carries_wire_code() {
        let json = serde_json::to_value(Envelope::error(ErrorCode::FileNotFound, None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "error", "message": "error_file_not_found"})
        );
    }

    #[test]
    fn debug_detail_rides_in_error_field() {
        let envelope = Envelope::error(ErrorCode::Internal, Some("boom".to_string()));
        let json = serde_json::to_value(envelope).unwrap();
        assert_eq!(json["message"], "error");
        assert_eq!(json["error"], "boom");
    }
}
