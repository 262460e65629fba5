//! Request object
//!
//! Explicit carrier for the parameters of one file manager request. The
//! transport layer fills it in; the dispatcher never reads anything else,
//! which keeps it decoupled from any particular web framework.

use std::path::PathBuf;
use std::time::SystemTime;

/// One uploaded file part, already spooled to a local temporary path by
/// the transport before the dispatcher runs.
#[derive(Debug)]
pub struct UploadPart {
    /// Client-supplied file name; may still carry a client-side path
    pub name: String,
    /// Fully received payload on local disk
    pub temp_path: PathBuf,
    pub size: u64,
    /// MIME type claimed by the client, if any
    pub content_type: Option<String>,
}

/// Parameters of a single file manager request.
#[derive(Debug, Default)]
pub struct FmRequest {
    /// Wire action name (`upload`, `read`, …)
    pub action: String,
    /// Virtual folder the request operates in; defaults to `/`
    pub folder: Option<String>,
    /// Target entry name, required by rename/delete/download/show
    pub file: Option<String>,
    /// Rename destination folder; defaults to the current folder
    pub dest_folder: Option<String>,
    /// Rename destination name
    pub dest_name: Option<String>,
    /// New folder name for create_folder
    pub name: Option<String>,
    /// Upload payloads
    pub uploads: Vec<UploadPart>,
    /// Parsed `If-Modified-Since` timestamp for downloads
    pub if_modified_since: Option<SystemTime>,
}

impl FmRequest {
    /// Convenience constructor for the common no-upload case.
    pub fn action(action: &str) -> Self {
        Self {
            action: action.to_string(),
            ..Self::default()
        }
    }
}
