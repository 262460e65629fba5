//! File entries
//!
//! The server-side view object the provider manipulates and the
//! client-visible projection the dispatcher serializes.

use serde::Serialize;
use std::path::PathBuf;

/// A file or folder as the provider sees it.
///
/// Reconstructed from disk metadata on every read; it has no identity
/// beyond the path it wraps and is never cached across requests.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Entry name, unique among its siblings at create/rename time
    pub name: String,
    /// Virtual folder containing this entry (`/`, `/docs`)
    pub folder: String,
    /// Resolved filesystem path. Server-side only, never serialized
    pub real_path: PathBuf,
    pub is_folder: bool,
    /// Byte count; folders have none
    pub size: Option<u64>,
    /// Display string: formatted size, or child count for folders
    pub info: String,
    /// Preview URL for small images, pointing back at the endpoint
    pub icon: Option<String>,
    /// Hover text, when a provider wants to attach one
    pub title: Option<String>,
    /// False marks protected entries the client may not rename or delete
    pub allow_edit: bool,
}

impl FileEntry {
    /// Project into the client-visible shape.
    pub fn to_dto(&self) -> EntryDto {
        EntryDto {
            name: self.name.clone(),
            info: self.info.clone(),
            is_folder: self.is_folder,
            icon: self.icon.clone(),
            // Present on the wire only when editing is disallowed.
            allow_edit: if self.allow_edit { None } else { Some(false) },
            title: self.title.clone(),
        }
    }
}

/// Client-visible projection of an entry. Real paths never cross this
/// boundary.
#[derive(Debug, Clone, Serialize)]
pub struct EntryDto {
    pub name: String,
    pub info: String,
    pub is_folder: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_edit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}
