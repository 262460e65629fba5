//! File providers
//!
//! Defines the storage backend contract consumed by the dispatcher, the
//! entry types that cross it, and the local-filesystem implementation.

pub mod entry;
pub mod filesystem;

pub use entry::{EntryDto, FileEntry};
pub use filesystem::FilesystemProvider;

use std::fs::File;
use std::path::Path;
use std::time::SystemTime;

use crate::error::ProviderError;

/// How the transport should label streamed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// `Content-Disposition: attachment`, forces a download dialog
    Attachment,
    /// `Content-Disposition: inline`, lets the browser render it
    Inline,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        }
    }
}

/// Payload of a successful download request.
pub enum Download {
    /// The client cache is current; send 304 and no body.
    NotModified,
    /// An open handle plus the headers the transport needs. The file is
    /// streamed from the handle, never buffered whole.
    Content {
        file: File,
        length: u64,
        mime: String,
        disposition: Disposition,
        modified: Option<SystemTime>,
        name: String,
    },
}

/// Contract every storage backend must implement.
///
/// Entries are transient views reconstructed from backend metadata on
/// every call; nothing is cached across requests. Implementations must
/// re-validate that each entry's backing path is still inside their
/// sandbox on every operation.
pub trait FileProvider: Send + Sync {
    /// List the entries of a virtual folder, matching folders first and
    /// files second, both in backend enumeration order. A missing folder
    /// yields an empty listing, not an error.
    fn read(&self, folder: &str, filter: &str) -> Result<Vec<FileEntry>, ProviderError>;

    /// Store an already-received payload under `name` in `folder`,
    /// creating the folder as needed and suffixing the name on collision.
    fn create_file(
        &self,
        folder: &str,
        name: &str,
        source: &Path,
    ) -> Result<FileEntry, ProviderError>;

    /// Create a subfolder. Folder names are NOT collision-suffixed; an
    /// existing sibling of the same name is a failure.
    fn create_folder(&self, folder: &str, name: &str) -> Result<FileEntry, ProviderError>;

    /// Rename an entry, possibly moving it to another folder. An existing
    /// destination is a failure; a missing destination folder is created.
    fn rename(
        &self,
        file: &FileEntry,
        new_folder: &str,
        new_name: &str,
    ) -> Result<FileEntry, ProviderError>;

    /// Delete an entry. Folders are deleted recursively; a failure along
    /// the way aborts without restoring what was already removed.
    fn delete(&self, file: &FileEntry) -> Result<(), ProviderError>;

    /// Open an entry for streaming, honoring a conditional timestamp with
    /// a not-modified short-circuit.
    fn download(
        &self,
        file: &FileEntry,
        force: bool,
        if_modified_since: Option<SystemTime>,
    ) -> Result<Download, ProviderError>;
}
