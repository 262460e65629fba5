//! Error types
//!
//! Defines domain-specific error types for each layer of the file manager,
//! plus the coded error vocabulary shared with the client.

use std::fmt;
use std::io;

/// Storage/provider layer errors
#[derive(Debug)]
pub enum ProviderError {
    /// The target entry's backing path no longer exists
    NotFound(String),
    /// The directory exists but cannot be listed
    Unreadable(String),
    /// A resolved path escaped the provider root
    OutsideRoot(String),
    CreateFailed(String),
    CreateFolderFailed(String),
    RenameFailed(String),
    DeleteFailed(String),
    DownloadFailed(String),
    /// Collision-suffix probing hit its upper bound
    NameExhausted(String),
    IoError(io::Error),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::NotFound(n) => write!(f, "Entry not found: {}", n),
            ProviderError::Unreadable(p) => write!(f, "Directory not readable: {}", p),
            ProviderError::OutsideRoot(p) => {
                write!(f, "Path escapes the provider root: {}", p)
            }
            ProviderError::CreateFailed(n) => write!(f, "Failed to create file: {}", n),
            ProviderError::CreateFolderFailed(n) => {
                write!(f, "Failed to create folder: {}", n)
            }
            ProviderError::RenameFailed(n) => write!(f, "Failed to rename: {}", n),
            ProviderError::DeleteFailed(n) => write!(f, "Failed to delete: {}", n),
            ProviderError::DownloadFailed(n) => write!(f, "Failed to download: {}", n),
            ProviderError::NameExhausted(n) => {
                write!(f, "No free name found for: {}", n)
            }
            ProviderError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<io::Error> for ProviderError {
    fn from(error: io::Error) -> Self {
        ProviderError::IoError(error)
    }
}

/// Coded errors sent to the client as the envelope `message` field.
///
/// The wire form is the code prefixed with `error_`, except for the
/// catch-all `Internal` which is the bare string `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Unauthorized,
    FileNotFound,
    InvalidAction,
    EmptyUpload,
    Create,
    CreateFolder,
    Rename,
    Delete,
    Download,
    NameExhausted,
    Unreadable,
    FileType,
    MaxSize,
    Internal,
}

impl ErrorCode {
    /// The string the client receives in the `message` field.
    pub fn wire_code(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "error_unauthorized",
            ErrorCode::FileNotFound => "error_file_not_found",
            ErrorCode::InvalidAction => "error_invalid_action",
            ErrorCode::EmptyUpload => "error_empty_upload",
            ErrorCode::Create => "error_create",
            ErrorCode::CreateFolder => "error_create_folder",
            ErrorCode::Rename => "error_rename",
            ErrorCode::Delete => "error_delete",
            ErrorCode::Download => "error_download",
            ErrorCode::NameExhausted => "error_name_exhausted",
            ErrorCode::Unreadable => "error_unreadable",
            ErrorCode::FileType => "error_filetype",
            ErrorCode::MaxSize => "error_maxsize",
            ErrorCode::Internal => "error",
        }
    }
}

/// Dispatcher layer errors
#[derive(Debug)]
pub enum DispatchError {
    /// The required capability flag is off for this action
    Unauthorized,
    /// The named entry is absent from its folder
    FileNotFound(String),
    /// Unrecognized action name
    InvalidAction(String),
    /// Upload request carried no file parts
    EmptyUpload,
    /// A required request parameter was missing
    MissingParameter(&'static str),
    /// Upload rejected by the accepted-file-types pattern
    FileType(String),
    /// Upload larger than the configured maximum
    MaxSize(String),
    Provider(ProviderError),
}

impl DispatchError {
    /// Map to the coded vocabulary the client understands.
    pub fn code(&self) -> ErrorCode {
        match self {
            DispatchError::Unauthorized => ErrorCode::Unauthorized,
            DispatchError::FileNotFound(_) => ErrorCode::FileNotFound,
            DispatchError::InvalidAction(_) => ErrorCode::InvalidAction,
            DispatchError::EmptyUpload => ErrorCode::EmptyUpload,
            DispatchError::MissingParameter(_) => ErrorCode::Internal,
            DispatchError::FileType(_) => ErrorCode::FileType,
            DispatchError::MaxSize(_) => ErrorCode::MaxSize,
            DispatchError::Provider(e) => match e {
                ProviderError::NotFound(_) => ErrorCode::Download,
                ProviderError::Unreadable(_) => ErrorCode::Unreadable,
                ProviderError::OutsideRoot(_) => ErrorCode::Unauthorized,
                ProviderError::CreateFailed(_) => ErrorCode::Create,
                ProviderError::CreateFolderFailed(_) => ErrorCode::CreateFolder,
                ProviderError::RenameFailed(_) => ErrorCode::Rename,
                ProviderError::DeleteFailed(_) => ErrorCode::Delete,
                ProviderError::DownloadFailed(_) => ErrorCode::Download,
                ProviderError::NameExhausted(_) => ErrorCode::NameExhausted,
                ProviderError::IoError(_) => ErrorCode::Internal,
            },
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Unauthorized => write!(f, "Action not authorized"),
            DispatchError::FileNotFound(n) => write!(f, "File not found: {}", n),
            DispatchError::InvalidAction(a) => write!(f, "Invalid action: {}", a),
            DispatchError::EmptyUpload => write!(f, "Upload request without files"),
            DispatchError::MissingParameter(p) => {
                write!(f, "Missing request parameter: {}", p)
            }
            DispatchError::FileType(n) => write!(f, "File type not accepted: {}", n),
            DispatchError::MaxSize(n) => write!(f, "File too large: {}", n),
            DispatchError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<ProviderError> for DispatchError {
    fn from(error: ProviderError) -> Self {
        DispatchError::Provider(error)
    }
}
