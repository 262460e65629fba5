//! Local filesystem provider
//!
//! The concrete [`FileProvider`] backed by a sandboxed directory tree.
//! Composes path resolution and name sanitization; every operation
//! re-validates containment before touching the disk.

use log::{error, info};
use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use url::form_urlencoded;

use crate::config::ManagerConfig;
use crate::error::ProviderError;
use crate::provider::{Disposition, Download, FileEntry, FileProvider};
use crate::storage::{PathResolver, clean_name, dedupe_path, name_matches, split_name};
use crate::util::format_size;

/// Extensions eligible for inline image previews.
const PREVIEW_EXTENSIONS: [&str; 8] = [
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "svg", "heif",
];

pub struct FilesystemProvider {
    resolver: PathResolver,
    allow_folders: bool,
    image_preview_limit: i64,
    endpoint: String,
}

impl FilesystemProvider {
    pub fn new(config: &ManagerConfig) -> Self {
        Self {
            resolver: PathResolver::new(config.root_path(), config.allow_folders),
            allow_folders: config.allow_folders,
            image_preview_limit: config.image_preview_limit,
            endpoint: config.endpoint.clone(),
        }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Build an entry from disk metadata. Folder entries are suppressed
    /// entirely when folder navigation is disabled.
    fn populate(&self, path: &Path, folder: &str) -> Option<FileEntry> {
        let name = path.file_name()?.to_string_lossy().into_owned();

        if path.is_dir() {
            if !self.allow_folders {
                return None;
            }
            let children = fs::read_dir(path).map(|it| it.count()).unwrap_or(0);
            return Some(FileEntry {
                name,
                folder: folder.to_string(),
                real_path: path.to_path_buf(),
                is_folder: true,
                size: None,
                info: format!("{children} files"),
                icon: None,
                title: None,
                allow_edit: true,
            });
        }

        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let icon = self.preview_icon(&name, folder, size);
        Some(FileEntry {
            name,
            folder: folder.to_string(),
            real_path: path.to_path_buf(),
            is_folder: false,
            size: Some(size),
            info: format_size(size),
            icon,
            title: None,
            allow_edit: true,
        })
    }

    /// Preview URL for small images: points back at this same endpoint
    /// with `action=show`, so the sandbox check runs again on fetch.
    fn preview_icon(&self, name: &str, folder: &str, size: u64) -> Option<String> {
        if self.image_preview_limit == 0 {
            return None;
        }
        if self.image_preview_limit > 0 && size >= self.image_preview_limit as u64 {
            return None;
        }

        let extension = name.rsplit_once('.')?.1.to_ascii_lowercase();
        if !PREVIEW_EXTENSIONS.contains(&extension.as_str()) {
            return None;
        }

        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("action", "show")
            .append_pair("file", name)
            .append_pair("folder", folder)
            .finish();
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        Some(format!("{}{}{}", self.endpoint, separator, query))
    }
}

impl FileProvider for FilesystemProvider {
    fn read(&self, folder: &str, filter: &str) -> Result<Vec<FileEntry>, ProviderError> {
        let path = self.resolver.resolve(folder);
        if !path.is_dir() {
            return Ok(Vec::new());
        }
        self.resolver.ensure_within_root(&path)?;

        let reader = fs::read_dir(&path).map_err(|e| {
            error!("Failed to list {} (real: {}): {}", folder, path.display(), e);
            ProviderError::Unreadable(folder.to_string())
        })?;

        let mut folders = Vec::new();
        let mut files = Vec::new();
        for dir_entry in reader.flatten() {
            let entry_name = dir_entry.file_name().to_string_lossy().into_owned();
            if !name_matches(filter, &entry_name) {
                continue;
            }
            if let Some(item) = self.populate(&dir_entry.path(), folder) {
                if item.is_folder {
                    folders.push(item);
                } else {
                    files.push(item);
                }
            }
        }

        folders.append(&mut files);
        Ok(folders)
    }

    fn create_file(
        &self,
        folder: &str,
        name: &str,
        source: &Path,
    ) -> Result<FileEntry, ProviderError> {
        let folder_path = self.resolver.resolve(folder);
        self.resolver.ensure_within_root(&folder_path)?;

        if !folder_path.is_dir() {
            fs::create_dir_all(&folder_path).map_err(|e| {
                error!("Cannot create folder {}: {}", folder_path.display(), e);
                ProviderError::CreateFailed(folder.to_string())
            })?;
        }

        let (stem, extension) = split_name(name);
        let target = dedupe_path(&folder_path, &clean_name(&stem), &clean_name(&extension))?;

        move_into_place(source, &target).map_err(|e| {
            error!(
                "Failed to move upload {} to {}: {}",
                source.display(),
                target.display(),
                e
            );
            ProviderError::CreateFailed(name.to_string())
        })?;

        info!("Stored {} (real: {})", name, target.display());
        self.populate(&target, folder)
            .ok_or_else(|| ProviderError::CreateFailed(name.to_string()))
    }

    fn create_folder(&self, folder: &str, name: &str) -> Result<FileEntry, ProviderError> {
        let parent = self.resolver.resolve(folder);
        self.resolver.ensure_within_root(&parent)?;

        let cleaned = clean_name(name);
        if cleaned.is_empty() {
            return Err(ProviderError::CreateFolderFailed(name.to_string()));
        }

        let path = parent.join(&cleaned);
        // Folder names are not collision-suffixed: an existing sibling wins.
        if path.is_dir() {
            return Err(ProviderError::CreateFolderFailed(cleaned));
        }

        fs::create_dir_all(&path).map_err(|e| {
            error!("Failed to create folder {}: {}", path.display(), e);
            ProviderError::CreateFolderFailed(cleaned.clone())
        })?;

        info!("Created folder {} (real: {})", cleaned, path.display());
        self.populate(&path, folder)
            .ok_or(ProviderError::CreateFolderFailed(cleaned))
    }

    fn rename(
        &self,
        file: &FileEntry,
        new_folder: &str,
        new_name: &str,
    ) -> Result<FileEntry, ProviderError> {
        self.resolver.ensure_within_root(&file.real_path)?;

        let dest_folder = self.resolver.resolve(new_folder);
        self.resolver.ensure_within_root(&dest_folder)?;
        let dest_file = dest_folder.join(clean_name(new_name));

        // Moving means the real parent directory changes; virtual strings
        // can differ while naming the same directory.
        let moving = match file.real_path.parent() {
            Some(parent) => !same_directory(parent, &dest_folder),
            None => true,
        };

        if moving && !dest_folder.is_dir() {
            fs::create_dir_all(&dest_folder).map_err(|e| {
                error!(
                    "Cannot create destination folder {}: {}",
                    dest_folder.display(),
                    e
                );
                ProviderError::RenameFailed(new_name.to_string())
            })?;
        }

        if !file.real_path.exists() {
            return Err(ProviderError::RenameFailed(file.name.clone()));
        }
        if dest_file.exists() {
            return Err(ProviderError::RenameFailed(new_name.to_string()));
        }

        fs::rename(&file.real_path, &dest_file).map_err(|e| {
            error!(
                "Failed to rename {} to {}: {}",
                file.real_path.display(),
                dest_file.display(),
                e
            );
            ProviderError::RenameFailed(file.name.clone())
        })?;

        info!(
            "Renamed {} to {} (real: {})",
            file.name,
            new_name,
            dest_file.display()
        );

        // After a move the client is shown the destination folder entry in
        // the source's folder context; a plain rename returns the file.
        let populated = if moving {
            self.populate(&dest_folder, &file.folder)
        } else {
            self.populate(&dest_file, &file.folder)
        };
        populated.ok_or_else(|| ProviderError::RenameFailed(new_name.to_string()))
    }

    fn delete(&self, file: &FileEntry) -> Result<(), ProviderError> {
        self.resolver.ensure_within_root(&file.real_path)?;

        if file.is_folder {
            if !file.real_path.is_dir() {
                return Err(ProviderError::DeleteFailed(file.name.clone()));
            }
            remove_tree(&file.real_path).map_err(|e| {
                error!(
                    "Failed to delete folder {} (real: {}): {}",
                    file.name,
                    file.real_path.display(),
                    e
                );
                ProviderError::DeleteFailed(file.name.clone())
            })?;
        } else {
            if !file.real_path.exists() {
                return Err(ProviderError::DeleteFailed(file.name.clone()));
            }
            fs::remove_file(&file.real_path).map_err(|e| {
                error!(
                    "Failed to delete {} (real: {}): {}",
                    file.name,
                    file.real_path.display(),
                    e
                );
                ProviderError::DeleteFailed(file.name.clone())
            })?;
        }

        info!("Deleted {} (real: {})", file.name, file.real_path.display());
        Ok(())
    }

    fn download(
        &self,
        file: &FileEntry,
        force: bool,
        if_modified_since: Option<SystemTime>,
    ) -> Result<Download, ProviderError> {
        self.resolver.ensure_within_root(&file.real_path)?;

        if !file.real_path.is_file() {
            return Err(ProviderError::NotFound(file.name.clone()));
        }

        let handle = fs::File::open(&file.real_path)
            .map_err(|_| ProviderError::DownloadFailed(file.name.clone()))?;
        let metadata = handle
            .metadata()
            .map_err(|_| ProviderError::DownloadFailed(file.name.clone()))?;
        let modified = metadata.modified().ok();

        // HTTP dates carry second precision, so the comparison does too.
        if let (Some(mod_time), Some(since)) = (modified, if_modified_since) {
            if unix_seconds(since) >= unix_seconds(mod_time) {
                return Ok(Download::NotModified);
            }
        }

        let (mime, disposition) = if force {
            ("application/octet-stream".to_string(), Disposition::Attachment)
        } else {
            (
                mime_guess::from_path(&file.real_path)
                    .first_or_octet_stream()
                    .to_string(),
                Disposition::Inline,
            )
        };

        Ok(Download::Content {
            file: handle,
            length: metadata.len(),
            mime,
            disposition,
            modified,
            name: file.name.clone(),
        })
    }
}

fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Compare directories by canonical identity, tolerating differing string
/// representations of the same place.
fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => a == b,
    }
}

/// Move a received payload to its final path; falls back to copy+delete
/// when the rename crosses filesystems.
fn move_into_place(source: &Path, target: &Path) -> io::Result<()> {
    match fs::rename(source, target) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(source, target)?;
            fs::remove_file(source)?;
            Ok(())
        }
    }
}

/// Recursive best-effort delete: every descendant is attempted even after
/// a failure, then the directory itself. The first error wins; nothing
/// already removed comes back.
fn remove_tree(dir: &Path) -> io::Result<()> {
    let mut first_error: Option<io::Error> = None;

    for dir_entry in fs::read_dir(dir)?.flatten() {
        let path = dir_entry.path();
        let result = if path.is_dir() {
            remove_tree(&path)
        } else {
            fs::remove_file(&path)
        };
        if let Err(e) = result {
            first_error.get_or_insert(e);
        }
    }

    match fs::remove_dir(dir) {
        Ok(()) => match first_error {
            None => Ok(()),
            Some(e) => Err(e),
        },
        Err(e) => Err(first_error.unwrap_or(e)),
    }
}
