//! Action handlers
//!
//! The dispatcher resolves the target entry, gates each action behind its
//! capability flag, invokes the provider, and wraps the result in the
//! wire envelope. Nothing persists across requests.

use log::{info, warn};
use regex::Regex;

use crate::config::ManagerConfig;
use crate::dispatcher::request::{FmRequest, UploadPart};
use crate::dispatcher::response::{Envelope, Outcome};
use crate::dispatcher::{Action, parse_action};
use crate::error::DispatchError;
use crate::provider::{FileEntry, FileProvider};

/// Stateless per-request dispatcher over a provider and its configuration.
pub struct Dispatcher<'a> {
    provider: &'a dyn FileProvider,
    config: &'a ManagerConfig,
    accept: Option<Regex>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(provider: &'a dyn FileProvider, config: &'a ManagerConfig) -> Self {
        Self {
            provider,
            config,
            accept: config.accept_pattern(),
        }
    }

    /// Run one request to completion. Every failure becomes an error
    /// envelope; raw detail is attached only when the debug flag is on.
    pub fn dispatch(&self, request: &FmRequest) -> Outcome {
        match self.process(request) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("Request '{}' failed: {}", request.action, err);
                let detail = if self.config.debug {
                    Some(err.to_string())
                } else {
                    None
                };
                Outcome::Json(Envelope::error(err.code(), detail))
            }
        }
    }

    fn process(&self, request: &FmRequest) -> Result<Outcome, DispatchError> {
        // 1. Parse the folder; ignored entirely when folders are disabled.
        let folder = if self.config.allow_folders {
            request.folder.as_deref().unwrap_or("/")
        } else {
            "/"
        };

        // 2. Resolve the target entry before any side effect.
        let file = match &request.file {
            Some(name) => Some(self.find_entry(folder, name)?),
            None => None,
        };

        // 3. Dispatch on the action, gating behind capability flags.
        match parse_action(&request.action) {
            Action::Upload => self.handle_upload(folder, request),
            Action::Show => self.handle_download(file, self.config.force_downloads, request),
            Action::Download => self.handle_download(file, true, request),
            Action::Rename => self.handle_rename(folder, file, request),
            Action::Delete => self.handle_delete(file),
            Action::Read => self.handle_read(folder),
            Action::CreateFolder => self.handle_create_folder(folder, request),
            Action::Unknown(other) => Err(DispatchError::InvalidAction(other)),
        }
    }

    /// Scan the folder listing for an exact name match.
    fn find_entry(&self, folder: &str, name: &str) -> Result<FileEntry, DispatchError> {
        let entries = self.provider.read(folder, name)?;
        entries
            .into_iter()
            .find(|e| e.name == name)
            .ok_or_else(|| DispatchError::FileNotFound(name.to_string()))
    }

    fn handle_upload(
        &self,
        folder: &str,
        request: &FmRequest,
    ) -> Result<Outcome, DispatchError> {
        if !self.config.allow_upload {
            return Err(DispatchError::Unauthorized);
        }
        if request.uploads.is_empty() {
            return Err(DispatchError::EmptyUpload);
        }

        // The first failing file aborts the rest of the batch.
        let mut envelope = Envelope::success();
        for part in &request.uploads {
            self.check_upload(part)?;

            let created =
                self.provider
                    .create_file(folder, base_name(&part.name), &part.temp_path)?;
            info!("Uploaded {} into {}", created.name, folder);
            envelope.file = Some(created.to_dto());
        }
        Ok(Outcome::Json(envelope))
    }

    /// Size and type limits, enforced before the payload is moved.
    fn check_upload(&self, part: &UploadPart) -> Result<(), DispatchError> {
        if self.config.max_file_size > 0 && part.size > self.config.max_file_size {
            return Err(DispatchError::MaxSize(part.name.clone()));
        }

        if let Some(pattern) = &self.accept {
            let mime_ok = part
                .content_type
                .as_deref()
                .is_some_and(|mime| pattern.is_match(mime));
            if !mime_ok && !pattern.is_match(&part.name) {
                return Err(DispatchError::FileType(part.name.clone()));
            }
        }
        Ok(())
    }

    fn handle_download(
        &self,
        file: Option<FileEntry>,
        force: bool,
        request: &FmRequest,
    ) -> Result<Outcome, DispatchError> {
        let file = file.ok_or(DispatchError::MissingParameter("file"))?;
        let download = self
            .provider
            .download(&file, force, request.if_modified_since)?;
        Ok(Outcome::Stream(download))
    }

    fn handle_rename(
        &self,
        folder: &str,
        file: Option<FileEntry>,
        request: &FmRequest,
    ) -> Result<Outcome, DispatchError> {
        if !self.config.allow_editing {
            return Err(DispatchError::Unauthorized);
        }
        let file = file.ok_or(DispatchError::MissingParameter("file"))?;
        if !file.allow_edit {
            return Err(DispatchError::Unauthorized);
        }
        let dest_name = request
            .dest_name
            .as_deref()
            .ok_or(DispatchError::MissingParameter("destName"))?;
        let dest_folder = request.dest_folder.as_deref().unwrap_or(folder);

        let item = self.provider.rename(&file, dest_folder, dest_name)?;
        let mut envelope = Envelope::success();
        envelope.file = Some(item.to_dto());
        Ok(Outcome::Json(envelope))
    }

    fn handle_delete(&self, file: Option<FileEntry>) -> Result<Outcome, DispatchError> {
        if !self.config.allow_editing {
            return Err(DispatchError::Unauthorized);
        }
        let file = file.ok_or(DispatchError::MissingParameter("file"))?;
        if !file.allow_edit {
            return Err(DispatchError::Unauthorized);
        }

        self.provider.delete(&file)?;
        Ok(Outcome::Json(Envelope::success()))
    }

    fn handle_read(&self, folder: &str) -> Result<Outcome, DispatchError> {
        if !self.config.allow_folders {
            return Err(DispatchError::Unauthorized);
        }

        let entries = self.provider.read(folder, "*")?;
        let mut envelope = Envelope::success();
        envelope.files = Some(entries.iter().map(FileEntry::to_dto).collect());
        Ok(Outcome::Json(envelope))
    }

    fn handle_create_folder(
        &self,
        folder: &str,
        request: &FmRequest,
    ) -> Result<Outcome, DispatchError> {
        if !self.config.allow_folders || !self.config.allow_editing {
            return Err(DispatchError::Unauthorized);
        }
        let name = request
            .name
            .as_deref()
            .ok_or(DispatchError::MissingParameter("name"))?;

        let item = self.provider.create_folder(folder, name)?;
        let mut envelope = Envelope::success();
        envelope.file = Some(item.to_dto());
        Ok(Outcome::Json(envelope))
    }
}

/// Strip any client-side path from an uploaded file name.
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}
