//! Configuration management
//!
//! Loads manager settings from `webfm.toml` with `WEBFM`-prefixed
//! environment overrides, then validates them before the server starts.

use config::{Config, ConfigError, Environment, File};
use regex::Regex;
use serde::Deserialize;
use std::path::PathBuf;

/// Complete manager configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ManagerConfig {
    /// Directory tree exposed to clients; everything served lives below it
    pub root: String,

    /// Allow users to upload new files
    pub allow_upload: bool,

    /// Allow users to delete or rename existing files
    pub allow_editing: bool,

    /// Allow users to create and explore folders
    pub allow_folders: bool,

    /// Regular expression matched against an upload's MIME type or file
    /// name; empty accepts everything
    pub accept_file_types: String,

    /// Maximum upload size in bytes; 0 disables the check
    pub max_file_size: u64,

    /// Maximum size, in bytes, an image may have to be previewed inline.
    /// 0 disables previews, negative means unlimited
    pub image_preview_limit: i64,

    /// Serve `show` requests as attachments instead of inline content
    pub force_downloads: bool,

    /// Attach raw error detail to error envelopes. Leaks server paths,
    /// must stay off in production
    pub debug: bool,

    /// URL path of the endpoint, also used when building preview icon URLs
    pub endpoint: String,

    /// Address and port of the HTTP listener
    pub bind_address: String,
    pub port: u16,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            root: "./files".to_string(),
            allow_upload: true,
            allow_editing: true,
            allow_folders: true,
            accept_file_types: String::new(),
            max_file_size: 64 * 1024 * 1024,
            image_preview_limit: 512_000,
            force_downloads: false,
            debug: false,
            endpoint: "/fm".to_string(),
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ManagerConfig {
    /// Load configuration from `webfm.toml` (optional) with environment
    /// overrides, falling back to defaults for anything unset.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ManagerConfig::default();

        let settings = Config::builder()
            .set_default("root", defaults.root)?
            .set_default("allow_upload", defaults.allow_upload)?
            .set_default("allow_editing", defaults.allow_editing)?
            .set_default("allow_folders", defaults.allow_folders)?
            .set_default("accept_file_types", defaults.accept_file_types)?
            .set_default("max_file_size", defaults.max_file_size as i64)?
            .set_default("image_preview_limit", defaults.image_preview_limit)?
            .set_default("force_downloads", defaults.force_downloads)?
            .set_default("debug", defaults.debug)?
            .set_default("endpoint", defaults.endpoint)?
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", defaults.port as i64)?
            .add_source(File::with_name("webfm").required(false))
            .add_source(Environment::with_prefix("WEBFM"))
            .build()?;

        let config: ManagerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.is_empty() {
            return Err(ConfigError::Message("root cannot be empty".into()));
        }

        if !self.accept_file_types.is_empty() {
            Regex::new(&self.accept_file_types).map_err(|e| {
                ConfigError::Message(format!(
                    "accept_file_types is not a valid regular expression: {e}"
                ))
            })?;
        }

        if !self.endpoint.starts_with('/') {
            return Err(ConfigError::Message(
                "endpoint must be an absolute URL path".into(),
            ));
        }

        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        Ok(())
    }

    /// Compiled accepted-file-types pattern, `None` when unrestricted.
    pub fn accept_pattern(&self) -> Option<Regex> {
        if self.accept_file_types.is_empty() {
            None
        } else {
            Regex::new(&self.accept_file_types).ok()
        }
    }

    /// Get the provider root as PathBuf
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }

    /// Get bind address and port as a socket address string
    pub fn bind_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
