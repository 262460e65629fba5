//! End-to-end dispatcher tests over a real temporary directory tree.

use std::fs;
use std::path::PathBuf;

use tempfile::{TempDir, tempdir};

use webfm::{
    Dispatcher, Download, FilesystemProvider, FmRequest, ManagerConfig, Outcome, UploadPart,
};

struct Harness {
    root: TempDir,
    staging: TempDir,
    config: ManagerConfig,
    provider: FilesystemProvider,
}

impl Harness {
    fn new(config: ManagerConfig) -> Self {
        let root = tempdir().unwrap();
        let staging = tempdir().unwrap();
        let config = ManagerConfig {
            root: root.path().to_string_lossy().into_owned(),
            ..config
        };
        let provider = FilesystemProvider::new(&config);
        Self {
            root,
            staging,
            config,
            provider,
        }
    }

    fn dispatch(&self, request: &FmRequest) -> Outcome {
        Dispatcher::new(&self.provider, &self.config).dispatch(request)
    }

    fn dispatch_json(&self, request: &FmRequest) -> serde_json::Value {
        match self.dispatch(request) {
            Outcome::Json(envelope) => serde_json::to_value(envelope).unwrap(),
            Outcome::Stream(_) => panic!("expected a JSON outcome"),
        }
    }

    fn upload_part(&self, file_name: &str, contents: &[u8]) -> UploadPart {
        let temp_path: PathBuf = self.staging.path().join(format!("spool-{file_name}"));
        fs::write(&temp_path, contents).unwrap();
        UploadPart {
            name: file_name.to_string(),
            temp_path,
            size: contents.len() as u64,
            content_type: None,
        }
    }
}

#[test]
fn upload_then_read_round_trip() {
    let harness = Harness::new(ManagerConfig::default());

    let mut upload = FmRequest::action("upload");
    upload.folder = Some("/docs".to_string());
    upload.uploads.push(harness.upload_part("a.png", b"img"));
    let response = harness.dispatch_json(&upload);
    assert_eq!(response["status"], "success");
    assert_eq!(response["file"]["name"], "a.png");
    assert_eq!(response["file"]["is_folder"], false);

    let mut read = FmRequest::action("read");
    read.folder = Some("/docs".to_string());
    let response = harness.dispatch_json(&read);
    let files = response["files"].as_array().unwrap();
    assert!(
        files
            .iter()
            .any(|f| f["name"] == "a.png" && f["is_folder"] == false)
    );
}

#[test]
fn colliding_uploads_get_suffixed_names() {
    let harness = Harness::new(ManagerConfig::default());

    for expected in ["report.txt", "report (1).txt", "report (2).txt"] {
        let mut upload = FmRequest::action("upload");
        upload.uploads.push(harness.upload_part("report.txt", b"x"));
        let response = harness.dispatch_json(&upload);
        assert_eq!(response["file"]["name"], expected);
    }
}

#[test]
fn traversal_folder_reads_like_root() {
    let harness = Harness::new(ManagerConfig::default());
    fs::write(harness.root.path().join("inside.txt"), b"x").unwrap();

    let mut read = FmRequest::action("read");
    read.folder = Some("../../etc".to_string());
    let response = harness.dispatch_json(&read);
    assert_eq!(response["status"], "success");
    // Traversal stripped: the probe stays inside the sandbox and cannot
    // see the real /etc.
    let files = response["files"].as_array().unwrap();
    assert!(!files.iter().any(|f| f["name"] == "passwd"));
}

#[test]
fn full_file_lifecycle() {
    let harness = Harness::new(ManagerConfig::default());

    // upload
    let mut upload = FmRequest::action("upload");
    upload.uploads.push(harness.upload_part("draft.txt", b"v1"));
    assert_eq!(harness.dispatch_json(&upload)["status"], "success");

    // rename in place
    let mut rename = FmRequest::action("rename");
    rename.file = Some("draft.txt".to_string());
    rename.dest_name = Some("final.txt".to_string());
    let response = harness.dispatch_json(&rename);
    assert_eq!(response["file"]["name"], "final.txt");

    // move into a folder that does not exist yet
    let mut relocate = FmRequest::action("rename");
    relocate.file = Some("final.txt".to_string());
    relocate.dest_folder = Some("/archive".to_string());
    relocate.dest_name = Some("final.txt".to_string());
    let response = harness.dispatch_json(&relocate);
    assert_eq!(response["status"], "success");
    assert!(harness.root.path().join("archive/final.txt").is_file());
    // A cross-folder move reports the destination folder entry.
    assert_eq!(response["file"]["name"], "archive");
    assert_eq!(response["file"]["is_folder"], true);

    // download from the new location
    let mut download = FmRequest::action("download");
    download.folder = Some("/archive".to_string());
    download.file = Some("final.txt".to_string());
    match harness.dispatch(&download) {
        Outcome::Stream(Download::Content { length, .. }) => assert_eq!(length, 2),
        _ => panic!("expected streamed content"),
    }

    // delete
    let mut delete = FmRequest::action("delete");
    delete.folder = Some("/archive".to_string());
    delete.file = Some("final.txt".to_string());
    assert_eq!(harness.dispatch_json(&delete)["status"], "success");
    assert!(!harness.root.path().join("archive/final.txt").exists());
}

#[test]
fn folder_lifecycle_and_collision() {
    let harness = Harness::new(ManagerConfig::default());

    let mut create = FmRequest::action("create_folder");
    create.name = Some("projects".to_string());
    let response = harness.dispatch_json(&create);
    assert_eq!(response["file"]["name"], "projects");
    assert_eq!(response["file"]["is_folder"], true);

    // Folders are not auto-suffixed; the second attempt fails.
    let response = harness.dispatch_json(&create);
    assert_eq!(response["status"], "error");
    assert_eq!(response["message"], "error_create_folder");

    let mut delete = FmRequest::action("delete");
    delete.file = Some("projects".to_string());
    assert_eq!(harness.dispatch_json(&delete)["status"], "success");
    assert!(!harness.root.path().join("projects").exists());
}

#[test]
fn read_only_configuration_rejects_mutation() {
    let harness = Harness::new(ManagerConfig {
        allow_upload: false,
        allow_editing: false,
        ..ManagerConfig::default()
    });
    fs::write(harness.root.path().join("a.txt"), b"x").unwrap();

    let mut upload = FmRequest::action("upload");
    upload.uploads.push(harness.upload_part("b.txt", b"y"));
    assert_eq!(harness.dispatch_json(&upload)["message"], "error_unauthorized");

    let mut delete = FmRequest::action("delete");
    delete.file = Some("a.txt".to_string());
    assert_eq!(harness.dispatch_json(&delete)["message"], "error_unauthorized");

    // Reading still works.
    let response = harness.dispatch_json(&FmRequest::action("read"));
    assert_eq!(response["status"], "success");
    assert_eq!(response["files"].as_array().unwrap().len(), 1);
}

#[test]
fn folders_disabled_pins_requests_to_root() {
    let harness = Harness::new(ManagerConfig {
        allow_folders: false,
        ..ManagerConfig::default()
    });
    fs::create_dir(harness.root.path().join("hidden")).unwrap();
    fs::write(harness.root.path().join("hidden/secret.txt"), b"s").unwrap();
    fs::write(harness.root.path().join("visible.txt"), b"v").unwrap();

    // Listing is unauthorized outright when folder browsing is off.
    let mut read = FmRequest::action("read");
    read.folder = Some("/hidden".to_string());
    assert_eq!(harness.dispatch_json(&read)["message"], "error_unauthorized");

    // Other actions ignore the folder parameter and act on the root.
    let mut download = FmRequest::action("download");
    download.folder = Some("/hidden".to_string());
    download.file = Some("visible.txt".to_string());
    match harness.dispatch(&download) {
        Outcome::Stream(Download::Content { length, .. }) => assert_eq!(length, 1),
        _ => panic!("expected streamed content"),
    }
}

#[test]
fn missing_target_file_fails_before_side_effects() {
    let harness = Harness::new(ManagerConfig::default());

    let mut rename = FmRequest::action("rename");
    rename.file = Some("ghost.txt".to_string());
    rename.dest_name = Some("new.txt".to_string());
    let response = harness.dispatch_json(&rename);
    assert_eq!(response["message"], "error_file_not_found");
    assert!(!harness.root.path().join("new.txt").exists());
}

#[test]
fn conditional_download_returns_not_modified() {
    let harness = Harness::new(ManagerConfig::default());
    fs::write(harness.root.path().join("a.txt"), b"hello").unwrap();
    let mtime = fs::metadata(harness.root.path().join("a.txt"))
        .unwrap()
        .modified()
        .unwrap();

    let mut download = FmRequest::action("download");
    download.file = Some("a.txt".to_string());
    download.if_modified_since = Some(mtime);
    match harness.dispatch(&download) {
        Outcome::Stream(Download::NotModified) => {}
        _ => panic!("expected not-modified"),
    }
}

#[test]
fn show_and_download_differ_in_disposition() {
    let harness = Harness::new(ManagerConfig::default());
    fs::write(harness.root.path().join("photo.png"), b"img").unwrap();

    let mut show = FmRequest::action("show");
    show.file = Some("photo.png".to_string());
    let inline = match harness.dispatch(&show) {
        Outcome::Stream(Download::Content { disposition, .. }) => disposition,
        _ => panic!("expected streamed content"),
    };

    let mut download = FmRequest::action("download");
    download.file = Some("photo.png".to_string());
    let attached = match harness.dispatch(&download) {
        Outcome::Stream(Download::Content { disposition, .. }) => disposition,
        _ => panic!("expected streamed content"),
    };

    assert_ne!(inline, attached);
    assert_eq!(inline.as_str(), "inline");
    assert_eq!(attached.as_str(), "attachment");
}

#[test]
fn forced_downloads_make_show_an_attachment() {
    let harness = Harness::new(ManagerConfig {
        force_downloads: true,
        ..ManagerConfig::default()
    });
    fs::write(harness.root.path().join("photo.png"), b"img").unwrap();

    let mut show = FmRequest::action("show");
    show.file = Some("photo.png".to_string());
    match harness.dispatch(&show) {
        Outcome::Stream(Download::Content { disposition, .. }) => {
            assert_eq!(disposition.as_str(), "attachment")
        }
        _ => panic!("expected streamed content"),
    }
}
