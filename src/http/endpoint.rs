//! Endpoint implementation
//!
//! One URL, action-dispatched via GET or POST. JSON envelopes for state
//! changes, raw streaming for download/show, 304 for satisfied
//! conditional requests.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use log::{error, warn};
use tempfile::NamedTempFile;
use tokio_util::io::ReaderStream;

use crate::config::ManagerConfig;
use crate::dispatcher::{Dispatcher, Envelope, FmRequest, Outcome, UploadPart};
use crate::error::ErrorCode;
use crate::provider::{Download, FilesystemProvider};
use crate::util::{format_http_date, parse_http_date};

/// Upper bound for urlencoded form bodies; uploads go through multipart.
const FORM_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<FilesystemProvider>,
    pub config: Arc<ManagerConfig>,
}

/// Build the single-route router for the configured endpoint path.
pub fn router(state: AppState) -> Router {
    let body_limit = if state.config.max_file_size == 0 {
        DefaultBodyLimit::disable()
    } else {
        // Leave room for multipart framing around the payload itself.
        DefaultBodyLimit::max(state.config.max_file_size as usize + 64 * 1024)
    };

    Router::new()
        .route(&state.config.endpoint.clone(), get(handle).post(handle))
        .layer(body_limit)
        .with_state(state)
}

async fn handle(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    request: Request,
) -> Response {
    let mut params = query;
    let mut uploads: Vec<UploadPart> = Vec::new();
    // Spooled payloads are unlinked when the guards drop; a consumed
    // payload has already been moved away by then.
    let mut guards: Vec<tempfile::TempPath> = Vec::new();

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let multipart = match Multipart::from_request(request, &()).await {
            Ok(multipart) => multipart,
            Err(e) => {
                warn!("Rejected malformed multipart request: {}", e);
                return error_response(ErrorCode::Internal);
            }
        };
        if let Err(e) = collect_multipart(multipart, &mut params, &mut uploads, &mut guards).await
        {
            warn!("Failed to receive upload: {}", e);
            return error_response(ErrorCode::Internal);
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        match axum::body::to_bytes(request.into_body(), FORM_BODY_LIMIT).await {
            Ok(bytes) => {
                for (key, value) in url::form_urlencoded::parse(&bytes) {
                    params.insert(key.into_owned(), value.into_owned());
                }
            }
            Err(e) => {
                warn!("Failed to read form body: {}", e);
                return error_response(ErrorCode::Internal);
            }
        }
    }

    let fm_request = FmRequest {
        action: params.get("action").cloned().unwrap_or_default(),
        folder: params.get("folder").cloned(),
        file: params.get("file").cloned(),
        dest_folder: params.get("destFolder").cloned(),
        dest_name: params.get("destName").cloned(),
        name: params.get("name").cloned(),
        uploads,
        if_modified_since: headers
            .get(header::IF_MODIFIED_SINCE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_http_date),
    };

    // Provider operations are blocking filesystem calls.
    let worker = state.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let dispatcher = Dispatcher::new(&*worker.provider, &*worker.config);
        dispatcher.dispatch(&fm_request)
    })
    .await;

    drop(guards);

    match outcome {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => {
            error!("Dispatcher task failed: {}", e);
            error_response(ErrorCode::Internal)
        }
    }
}

/// Walk the multipart stream: file parts are spooled to temp files, text
/// parts become request parameters.
async fn collect_multipart(
    mut multipart: Multipart,
    params: &mut HashMap<String, String>,
    uploads: &mut Vec<UploadPart>,
    guards: &mut Vec<tempfile::TempPath>,
) -> Result<(), axum::extract::multipart::MultipartError> {
    while let Some(mut field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|m| m.to_string());

        match file_name {
            Some(file_name) => {
                let mut temp = match NamedTempFile::new() {
                    Ok(temp) => temp,
                    Err(e) => {
                        error!("Cannot create upload spool file: {}", e);
                        continue;
                    }
                };

                let mut size: u64 = 0;
                let mut failed = false;
                while let Some(chunk) = field.chunk().await? {
                    size += chunk.len() as u64;
                    if let Err(e) = temp.write_all(&chunk) {
                        error!("Failed to spool upload {}: {}", file_name, e);
                        failed = true;
                        break;
                    }
                }
                if failed {
                    continue;
                }

                let temp_path = temp.into_temp_path();
                uploads.push(UploadPart {
                    name: file_name,
                    temp_path: temp_path.to_path_buf(),
                    size,
                    content_type,
                });
                guards.push(temp_path);
            }
            None => {
                let value = field.text().await?;
                params.insert(field_name, value);
            }
        }
    }
    Ok(())
}

fn outcome_response(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Json(envelope) => envelope_response(envelope),
        Outcome::Stream(Download::NotModified) => StatusCode::NOT_MODIFIED.into_response(),
        Outcome::Stream(Download::Content {
            file,
            length,
            mime,
            disposition,
            modified,
            name,
        }) => {
            let stream = ReaderStream::new(tokio::fs::File::from_std(file));

            let mut builder = Response::builder()
                .header(header::CONTENT_TYPE, mime)
                .header(header::CONTENT_LENGTH, length)
                .header(
                    header::CONTENT_DISPOSITION,
                    format!("{}; filename=\"{}\"", disposition.as_str(), name),
                );
            if let Some(modified) = modified {
                builder = builder.header(header::LAST_MODIFIED, format_http_date(modified));
            }

            match builder.body(Body::from_stream(stream)) {
                Ok(response) => response,
                Err(e) => {
                    error!("Failed to build download response: {}", e);
                    error_response(ErrorCode::Download)
                }
            }
        }
    }
}

fn envelope_response(envelope: Envelope) -> Response {
    let status = if envelope.is_error() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    (status, axum::Json(envelope)).into_response()
}

fn error_response(code: ErrorCode) -> Response {
    envelope_response(Envelope::error(code, None))
}
