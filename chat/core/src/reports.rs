//! Report Endpoints
//!
//! HTTP collaborators of the chat session: listing uploaded reports (the
//! session needs the label for its welcome message), uploading a new
//! evaluation artifact, and locating the PDF export.
//!
//! Endpoints:
//! - `GET /reports` - list of `{id, label, created_at}`
//! - `POST /upload` - multipart form with `file` and `label`
//! - `GET /report/{label}` - PDF export (opened directly, never fetched here)

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ClientConfig;
use crate::messages::ChatId;

// =============================================================================
// Error Types
// =============================================================================

/// Upload rejected before anything was sent
#[derive(Debug, Error)]
pub enum UploadError {
    /// No label was given for the report
    #[error("Please provide a label for the report")]
    MissingLabel,

    /// The artifact is not a JSON file
    #[error("Invalid file type for {0}. Please upload a JSON file")]
    InvalidFileType(PathBuf),

    /// The artifact could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// The artifact is not valid JSON
    #[error("Invalid JSON in upload: {0}")]
    InvalidJson(#[source] serde_json::Error),
}

/// Errors from the report endpoints
#[derive(Debug, Error)]
pub enum ReportsError {
    /// Request could not be sent or the body could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("Backend returned {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// The backend reported an error in the response body
    #[error("Backend error: {0}")]
    Backend(String),

    /// The configured base URL cannot carry a path
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// The upload was rejected locally
    #[error(transparent)]
    Upload(#[from] UploadError),
}

// =============================================================================
// Types
// =============================================================================

/// An uploaded report as listed by the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Identifier; doubles as the chat id
    pub id: ChatId,
    /// Human label given at upload
    pub label: String,
    /// Upload timestamp as sent by the backend (ISO 8601)
    #[serde(default)]
    pub created_at: String,
}

/// A validated upload, ready to send
#[derive(Clone, Debug)]
pub struct UploadPayload {
    /// Report label (trimmed)
    pub label: String,
    /// File name sent with the multipart part
    pub file_name: String,
    /// Raw file contents
    pub contents: Vec<u8>,
}

/// Resolve the report a chat id refers to
#[must_use]
pub fn find_report<'a>(reports: &'a [Report], id: &ChatId) -> Option<&'a Report> {
    reports.iter().find(|report| &report.id == id)
}

/// Validate an upload without touching the network
///
/// # Errors
///
/// Returns the first problem found, in this order: missing label, non-JSON
/// file, unreadable file, contents that do not parse as JSON.
pub async fn prepare_upload(label: &str, path: &Path) -> Result<UploadPayload, UploadError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(UploadError::MissingLabel);
    }

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return Err(UploadError::InvalidFileType(path.to_path_buf()));
    }

    let contents = tokio::fs::read(path).await.map_err(|e| UploadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_slice::<serde_json::Value>(&contents).map_err(UploadError::InvalidJson)?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report.json".to_string());

    Ok(UploadPayload {
        label: label.to_string(),
        file_name,
        contents,
    })
}

/// Pull an error message out of a response body, if it carries one
///
/// The backend signals some failures with a 200 and a body of either
/// `{"error": "..."}` or `[{"error": "..."}, status]`.
fn backend_error(body: &serde_json::Value) -> Option<String> {
    let object = match body {
        serde_json::Value::Array(items) => items.first()?,
        other => other,
    };
    object
        .get("error")
        .and_then(|e| e.as_str())
        .map(str::to_string)
}

// =============================================================================
// Client
// =============================================================================

/// HTTP client for the report endpoints
#[derive(Clone, Debug)]
pub struct ReportsClient {
    /// Base URL, without trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl ReportsClient {
    /// Create a client for `base_url`
    ///
    /// # Errors
    ///
    /// Returns `ReportsError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ReportsError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            http_client,
        })
    }

    /// Create from `ClientConfig`
    ///
    /// # Errors
    ///
    /// Returns `ReportsError::Http` if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ReportsError> {
        Self::new(config.server.base_url.clone(), config.server.request_timeout)
    }

    /// Base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ReportsError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ReportsError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ReportsError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of the PDF export for the report labelled `label`
    ///
    /// # Errors
    ///
    /// Returns `ReportsError::InvalidUrl` if the base URL cannot carry a path.
    pub fn export_url(&self, label: &str) -> Result<Url, ReportsError> {
        self.endpoint(&["report", label])
    }

    /// Fetch the list of uploaded reports
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-success status, or a body
    /// that is not a report list.
    pub async fn list_reports(&self) -> Result<Vec<Report>, ReportsError> {
        let url = self.endpoint(&["reports"])?;
        tracing::debug!(url = %url, "Loading reports");

        let response = self.http_client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(ReportsError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let reports: Vec<Report> = response.json().await?;
        tracing::info!(count = reports.len(), "Loaded reports");
        Ok(reports)
    }

    /// Upload an evaluation artifact under `label`
    ///
    /// The file is validated before any request is made.
    ///
    /// # Errors
    ///
    /// Returns `ReportsError::Upload` when validation fails, and an HTTP or
    /// backend error when the upload itself does.
    pub async fn upload_report(&self, label: &str, path: &Path) -> Result<(), ReportsError> {
        let payload = prepare_upload(label, path).await?;
        let url = self.endpoint(&["upload"])?;

        tracing::info!(
            label = %payload.label,
            file = %payload.file_name,
            bytes = payload.contents.len(),
            "Uploading report"
        );

        let part = Part::bytes(payload.contents)
            .file_name(payload.file_name)
            .mime_str("application/json")?;
        let form = Form::new().text("label", payload.label).part("file", part);

        let response = self.http_client.post(url.clone()).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(ReportsError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
            if let Some(message) = backend_error(&value) {
                tracing::warn!(error = %message, "Upload rejected by backend");
                return Err(ReportsError::Backend(message));
            }
        }

        Ok(())
    }
}
