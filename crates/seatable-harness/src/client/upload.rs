// crates/seatable-harness/src/client/upload.rs
// ============================================================================
// Module: File Upload
// Description: Multipart upload to a pre-issued upload link.
// Purpose: Attach files and images to rows outside the described operations.
// Dependencies: reqwest
// ============================================================================

//! ## Overview
//! Uploads go to the link returned by the upload-link operation, with
//! `ret-json=1` appended so the server answers with JSON. The link itself
//! authorises the upload; no bearer credential is sent. Uploads are audited
//! like every other call but are not schema validated. The link's final path
//! segment is the upload token, so audit records carry it masked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::time::Instant;

use reqwest::Method;
use reqwest::blocking::multipart::Form;
use reqwest::blocking::multipart::Part;
use reqwest::header::ACCEPT;
use url::Url;

use super::ApiClient;
use super::CallError;
use super::response::ApiResponse;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Audit placeholder for a token-bearing path segment.
const MASKED_SEGMENT: &str = "********";

/// Audit placeholder for a link that does not parse.
const INVALID_LINK: &str = "<invalid upload link>";

/// File content to upload.
#[derive(Clone)]
pub struct UploadFile {
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type of the content.
    pub mime_type: String,
    /// Raw file bytes.
    pub contents: Vec<u8>,
}

impl UploadFile {
    /// Reads a file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::Encode`] when the file cannot be read.
    pub fn from_path(path: &Path, mime_type: &str) -> Result<Self, CallError> {
        let contents = fs::read(path).map_err(|err| CallError::Encode {
            operation: "upload".to_string(),
            message: format!("{}: {err}", path.display()),
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |name| name.to_string_lossy().into_owned());
        Ok(Self {
            file_name,
            mime_type: mime_type.to_string(),
            contents,
        })
    }
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.contents.len())
            .finish()
    }
}

/// Multipart upload request.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Upload link issued by the server.
    pub upload_link: String,
    /// Target parent directory.
    pub parent_dir: String,
    /// Directory relative to `parent_dir`.
    pub relative_path: String,
    /// File to upload.
    pub file: UploadFile,
}

// ============================================================================
// SECTION: Upload
// ============================================================================

impl ApiClient {
    /// Uploads one file through an upload link.
    ///
    /// # Errors
    ///
    /// Returns [`CallError`] when the link is invalid, the exchange fails, or
    /// the server answers with a non-2xx status.
    pub fn upload_file(&self, request: &UploadRequest) -> Result<ApiResponse, CallError> {
        let started = Instant::now();
        let mut url = Url::parse(&request.upload_link).map_err(|err| CallError::Encode {
            operation: "upload".to_string(),
            message: format!("invalid upload link: {err}"),
        });
        if let Ok(link) = &mut url {
            link.query_pairs_mut().append_pair("ret-json", "1");
        }
        let result = url.clone().and_then(|url| self.send_upload(url, request));
        let audited_url = url.map_or_else(|_| INVALID_LINK.to_string(), |url| redact_link(&url));
        self.record(None, &Method::POST, &audited_url, &result, started.elapsed());
        result
    }

    /// Sends the multipart request and checks for a 2xx status.
    fn send_upload(&self, url: Url, request: &UploadRequest) -> Result<ApiResponse, CallError> {
        let part = Part::bytes(request.file.contents.clone())
            .file_name(request.file.file_name.clone())
            .mime_str(&request.file.mime_type)
            .map_err(|err| CallError::Encode {
                operation: "upload".to_string(),
                message: format!("invalid mime type: {err}"),
            })?;
        let form = Form::new()
            .text("parent_dir", request.parent_dir.clone())
            .text("relative_path", request.relative_path.clone())
            .text("replace", "1")
            .part("file", part);
        let builder = self
            .http
            .request(Method::POST, url.clone())
            .header(ACCEPT, "application/json")
            .multipart(form);
        let response = self.exchange(None, "upload".to_string(), Method::POST, url, builder)?;
        if !(200 .. 300).contains(&response.status()) {
            return Err(CallError::UnexpectedStatus {
                operation: "upload".to_string(),
                expected: "2xx".to_string(),
                actual: response.status(),
            });
        }
        Ok(response)
    }
}

/// Returns `url` with its token segment masked.
fn redact_link(url: &Url) -> String {
    let mut redacted = url.clone();
    if let Ok(mut segments) = redacted.path_segments_mut() {
        segments.pop_if_empty().pop().push(MASKED_SEGMENT);
    }
    redacted.to_string()
}
