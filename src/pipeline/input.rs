//! Input resolution: turn a user-supplied path or URL into an in-memory
//! [`UploadedDocument`].
//!
//! The library never touches the filesystem once the document is loaded;
//! pdfium reads straight from the byte buffer. Validation of the PDF itself
//! (magic bytes, page count) belongs to [`crate::pipeline::render`] so that
//! byte uploads and path uploads go through exactly the same checks.

use crate::error::JobFitError;
use std::path::PathBuf;
use tracing::{debug, info};

/// How far into the buffer the `%PDF` header may start.
pub const PDF_HEADER_SEARCH_LEN: usize = 1024;

/// Raw resume bytes as supplied by the caller.
#[derive(Clone, Default)]
pub struct UploadedDocument {
    /// File name or URL the bytes came from, for display only.
    pub name: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `true` when the `%PDF` signature appears in the first
    /// [`PDF_HEADER_SEARCH_LEN`] bytes, as PDF readers accept leading junk.
    pub fn has_pdf_magic(&self) -> bool {
        let head = &self.bytes[..self.bytes.len().min(PDF_HEADER_SEARCH_LEN)];
        head.windows(4).any(|w| w == b"%PDF")
    }
}

impl std::fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load the resume named by `input` into memory.
///
/// URLs are downloaded; anything else is treated as a local path.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<UploadedDocument, JobFitError> {
    if input.trim().is_empty() {
        return Err(JobFitError::missing("resume PDF"));
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(input).await
    }
}

async fn read_local(path_str: &str) -> Result<UploadedDocument, JobFitError> {
    let path = PathBuf::from(path_str);

    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(JobFitError::PermissionDenied { path });
        }
        Err(_) => return Err(JobFitError::FileNotFound { path }),
    };

    debug!("Read local resume: {} ({} bytes)", path.display(), bytes.len());
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path_str.to_string());
    Ok(UploadedDocument::new(bytes).with_name(name))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<UploadedDocument, JobFitError> {
    info!("Downloading resume from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| JobFitError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            JobFitError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            JobFitError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(JobFitError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| JobFitError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(UploadedDocument::new(bytes.to_vec()).with_name(filename_from_url(url)))
}

/// Last non-empty path segment of `url`, or the URL itself.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() {
                    return last.to_string();
                }
            }
        }
    }
    url.to_string()
}
