//! Source loading: turn a caller-supplied input into a [`DocumentHandle`].
//!
//! A document arrives as a filesystem path, raw bytes, a base64 string or a URL.
//! Non-path inputs are written to a request-scoped temporary file by default
//! (see [`LoaderConfig::spool_to_temp_file`]). The temporary file belongs to the
//! returned [`LoadedDocument`] and is removed when that value is dropped, which
//! covers success, failure, timeout and cancellation alike.

mod fetch;

use crate::core::config::LoaderConfig;
use crate::core::mime::{self, DocumentKind, PDF_MIME_TYPE};
use crate::{DualtextError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempPath;

/// A document as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
    Base64(String),
    Url(String),
}

impl From<PathBuf> for DocumentSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for DocumentSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for DocumentSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Boundary request where each input is optional.
///
/// Exactly one field must be set; [`DocumentRequest::into_source`] enforces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequest {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub bytes: Option<Vec<u8>>,
    #[serde(default)]
    pub base64: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl DocumentRequest {
    pub fn into_source(self) -> Result<DocumentSource> {
        let supplied: Vec<&str> = [
            self.path.as_ref().map(|_| "path"),
            self.bytes.as_ref().map(|_| "bytes"),
            self.base64.as_ref().map(|_| "base64"),
            self.url.as_ref().map(|_| "url"),
        ]
        .into_iter()
        .flatten()
        .collect();

        if supplied.len() > 1 {
            return Err(DualtextError::validation(format!(
                "Exactly one document input is allowed, got: {}",
                supplied.join(", ")
            )));
        }

        if let Some(path) = self.path {
            Ok(DocumentSource::Path(path))
        } else if let Some(bytes) = self.bytes {
            Ok(DocumentSource::Bytes(bytes))
        } else if let Some(encoded) = self.base64 {
            Ok(DocumentSource::Base64(encoded))
        } else if let Some(url) = self.url {
            Ok(DocumentSource::Url(url))
        } else {
            Err(DualtextError::validation(
                "No document supplied: provide one of path, bytes, base64 or url",
            ))
        }
    }
}

/// Where the document content lives.
#[derive(Debug, Clone)]
pub enum DocumentData {
    File(PathBuf),
    Memory(Arc<[u8]>),
}

/// Immutable, cheaply clonable reference to a loaded document.
///
/// Both extraction strategies receive a clone of the same handle and only read from it.
#[derive(Debug, Clone)]
pub struct DocumentHandle {
    data: DocumentData,
    mime_type: String,
}

impl DocumentHandle {
    pub fn from_path(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            data: DocumentData::File(path.into()),
            mime_type: mime_type.into(),
        }
    }

    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> Self {
        Self {
            data: DocumentData::Memory(bytes.into()),
            mime_type: mime_type.into(),
        }
    }

    pub fn data(&self) -> &DocumentData {
        &self.data
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.data {
            DocumentData::File(path) => Some(path),
            DocumentData::Memory(_) => None,
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn kind(&self) -> DocumentKind {
        mime::classify(&self.mime_type).unwrap_or(DocumentKind::Pdf)
    }

    /// Human-readable description for logs.
    pub fn describe(&self) -> String {
        match &self.data {
            DocumentData::File(path) => path.display().to_string(),
            DocumentData::Memory(bytes) => format!("<{} bytes in memory>", bytes.len()),
        }
    }
}

/// A handle together with the temporary file backing it, if any.
#[derive(Debug)]
pub struct LoadedDocument {
    handle: DocumentHandle,
    temp: Option<TempPath>,
}

impl LoadedDocument {
    pub fn handle(&self) -> &DocumentHandle {
        &self.handle
    }

    /// Path of the request-scoped temporary file, when the input was spooled.
    pub fn temp_path(&self) -> Option<&Path> {
        self.temp.as_deref()
    }
}

/// Resolve `source` into a local document.
pub async fn load(source: DocumentSource, config: &LoaderConfig) -> Result<LoadedDocument> {
    match source {
        DocumentSource::Path(path) => {
            let mime_type = mime::resolve(mime::detect_from_path(&path))?;
            tracing::debug!(path = %path.display(), mime_type = %mime_type, "loaded document from path");
            Ok(LoadedDocument {
                handle: DocumentHandle::from_path(path, mime_type),
                temp: None,
            })
        }
        DocumentSource::Bytes(bytes) => from_bytes(bytes, None, config).await,
        DocumentSource::Base64(encoded) => {
            let bytes = decode_base64(&encoded)?;
            from_bytes(bytes, None, config).await
        }
        DocumentSource::Url(url) => {
            let parsed = fetch::parse_url(&url)?;
            let fetched = fetch::fetch_document(&parsed, config).await?;
            let hint = fetched
                .content_type
                .filter(|ct| mime::classify(ct).is_ok())
                .or_else(|| mime::detect_from_path(Path::new(parsed.path())));
            from_bytes(fetched.bytes, hint, config).await
        }
    }
}

/// Decode standard-alphabet base64, tolerating a `data:` URI prefix and embedded whitespace.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    let trimmed = encoded.trim();
    let payload = match trimmed.strip_prefix("data:") {
        Some(rest) => match rest.split_once(',') {
            Some((header, data)) if header.ends_with(";base64") => data,
            _ => {
                return Err(DualtextError::validation(
                    "Malformed data URI: expected 'data:<mime>;base64,<payload>'",
                ));
            }
        },
        None => trimmed,
    };

    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| DualtextError::validation_with_source("Invalid base64 document data", e))?;

    if bytes.is_empty() {
        return Err(DualtextError::validation("Decoded base64 document is empty"));
    }
    Ok(bytes)
}

async fn from_bytes(bytes: Vec<u8>, hint: Option<String>, config: &LoaderConfig) -> Result<LoadedDocument> {
    if bytes.is_empty() {
        return Err(DualtextError::validation("Document is empty"));
    }

    let mime_type = mime::resolve(mime::detect_from_bytes(&bytes).or(hint))?;

    if !config.spool_to_temp_file {
        tracing::debug!(bytes = bytes.len(), mime_type = %mime_type, "keeping document in memory");
        return Ok(LoadedDocument {
            handle: DocumentHandle::from_bytes(bytes, mime_type),
            temp: None,
        });
    }

    let suffix = extension_for(&mime_type);
    let temp = tokio::task::spawn_blocking(move || spool(&bytes, &suffix))
        .await
        .map_err(|e| DualtextError::Io(std::io::Error::other(format!("spool task failed: {}", e))))??;

    tracing::debug!(path = %temp.display(), mime_type = %mime_type, "spooled document to temporary file");

    Ok(LoadedDocument {
        handle: DocumentHandle::from_path(temp.to_path_buf(), mime_type),
        temp: Some(temp),
    })
}

fn spool(bytes: &[u8], suffix: &str) -> Result<TempPath> {
    use std::io::Write;

    let mut file = tempfile::Builder::new()
        .prefix("dualtext-")
        .suffix(suffix)
        .tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file.into_temp_path())
}

fn extension_for(mime_type: &str) -> String {
    if mime_type == PDF_MIME_TYPE {
        return ".pdf".to_string();
    }
    mime_guess::get_mime_extensions_str(mime_type)
        .and_then(|exts| exts.first())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}
