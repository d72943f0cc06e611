use crate::core::config::LoaderConfig;
use crate::{DualtextError, Result};
use reqwest::Url;
use std::time::Duration;

/// A downloaded document and the MIME type the server announced, if any.
#[derive(Debug)]
pub(crate) struct FetchedDocument {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Parse and vet a document URL. Only `http` and `https` are accepted.
pub(crate) fn parse_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim())
        .map_err(|e| DualtextError::validation_with_source(format!("Invalid document URL '{}'", url), e))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(DualtextError::validation(format!(
            "Unsupported URL scheme '{}', expected http or https",
            other
        ))),
    }
}

pub(crate) async fn fetch_document(url: &Url, config: &LoaderConfig) -> Result<FetchedDocument> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .build()
        .map_err(|e| DualtextError::fetch_with_source(url.as_str(), "failed to build HTTP client", e))?;

    tracing::debug!(url = %url, "fetching document");

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| DualtextError::fetch_with_source(url.as_str(), "request failed", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DualtextError::fetch(url.as_str(), format!("HTTP {}", status)));
    }

    if let Some(length) = response.content_length()
        && length > config.max_fetch_bytes
    {
        return Err(DualtextError::fetch(
            url.as_str(),
            format!(
                "document is {} bytes, over the {} byte limit",
                length, config.max_fetch_bytes
            ),
        ));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_ascii_lowercase());

    let bytes = response
        .bytes()
        .await
        .map_err(|e| DualtextError::fetch_with_source(url.as_str(), "failed to read response body", e))?;

    if bytes.len() as u64 > config.max_fetch_bytes {
        return Err(DualtextError::fetch(
            url.as_str(),
            format!("document exceeds the {} byte limit", config.max_fetch_bytes),
        ));
    }

    tracing::debug!(url = %url, bytes = bytes.len(), "document fetched");

    Ok(FetchedDocument {
        bytes: bytes.to_vec(),
        content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_accepts_https() {
        let url = parse_url("https://example.com/forms/acord25.pdf").unwrap();
        assert_eq!(url.path(), "/forms/acord25.pdf");
    }

    #[test]
    fn test_parse_url_rejects_file_scheme() {
        let err = parse_url("file:///etc/passwd").unwrap_err();
        assert!(matches!(err, DualtextError::Validation { .. }));
    }

    #[test]
    fn test_parse_url_rejects_garbage() {
        assert!(matches!(
            parse_url("not a url"),
            Err(DualtextError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_error() {
        let url = parse_url("http://127.0.0.1:9/doc.pdf").unwrap();
        let config = LoaderConfig {
            fetch_timeout_secs: 2,
            ..Default::default()
        };
        let err = fetch_document(&url, &config).await.unwrap_err();
        assert!(matches!(err, DualtextError::Fetch { .. }));
    }
}
