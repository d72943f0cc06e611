//! Configuration for the extraction pipeline.
//!
//! Configuration is always passed explicitly to [`crate::Orchestrator`]; nothing
//! is read from global state while a request runs. Files in TOML, YAML or JSON
//! can be loaded directly, and [`ExtractionConfig::discover`] looks for a
//! `dualtext.toml` in the current directory and its parents.
//!
//! # Example
//!
//! ```rust
//! use dualtext::{ExtractionConfig, ProcessingMode};
//!
//! let config: ExtractionConfig = toml::from_str(r#"
//!     mode = "sequential"
//!     timeout_secs = 120
//!
//!     [ocr]
//!     language = "eng+deu"
//! "#).unwrap();
//!
//! assert_eq!(config.mode, ProcessingMode::Sequential);
//! assert_eq!(config.ocr.language, "eng+deu");
//! assert!(config.loader.spool_to_temp_file);
//! ```

use crate::error::{DualtextError, Result};
use crate::ocr::validation::{validate_language_code, validate_psm};
use crate::pdf::PageRenderOptions;
use crate::types::ProcessingMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for by [`ExtractionConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "dualtext.toml";

/// Overrides the Tesseract executable.
pub const ENV_TESSERACT_CMD: &str = "DUALTEXT_TESSERACT_CMD";

/// Overrides the directory containing the Pdfium shared library.
pub const ENV_PDFIUM_PATH: &str = "DUALTEXT_PDFIUM_PATH";

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Scheduling of the two strategies when the caller does not pick one.
    #[serde(default)]
    pub mode: ProcessingMode,

    /// Whole-request deadline. `None` waits for both strategies indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub pdf: PdfConfig,

    #[serde(default)]
    pub ocr: OcrConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            mode: ProcessingMode::Concurrent,
            timeout_secs: None,
            loader: LoaderConfig::default(),
            pdf: PdfConfig::default(),
            ocr: OcrConfig::default(),
        }
    }
}

/// Source loading behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Write byte, base64 and URL inputs to a request-scoped temporary file.
    #[serde(default = "default_true")]
    pub spool_to_temp_file: bool,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Upper bound on downloaded document size.
    #[serde(default = "default_max_fetch_bytes")]
    pub max_fetch_bytes: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            spool_to_temp_file: true,
            fetch_timeout_secs: default_fetch_timeout(),
            max_fetch_bytes: default_max_fetch_bytes(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Directory holding the Pdfium shared library. The system search path is used when unset.
    #[serde(default)]
    pub pdfium_library_path: Option<PathBuf>,
}

/// Rasterize+OCR settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Tesseract language argument, `+`-separated for several languages.
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_tesseract_cmd")]
    pub tesseract_cmd: PathBuf,

    /// Page segmentation mode passed as `--psm`.
    #[serde(default)]
    pub psm: Option<u8>,

    #[serde(default = "default_page_timeout")]
    pub page_timeout_secs: u64,

    #[serde(default)]
    pub render: PageRenderOptions,
}

impl OcrConfig {
    pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 120;
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            tesseract_cmd: default_tesseract_cmd(),
            psm: None,
            page_timeout_secs: default_page_timeout(),
            render: PageRenderOptions::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_max_fetch_bytes() -> u64 {
    100 * 1024 * 1024
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_tesseract_cmd() -> PathBuf {
    PathBuf::from("tesseract")
}

fn default_page_timeout() -> u64 {
    OcrConfig::DEFAULT_PAGE_TIMEOUT_SECS
}

impl ExtractionConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| DualtextError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| DualtextError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_json::from_str(&content)
            .map_err(|e| DualtextError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration, choosing the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
            Some(ext) if ext == "toml" => Self::from_toml_file(path),
            Some(ext) if ext == "yaml" || ext == "yml" => Self::from_yaml_file(path),
            Some(ext) if ext == "json" => Self::from_json_file(path),
            _ => Err(DualtextError::validation(format!(
                "Unsupported config file format: {} (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Search for `dualtext.toml` in the current directory and its parents.
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir().map_err(DualtextError::Io)?;
        Self::discover_from(&current)
    }

    /// Same as [`discover`](Self::discover), starting at `start`.
    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "discovered config file");
                return Ok(Some(Self::from_toml_file(candidate)?));
            }
        }
        Ok(None)
    }

    /// Apply `DUALTEXT_TESSERACT_CMD` and `DUALTEXT_PDFIUM_PATH` when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(cmd) = std::env::var_os(ENV_TESSERACT_CMD).filter(|v| !v.is_empty()) {
            self.ocr.tesseract_cmd = PathBuf::from(cmd);
        }
        if let Some(path) = std::env::var_os(ENV_PDFIUM_PATH).filter(|v| !v.is_empty()) {
            self.pdf.pdfium_library_path = Some(PathBuf::from(path));
        }
        self
    }

    /// Reject settings that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == Some(0) {
            return Err(DualtextError::validation("timeout_secs must be greater than zero"));
        }
        if self.loader.fetch_timeout_secs == 0 {
            return Err(DualtextError::validation("loader.fetch_timeout_secs must be greater than zero"));
        }
        if self.ocr.page_timeout_secs == 0 {
            return Err(DualtextError::validation("ocr.page_timeout_secs must be greater than zero"));
        }
        validate_language_code(&self.ocr.language)
            .map_err(|e| DualtextError::validation_with_source("invalid ocr.language", e))?;
        if let Some(psm) = self.ocr.psm {
            validate_psm(psm).map_err(|e| DualtextError::validation_with_source("invalid ocr.psm", e))?;
        }
        self.ocr
            .render
            .validate()
            .map_err(|e| DualtextError::validation(format!("invalid ocr.render: {}", e)))?;
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DualtextError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
