//! Tesseract command-line backend.

use super::error::OcrError;
use super::validation::{validate_language_code, validate_psm};
use super::OcrEngine;
use crate::core::config::OcrConfig;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Runs `tesseract <image> stdout -l <lang>` once per page image.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: PathBuf,
    language: String,
    psm: Option<u8>,
    page_timeout: Duration,
}

impl TesseractCli {
    pub fn new(command: impl Into<PathBuf>, language: impl Into<String>) -> Result<Self, OcrError> {
        let language = language.into();
        validate_language_code(&language)?;
        Ok(Self {
            command: command.into(),
            language,
            psm: None,
            page_timeout: Duration::from_secs(OcrConfig::DEFAULT_PAGE_TIMEOUT_SECS),
        })
    }

    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let mut cli = Self::new(&config.tesseract_cmd, config.language.clone())?;
        if let Some(psm) = config.psm {
            validate_psm(psm)?;
            cli.psm = Some(psm);
        }
        if config.page_timeout_secs == 0 {
            return Err(OcrError::InvalidConfiguration(
                "page_timeout_secs must be greater than zero".to_string(),
            ));
        }
        cli.page_timeout = Duration::from_secs(config.page_timeout_secs);
        Ok(cli)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    fn build_command(&self, image_path: &Path) -> Command {
        let mut command = Command::new(&self.command);
        command
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language);
        if let Some(psm) = self.psm {
            command.arg("--psm").arg(psm.to_string());
        }
        // suppress the trailing form feed tesseract appends after each page
        command.arg("-c").arg("page_separator=");
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image_path: &Path) -> Result<String, OcrError> {
        let child = self.build_command(image_path).spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                OcrError::EngineUnavailable(format!("'{}' not found on PATH", self.command.display()))
            } else {
                OcrError::IOError(format!("Failed to execute tesseract: {}", e))
            }
        })?;

        let output = match timeout(self.page_timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(OcrError::IOError(format!("Failed to wait for tesseract: {}", e))),
            Err(_) => {
                // child was moved into wait_with_output and is killed when that future drops
                return Err(OcrError::Timeout {
                    seconds: self.page_timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingFailed(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_unknown_language() {
        let result = TesseractCli::new("tesseract", "xx_fake");
        assert!(matches!(result, Err(OcrError::InvalidLanguageCode(_))));
    }

    #[test]
    fn test_from_config_rejects_bad_psm() {
        let config = OcrConfig {
            psm: Some(42),
            ..Default::default()
        };
        assert!(matches!(
            TesseractCli::from_config(&config),
            Err(OcrError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_command_arguments() {
        let config = OcrConfig {
            language: "eng+deu".to_string(),
            psm: Some(6),
            ..Default::default()
        };
        let cli = TesseractCli::from_config(&config).unwrap();
        let command = cli.build_command(Path::new("/tmp/page-1.png"));
        let args: Vec<String> = command
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec!["/tmp/page-1.png", "stdout", "-l", "eng+deu", "--psm", "6", "-c", "page_separator="]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_engine_unavailable() {
        let cli = TesseractCli::new("/nonexistent/bin/tesseract-dualtext", "eng").unwrap();
        let result = cli.recognize(Path::new("/tmp/none.png")).await;
        assert!(matches!(result, Err(OcrError::EngineUnavailable(_))));
    }
}
