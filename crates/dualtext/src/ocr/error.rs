use crate::error::DualtextError;
use std::fmt;

/// Failures of the recognition engine.
#[derive(Debug, Clone)]
pub enum OcrError {
    EngineUnavailable(String),
    InvalidConfiguration(String),
    InvalidLanguageCode(String),
    ImageProcessingFailed(String),
    ProcessingFailed(String),
    Timeout { seconds: u64 },
    IOError(String),
}

impl fmt::Display for OcrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EngineUnavailable(msg) => write!(f, "Tesseract is not available: {}", msg),
            Self::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::InvalidLanguageCode(msg) => write!(f, "Invalid language code: {}", msg),
            Self::ImageProcessingFailed(msg) => write!(f, "Image processing failed: {}", msg),
            Self::ProcessingFailed(msg) => write!(f, "OCR processing failed: {}", msg),
            Self::Timeout { seconds } => write!(f, "Tesseract did not finish within {}s", seconds),
            Self::IOError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for OcrError {}

impl From<OcrError> for DualtextError {
    fn from(err: OcrError) -> Self {
        DualtextError::ocr_with_source("Error in OCR process", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_timeout_display() {
        let err = OcrError::Timeout { seconds: 5 };
        assert_eq!(err.to_string(), "Tesseract did not finish within 5s");
    }

    #[test]
    fn test_into_dualtext_error_keeps_cause() {
        let err: DualtextError = OcrError::ProcessingFailed("exit status 1".to_string()).into();
        assert!(matches!(err, DualtextError::Ocr { .. }));
        assert_eq!(err.to_string(), "OCR error: Error in OCR process");
        assert!(err.source().unwrap().to_string().contains("exit status 1"));
    }
}
