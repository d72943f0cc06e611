use super::error::PdfError;
use pdfium_render::prelude::*;
use std::path::Path;

/// Bind to the Pdfium shared library.
///
/// When `library_dir` is given the platform-specific library name is resolved
/// inside that directory first. Falls back to the system library search path.
pub(crate) fn bind_pdfium(library_dir: Option<&Path>) -> Result<Box<dyn PdfiumLibraryBindings>, PdfError> {
    if let Some(lib_dir) = library_dir {
        match Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(lib_dir)) {
            Ok(bindings) => return Ok(bindings),
            Err(e) => {
                tracing::warn!(
                    path = %lib_dir.display(),
                    error = %e,
                    "failed to bind configured Pdfium library, trying system library"
                );
            }
        }
    }

    Pdfium::bind_to_system_library().map_err(|e| PdfError::PdfiumUnavailable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bogus_directory_falls_back_to_system() {
        let dir = tempfile::tempdir().unwrap();
        match bind_pdfium(Some(dir.path())) {
            Ok(_) => {}
            Err(err) => assert!(matches!(err, PdfError::PdfiumUnavailable(_))),
        }
    }
}
