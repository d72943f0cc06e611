use super::bindings::bind_pdfium;
use super::error::{PdfError, Result};
use image::DynamicImage;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

const PDF_POINTS_PER_INCH: f64 = 72.0;

/// Resolution controls for page rasterization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRenderOptions {
    pub target_dpi: i32,
    pub max_image_dimension: i32,
    pub auto_adjust_dpi: bool,
    pub min_dpi: i32,
    pub max_dpi: i32,
}

impl Default for PageRenderOptions {
    fn default() -> Self {
        Self {
            target_dpi: 300,
            max_image_dimension: 65536,
            auto_adjust_dpi: true,
            min_dpi: 72,
            max_dpi: 600,
        }
    }
}

impl PageRenderOptions {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.target_dpi <= 0 || self.min_dpi <= 0 || self.max_dpi <= 0 {
            return Err("DPI values must be positive".to_string());
        }
        if self.min_dpi > self.max_dpi {
            return Err(format!(
                "min_dpi ({}) must not exceed max_dpi ({})",
                self.min_dpi, self.max_dpi
            ));
        }
        if self.max_image_dimension <= 0 {
            return Err("max_image_dimension must be positive".to_string());
        }
        Ok(())
    }
}

/// Where the PDF bytes come from.
#[derive(Debug, Clone, Copy)]
pub enum PdfInput<'a> {
    File(&'a Path),
    Bytes(&'a [u8]),
}

pub struct PdfRenderer {
    pdfium: Pdfium,
}

impl PdfRenderer {
    pub fn new(library_dir: Option<&Path>) -> Result<Self> {
        let binding = bind_pdfium(library_dir)?;
        Ok(Self {
            pdfium: Pdfium::new(binding),
        })
    }

    /// Render every page in document order.
    pub fn render_all_pages(&self, input: PdfInput<'_>, options: &PageRenderOptions) -> Result<Vec<DynamicImage>> {
        let document = match input {
            PdfInput::File(path) => {
                if !path.exists() {
                    return Err(PdfError::NotFound(path.to_path_buf()));
                }
                self.pdfium.load_pdf_from_file(path, None)
            }
            PdfInput::Bytes(bytes) => self.pdfium.load_pdf_from_byte_slice(bytes, None),
        }
        .map_err(map_load_error)?;

        let page_count = document.pages().len() as usize;
        let mut images = Vec::with_capacity(page_count);

        for (page_index, page) in document.pages().iter().enumerate() {
            let image = render_page(&page, options)
                .map_err(|e| PdfError::RenderingFailed(format!("page {}: {}", page_index + 1, e)))?;
            tracing::debug!(
                page = page_index + 1,
                width = image.width(),
                height = image.height(),
                "rendered page"
            );
            images.push(image);
        }

        Ok(images)
    }
}

fn map_load_error(err: PdfiumError) -> PdfError {
    let err_msg = err.to_string();
    if err_msg.contains("password") || err_msg.contains("Password") {
        PdfError::PasswordRequired
    } else {
        PdfError::InvalidPdf(err_msg)
    }
}

fn render_page(page: &PdfPage<'_>, options: &PageRenderOptions) -> std::result::Result<DynamicImage, PdfiumError> {
    let width_points = page.width().value;
    let height_points = page.height().value;

    let dpi = if options.auto_adjust_dpi {
        calculate_optimal_dpi(
            width_points as f64,
            height_points as f64,
            options.target_dpi,
            options.max_image_dimension,
            options.min_dpi,
            options.max_dpi,
        )
    } else {
        options.target_dpi
    };

    let scale = dpi as f64 / PDF_POINTS_PER_INCH;

    let config = PdfRenderConfig::new()
        .set_target_width(((width_points as f64 * scale) as i32).max(1))
        .set_target_height(((height_points as f64 * scale) as i32).max(1))
        .rotate_if_landscape(PdfPageRenderRotation::None, false);

    let bitmap = page.render_with_config(&config)?;
    Ok(DynamicImage::ImageRgb8(bitmap.as_image().into_rgb8()))
}

/// Pick the DPI closest to `target_dpi` that keeps both page edges within `max_dimension` pixels.
fn calculate_optimal_dpi(
    page_width: f64,
    page_height: f64,
    target_dpi: i32,
    max_dimension: i32,
    min_dpi: i32,
    max_dpi: i32,
) -> i32 {
    let width_inches = page_width / PDF_POINTS_PER_INCH;
    let height_inches = page_height / PDF_POINTS_PER_INCH;

    let fits = |dpi: i32| {
        (width_inches * dpi as f64) as i32 <= max_dimension && (height_inches * dpi as f64) as i32 <= max_dimension
    };

    if fits(target_dpi) {
        return target_dpi.clamp(min_dpi, max_dpi);
    }

    let width_limited = (max_dimension as f64 / width_inches) as i32;
    let height_limited = (max_dimension as f64 / height_inches) as i32;
    width_limited.min(height_limited).clamp(min_dpi, max_dpi)
}
