//! PDF rasterisation: render the first page of a resume to a JPEG payload.
//!
//! Only page index 0 is ever loaded into a bitmap. Multi-page resumes are
//! accepted, but everything after the first page is ignored.
//!
//! ## Error mapping
//!
//! | Condition                                  | Error                 |
//! |--------------------------------------------|-----------------------|
//! | no document                                | `MissingInput`        |
//! | empty buffer, no `%PDF` in first 1 KiB     | `InvalidDocument`     |
//! | pdfium cannot parse it, password, 0 pages  | `InvalidDocument`     |
//! | page 0 fails to render or encode           | `RenderFailed`        |
//! | pdfium shared library not found            | `PdfiumBindingFailed` |
//!
//! The cheap checks run before pdfium is bound, so obviously bad uploads are
//! rejected even on machines without the pdfium library.

use crate::config::RasterOptions;
use crate::error::JobFitError;
use crate::pipeline::encode::{encode_jpeg, ImagePayload};
use crate::pipeline::input::UploadedDocument;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Environment variable naming an explicit pdfium library to load.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Rasterise the first page with default options.
pub fn rasterize(document: Option<&UploadedDocument>) -> Result<ImagePayload, JobFitError> {
    rasterize_with(document, &RasterOptions::default())
}

/// Rasterise the first page of `document` into a base64 JPEG payload.
pub fn rasterize_with(
    document: Option<&UploadedDocument>,
    options: &RasterOptions,
) -> Result<ImagePayload, JobFitError> {
    let document = document.ok_or_else(|| JobFitError::missing("resume PDF"))?;
    validate_signature(document)?;

    let pdfium = bind_pdfium()?;
    let pdf = pdfium
        .load_pdf_from_byte_slice(&document.bytes, options.password.as_deref())
        .map_err(|e| JobFitError::invalid_document(format!("cannot parse PDF: {e:?}")))?;

    let pages = pdf.pages();
    let total_pages = pages.len() as usize;
    info!("Resume PDF loaded: {} pages", total_pages);
    if total_pages == 0 {
        return Err(JobFitError::invalid_document("document has no pages"));
    }

    let page = pages.get(0).map_err(|e| JobFitError::RenderFailed {
        detail: format!("cannot open page 1: {e:?}"),
    })?;

    let max = max_dimension(options.max_rendered_pixels);
    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(options.dpi as f32 / 72.0)
        .set_maximum_width(max)
        .set_maximum_height(max);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| JobFitError::RenderFailed {
            detail: format!("{e:?}"),
        })?;

    let image = bitmap.as_image();
    debug!(
        "Rendered page 1 → {}x{} px at {} DPI",
        image.width(),
        image.height(),
        options.dpi
    );

    encode_jpeg(&image, options.jpeg_quality).map_err(|e| JobFitError::RenderFailed {
        detail: format!("JPEG encoding failed: {e}"),
    })
}

/// pdfium takes the size cap as `i32`; saturate instead of wrapping.
fn max_dimension(px: u32) -> i32 {
    i32::try_from(px).unwrap_or(i32::MAX)
}

/// Reject buffers that cannot possibly be a PDF.
fn validate_signature(document: &UploadedDocument) -> Result<(), JobFitError> {
    if document.is_empty() {
        return Err(JobFitError::invalid_document("uploaded file is empty"));
    }
    if !document.has_pdf_magic() {
        let mut magic = [0u8; 4];
        let n = document.len().min(4);
        magic[..n].copy_from_slice(&document.bytes[..n]);
        return Err(JobFitError::invalid_document(format!(
            "not a PDF (first bytes: {magic:?})"
        )));
    }
    Ok(())
}

/// Bind to pdfium: `PDFIUM_LIB_PATH` (file or directory), then the working
/// directory, then the system library search path.
pub fn bind_pdfium() -> Result<Pdfium, JobFitError> {
    let bindings = match std::env::var(PDFIUM_LIB_PATH_ENV) {
        Ok(path) if !path.is_empty() => {
            let path = std::path::Path::new(&path);
            if path.is_dir() {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path))
            } else {
                Pdfium::bind_to_library(path)
            }
        }
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| JobFitError::PdfiumBindingFailed(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}
