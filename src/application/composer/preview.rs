//! Turning a locally selected file into something the page can display.

use std::time::Instant;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use bytes::Bytes;
use metrics::histogram;
use thiserror::Error;

use crate::{
    domain::{
        error::DomainError,
        media::{FALLBACK_MEDIA_TYPE, ImageDimensions, ImagePreview},
    },
    infra::telemetry::METRIC_PREVIEW_DECODE_MS,
};

/// A file as it arrived from the picker.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub file_name: String,
    pub declared_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("no file content was selected")]
    Empty,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("preview decoding task failed: {0}")]
    Task(String),
}

/// Decode `file` off the async executor and produce its preview.
pub async fn read_preview(file: SelectedFile) -> Result<ImagePreview, PreviewError> {
    let started = Instant::now();
    let result = tokio::task::spawn_blocking(move || build_preview(&file))
        .await
        .map_err(|err| PreviewError::Task(err.to_string()))?;
    histogram!(METRIC_PREVIEW_DECODE_MS).record(started.elapsed().as_secs_f64() * 1000.0);
    result
}

pub fn build_preview(file: &SelectedFile) -> Result<ImagePreview, PreviewError> {
    if file.bytes.is_empty() {
        return Err(PreviewError::Empty);
    }

    let media_type = resolve_media_type(file.declared_type.as_deref(), &file.file_name);
    let data_url = format!("data:{media_type};base64,{}", STANDARD.encode(&file.bytes));
    let dimensions = probe_dimensions(&file.bytes);

    ImagePreview::new(
        data_url,
        media_type,
        file.bytes.len(),
        file.file_name.clone(),
        dimensions,
    )
    .map_err(PreviewError::from)
}

/// Prefer the declared part type; fall back to the file extension.
pub fn resolve_media_type(declared: Option<&str>, file_name: &str) -> String {
    let declared = declared
        .and_then(|value| value.trim().parse::<mime_guess::Mime>().ok())
        .map(|mime| mime.essence_str().to_ascii_lowercase())
        .filter(|essence| essence != FALLBACK_MEDIA_TYPE);
    if let Some(essence) = declared {
        return essence;
    }

    mime_guess::from_path(file_name)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_MEDIA_TYPE.to_string())
}

fn probe_dimensions(bytes: &[u8]) -> Option<ImageDimensions> {
    let size = imagesize::blob_size(bytes).ok()?;
    let width = u32::try_from(size.width).ok().filter(|w| *w > 0)?;
    let height = u32::try_from(size.height).ok().filter(|h| *h > 0)?;
    Some(ImageDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG.
    const PIXEL_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    fn selected(name: &str, declared: Option<&str>, bytes: &'static [u8]) -> SelectedFile {
        SelectedFile {
            file_name: name.to_string(),
            declared_type: declared.map(str::to_string),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn builds_data_url_with_dimensions() {
        let preview = build_preview(&selected("pixel.png", Some("image/png"), PIXEL_PNG))
            .expect("preview");

        assert!(preview.data_url().starts_with("data:image/png;base64,iVBORw0KGgo"));
        assert_eq!(preview.media_type(), "image/png");
        assert_eq!(preview.byte_len(), PIXEL_PNG.len());
        assert_eq!(
            preview.dimensions(),
            Some(ImageDimensions {
                width: 1,
                height: 1
            })
        );
    }

    #[test]
    fn guesses_type_from_extension_when_undeclared() {
        assert_eq!(resolve_media_type(None, "cover.JPG"), "image/jpeg");
        assert_eq!(
            resolve_media_type(Some("application/octet-stream"), "loop.gif"),
            "image/gif"
        );
        assert_eq!(resolve_media_type(Some(" "), "notes"), FALLBACK_MEDIA_TYPE);
        assert_eq!(
            resolve_media_type(Some("Image/PNG; name=\"x\""), "x"),
            "image/png"
        );
    }

    #[test]
    fn non_image_bytes_still_produce_a_preview() {
        let preview = build_preview(&selected("notes.txt", None, b"hello"))
            .expect("no type enforcement");
        assert_eq!(preview.media_type(), "text/plain");
        assert!(preview.dimensions().is_none());
        assert!(!preview.is_image());
    }

    #[test]
    fn empty_selection_is_reported() {
        let err = build_preview(&selected("", None, b"")).expect_err("empty");
        assert!(matches!(err, PreviewError::Empty));
    }

    #[tokio::test]
    async fn read_preview_runs_off_the_executor() {
        let preview = read_preview(selected("pixel.png", None, PIXEL_PNG))
            .await
            .expect("preview");
        assert_eq!(preview.file_name(), "pixel.png");
    }
}
