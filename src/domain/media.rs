//! Locally selected media held by the composer before any submission.

use serde::Serialize;

use super::error::DomainError;

pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// A client-displayable rendition of a selected file, encoded as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagePreview {
    data_url: String,
    media_type: String,
    byte_len: usize,
    file_name: String,
    dimensions: Option<ImageDimensions>,
}

impl ImagePreview {
    pub fn new(
        data_url: String,
        media_type: impl Into<String>,
        byte_len: usize,
        file_name: impl Into<String>,
        dimensions: Option<ImageDimensions>,
    ) -> Result<Self, DomainError> {
        if !data_url.starts_with("data:") || !data_url.contains(',') {
            return Err(DomainError::invariant(
                "image preview must be a `data:` URL",
            ));
        }

        Ok(Self {
            data_url,
            media_type: media_type.into(),
            byte_len,
            file_name: file_name.into(),
            dimensions,
        })
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn dimensions(&self) -> Option<ImageDimensions> {
        self.dimensions
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }
}

/// Identifies one asynchronous file read. Only the most recently begun read that has not
/// been abandoned may land a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReadTicket(u64);

impl ReadTicket {
    pub(crate) fn first() -> Self {
        Self(1)
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageSlot {
    #[default]
    Empty,
    Previewing(ImagePreview),
}

impl ImageSlot {
    pub fn preview(&self) -> Option<&ImagePreview> {
        match self {
            ImageSlot::Empty => None,
            ImageSlot::Previewing(preview) => Some(preview),
        }
    }
}
