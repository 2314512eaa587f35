//! Composer sessions and the work done on behalf of a single composer page.

mod preview;
mod service;

pub use preview::{PreviewError, SelectedFile, build_preview, read_preview, resolve_media_type};
pub use service::ComposerService;
