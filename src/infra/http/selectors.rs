//! CSS selectors targeted by composer patch streams.

pub const CHARACTER_COUNT: &str = "[data-role=\"character-count\"]";
pub const AUDIENCE_NOTICE: &str = "[data-role=\"audience-notice\"]";
pub const MEDIA_SLOT: &str = "[data-role=\"media-slot\"]";
pub const TOAST_STACK: &str = "[data-role=\"toast-stack\"]";
