//! Typed hand-off records produced when the author submits the composer.

use serde::Serialize;

use super::{
    media::ImagePreview,
    types::{Category, SubmitIntent, Visibility},
};

/// Everything a publishing collaborator needs to create the post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostSubmission {
    pub intent: SubmitIntent,
    pub title: String,
    pub content: String,
    pub visibility: Visibility,
    pub category: Option<Category>,
    pub image: Option<ImagePreview>,
}

impl PostSubmission {
    pub fn summary(&self) -> SubmissionSummary {
        SubmissionSummary {
            title: self.title.clone(),
            content: self.content.clone(),
            visibility: self.visibility,
            has_image: self.image.is_some(),
        }
    }
}

/// Compact diagnostic view of a submission, without the encoded image payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub title: String,
    pub content: String,
    pub visibility: Visibility,
    pub has_image: bool,
}
