//! Local form state of the post composer and the operations the author drives.

use super::{
    media::{ImagePreview, ImageSlot, ReadTicket},
    submission::PostSubmission,
    types::{Category, SubmitIntent, Visibility},
};

/// Tier-gating explanation shown while a non-public visibility is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudienceNotice {
    pub heading: &'static str,
    pub audience: &'static str,
}

impl AudienceNotice {
    pub fn for_visibility(visibility: Visibility) -> Option<Self> {
        match visibility {
            Visibility::Public => None,
            Visibility::Supporters => Some(Self {
                heading: "Supporter Exclusive",
                audience: "Supporter tier and above",
            }),
            Visibility::Collectors => Some(Self {
                heading: "Collector Exclusive",
                audience: "Collector and Whale tier",
            }),
        }
    }

    pub fn body(&self) -> String {
        format!(
            "This post will only be visible to your {} members. Non-members will see a preview with a call-to-action to join.",
            self.audience
        )
    }
}

/// Result of landing an asynchronous image read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageReadOutcome {
    Applied,
    /// A newer selection or a removal happened after this read began.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct PostComposer {
    title: String,
    content: String,
    visibility: Visibility,
    category: Option<Category>,
    image: ImageSlot,
    issued: Option<ReadTicket>,
    awaited: Option<ReadTicket>,
    superseded: Option<ReadTicket>,
}

impl PostComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn image(&self) -> &ImageSlot {
        &self.image
    }

    pub fn update_title(&mut self, text: impl Into<String>) {
        self.title = text.into();
    }

    pub fn update_content(&mut self, text: impl Into<String>) {
        self.content = text.into();
    }

    /// Number of characters in the body, as shown beneath the textarea.
    pub fn character_count(&self) -> usize {
        self.content.chars().count()
    }

    pub fn select_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    pub fn select_category(&mut self, category: Option<Category>) {
        self.category = category;
    }

    pub fn audience_notice(&self) -> Option<AudienceNotice> {
        AudienceNotice::for_visibility(self.visibility)
    }

    /// Start a file read; the returned ticket must accompany its completion.
    pub fn begin_image_read(&mut self) -> ReadTicket {
        let ticket = self.issue_ticket();
        self.issued = Some(ticket);
        self.superseded = self.awaited.replace(ticket);
        ticket
    }

    /// Give up a read that produced nothing, handing the slot back to the read it displaced.
    pub fn abandon_image_read(&mut self, ticket: ReadTicket) {
        if self.awaited == Some(ticket) {
            self.awaited = self.superseded.take();
        }
    }

    pub fn complete_image_read(
        &mut self,
        ticket: ReadTicket,
        preview: ImagePreview,
    ) -> ImageReadOutcome {
        if self.awaited != Some(ticket) {
            return ImageReadOutcome::Stale;
        }
        self.image = ImageSlot::Previewing(preview);
        ImageReadOutcome::Applied
    }

    pub fn remove_image(&mut self) {
        self.image = ImageSlot::Empty;
        // A read still in flight must not resurrect the preview.
        self.awaited = None;
        self.superseded = None;
    }

    pub fn submit(&self, intent: SubmitIntent) -> PostSubmission {
        PostSubmission {
            intent,
            title: self.title.clone(),
            content: self.content.clone(),
            visibility: self.visibility,
            category: self.category,
            image: self.image.preview().cloned(),
        }
    }

    fn issue_ticket(&self) -> ReadTicket {
        match self.issued {
            Some(ticket) => ticket.next(),
            None => ReadTicket::first(),
        }
    }
}
