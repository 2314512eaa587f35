use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    application::error::{ErrorReport, HttpError},
    config::{NavigationSettings, ProfileSettings},
    domain::{
        composer::{AudienceNotice, PostComposer},
        media::ImagePreview,
        types::{Category, Visibility},
    },
};

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    render_fragment(template).map(Html)
}

/// Render a template into a bare string, for use inside a patch stream.
pub fn render_fragment<T: Template>(template: T) -> Result<String, HttpError> {
    template.render().map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(back_href: &str) -> Response {
    let view = ErrorPageView::not_found(back_href);
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

/// Identity strip shown above the composer card.
#[derive(Clone)]
pub struct ProfileCardView {
    pub display_name: String,
    pub handle: String,
    pub avatar_url: Option<String>,
    pub initials: String,
}

impl From<&ProfileSettings> for ProfileCardView {
    fn from(profile: &ProfileSettings) -> Self {
        Self {
            display_name: profile.display_name.clone(),
            handle: profile.handle.clone(),
            avatar_url: profile.avatar_url.clone(),
            initials: profile.initials.clone(),
        }
    }
}

#[derive(Clone)]
pub struct SelectOptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

pub fn visibility_options(current: Visibility) -> Vec<SelectOptionView> {
    Visibility::ALL
        .into_iter()
        .map(|visibility| SelectOptionView {
            value: visibility.as_str(),
            label: visibility.label(),
            selected: visibility == current,
        })
        .collect()
}

pub fn category_options(current: Option<Category>) -> Vec<SelectOptionView> {
    Category::ALL
        .into_iter()
        .map(|category| SelectOptionView {
            value: category.as_str(),
            label: category.label(),
            selected: current == Some(category),
        })
        .collect()
}

#[derive(Clone)]
pub struct AudienceNoticeView {
    pub heading: &'static str,
    pub body: String,
}

impl From<AudienceNotice> for AudienceNoticeView {
    fn from(notice: AudienceNotice) -> Self {
        Self {
            heading: notice.heading,
            body: notice.body(),
        }
    }
}

#[derive(Clone)]
pub struct MediaPreviewView {
    pub data_url: String,
    pub file_name: String,
    pub is_image: bool,
    pub dimensions: Option<String>,
}

impl From<&ImagePreview> for MediaPreviewView {
    fn from(preview: &ImagePreview) -> Self {
        Self {
            data_url: preview.data_url().to_string(),
            file_name: preview.file_name().to_string(),
            is_image: preview.is_image(),
            dimensions: preview
                .dimensions()
                .map(|size| format!("{} × {}", size.width, size.height)),
        }
    }
}

#[derive(Clone)]
pub struct MediaSlotView {
    pub session_id: String,
    pub preview: Option<MediaPreviewView>,
    pub limit_label: String,
}

impl MediaSlotView {
    pub fn new(session_id: Uuid, composer: &PostComposer, upload_limit_bytes: u64) -> Self {
        Self {
            session_id: session_id.to_string(),
            preview: composer.image().preview().map(MediaPreviewView::from),
            limit_label: upload_limit_label(upload_limit_bytes),
        }
    }
}

pub fn upload_limit_label(limit_bytes: u64) -> String {
    format!("PNG, JPG, GIF up to {}", upload_size_label(limit_bytes))
}

/// Largest whole unit not exceeding `bytes`, so the copy never promises more than is accepted.
pub fn upload_size_label(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    if bytes >= MIB {
        format!("{}MB", bytes / MIB)
    } else if bytes >= KIB {
        format!("{}KB", bytes / KIB)
    } else {
        format!("{bytes} bytes")
    }
}

#[derive(Clone)]
pub struct ToastItem {
    pub id: String,
    pub kind: &'static str,
    pub text: String,
    pub ttl_ms: u64,
}

pub struct ComposerPageView {
    pub session_id: String,
    pub back_href: String,
    pub profile: ProfileCardView,
    pub title: String,
    pub content: String,
    pub visibility_options: Vec<SelectOptionView>,
    pub category_options: Vec<SelectOptionView>,
    pub tips: [&'static str; 4],
}

pub const POSTING_TIPS: [&str; 4] = [
    "Use high-quality images to showcase your work",
    "Keep your title concise and attention-grabbing",
    "Add value with behind-the-scenes content or insights",
    "Engage with comments to build community",
];

/// Full composer page. The fragment fields share names with the standalone fragment
/// templates so the page can include the same partials.
#[derive(Template)]
#[template(path = "composer.html")]
pub struct ComposerPageTemplate {
    pub view: ComposerPageView,
    pub count: usize,
    pub notice: Option<AudienceNoticeView>,
    pub media: MediaSlotView,
    pub toasts: Vec<ToastItem>,
}

impl ComposerPageTemplate {
    pub fn new(
        session_id: Uuid,
        composer: &PostComposer,
        profile: &ProfileSettings,
        navigation: &NavigationSettings,
        upload_limit_bytes: u64,
    ) -> Self {
        let view = ComposerPageView {
            session_id: session_id.to_string(),
            back_href: navigation.back_href.clone(),
            profile: ProfileCardView::from(profile),
            title: composer.title().to_string(),
            content: composer.content().to_string(),
            visibility_options: visibility_options(composer.visibility()),
            category_options: category_options(composer.category()),
            tips: POSTING_TIPS,
        };

        Self {
            view,
            count: composer.character_count(),
            notice: composer.audience_notice().map(AudienceNoticeView::from),
            media: MediaSlotView::new(session_id, composer, upload_limit_bytes),
            toasts: Vec::new(),
        }
    }
}

#[derive(Template)]
#[template(path = "partials/character_count.html")]
pub struct CharacterCountTemplate {
    pub count: usize,
}

#[derive(Template)]
#[template(path = "partials/audience_notice.html")]
pub struct AudienceNoticeTemplate {
    pub notice: Option<AudienceNoticeView>,
}

#[derive(Template)]
#[template(path = "partials/media_slot.html")]
pub struct MediaSlotTemplate {
    pub media: MediaSlotView,
}

#[derive(Template)]
#[template(path = "partials/toast_stack.html")]
pub struct ToastStackTemplate {
    pub toasts: Vec<ToastItem>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub back_href: String,
}

impl ErrorPageView {
    pub fn not_found(back_href: &str) -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Head back to the composer to keep writing.".to_string(),
            back_href: back_href.to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: ErrorPageView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_limit_label_rounds_down_to_whole_units() {
        assert_eq!(upload_limit_label(10 * 1_048_576), "PNG, JPG, GIF up to 10MB");
        assert_eq!(upload_limit_label(1_048_577), "PNG, JPG, GIF up to 1MB");
        assert_eq!(upload_limit_label(2 * 1_048_576 - 1), "PNG, JPG, GIF up to 1MB");
        assert_eq!(upload_limit_label(4096), "PNG, JPG, GIF up to 4KB");
        assert_eq!(upload_limit_label(64), "PNG, JPG, GIF up to 64 bytes");
    }

    #[test]
    fn only_current_options_are_selected() {
        let options = visibility_options(Visibility::Supporters);
        let selected: Vec<_> = options
            .iter()
            .filter(|option| option.selected)
            .map(|option| option.value)
            .collect();
        assert_eq!(selected, vec!["supporters"]);

        assert!(category_options(None).iter().all(|option| !option.selected));
    }

    #[test]
    fn character_count_fragment_carries_hint() {
        let html = render_fragment(CharacterCountTemplate { count: 5 }).expect("render");
        assert!(html.contains("data-role=\"character-count\""));
        assert!(html.contains("5 characters • Supports markdown formatting"));
    }

    #[test]
    fn audience_notice_fragment_is_empty_for_public() {
        let html = render_fragment(AudienceNoticeTemplate { notice: None }).expect("render");
        assert!(html.contains("data-role=\"audience-notice\""));
        assert!(!html.contains("Exclusive"));
    }
}
