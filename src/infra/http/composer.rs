//! Handlers behind the composer page: one per author interaction.

use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    Multipart,
    multipart::{Field, MultipartError},
};
use bytes::{Bytes, BytesMut};
use metrics::counter;
use serde::Deserialize;
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::{
    HttpState, no_patch,
    selectors::{AUDIENCE_NOTICE, CHARACTER_COUNT, MEDIA_SLOT},
    toasts::{Toast, push_toasts},
};
use crate::{
    application::{
        composer::{SelectedFile, read_preview},
        error::HttpError,
        stream::PatchStream,
    },
    domain::{
        composer::{AudienceNotice, ImageReadOutcome, PostComposer},
        types::{Category, SubmitIntent, Visibility},
    },
    infra::telemetry::{METRIC_PREVIEWS_APPLIED, METRIC_PREVIEWS_STALE},
    presentation::views::{
        AudienceNoticeTemplate, AudienceNoticeView, CharacterCountTemplate, ComposerPageTemplate,
        MediaSlotTemplate, MediaSlotView, render_fragment, render_template_response,
        upload_size_label,
    },
};

const SOURCE_BASE: &str = "infra::http::composer";
const IMAGE_FIELD: &str = "image";
const RESET_FILE_INPUT: &str =
    "document.querySelectorAll('[data-role=\"image-input\"]').forEach((input) => { input.value = ''; });";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct TitleForm {
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ContentForm {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct VisibilityForm {
    visibility: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct CategoryForm {
    category: String,
}

/// The whole composer form, sent along with a submit so the record matches what is on screen.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct SubmitForm {
    title: Option<String>,
    content: Option<String>,
    visibility: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct SubmitQuery {
    intent: Option<String>,
}

pub(super) async fn compose_page(State(state): State<HttpState>) -> Response {
    let (id, composer) = state.composer.open();
    debug!(target = SOURCE_BASE, session_id = %id, "composer page opened");

    let template = ComposerPageTemplate::new(
        id,
        &composer,
        &state.profile,
        &state.navigation,
        state.upload_limit_bytes,
    );
    render_template_response(template, StatusCode::OK)
}

pub(super) async fn update_title(
    State(state): State<HttpState>,
    Path(id): Path<Uuid>,
    Form(form): Form<TitleForm>,
) -> Response {
    state
        .composer
        .update(id, |composer| composer.update_title(form.title));
    no_patch()
}

pub(super) async fn update_content(
    State(state): State<HttpState>,
    Path(id): Path<Uuid>,
    Form(form): Form<ContentForm>,
) -> Response {
    let count = state.composer.update(id, |composer| {
        composer.update_content(form.content);
        composer.character_count()
    });

    match character_count_patch(count) {
        Ok(stream) => stream.into_response(),
        Err(err) => err.into_response(),
    }
}

pub(super) async fn select_visibility(
    State(state): State<HttpState>,
    Path(id): Path<Uuid>,
    Form(form): Form<VisibilityForm>,
) -> Response {
    let visibility = match Visibility::try_from(form.visibility.as_str()) {
        Ok(visibility) => visibility,
        Err(err) => return HttpError::from(err).into_response(),
    };

    let notice = state.composer.update(id, |composer| {
        composer.select_visibility(visibility);
        composer.audience_notice()
    });

    match audience_notice_patch(notice) {
        Ok(stream) => stream.into_response(),
        Err(err) => err.into_response(),
    }
}

pub(super) async fn select_category(
    State(state): State<HttpState>,
    Path(id): Path<Uuid>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let category = match Category::parse_selection(&form.category) {
        Ok(category) => category,
        Err(err) => return HttpError::from(err).into_response(),
    };

    state
        .composer
        .update(id, |composer| composer.select_category(category));
    no_patch()
}

pub(super) async fn upload_image(
    State(state): State<HttpState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Response {
    let limit_bytes = state.upload_limit_bytes;
    let field = match next_image_field(&mut multipart).await {
        Ok(Some(field)) => field,
        Ok(None) => return no_patch(),
        Err(err) => return toast_response(&[err.into_toast(limit_bytes)]),
    };

    let file_name = field
        .file_name()
        .map(|value| value.trim().to_string())
        .unwrap_or_default();
    if file_name.is_empty() {
        return no_patch();
    }
    let declared_type = field.content_type().map(|value| value.to_string());

    // Reads rank by selection order, so the ticket is taken before the body streams in.
    let ticket = state.composer.update(id, PostComposer::begin_image_read);
    let abandon = || {
        state
            .composer
            .update(id, |composer| composer.abandon_image_read(ticket));
    };

    let bytes = match read_file_bytes(field, limit_bytes).await {
        Ok(bytes) => bytes,
        Err(err) => {
            abandon();
            return toast_response(&[err.into_toast(limit_bytes)]);
        }
    };

    if bytes.is_empty() {
        abandon();
        return no_patch();
    }

    let file = SelectedFile {
        file_name,
        declared_type,
        bytes,
    };
    let file_name = file.file_name.clone();

    let preview = match read_preview(file).await {
        Ok(preview) => preview,
        Err(err) => {
            abandon();
            error!(
                target = SOURCE_BASE,
                session_id = %id,
                file_name = %file_name,
                error = %err,
                "failed to build image preview"
            );
            return toast_response(&[Toast::error("Image could not be read, please try again")]);
        }
    };

    let landed = state.composer.update(id, |composer| {
        match composer.complete_image_read(ticket, preview) {
            ImageReadOutcome::Applied => Some(MediaSlotView::new(id, composer, limit_bytes)),
            ImageReadOutcome::Stale => None,
        }
    });

    let Some(media) = landed else {
        counter!(METRIC_PREVIEWS_STALE).increment(1);
        debug!(
            target = SOURCE_BASE,
            session_id = %id,
            ticket = ticket.value(),
            "discarded stale image read"
        );
        return no_patch();
    };

    counter!(METRIC_PREVIEWS_APPLIED).increment(1);
    match media_slot_patch(media) {
        Ok(mut stream) => {
            stream.script(RESET_FILE_INPUT.to_string());
            stream.into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(super) async fn remove_image(State(state): State<HttpState>, Path(id): Path<Uuid>) -> Response {
    let limit_bytes = state.upload_limit_bytes;
    let media = state.composer.update(id, |composer| {
        composer.remove_image();
        MediaSlotView::new(id, composer, limit_bytes)
    });

    match media_slot_patch(media) {
        Ok(mut stream) => {
            stream.script(RESET_FILE_INPUT.to_string());
            stream.into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(super) async fn submit(
    State(state): State<HttpState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SubmitQuery>,
    Form(form): Form<SubmitForm>,
) -> Response {
    let intent = match query.intent.as_deref() {
        Some(value) => match SubmitIntent::try_from(value) {
            Ok(intent) => intent,
            Err(err) => return HttpError::from(err).into_response(),
        },
        None => SubmitIntent::default(),
    };

    let visibility = match form.visibility.as_deref().map(Visibility::try_from).transpose() {
        Ok(visibility) => visibility,
        Err(err) => return HttpError::from(err).into_response(),
    };
    let category = match form.category.as_deref().map(Category::parse_selection).transpose() {
        Ok(category) => category,
        Err(err) => return HttpError::from(err).into_response(),
    };

    let submission = state.composer.update(id, |composer| {
        if let Some(title) = form.title {
            composer.update_title(title);
        }
        if let Some(content) = form.content {
            composer.update_content(content);
        }
        if let Some(visibility) = visibility {
            composer.select_visibility(visibility);
        }
        if let Some(category) = category {
            composer.select_category(category);
        }
        composer.submit(intent)
    });

    let toast = match state.publisher.publish(submission).await {
        Ok(receipt) => {
            debug!(
                target = SOURCE_BASE,
                session_id = %id,
                intent = receipt.intent.as_str(),
                received_at = %receipt.received_at,
                "composer submission acknowledged"
            );
            Toast::success(receipt.intent.confirmation())
        }
        Err(err) => {
            warn!(
                target = SOURCE_BASE,
                session_id = %id,
                intent = intent.as_str(),
                error = %err,
                "publisher rejected composer submission"
            );
            Toast::error("Post could not be submitted, please try again")
        }
    };

    toast_response(&[toast])
}

pub(super) async fn discard(State(state): State<HttpState>, Path(id): Path<Uuid>) -> Response {
    if state.composer.discard(id) {
        debug!(target = SOURCE_BASE, session_id = %id, "composer session discarded");
    }
    no_patch()
}

fn character_count_patch(count: usize) -> Result<PatchStream, HttpError> {
    let html = render_fragment(CharacterCountTemplate { count })?;
    let mut stream = PatchStream::new();
    stream.replace(CHARACTER_COUNT, html);
    Ok(stream)
}

fn audience_notice_patch(notice: Option<AudienceNotice>) -> Result<PatchStream, HttpError> {
    let notice = notice.map(AudienceNoticeView::from);
    let html = render_fragment(AudienceNoticeTemplate { notice })?;
    let mut stream = PatchStream::new();
    stream.replace(AUDIENCE_NOTICE, html);
    Ok(stream)
}

fn media_slot_patch(media: MediaSlotView) -> Result<PatchStream, HttpError> {
    let html = render_fragment(MediaSlotTemplate { media })?;
    let mut stream = PatchStream::new();
    stream.replace(MEDIA_SLOT, html);
    Ok(stream)
}

fn toast_response(toasts: &[Toast]) -> Response {
    let mut stream = PatchStream::new();
    match push_toasts(&mut stream, toasts) {
        Ok(()) => stream.into_response(),
        Err(err) => err.into_response(),
    }
}

enum SelectedFileError {
    PayloadTooLarge,
    InvalidFormData,
    Read,
}

impl SelectedFileError {
    fn into_toast(self, limit_bytes: u64) -> Toast {
        match self {
            SelectedFileError::PayloadTooLarge => Toast::error(format!(
                "File is too large (limit is {})",
                upload_size_label(limit_bytes)
            )),
            SelectedFileError::InvalidFormData => Toast::error("Upload form data was invalid"),
            SelectedFileError::Read => Toast::error("Image could not be read, please try again"),
        }
    }
}

impl From<MultipartError> for SelectedFileError {
    fn from(err: MultipartError) -> Self {
        let status = err.status();
        error!(
            target = SOURCE_BASE,
            status = status.as_u16(),
            error = %err,
            "failed to read multipart payload"
        );
        match status {
            StatusCode::PAYLOAD_TOO_LARGE => SelectedFileError::PayloadTooLarge,
            StatusCode::BAD_REQUEST => SelectedFileError::InvalidFormData,
            _ => SelectedFileError::Read,
        }
    }
}

/// Advance to the image part of the form; `None` when the form carries none.
async fn next_image_field(multipart: &mut Multipart) -> Result<Option<Field>, SelectedFileError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) {
            return Ok(Some(field));
        }
    }
    Ok(None)
}

/// Collect the file body, refusing it as soon as it grows past `limit_bytes`.
async fn read_file_bytes(mut field: Field, limit_bytes: u64) -> Result<Bytes, SelectedFileError> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = field.chunk().await? {
        let received = (buffer.len() + chunk.len()) as u64;
        if received > limit_bytes {
            warn!(
                target = SOURCE_BASE,
                limit_bytes,
                "image upload exceeded the file size limit"
            );
            return Err(SelectedFileError::PayloadTooLarge);
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer.freeze())
}
