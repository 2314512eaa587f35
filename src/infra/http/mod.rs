mod composer;
mod middleware;
mod selectors;
mod toasts;

use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};

use crate::{
    application::{composer::ComposerService, publisher::PostPublisher},
    config::{NavigationSettings, ProfileSettings},
    presentation::views::render_not_found_response,
};

use middleware::{log_responses, set_request_context};

const DATASTAR_REQUEST_HEADER: &str = "datastar-request";
/// Room for boundaries and part headers on top of the file itself.
const MULTIPART_ENVELOPE_BYTES: u64 = 64 * 1024;

#[derive(Clone)]
pub struct HttpState {
    pub composer: Arc<ComposerService>,
    pub publisher: Arc<dyn PostPublisher>,
    pub profile: Arc<ProfileSettings>,
    pub navigation: Arc<NavigationSettings>,
    pub upload_limit_bytes: u64,
}

pub fn build_router(state: HttpState) -> Router {
    let upload_body_limit = usize::try_from(
        state
            .upload_limit_bytes
            .saturating_add(MULTIPART_ENVELOPE_BYTES),
    )
    .unwrap_or(usize::MAX);

    let composer_routes = Router::new()
        .route("/compose", get(composer::compose_page))
        .route("/compose/{id}/title", post(composer::update_title))
        .route("/compose/{id}/content", post(composer::update_content))
        .route("/compose/{id}/visibility", post(composer::select_visibility))
        .route("/compose/{id}/category", post(composer::select_category))
        .route(
            "/compose/{id}/image",
            post(composer::upload_image).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route("/compose/{id}/image/remove", post(composer::remove_image))
        .route("/compose/{id}/submit", post(composer::submit))
        .route("/compose/{id}/discard", post(composer::discard));

    let service_routes = Router::new()
        .route("/", get(root_redirect))
        .route("/_health", get(health))
        .route("/static/{*path}", get(crate::infra::assets::serve_static));

    composer_routes
        .merge(service_routes)
        .fallback(fallback)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn root_redirect() -> Redirect {
    Redirect::to("/compose")
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn fallback(State(state): State<HttpState>) -> Response {
    render_not_found_response(&state.navigation.back_href)
}

fn no_patch() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
