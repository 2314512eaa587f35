use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;

use async_stream::stream;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use bytes::Bytes;
use http_body_util::BodyExt;
use metrics_util::debugging::DebuggingRecorder;
use patronage::{
    application::{composer::ComposerService, publisher::DiagnosticPublisher},
    config::Settings,
    infra::http::{HttpState, build_router},
};
use tokio::sync::oneshot;
use tower::ServiceExt;

// 1x1 transparent PNG.
const PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

#[tokio::test]
async fn composer_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let settings = Settings::defaults().expect("default settings");
    let router = build_router(HttpState {
        composer: Arc::new(ComposerService::new(&settings.composer)),
        publisher: Arc::new(DiagnosticPublisher),
        profile: Arc::new(settings.profile.clone()),
        navigation: Arc::new(settings.navigation.clone()),
        upload_limit_bytes: settings.uploads.max_request_bytes.get(),
    });

    let page = router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/compose")
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("router should respond");
    assert_eq!(page.status(), StatusCode::OK);
    let html = page
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    let html = String::from_utf8(html.to_vec()).expect("utf-8 body");
    let marker = "data-composer-session=\"";
    let start = html.find(marker).expect("session marker") + marker.len();
    let session = &html[start..start + 36];

    let boundary = "metrics-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"pixel.png\"\r\nContent-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(PIXEL_PNG);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let upload = router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(format!("/compose/{session}/image"))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .expect("request should build"),
        )
        .await
        .expect("router should respond");
    assert_eq!(upload.status(), StatusCode::OK);

    // An upload overtaken by a removal lands as stale.
    let (started_tx, started_rx) = oneshot::channel::<()>();
    let (release_tx, release_rx) = oneshot::channel::<()>();
    let mut head = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"late.png\"\r\nContent-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    head.extend_from_slice(&PIXEL_PNG[..1]);
    let mut tail = PIXEL_PNG[1..].to_vec();
    tail.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    let chunks = stream! {
        yield Ok::<Bytes, Infallible>(Bytes::from(head));
        let _ = started_tx.send(());
        let _ = release_rx.await;
        yield Ok(Bytes::from(tail));
    };
    let held = Request::builder()
        .method(Method::POST)
        .uri(format!("/compose/{session}/image"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from_stream(chunks))
        .expect("request should build");
    let held = tokio::spawn(router.clone().oneshot(held));
    started_rx.await.expect("held upload should reach its file body");

    let removed = router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(format!("/compose/{session}/image/remove"))
                .body(Body::empty())
                .expect("request should build"),
        )
        .await
        .expect("router should respond");
    assert_eq!(removed.status(), StatusCode::OK);

    let _ = release_tx.send(());
    let late = held
        .await
        .expect("upload task should join")
        .expect("router should respond");
    assert_eq!(late.status(), StatusCode::NO_CONTENT);

    let submit = router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(format!("/compose/{session}/submit?intent=draft"))
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("title=Metrics"))
                .expect("request should build"),
        )
        .await
        .expect("router should respond");
    assert_eq!(submit.status(), StatusCode::OK);

    let snapshot = snapshotter.snapshot().into_vec();
    let names: HashSet<String> = snapshot
        .iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "patronage_composer_sessions_opened_total",
        "patronage_composer_previews_applied_total",
        "patronage_composer_previews_stale_total",
        "patronage_composer_submissions_total",
        "patronage_composer_preview_decode_ms",
    ];
    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }

    let draft_labelled = snapshot.iter().any(|(composite_key, _, _, _)| {
        composite_key.key().name() == "patronage_composer_submissions_total"
            && composite_key
                .key()
                .labels()
                .any(|label| label.key() == "intent" && label.value() == "draft")
    });
    assert!(draft_labelled, "submission counter should carry the intent label");
}
