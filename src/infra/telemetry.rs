use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

pub const METRIC_SESSIONS_OPENED: &str = "patronage_composer_sessions_opened_total";
pub const METRIC_PREVIEWS_APPLIED: &str = "patronage_composer_previews_applied_total";
pub const METRIC_PREVIEWS_STALE: &str = "patronage_composer_previews_stale_total";
pub const METRIC_SUBMISSIONS: &str = "patronage_composer_submissions_total";
pub const METRIC_PREVIEW_DECODE_MS: &str = "patronage_composer_preview_decode_ms";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_SESSIONS_OPENED,
            Unit::Count,
            "Total number of composer pages opened."
        );
        describe_counter!(
            METRIC_PREVIEWS_APPLIED,
            Unit::Count,
            "Total number of image previews shown to the author."
        );
        describe_counter!(
            METRIC_PREVIEWS_STALE,
            Unit::Count,
            "Total number of image reads discarded because a newer selection superseded them."
        );
        describe_counter!(
            METRIC_SUBMISSIONS,
            Unit::Count,
            "Total number of composer submissions, labelled by intent."
        );
        describe_histogram!(
            METRIC_PREVIEW_DECODE_MS,
            Unit::Milliseconds,
            "Time spent turning an uploaded file into a preview."
        );
    });
}
