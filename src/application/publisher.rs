//! Hand-off point between the composer and whatever creates posts.

use async_trait::async_trait;
use metrics::counter;
use time::OffsetDateTime;
use tracing::info;

use crate::{
    application::error::AppError,
    domain::{submission::PostSubmission, types::SubmitIntent},
    infra::telemetry::METRIC_SUBMISSIONS,
};

/// Acknowledgement returned once a submission has been accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReceipt {
    pub intent: SubmitIntent,
    pub received_at: OffsetDateTime,
}

#[async_trait]
pub trait PostPublisher: Send + Sync {
    async fn publish(&self, submission: PostSubmission) -> Result<PublishReceipt, AppError>;
}

/// Accepts every submission and records it in the log without persisting anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagnosticPublisher;

#[async_trait]
impl PostPublisher for DiagnosticPublisher {
    async fn publish(&self, submission: PostSubmission) -> Result<PublishReceipt, AppError> {
        let summary = submission.summary();
        let payload = serde_json::to_string(&summary)
            .map_err(|err| AppError::unexpected(format!("failed to encode submission: {err}")))?;

        info!(
            target: "patronage::composer::submit",
            intent = submission.intent.as_str(),
            visibility = submission.visibility.as_str(),
            category = submission.category.map(|category| category.as_str()),
            has_image = summary.has_image,
            payload = %payload,
            "composer submission received"
        );
        counter!(METRIC_SUBMISSIONS, "intent" => submission.intent.as_str()).increment(1);

        Ok(PublishReceipt {
            intent: submission.intent,
            received_at: OffsetDateTime::now_utc(),
        })
    }
}
