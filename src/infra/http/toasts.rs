use std::time::Duration;

use uuid::Uuid;

use super::selectors::TOAST_STACK;
use crate::{
    application::{error::HttpError, stream::PatchStream},
    presentation::views::{ToastItem, ToastStackTemplate, render_fragment},
};

#[derive(Clone)]
pub(super) struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub text: String,
    pub ttl: Duration,
}

#[derive(Clone, Copy)]
pub(super) enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    fn as_variant(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

const DEFAULT_TOAST_TTL: Duration = Duration::from_millis(6000);

impl Toast {
    pub fn success(text: impl Into<String>) -> Self {
        Self::with_kind(ToastKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::with_kind(ToastKind::Error, text)
    }

    fn with_kind(kind: ToastKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            ttl: DEFAULT_TOAST_TTL,
        }
    }
}

pub(super) fn push_toasts(stream: &mut PatchStream, toasts: &[Toast]) -> Result<(), HttpError> {
    let items = toasts
        .iter()
        .map(|toast| ToastItem {
            id: toast.id.to_string(),
            kind: toast.kind.as_variant(),
            text: toast.text.clone(),
            ttl_ms: u64::try_from(toast.ttl.as_millis()).unwrap_or(u64::MAX),
        })
        .collect::<Vec<_>>();

    let html = render_fragment(ToastStackTemplate { toasts: items })?;
    stream.replace(TOAST_STACK, html);
    Ok(())
}
