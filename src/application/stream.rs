//! Server-sent event responses in the shape the datastar client consumes.

use std::convert::Infallible;

use async_stream::stream;
use axum::response::{
    IntoResponse, Response,
    sse::{Event, Sse},
};
use datastar::prelude::{ElementPatchMode, ExecuteScript, PatchElements};

/// Ordered list of patches answering one composer interaction.
#[derive(Default)]
pub struct PatchStream {
    events: Vec<Event>,
}

impl PatchStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap the element matched by `selector` for the supplied fragment.
    pub fn replace(&mut self, selector: &str, html: String) -> &mut Self {
        self.patch(selector, html, ElementPatchMode::Replace)
    }

    pub fn patch(&mut self, selector: &str, html: String, mode: ElementPatchMode) -> &mut Self {
        let event = PatchElements::new(html)
            .selector(selector)
            .mode(mode)
            .write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    pub fn script(&mut self, script: String) -> &mut Self {
        let event = ExecuteScript::new(script).write_as_axum_sse_event();
        self.events.push(event);
        self
    }
}

impl IntoResponse for PatchStream {
    fn into_response(self) -> Response {
        let events = self.events;
        let stream = stream! {
            for event in events {
                yield Ok::<Event, Infallible>(event);
            }
        };
        Sse::new(stream).into_response()
    }
}
