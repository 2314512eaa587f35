//! Application services layer.

pub mod composer;
pub mod error;
pub(crate) mod lock;
pub mod publisher;
pub mod stream;
