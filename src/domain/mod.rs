pub mod composer;
pub mod error;
pub mod media;
pub mod submission;
pub mod types;
