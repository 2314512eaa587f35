//! Patronage post composer: a server-rendered, datastar-driven form for writing posts.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
