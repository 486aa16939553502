//! Core histpaste library: history range resolution, content composition,
//! export dispatch, sinks and config.

pub mod annotate;
pub mod auth;
pub mod collect;
pub mod compose;
pub mod config;
pub mod export;
pub mod history;
pub mod logging;
pub mod range;
pub mod sinks;
