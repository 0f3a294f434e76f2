//! archives a subscription blog author's posts: media, files, and rendered
//! HTML, with a durable completion cache
pub static USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub mod app;
pub mod cache;
pub mod classify;
pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod download;
pub mod error;
pub mod external_video;
pub mod progress;
pub mod quality;
pub mod render;
pub mod sanitize;
pub mod usecase;
pub mod wire;
