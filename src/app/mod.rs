//! application entrypoint: CLI -> config -> download context -> use cases
pub mod core;
pub mod logging;

pub use core::{exit_code, run};
