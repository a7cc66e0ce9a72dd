pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::LocalStorage;
pub use app::{run_stage, run_stages, Stage};
pub use config::TrendsConfig;
pub use core::TrendEngine;
pub use utils::error::{Result, TrendsError};
