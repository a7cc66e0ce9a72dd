pub mod engine;

pub use crate::domain::ports::{Pipeline, Storage};
pub use crate::utils::error::Result;
pub use engine::TrendEngine;
