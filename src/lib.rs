//! Facility map viewer: loads primary care site records, filters them by
//! district and free-text categories, and prepares them for a map.

pub mod config;
pub mod data;
pub mod pipeline;

pub use config::AppConfig;
pub use pipeline::{PipelineOutput, RenderedPoint, run};
