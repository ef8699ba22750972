pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::LocalStorage;
pub use config::ExportConfig;
pub use crate::core::{
    etl::{EtlEngine, RunSummary},
    pipeline::CampPipeline,
};
pub use utils::error::{EtlError, Result};
