pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{http::MouserClient, storage::LocalStorage};
pub use config::{toml_config::PricerConfig, RunSettings};
pub use crate::core::{etl::PricingEngine, pipeline::PricingPipeline};
pub use utils::error::{PricerError, Result};
