pub mod run_config;

pub use run_config::{ModelParams, ModelType, RunConfiguration, TrendlineConfig};
