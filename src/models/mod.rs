pub mod config;

pub use config::{AppConfig, CONFIG_ENV, DEFAULT_CONFIG_FILE};
