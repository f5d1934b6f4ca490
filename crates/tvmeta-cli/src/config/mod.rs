//! Application configuration module.
//!
//! Manages the TOML config file holding provider settings such as the
//! TheTVDB API key and base URL overrides.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::AppConfig;
pub use paths::resolve_config_path;
