//! Configuration management for the lottery client
//!
//! This module handles loading and managing configuration settings
//! from defaults, TOML files and the environment.

pub mod loader;
pub mod settings;

pub use loader::{ConfigLoader, default_config_path};
pub use settings::{AccountSettings, LoggingSettings, NetworkSettings, PurchaseSettings, Settings};
