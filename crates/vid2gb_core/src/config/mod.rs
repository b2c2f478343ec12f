//! Configuration management for vid2gb.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Defaults for every field, so a partial file is always valid
//!
//! # Example
//!
//! ```no_run
//! use vid2gb_core::config::ConfigManager;
//!
//! let mut config = ConfigManager::new("vid2gb.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Build tool: {}", config.settings().tools.build_tool);
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigResult, ConfigManager};
pub use settings::{FrameSettings, LoggingSettings, PathSettings, Settings, ToolSettings};
