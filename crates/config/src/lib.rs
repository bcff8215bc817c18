//! Configuration management for dotagents
//!
//! This crate handles:
//! - Configuration loading and validation
//! - XDG directory management
//! - Logging initialization

pub mod config;
pub mod dirs;
pub mod logging;

// Re-export error types from core
pub use dotagents_core::{Error, Result};

pub use config::{BackupConfig, Config, GeneralConfig};
pub use dirs::{config_dir, default_config_file};
