//! Core types and utilities for dotagents
//!
//! This is the foundation crate (Layer 0) that all other dotagents crates depend on.
//! It provides:
//! - Path types (`AbsPath`, `RelPath`)
//! - Base error types
//! - Client and scope vocabulary
//! - Collaborator traits (`SkillValidator`)
//!
//! This crate has no dependencies on other dotagents crates.

pub mod client;
pub mod error;
pub mod path;
pub mod traits;

pub use client::{Client, Scope};
pub use error::{Error, Result};
pub use traits::{SkillMeta, SkillValidator};
