//! Core types and definitions for trackside level ingestion.
//!
//! This crate defines the vocabulary shared across all other crates:
//! error types, format enums, import options, tuning constants, and
//! the glob-driven file discovery used by every producer.

pub mod config;
pub mod constants;
pub mod discovery;
pub mod enums;
pub mod error;
pub mod types;

pub use config::ImportOptions;
pub use error::{FormatError, LevelError, ValidationError};
