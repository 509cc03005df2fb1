//! Vecsearch Core Library
//!
//! This crate provides the foundational utilities shared by the vecsearch
//! crates:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management (credentials, embedding and search settings)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, EmbeddingSettings, HnswSettings, SearchSettings};
pub use error::{AppError, AppResult};
