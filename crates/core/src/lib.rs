//! Core types, errors, and configuration for Chatscope.
//!
//! This crate holds the closed vocabularies shared by the transcript parser
//! and the feature engine (day periods, system notice kinds, grammatical
//! categories) together with the configuration file model.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use config::ChatscopeConfig;
pub use error::{Error, Result};
pub use types::*;
