//! Command-line interface for Chatscope.
//!
//! `chatscope summary|timeline|features <file>` parses a bracketed chat
//! transcript and prints JSON to stdout.

#![deny(missing_docs, unsafe_code)]

/// CLI command definitions and parsing.
pub mod commands;

/// CLI application entry point and configuration.
pub mod app;

/// Error types for CLI operations.
pub mod error;
