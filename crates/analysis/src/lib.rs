//! Chat transcript parsing and feature aggregation for Chatscope.
//!
//! Raw transcript lines flow through the line classifier and event parser
//! into a sealed [`Timeline`]; features then aggregate the timeline into
//! labeled tables for charting.

#![deny(missing_docs, unsafe_code)]

/// Transcript line classification and event parsing.
pub mod parsers;

/// Timeline model and builder.
pub mod timeline;

/// Time-of-day classification.
pub mod temporal;

/// Per-message lexical incidences.
pub mod content;

/// Tagging capability and stopwords.
pub mod nlp;

/// Feature engine and built-in features.
pub mod features;

/// Error types for analysis operations.
pub mod error;

pub use error::{AnalysisError, AnalysisResult};
pub use features::{AggregationResult, Feature, FeatureEngine};
pub use parsers::TranscriptParser;
pub use timeline::{Actor, ActorId, Event, Message, SystemMessage, Timeline, TimelineBuilder};
