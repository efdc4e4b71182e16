//! Bracketed chat transcript parsing.
//!
//! Transcripts use one header convention, `[dd/mm/yy(yy) hh:mm:ss] rest`.
//! Any other line continues the body of the event opened before it.

use crate::error::AnalysisResult;
use crate::timeline::{Timeline, TimelineBuilder};
use std::path::Path;
use tracing::info;

/// Header detection and continuation handling.
pub mod line;

/// Timestamp parsing and message/notice classification.
pub mod event;

pub use event::{EventBody, EventParser, ParsedEvent};
pub use line::{Header, LineClassifier, LineKind};

/// Replace or drop invisible characters chat platforms sprinkle into exports.
pub fn clean_impurities(content: &str) -> String {
    let mut cleaned = String::with_capacity(content.len());

    for c in content.chars() {
        match c {
            '\u{feff}' | '\u{200e}' | '\u{2002}' | '\u{202c}' | '\u{202a}' => {}
            '\u{a0}' => cleaned.push(' '),
            '\u{2011}' => cleaned.push('-'),
            _ => cleaned.push(c),
        }
    }

    cleaned
}

/// Parser for bracketed chat transcripts.
#[derive(Debug, Default, Clone, Copy)]
pub struct TranscriptParser;

impl TranscriptParser {
    /// Creates a new TranscriptParser instance.
    pub fn new() -> Self {
        Self
    }

    /// Parse a whole transcript held in memory.
    pub fn parse_str(&self, content: &str) -> AnalysisResult<Timeline> {
        let cleaned = clean_impurities(content);
        let mut builder = TimelineBuilder::new();
        for line in cleaned.lines() {
            // `lines` leaves the `\r` of a final unterminated CRLF line.
            builder.push_line(line.strip_suffix('\r').unwrap_or(line))?;
        }
        builder.finish()
    }

    /// Read and parse a transcript file. Invalid UTF-8 is replaced rather
    /// than rejected.
    pub fn parse_file(&self, path: &Path) -> AnalysisResult<Timeline> {
        info!("Loading transcript {}", path.display());
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        self.parse_str(&content)
    }
}
