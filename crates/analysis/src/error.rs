use thiserror::Error;

/// Errors that can occur during analysis operations.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A header line carries a date or time that does not exist.
    #[error("Malformed timestamp on line {line}: {value}")]
    MalformedTimestamp {
        /// 1-based line number in the transcript.
        line: usize,
        /// The offending `date time` text.
        value: String,
    },
    /// The transcript produced no events.
    #[error("Transcript contains no events")]
    EmptyTranscript,
    /// The tagging capability failed on a text.
    #[error("Tagging error: {0}")]
    Tagging(String),
    /// A computation observed its cancellation token.
    #[error("Computation cancelled")]
    Cancelled,
    /// No registered feature has the requested name.
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Core crate error.
    #[error(transparent)]
    Core(#[from] chatscope_core::Error),
    /// I/O operation error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
