use crate::constants::{APP_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_MIN_WORD_LENGTH};
use crate::Error;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration for Chatscope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChatscopeConfig {
    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Feature engine configuration.
    pub analysis: AnalysisConfig,

    /// Linguistic feature configuration.
    pub nlp: NlpConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is not set.
    pub level: LogLevel,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level.
    Error,

    /// Warning level.
    Warn,

    /// Info level.
    Info,

    /// Debug level.
    Debug,

    /// Trace level.
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Feature engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Names of the features to compute. Empty means every built-in feature.
    pub features: Vec<String>,

    /// Compute features on a worker pool instead of sequentially.
    pub parallel: bool,

    /// Maximum number of worker threads for parallel computation.
    pub max_workers: usize,
}

/// Tagger backing the noun and verb features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaggerKind {
    /// Lexicon and suffix heuristics for Portuguese/Spanish style text.
    Suffix,

    /// jieba part-of-speech tagging for Chinese text.
    Jieba,
}

impl FromStr for TaggerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "suffix" => Ok(TaggerKind::Suffix),
            "jieba" => Ok(TaggerKind::Jieba),
            other => Err(Error::config(format!("unknown tagger: {}", other))),
        }
    }
}

impl fmt::Display for TaggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaggerKind::Suffix => f.write_str("suffix"),
            TaggerKind::Jieba => f.write_str("jieba"),
        }
    }
}

/// Linguistic feature configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NlpConfig {
    /// Tagger implementation.
    pub tagger: TaggerKind,

    /// Drop stopwords before counting.
    pub stopword_filtering: bool,

    /// Stopword list replacing the built-in one.
    pub stopwords: Option<Vec<String>>,

    /// Minimum token length, in characters, for counting.
    pub min_word_length: usize,

    /// Keep only the most frequent terms per table section.
    pub top_terms: Option<usize>,
}

impl ChatscopeConfig {
    /// Default location of the configuration file.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Cannot find config directory".to_string()))?;
        Ok(config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::FileSystem(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location, falling back to defaults
    /// when no file exists there.
    pub fn load_or_default() -> Result<Self> {
        let path = Self::default_path()?;
        if path.is_file() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Parse(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| Error::FileSystem(format!("Failed to write config file: {}", e)))
    }

    /// Reject values no feature can work with.
    pub fn validate(&self) -> Result<()> {
        if self.analysis.max_workers == 0 {
            return Err(Error::validation("analysis.max_workers must be at least 1"));
        }
        if self.nlp.top_terms == Some(0) {
            return Err(Error::validation("nlp.top_terms must be at least 1"));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            features: Vec::new(),
            parallel: false,
            max_workers: num_cpus::get(),
        }
    }
}

impl Default for NlpConfig {
    fn default() -> Self {
        Self {
            tagger: TaggerKind::Suffix,
            stopword_filtering: true,
            stopwords: None,
            min_word_length: DEFAULT_MIN_WORD_LENGTH,
            top_terms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_sections() {
        let config: ChatscopeConfig = toml::from_str(
            r#"
            [nlp]
            tagger = "jieba"
            top_terms = 25
            stopwords = ["bom", "dia"]
            "#,
        )
        .unwrap();

        assert_eq!(config.nlp.tagger, TaggerKind::Jieba);
        assert_eq!(config.nlp.top_terms, Some(25));
        assert_eq!(
            config.nlp.stopwords,
            Some(vec!["bom".to_string(), "dia".to_string()])
        );
        assert!(config.nlp.stopword_filtering);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.analysis.features.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ChatscopeConfig::default();
        config.logging.level = LogLevel::Debug;
        config.analysis.features = vec!["messages".to_string(), "time".to_string()];
        config.analysis.parallel = true;

        config.save(&path).unwrap();
        let loaded = ChatscopeConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analysis]\nmax_workers = 0\n").unwrap();

        let err = ChatscopeConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn unreadable_and_malformed_files_are_distinguished() {
        let dir = tempfile::tempdir().unwrap();
        let missing = ChatscopeConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, Error::FileSystem(_)));

        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[nlp\ntagger = ").unwrap();
        let malformed = ChatscopeConfig::load(&path).unwrap_err();
        assert!(matches!(malformed, Error::Parse(_)));
    }

    #[test]
    fn tagger_kind_from_str() {
        assert_eq!("Suffix".parse::<TaggerKind>().unwrap(), TaggerKind::Suffix);
        assert_eq!("jieba".parse::<TaggerKind>().unwrap(), TaggerKind::Jieba);
        assert!("spacy".parse::<TaggerKind>().is_err());
    }
}
