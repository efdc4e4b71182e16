//! Application constants and configuration defaults.

/// Application directory name under the platform config directory.
pub const APP_DIR_NAME: &str = "chatscope";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Two-digit years in transcript headers are offset by this century.
pub const TWO_DIGIT_YEAR_BASE: i32 = 2000;

/// Years accepted in transcript headers. Anything else points at a
/// different date convention.
pub const HEADER_YEARS: std::ops::RangeInclusive<i32> = 2000..=2100;

/// Minimum digits of a phone-number mention (`@5511999999999`).
pub const MIN_MENTION_DIGITS: usize = 8;

/// Default minimum token length kept by the linguistic features.
pub const DEFAULT_MIN_WORD_LENGTH: usize = 2;

/// Endings accepted for verb tokens by the suffix tagger.
pub const VERB_ENDINGS: [&str; 3] = ["ar", "er", "ir"];
