//! CLI command definitions for Chatscope.

use chatscope_core::config::TaggerKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Main CLI application.
#[derive(Parser, Debug)]
#[command(name = "chatscope", author, version, about, long_about = None)]
pub struct Cli {
    /// Logging verbosity
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "CHATSCOPE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON on a single line
    #[arg(long, global = true)]
    pub compact: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a transcript: actors, counts and time span
    Summary(SummaryArgs),

    /// Print the parsed timeline
    Timeline(TimelineArgs),

    /// Compute features over a transcript
    Features(FeaturesArgs),
}

/// Summary arguments.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Transcript file
    pub file: PathBuf,
}

/// Timeline arguments.
#[derive(Args, Debug)]
pub struct TimelineArgs {
    /// Transcript file
    pub file: PathBuf,
}

/// Feature arguments.
#[derive(Args, Debug)]
pub struct FeaturesArgs {
    /// Transcript file
    pub file: PathBuf,

    /// Feature to compute; repeat for several. Defaults to the configured set
    #[arg(short, long = "feature")]
    pub features: Vec<String>,

    /// Compute features on a worker pool
    #[arg(long)]
    pub parallel: bool,

    /// Tagger for the noun and verb tables
    #[arg(long, value_enum)]
    pub tagger: Option<TaggerArg>,

    /// Keep only the N most frequent terms per table section
    #[arg(long)]
    pub top: Option<usize>,
}

/// Tagger choices.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaggerArg {
    /// Lexicon and suffix heuristics
    Suffix,
    /// jieba part-of-speech tagging
    Jieba,
}

impl From<TaggerArg> for TaggerKind {
    fn from(arg: TaggerArg) -> Self {
        match arg {
            TaggerArg::Suffix => TaggerKind::Suffix,
            TaggerArg::Jieba => TaggerKind::Jieba,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_flags_parse() {
        let cli = Cli::try_parse_from([
            "chatscope",
            "-vv",
            "features",
            "chat.txt",
            "--feature",
            "nouns",
            "-f",
            "time",
            "--parallel",
            "--tagger",
            "jieba",
            "--top",
            "5",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::Features(args) = cli.command else {
            panic!("expected features command");
        };
        assert_eq!(args.file, PathBuf::from("chat.txt"));
        assert_eq!(args.features, vec!["nouns", "time"]);
        assert!(args.parallel);
        assert_eq!(args.tagger, Some(TaggerArg::Jieba));
        assert_eq!(args.top, Some(5));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["chatscope", "summary", "chat.txt", "--compact", "-v"]).unwrap();
        assert!(cli.compact);
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Commands::Summary(_)));
    }

    #[test]
    fn unknown_tagger_is_rejected() {
        assert!(Cli::try_parse_from(["chatscope", "features", "x", "--tagger", "spacy"]).is_err());
    }
}
