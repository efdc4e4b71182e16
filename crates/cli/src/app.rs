//! CLI application entry point and configuration.
//!
//! Loads the configuration, installs logging, dispatches the subcommand and
//! prints its JSON output to stdout. Logs go to stderr.

use crate::commands::{Cli, Commands, FeaturesArgs, SummaryArgs, TimelineArgs};
use crate::error::{CliError, Result};
use chatscope_analysis::{FeatureEngine, Timeline, TranscriptParser};
use chatscope_core::config::LogLevel;
use chatscope_core::ChatscopeConfig;
use clap::Parser;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Parse the command line and run it.
pub fn run() -> Result<()> {
    App::new()?.run()
}

/// Main CLI application.
#[derive(Debug)]
pub struct App {
    /// Effective configuration.
    pub config: ChatscopeConfig,
    /// Parsed CLI arguments.
    pub cli: Cli,
}

impl App {
    /// Create a new application instance from command line arguments.
    pub fn new() -> Result<Self> {
        Self::from_cli(Cli::parse())
    }

    /// Create an application instance from already parsed arguments.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let config = Self::load_config(&cli)?;
        Ok(Self { config, cli })
    }

    /// Load configuration from the given file, or from the default location.
    fn load_config(cli: &Cli) -> Result<ChatscopeConfig> {
        match &cli.config {
            Some(path) if !path.exists() => Err(CliError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            ))),
            Some(path) => Ok(ChatscopeConfig::load(path)?),
            None => Ok(ChatscopeConfig::load_or_default()?),
        }
    }

    /// Run the application.
    pub fn run(self) -> Result<()> {
        self.setup_logging();

        let output = self.execute()?;
        let rendered = if self.cli.compact {
            serde_json::to_string(&output)?
        } else {
            serde_json::to_string_pretty(&output)?
        };
        println!("{}", rendered);
        Ok(())
    }

    /// Run the subcommand and return its JSON output.
    pub fn execute(&self) -> Result<Value> {
        match &self.cli.command {
            Commands::Summary(args) => self.handle_summary(args),
            Commands::Timeline(args) => self.handle_timeline(args),
            Commands::Features(args) => self.handle_features(args),
        }
    }

    /// `RUST_LOG` wins; otherwise `-v` raises the configured level.
    fn setup_logging(&self) {
        let directive = log_directive(self.cli.verbose, self.config.logging.level);
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init()
            .ok(); // Ignore errors if a subscriber is already installed
    }

    fn handle_summary(&self, args: &SummaryArgs) -> Result<Value> {
        let timeline = load_timeline(&args.file)?;
        Ok(summarize(&args.file, &timeline))
    }

    fn handle_timeline(&self, args: &TimelineArgs) -> Result<Value> {
        let timeline = load_timeline(&args.file)?;
        Ok(serde_json::to_value(&timeline)?)
    }

    fn handle_features(&self, args: &FeaturesArgs) -> Result<Value> {
        let mut config = self.config.clone();
        if let Some(tagger) = args.tagger {
            config.nlp.tagger = tagger.into();
        }
        if let Some(top) = args.top {
            config.nlp.top_terms = Some(top);
        }
        if !args.features.is_empty() {
            config.analysis.features = args.features.clone();
        }
        config.analysis.parallel |= args.parallel;
        config.validate()?;

        let engine = FeatureEngine::from_config(&config, CancellationToken::new())
            .select(config.analysis.features.as_slice())?;
        debug!(
            features = ?engine.feature_names(),
            parallel = config.analysis.parallel,
            tagger = %config.nlp.tagger,
            "Feature engine ready"
        );

        let timeline = load_timeline(&args.file)?;
        let results = if config.analysis.parallel {
            engine.compute_all_parallel(&timeline)?
        } else {
            engine.compute_all(&timeline)?
        };

        Ok(json!({
            "file": args.file.display().to_string(),
            "features": results,
        }))
    }
}

fn load_timeline(path: &Path) -> Result<Timeline> {
    let timeline = TranscriptParser::new().parse_file(path)?;
    info!(
        file = %path.display(),
        events = timeline.events().len(),
        "Transcript parsed"
    );
    Ok(timeline)
}

fn summarize(path: &Path, timeline: &Timeline) -> Value {
    let (first, last) = timeline.span();

    let actors: Vec<Value> = timeline
        .actors()
        .iter()
        .map(|actor| {
            json!({
                "id": actor.id(),
                "name": actor.display_name(),
                "messages": timeline.messages_by(actor.id()).count(),
            })
        })
        .collect();

    let mut notices: BTreeMap<&'static str, usize> = BTreeMap::new();
    for notice in timeline.system_messages() {
        *notices.entry(notice.kind().key()).or_default() += 1;
    }

    json!({
        "file": path.display().to_string(),
        "events": timeline.events().len(),
        "messages": timeline.message_count(),
        "system_messages": timeline.system_message_count(),
        "first": first,
        "last": last,
        "actors": actors,
        "notices": notices,
    })
}

/// Filter directive for the given `-v` count and configured level.
fn log_directive(verbosity: u8, configured: LogLevel) -> &'static str {
    match verbosity {
        0 => configured.as_directive(),
        1 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TRANSCRIPT: &str = "[01/01/21 07:52:45] Joel: Hello!\n\
[01/01/21 07:52:47] Mary: Hi! Vamos comer?\n\
[01/01/21 07:52:49] Joel: image omitted\n\
[01/01/21 07:53:03] John left\n";

    struct Fixture {
        _dir: TempDir,
        transcript: String,
        config: String,
    }

    fn fixture(config: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let transcript = dir.path().join("chat.txt");
        let config_path = dir.path().join("config.toml");
        fs::write(&transcript, TRANSCRIPT).unwrap();
        fs::write(&config_path, config).unwrap();
        Fixture {
            transcript: transcript.display().to_string(),
            config: config_path.display().to_string(),
            _dir: dir,
        }
    }

    fn execute(fixture: &Fixture, args: &[&str]) -> Result<Value> {
        let mut argv = vec!["chatscope", "--config", fixture.config.as_str()];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        App::from_cli(cli)?.execute()
    }

    #[test]
    fn summary_reports_counts_and_actors() {
        let fixture = fixture("");
        let output = execute(&fixture, &["summary", &fixture.transcript]).unwrap();

        assert_eq!(output["messages"], 2);
        assert_eq!(output["system_messages"], 2);
        assert_eq!(output["actors"][0]["name"], "Joel");
        assert_eq!(output["actors"][1]["messages"], 1);
        assert_eq!(output["notices"]["image_omitted"], 1);
        assert_eq!(output["notices"]["participant_left"], 1);
        assert_eq!(output["first"], "2021-01-01T07:52:45");
    }

    #[test]
    fn timeline_lists_typed_events() {
        let fixture = fixture("");
        let output = execute(&fixture, &["timeline", &fixture.transcript]).unwrap();
        let events = output["events"].as_array().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[2]["type"], "system");
        assert_eq!(events[2]["kind"], "image_omitted");
    }

    #[test]
    fn features_use_configuration_and_overrides() {
        let fixture = fixture("[analysis]\nfeatures = [\"messages\", \"verbs\"]\nmax_workers = 2\n");
        let output = execute(&fixture, &["features", &fixture.transcript]).unwrap();
        let names: Vec<_> = output["features"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["feature"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["messages", "verbs"]);

        let output = execute(
            &fixture,
            &["features", &fixture.transcript, "-f", "time", "--parallel"],
        )
        .unwrap();
        assert_eq!(output["features"].as_array().unwrap().len(), 1);
        assert_eq!(output["features"][0]["feature"], "time");
    }

    #[test]
    fn unknown_feature_fails() {
        let fixture = fixture("");
        let err = execute(&fixture, &["features", &fixture.transcript, "-f", "sentiment"])
            .unwrap_err();
        assert!(matches!(err, CliError::Analysis(_)));
    }

    #[test]
    fn missing_config_file_fails() {
        let cli = Cli::try_parse_from([
            "chatscope",
            "--config",
            "/nonexistent/chatscope.toml",
            "summary",
            "x",
        ])
        .unwrap();
        assert!(matches!(App::from_cli(cli), Err(CliError::Config(_))));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let fixture = fixture("[analysis]\nmax_workers = 0\n");
        let cli = Cli::try_parse_from(["chatscope", "--config", &fixture.config, "summary", "x"])
            .unwrap();
        assert!(matches!(App::from_cli(cli), Err(CliError::Core(_))));
    }

    #[test]
    fn verbosity_overrides_configured_level() {
        assert_eq!(log_directive(0, LogLevel::Warn), "warn");
        assert_eq!(log_directive(1, LogLevel::Warn), "debug");
        assert_eq!(log_directive(3, LogLevel::Error), "trace");
    }
}
