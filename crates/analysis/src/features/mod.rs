//! Feature engine and built-in features.
//!
//! A feature reads a sealed [`Timeline`] and produces an [`AggregationResult`]:
//! ordered, labeled columns and rows keyed by actor and/or time bucket, ready
//! to be handed to a chart adapter as JSON.

use crate::error::{AnalysisError, AnalysisResult};
use crate::nlp::{tagger_for, Tagger};
use crate::timeline::{ActorId, Timeline};
use chatscope_core::{ChatscopeConfig, Period, SubPeriod};
use chrono::{NaiveDate, NaiveDateTime, Weekday};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Message and notice counts, message length distributions.
pub mod messages;

/// Per-actor participation.
pub mod actors;

/// Activity by period, sub-period and weekday.
pub mod time;

/// Noun and verb frequency tables.
pub mod lexical;

/// Fabrication and lamination aspects.
pub mod aspects;

/// Shared media, link domains and participation.
pub mod media;

pub use actors::ActorsFeature;
pub use aspects::{FabricationsFeature, LaminationsFeature};
pub use lexical::{LexicalOptions, NounsFeature, VerbsFeature};
pub use media::{DomainsFeature, MediaFeature};
pub use messages::MessagesFeature;
pub use time::TimeFeature;

/// A pluggable aggregation over a sealed timeline.
///
/// Features never mutate the timeline and may run concurrently with each
/// other on the same one.
pub trait Feature: Send + Sync {
    /// Registry name, e.g. `"messages"`.
    fn name(&self) -> &str;
    /// Aggregate `timeline`.
    fn compute(&self, timeline: &Timeline) -> AnalysisResult<AggregationResult>;
}

/// A result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Machine key.
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Unit of the values, e.g. `"messages"` or `"seconds"`.
    pub unit: String,
}

impl Column {
    /// Create a column.
    pub fn new(key: impl Into<String>, label: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            unit: unit.into(),
        }
    }
}

/// A time bucket rows can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Bucket {
    /// Calendar day.
    Day(NaiveDate),
    /// Calendar month.
    Month {
        /// Year.
        year: i32,
        /// Month, 1 to 12.
        month: u32,
    },
    /// Day of the week.
    Weekday(Weekday),
    /// Period of the day.
    Period(Period),
    /// Sub-period of the day.
    SubPeriod(SubPeriod),
}

impl Bucket {
    /// Month bucket of a timestamp.
    pub fn month_of(timestamp: NaiveDateTime) -> Self {
        use chrono::Datelike;
        Bucket::Month {
            year: timestamp.year(),
            month: timestamp.month(),
        }
    }

    /// Display label, e.g. `"January 2021"` for a month.
    pub fn label(&self) -> String {
        match self {
            Bucket::Day(date) => date.format("%Y-%m-%d").to_string(),
            Bucket::Month { year, month } => match NaiveDate::from_ymd_opt(*year, *month, 1) {
                Some(first) => first.format("%B %Y").to_string(),
                None => format!("{:04}-{:02}", year, month),
            },
            Bucket::Weekday(weekday) => weekday_label(*weekday).to_string(),
            Bucket::Period(period) => period.label().to_string(),
            Bucket::SubPeriod(sub_period) => sub_period.label().to_string(),
        }
    }
}

/// Monday-first day names.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Identity of a row. A row with neither actor nor bucket is the global total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RowKey {
    /// Actor the row is about.
    pub actor: Option<ActorId>,
    /// Time bucket the row is about.
    pub bucket: Option<Bucket>,
    /// Enclosing bucket, e.g. the month of a weekday row.
    pub within: Option<Bucket>,
}

impl RowKey {
    /// Whole-transcript row.
    pub fn global() -> Self {
        Self {
            actor: None,
            bucket: None,
            within: None,
        }
    }

    /// Row for one actor.
    pub fn actor(actor: ActorId) -> Self {
        Self {
            actor: Some(actor),
            ..Self::global()
        }
    }

    /// Row for one bucket across all actors.
    pub fn bucket(bucket: Bucket) -> Self {
        Self {
            bucket: Some(bucket),
            ..Self::global()
        }
    }

    /// Row for one actor within one bucket.
    pub fn actor_bucket(actor: ActorId, bucket: Bucket) -> Self {
        Self {
            actor: Some(actor),
            bucket: Some(bucket),
            within: None,
        }
    }

    /// Row for `bucket` restricted to the enclosing bucket `within`.
    pub fn nested(within: Bucket, bucket: Bucket) -> Self {
        Self {
            actor: None,
            bucket: Some(bucket),
            within: Some(within),
        }
    }
}

/// A single value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Integer count.
    Count(u64),
    /// Real number.
    Number(f64),
    /// Text.
    Text(String),
    /// Timestamp.
    Time(NaiveDateTime),
    /// No value.
    Empty,
}

impl Cell {
    /// Count from a `usize`.
    pub fn count(value: usize) -> Self {
        Cell::Count(value as u64)
    }

    /// The count, if this is one.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Cell::Count(value) => Some(*value),
            _ => None,
        }
    }

    /// The number, if this is one. Counts are widened.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            Cell::Count(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// The text, if this is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value),
            _ => None,
        }
    }

    /// The timestamp, if this is one.
    pub fn as_time(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Time(value) => Some(*value),
            _ => None,
        }
    }
}

/// A labeled row of cells, one per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    /// Row identity.
    pub key: RowKey,
    /// Human-readable label.
    pub label: String,
    /// Values in column order.
    pub cells: Vec<Cell>,
}

/// Output of one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    /// Producing feature.
    pub feature: String,
    /// Chart title.
    pub title: String,
    /// Columns in display order.
    pub columns: Vec<Column>,
    /// Rows in display order.
    pub rows: Vec<Row>,
}

impl AggregationResult {
    /// Create an empty result with the given columns.
    pub fn new(feature: impl Into<String>, title: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            feature: feature.into(),
            title: title.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Missing trailing cells are filled with [`Cell::Empty`].
    pub fn push_row(&mut self, key: RowKey, label: impl Into<String>, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Empty);
        self.rows.push(Row {
            key,
            label: label.into(),
            cells,
        });
    }

    /// Position of the column with `key`.
    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.key == key)
    }

    /// First row with `key`.
    pub fn row(&self, key: &RowKey) -> Option<&Row> {
        self.rows.iter().find(|row| row.key == *key)
    }

    /// Cell at row `key`, column `column`.
    pub fn value(&self, key: &RowKey, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.row(key).and_then(|row| row.cells.get(index))
    }
}

/// Registry of features and the runner that computes them.
pub struct FeatureEngine {
    features: Vec<Arc<dyn Feature>>,
    max_workers: usize,
}

impl FeatureEngine {
    /// Create an engine with no features.
    pub fn new() -> Self {
        Self {
            features: Vec::new(),
            max_workers: rayon::current_num_threads(),
        }
    }

    /// Create an engine with every built-in feature, in their fixed order.
    pub fn with_builtin(
        tagger: Arc<dyn Tagger>,
        options: LexicalOptions,
        cancel: CancellationToken,
    ) -> Self {
        let mut engine = Self::new();
        engine.features = vec![
            Arc::new(MessagesFeature),
            Arc::new(ActorsFeature),
            Arc::new(TimeFeature),
            Arc::new(NounsFeature::new(
                tagger.clone(),
                options.clone(),
                cancel.clone(),
            )),
            Arc::new(VerbsFeature::new(tagger, options, cancel)),
            Arc::new(FabricationsFeature),
            Arc::new(LaminationsFeature),
            Arc::new(MediaFeature),
            Arc::new(DomainsFeature),
        ];
        engine
    }

    /// Create an engine with the built-in features set up from configuration.
    pub fn from_config(config: &ChatscopeConfig, cancel: CancellationToken) -> Self {
        Self::with_builtin(
            tagger_for(config.nlp.tagger),
            LexicalOptions::from(&config.nlp),
            cancel,
        )
        .with_max_workers(config.analysis.max_workers)
    }

    /// Cap the worker threads used by [`compute_all_parallel`](Self::compute_all_parallel).
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Add a feature after the existing ones. Names must be unique.
    pub fn register(&mut self, feature: Arc<dyn Feature>) -> AnalysisResult<()> {
        if self.get(feature.name()).is_some() {
            return Err(AnalysisError::Config(format!(
                "feature '{}' is already registered",
                feature.name()
            )));
        }
        self.features.push(feature);
        Ok(())
    }

    /// Names in registry order.
    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|feature| feature.name()).collect()
    }

    /// Look up a feature by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Feature>> {
        self.features.iter().find(|feature| feature.name() == name)
    }

    /// Restrict the engine to `names`, keeping registry order. An empty
    /// selection keeps every feature.
    pub fn select<S: AsRef<str>>(mut self, names: &[S]) -> AnalysisResult<Self> {
        if names.is_empty() {
            return Ok(self);
        }
        for name in names {
            if self.get(name.as_ref()).is_none() {
                return Err(AnalysisError::UnknownFeature(name.as_ref().to_string()));
            }
        }
        self.features
            .retain(|feature| names.iter().any(|name| name.as_ref() == feature.name()));
        Ok(self)
    }

    /// Compute one feature by name.
    pub fn compute(&self, timeline: &Timeline, name: &str) -> AnalysisResult<AggregationResult> {
        let feature = self
            .get(name)
            .ok_or_else(|| AnalysisError::UnknownFeature(name.to_string()))?;
        run_feature(feature.as_ref(), timeline)
    }

    /// Compute every registered feature on the calling thread.
    pub fn compute_all(&self, timeline: &Timeline) -> AnalysisResult<Vec<AggregationResult>> {
        self.features
            .iter()
            .map(|feature| run_feature(feature.as_ref(), timeline))
            .collect()
    }

    /// Compute every registered feature on a rayon pool of at most
    /// `max_workers` threads. Results keep registry order.
    pub fn compute_all_parallel(
        &self,
        timeline: &Timeline,
    ) -> AnalysisResult<Vec<AggregationResult>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| AnalysisError::Config(format!("failed to build worker pool: {}", e)))?;

        pool.install(|| {
            self.features
                .par_iter()
                .map(|feature| run_feature(feature.as_ref(), timeline))
                .collect()
        })
    }
}

impl Default for FeatureEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn run_feature(feature: &dyn Feature, timeline: &Timeline) -> AnalysisResult<AggregationResult> {
    let result = feature.compute(timeline)?;
    info!(
        feature = feature.name(),
        rows = result.rows.len(),
        "Feature computed"
    );
    Ok(result)
}

/// Counts that remember first-occurrence order.
#[derive(Debug, Default)]
pub(crate) struct Frequencies {
    index: HashMap<String, usize>,
    terms: Vec<(String, usize)>,
}

impl Frequencies {
    pub(crate) fn add(&mut self, term: &str) {
        match self.index.get(term) {
            Some(&i) => self.terms[i].1 += 1,
            None => {
                self.index.insert(term.to_string(), self.terms.len());
                self.terms.push((term.to_string(), 1));
            }
        }
    }

    /// Most frequent first; equal counts keep first-occurrence order.
    pub(crate) fn ranked(mut self, top: Option<usize>) -> Vec<(String, usize)> {
        self.terms.sort_by(|a, b| b.1.cmp(&a.1));
        if let Some(top) = top {
            self.terms.truncate(top);
        }
        self.terms
    }
}

/// Push ranked `(term, count)` rows as `term`, `count`, `rank` cells.
pub(crate) fn push_ranked(
    result: &mut AggregationResult,
    key: RowKey,
    frequencies: Frequencies,
    top: Option<usize>,
) {
    for (rank, (term, count)) in frequencies.ranked(top).into_iter().enumerate() {
        result.push_row(
            key,
            term.clone(),
            vec![Cell::Text(term), Cell::count(count), Cell::count(rank + 1)],
        );
    }
}

/// Mean and median of a list of values, or `None` when it is empty.
pub(crate) fn mean_median(values: &mut [usize]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let mean = values.iter().sum::<usize>() as f64 / values.len() as f64;
    let mid = values.len() / 2;
    let median = if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) as f64 / 2.0
    } else {
        values[mid] as f64
    };
    Some((mean, median))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::SuffixTagger;
    use crate::parsers::TranscriptParser;

    fn timeline() -> Timeline {
        TranscriptParser::new()
            .parse_str("[01/01/21 07:52:45] Joel: Hello!\n[02/01/21 20:00:00] Mary: Hi!\n")
            .unwrap()
    }

    fn engine() -> FeatureEngine {
        FeatureEngine::with_builtin(
            Arc::new(SuffixTagger::new()),
            LexicalOptions::default(),
            CancellationToken::new(),
        )
    }

    struct Constant;

    impl Feature for Constant {
        fn name(&self) -> &str {
            "constant"
        }

        fn compute(&self, _timeline: &Timeline) -> AnalysisResult<AggregationResult> {
            let mut result =
                AggregationResult::new("constant", "Constant", vec![Column::new("n", "N", "")]);
            result.push_row(RowKey::global(), "All", vec![Cell::Count(1)]);
            Ok(result)
        }
    }

    #[test]
    fn builtin_registry_order() {
        assert_eq!(
            engine().feature_names(),
            vec![
                "messages",
                "actors",
                "time",
                "nouns",
                "verbs",
                "fabrications",
                "laminations",
                "media",
                "domains"
            ]
        );
    }

    #[test]
    fn unknown_feature_is_rejected() {
        let err = engine().compute(&timeline(), "sentiment").unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownFeature(name) if name == "sentiment"));

        let err = engine().select(&["time", "sentiment"]).err().unwrap();
        assert!(matches!(err, AnalysisError::UnknownFeature(_)));
    }

    #[test]
    fn selection_keeps_registry_order() {
        let engine = engine().select(&["verbs", "messages"]).unwrap();
        assert_eq!(engine.feature_names(), vec!["messages", "verbs"]);
    }

    #[test]
    fn custom_features_register_once() {
        let mut engine = FeatureEngine::new();
        engine.register(Arc::new(Constant)).unwrap();
        assert!(engine.register(Arc::new(Constant)).is_err());

        let result = engine.compute(&timeline(), "constant").unwrap();
        assert_eq!(
            result.value(&RowKey::global(), "n").and_then(Cell::as_count),
            Some(1)
        );
    }

    #[test]
    fn parallel_matches_sequential() {
        let timeline = timeline();
        let engine = engine().with_max_workers(3);
        assert_eq!(
            engine.compute_all(&timeline).unwrap(),
            engine.compute_all_parallel(&timeline).unwrap()
        );
    }

    #[test]
    fn push_row_pads_missing_cells() {
        let mut result = AggregationResult::new(
            "x",
            "X",
            vec![Column::new("a", "A", ""), Column::new("b", "B", "")],
        );
        result.push_row(RowKey::global(), "All", vec![Cell::Count(2)]);
        assert_eq!(result.rows[0].cells, vec![Cell::Count(2), Cell::Empty]);
    }

    #[test]
    fn bucket_labels() {
        assert_eq!(
            Bucket::Month {
                year: 2021,
                month: 1
            }
            .label(),
            "January 2021"
        );
        assert_eq!(Bucket::Weekday(Weekday::Fri).label(), "Friday");
        assert_eq!(
            Bucket::Day(NaiveDate::from_ymd_opt(2021, 1, 2).unwrap()).label(),
            "2021-01-02"
        );
    }

    #[test]
    fn cells_serialize_untagged() {
        let json = serde_json::to_string(&vec![
            Cell::Count(3),
            Cell::Number(1.5),
            Cell::Text("x".into()),
            Cell::Empty,
        ])
        .unwrap();
        assert_eq!(json, r#"[3,1.5,"x",null]"#);
    }

    #[test]
    fn mean_median_of_even_and_odd_lists() {
        assert_eq!(mean_median(&mut []), None);
        assert_eq!(mean_median(&mut [3, 1, 2]), Some((2.0, 2.0)));
        assert_eq!(mean_median(&mut [4, 1, 2, 3]), Some((2.5, 2.5)));
    }
}
