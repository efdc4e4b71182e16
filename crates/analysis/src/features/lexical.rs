use super::{push_ranked, AggregationResult, Column, Feature, Frequencies, RowKey};
use crate::content::ContentProfile;
use crate::error::{AnalysisError, AnalysisResult};
use crate::nlp::{Stopwords, Tagger};
use crate::timeline::Timeline;
use chatscope_core::config::NlpConfig;
use chatscope_core::constants::DEFAULT_MIN_WORD_LENGTH;
use chatscope_core::PartOfSpeech;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Term filtering shared by the noun and verb tables.
#[derive(Debug, Clone)]
pub struct LexicalOptions {
    /// Terms to drop; `None` keeps everything.
    pub stopwords: Option<Stopwords>,
    /// Shortest term kept, in characters.
    pub min_word_length: usize,
    /// Keep only the most frequent terms of each table.
    pub top_terms: Option<usize>,
}

impl Default for LexicalOptions {
    fn default() -> Self {
        Self {
            stopwords: Some(Stopwords::new()),
            min_word_length: DEFAULT_MIN_WORD_LENGTH,
            top_terms: None,
        }
    }
}

impl From<&NlpConfig> for LexicalOptions {
    fn from(config: &NlpConfig) -> Self {
        Self {
            stopwords: config
                .stopword_filtering
                .then(|| match &config.stopwords {
                    Some(list) => Stopwords::with_custom_list(list.clone()),
                    None => Stopwords::new(),
                }),
            min_word_length: config.min_word_length,
            top_terms: config.top_terms,
        }
    }
}

/// Frequency table of the tokens a tagger assigns to one category.
pub struct LexicalFeature {
    name: &'static str,
    title: &'static str,
    category: PartOfSpeech,
    tagger: Arc<dyn Tagger>,
    options: LexicalOptions,
    cancel: CancellationToken,
}

impl LexicalFeature {
    /// Create a table for `category`.
    pub fn new(
        name: &'static str,
        title: &'static str,
        category: PartOfSpeech,
        tagger: Arc<dyn Tagger>,
        options: LexicalOptions,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            name,
            title,
            category,
            tagger,
            options,
            cancel,
        }
    }

    fn keep(&self, term: &str) -> bool {
        if term.chars().count() < self.options.min_word_length {
            return false;
        }
        match &self.options.stopwords {
            Some(stopwords) => !stopwords.is_stopword(term),
            None => true,
        }
    }
}

impl Feature for LexicalFeature {
    fn name(&self) -> &str {
        self.name
    }

    fn compute(&self, timeline: &Timeline) -> AnalysisResult<AggregationResult> {
        let mut global = Frequencies::default();
        let mut by_actor: Vec<Frequencies> = timeline
            .actors()
            .iter()
            .map(|_| Frequencies::default())
            .collect();
        let mut skipped = 0usize;

        for message in timeline.messages() {
            if self.cancel.is_cancelled() {
                return Err(AnalysisError::Cancelled);
            }
            if message.body().trim().is_empty() {
                continue;
            }

            let text = ContentProfile::of(message.body()).pure_text;
            let tokens = match self.tagger.tag(&text) {
                Ok(tokens) => tokens,
                Err(e) => {
                    warn!(
                        feature = self.name,
                        tagger = self.tagger.name(),
                        ordinal = message.moment().ordinal(),
                        "Skipping message after tagging failure: {}",
                        e
                    );
                    skipped += 1;
                    continue;
                }
            };

            for token in tokens.into_iter().filter(|t| t.category == self.category) {
                let term = token.token.to_lowercase();
                if !self.keep(&term) {
                    continue;
                }
                global.add(&term);
                if let Some(frequencies) = by_actor.get_mut(message.actor().index()) {
                    frequencies.add(&term);
                }
            }
        }

        if skipped > 0 {
            debug!(feature = self.name, skipped, "Messages skipped by tagging");
        }

        let mut result = AggregationResult::new(
            self.name,
            self.title,
            vec![
                Column::new("term", "Term", ""),
                Column::new("count", "Occurrences", "occurrences"),
                Column::new("rank", "Rank", ""),
            ],
        );

        let top = self.options.top_terms;
        push_ranked(&mut result, RowKey::global(), global, top);
        for (actor, frequencies) in timeline.actors().iter().zip(by_actor) {
            push_ranked(&mut result, RowKey::actor(actor.id()), frequencies, top);
        }

        Ok(result)
    }
}

/// Most frequent nouns, globally and per actor.
pub struct NounsFeature(LexicalFeature);

impl NounsFeature {
    /// Create the noun table.
    pub fn new(tagger: Arc<dyn Tagger>, options: LexicalOptions, cancel: CancellationToken) -> Self {
        Self(LexicalFeature::new(
            "nouns",
            "Most frequent nouns",
            PartOfSpeech::Noun,
            tagger,
            options,
            cancel,
        ))
    }
}

impl Feature for NounsFeature {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn compute(&self, timeline: &Timeline) -> AnalysisResult<AggregationResult> {
        self.0.compute(timeline)
    }
}

/// Most frequent verbs, globally and per actor.
pub struct VerbsFeature(LexicalFeature);

impl VerbsFeature {
    /// Create the verb table.
    pub fn new(tagger: Arc<dyn Tagger>, options: LexicalOptions, cancel: CancellationToken) -> Self {
        Self(LexicalFeature::new(
            "verbs",
            "Most frequent verbs",
            PartOfSpeech::Verb,
            tagger,
            options,
            cancel,
        ))
    }
}

impl Feature for VerbsFeature {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn compute(&self, timeline: &Timeline) -> AnalysisResult<AggregationResult> {
        self.0.compute(timeline)
    }
}
