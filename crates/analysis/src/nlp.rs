use crate::error::AnalysisResult;
use chatscope_core::config::TaggerKind;
use chatscope_core::constants::VERB_ENDINGS;
use chatscope_core::PartOfSpeech;
use jieba_rs::Jieba;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{M}\p{N}'’-]*").expect("word pattern is valid"));

/// A token and the grammatical category assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedToken {
    /// Surface form as found in the text.
    pub token: String,
    /// Assigned category.
    pub category: PartOfSpeech,
}

impl TaggedToken {
    /// Create a tagged token.
    pub fn new(token: impl Into<String>, category: PartOfSpeech) -> Self {
        Self {
            token: token.into(),
            category,
        }
    }
}

/// Maps text to `(token, category)` pairs.
///
/// Implementations may be slow; the linguistic features call them once per
/// message and check for cancellation in between.
pub trait Tagger: Send + Sync {
    /// Returns the name of the tagger.
    fn name(&self) -> &str;
    /// Tag `text`.
    fn tag(&self, text: &str) -> AnalysisResult<Vec<TaggedToken>>;
}

/// Build the tagger selected in configuration.
pub fn tagger_for(kind: TaggerKind) -> Arc<dyn Tagger> {
    match kind {
        TaggerKind::Suffix => Arc::new(SuffixTagger::new()),
        TaggerKind::Jieba => Arc::new(JiebaTagger::new()),
    }
}

/// Lexicon plus suffix heuristics for Portuguese and Spanish style text,
/// with a small English lexicon.
///
/// Closed-class words come from the lexicon. Open-class words are verbs when
/// they look like infinitives (`-ar`, `-er`, `-ir`), adverbs on `-mente` or
/// `-ly`, adjectives on common adjective endings, and nouns otherwise.
pub struct SuffixTagger {
    lexicon: HashMap<&'static str, PartOfSpeech>,
}

impl SuffixTagger {
    /// Create a tagger with the built-in lexicon.
    pub fn new() -> Self {
        let mut lexicon = HashMap::new();
        let function_words = [
            "a", "o", "as", "os", "um", "uma", "uns", "umas", "de", "do", "da", "dos", "das",
            "em", "no", "na", "nos", "nas", "e", "ou", "mas", "que", "se", "por", "para", "pra",
            "com", "sem", "ao", "aos", "à", "às", "pelo", "pela", "el", "la", "los", "las", "y",
            "the", "an", "and", "or", "but", "of", "to", "in", "on", "at", "for", "with",
            "from", "by", "as", "if",
        ];
        let pronouns = [
            "eu", "tu", "ele", "ela", "nós", "vós", "eles", "elas", "você", "vocês", "me",
            "te", "lhe", "nos", "meu", "minha", "seu", "sua", "isso", "isto", "aquilo", "yo",
            "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
            "my", "your", "our", "their", "this", "that",
        ];
        let adverbs = [
            "não", "sim", "já", "muito", "pouco", "mais", "menos", "bem", "mal", "aqui", "ali",
            "lá", "hoje", "ontem", "amanhã", "agora", "sempre", "nunca", "também", "ainda",
            "not", "very", "now", "here", "there", "today", "always", "never", "also",
        ];
        let verbs = [
            "é", "são", "está", "estão", "foi", "era", "tem", "têm", "vai", "vou", "fiz",
            "is", "are", "was", "were", "be", "been", "am", "have", "has", "had", "do",
            "does", "did", "will", "can",
        ];
        for word in function_words {
            lexicon.insert(word, PartOfSpeech::Function);
        }
        for word in pronouns {
            lexicon.insert(word, PartOfSpeech::Pronoun);
        }
        for word in adverbs {
            lexicon.insert(word, PartOfSpeech::Adverb);
        }
        for word in verbs {
            lexicon.insert(word, PartOfSpeech::Verb);
        }
        Self { lexicon }
    }

    fn categorize(&self, word: &str) -> PartOfSpeech {
        let lower = word.to_lowercase();
        if let Some(category) = self.lexicon.get(lower.as_str()) {
            return *category;
        }
        if lower.chars().all(|c| c.is_numeric()) {
            return PartOfSpeech::Numeral;
        }

        let length = lower.chars().count();
        if length > 3 && VERB_ENDINGS.iter().any(|ending| lower.ends_with(ending)) {
            PartOfSpeech::Verb
        } else if lower.ends_with("mente") || (length > 4 && lower.ends_with("ly")) {
            PartOfSpeech::Adverb
        } else if ["oso", "osa", "ável", "ível", "ivo", "iva", "ous", "ful", "ive"]
            .iter()
            .any(|ending| length > 4 && lower.ends_with(ending))
        {
            PartOfSpeech::Adjective
        } else {
            PartOfSpeech::Noun
        }
    }
}

impl Default for SuffixTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl Tagger for SuffixTagger {
    fn name(&self) -> &str {
        "suffix"
    }

    fn tag(&self, text: &str) -> AnalysisResult<Vec<TaggedToken>> {
        Ok(WORD_RE
            .find_iter(text)
            .map(|m| TaggedToken::new(m.as_str(), self.categorize(m.as_str())))
            .collect())
    }
}

/// Chinese part-of-speech tagging via jieba-rs.
pub struct JiebaTagger {
    jieba: Arc<Jieba>,
}

impl JiebaTagger {
    /// Create a new JiebaTagger with default dictionary.
    pub fn new() -> Self {
        Self {
            jieba: Arc::new(Jieba::new()),
        }
    }

    /// jieba tags `eng` every Latin-script token without a finer category.
    fn map_tag(tag: &str) -> PartOfSpeech {
        if tag == "eng" {
            return PartOfSpeech::Noun;
        }
        match tag.chars().next() {
            Some('n') => PartOfSpeech::Noun,
            Some('v') => PartOfSpeech::Verb,
            Some('a') => PartOfSpeech::Adjective,
            Some('d') => PartOfSpeech::Adverb,
            Some('r') => PartOfSpeech::Pronoun,
            Some('m') => PartOfSpeech::Numeral,
            Some('x') | Some('w') => PartOfSpeech::Punctuation,
            Some('p') | Some('c') | Some('u') | Some('e') | Some('y') | Some('o') => {
                PartOfSpeech::Function
            }
            _ => PartOfSpeech::Other,
        }
    }
}

impl Default for JiebaTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl Tagger for JiebaTagger {
    fn name(&self) -> &str {
        "jieba"
    }

    fn tag(&self, text: &str) -> AnalysisResult<Vec<TaggedToken>> {
        Ok(self
            .jieba
            .tag(text, true)
            .into_iter()
            .filter(|tag| !tag.word.trim().is_empty())
            .map(|tag| TaggedToken::new(tag.word, Self::map_tag(tag.tag)))
            .collect())
    }
}

/// Stopwords filter for the linguistic features.
#[derive(Debug, Clone)]
pub struct Stopwords {
    stopwords: HashSet<String>,
}

impl Stopwords {
    /// Create a filter with the default Portuguese and English lists.
    pub fn new() -> Self {
        let default_stopwords = [
            "a", "o", "e", "é", "de", "do", "da", "em", "um", "uma", "que", "não", "se", "na",
            "no", "por", "para", "pra", "com", "os", "as", "eu", "vc", "vcs", "tb", "tbm", "q",
            "gente", "coisa", "aí", "ai", "né", "tá", "ta", "ok", "the", "a", "an", "and",
            "or", "is", "it", "to", "of", "in", "you", "i", "ok", "yes", "no", "lol",
        ];

        Self {
            stopwords: default_stopwords.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Create a filter with a custom stopword list replacing the defaults.
    pub fn with_custom_list(stopwords: Vec<String>) -> Self {
        Self {
            stopwords: stopwords.into_iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Check if a word is a stopword. Case-insensitive.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

}

impl Default for Stopwords {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(tagger: &dyn Tagger, text: &str) -> Vec<(String, PartOfSpeech)> {
        tagger
            .tag(text)
            .unwrap()
            .into_iter()
            .map(|t| (t.token, t.category))
            .collect()
    }

    #[test]
    fn suffix_tagger_splits_open_and_closed_classes() {
        let tagger = SuffixTagger::new();
        let tagged = categories(&tagger, "Vamos comer pizza na praia amanhã");
        assert_eq!(
            tagged,
            vec![
                ("Vamos".to_string(), PartOfSpeech::Noun),
                ("comer".to_string(), PartOfSpeech::Verb),
                ("pizza".to_string(), PartOfSpeech::Noun),
                ("na".to_string(), PartOfSpeech::Function),
                ("praia".to_string(), PartOfSpeech::Noun),
                ("amanhã".to_string(), PartOfSpeech::Adverb),
            ]
        );
    }

    #[test]
    fn suffix_tagger_numbers_and_adverbs() {
        let tagger = SuffixTagger::new();
        let tagged = categories(&tagger, "Chegou 42 rapidamente");
        assert_eq!(tagged[1].1, PartOfSpeech::Numeral);
        assert_eq!(tagged[2].1, PartOfSpeech::Adverb);
    }

    #[test]
    fn suffix_tagger_ignores_punctuation() {
        let tagger = SuffixTagger::new();
        let tokens: Vec<_> = tagger
            .tag("Hi!! How about you?")
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect();
        assert_eq!(tokens, vec!["Hi", "How", "about", "you"]);
    }

    #[test]
    fn jieba_maps_nouns_and_verbs() {
        let tagger = JiebaTagger::new();
        let tagged = tagger.tag("我们去北京").unwrap();
        assert!(tagged.iter().any(|t| t.category == PartOfSpeech::Noun));
        assert!(tagged.iter().any(|t| t.category == PartOfSpeech::Pronoun));
    }

    #[test]
    fn jieba_tag_prefixes() {
        assert_eq!(JiebaTagger::map_tag("ns"), PartOfSpeech::Noun);
        assert_eq!(JiebaTagger::map_tag("vn"), PartOfSpeech::Verb);
        assert_eq!(JiebaTagger::map_tag("uj"), PartOfSpeech::Function);
        assert_eq!(JiebaTagger::map_tag("eng"), PartOfSpeech::Noun);
        assert_eq!(JiebaTagger::map_tag("e"), PartOfSpeech::Function);
        assert_eq!(JiebaTagger::map_tag(""), PartOfSpeech::Other);
    }

    #[test]
    fn jieba_counts_latin_tokens_as_nouns() {
        let tagged = JiebaTagger::new().tag("我们用Zorblax").unwrap();
        let latin = tagged.iter().find(|t| t.token == "Zorblax").unwrap();
        assert_eq!(latin.category, PartOfSpeech::Noun);
    }

    #[test]
    fn stopwords_are_case_insensitive() {
        let stopwords = Stopwords::new();
        assert!(stopwords.is_stopword("The"));
        assert!(!stopwords.is_stopword("praia"));
        assert!(stopwords.is_stopword("Gente"));

        let custom = Stopwords::with_custom_list(vec!["Pizza".into()]);
        assert!(custom.is_stopword("pizza"));
    }
}
