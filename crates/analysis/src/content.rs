//! Lexical incidences of a message body.
//!
//! Researchers group these into *fabrication* aspects (laughs, marks,
//! numbers) and *lamination* aspects (links, e-mails, mentions). Removing
//! laminations and emojis from a body gives its *net* text; removing
//! fabrications from the net text gives its *pure* text.

use chatscope_core::constants::MIN_MENTION_DIGITS;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*(),]|(?:%[0-9a-fA-F]))+")
        .expect("url pattern is valid")
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b").expect("email pattern is valid")
});

static QUESTION_MARK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\?+").expect("question mark pattern is valid"));

static EXCLAMATION_MARK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!+").expect("exclamation mark pattern is valid"));

static MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"@\d{{{},}}", MIN_MENTION_DIGITS)).expect("mention pattern is valid")
});

static NUMBERS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("numbers pattern is valid"));

static LAUGHS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|\s)((?:he|ha|hi|hu){2,}|(?:hh)+|(?:ja|je|ka|rs){2,}|k{2,})\b")
        .expect("laughs pattern is valid")
});

static EMOTICONS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":-?\)|:-?\(|:-?D").expect("emoticons pattern is valid"));

static EMOJI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\p{Extended_Pictographic}(?:\x{FE0F}|[\x{1F3FB}-\x{1F3FF}]|\x{200D}\p{Extended_Pictographic})*")
        .expect("emoji pattern is valid")
});

/// Incidences found in one message body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentProfile {
    /// Characters in the body.
    pub total_chars: usize,
    /// Whitespace-separated words in the body.
    pub words: usize,
    /// Emoji sequences.
    pub emojis: Vec<String>,
    /// URLs.
    pub links: Vec<String>,
    /// E-mail addresses.
    pub emails: Vec<String>,
    /// Runs of `?`, outside URLs.
    pub question_marks: Vec<String>,
    /// Runs of `!`, outside URLs.
    pub exclamation_marks: Vec<String>,
    /// Phone-number mentions such as `@5511999999999`.
    pub mentions: Vec<String>,
    /// Digit runs, outside URLs.
    pub numbers: Vec<String>,
    /// Written laughter (`haha`, `kkkk`, `rsrs`, ...).
    pub laughs: Vec<String>,
    /// ASCII emoticons.
    pub emoticons: Vec<String>,
    /// Body without mentions, links, e-mails and emojis.
    pub net_text: String,
    /// Net text without laughs, marks and numbers.
    pub pure_text: String,
}

impl ContentProfile {
    /// Profile a message body.
    pub fn of(body: &str) -> Self {
        let emojis = find_all(&EMOJI_RE, body);
        let links = find_all(&URL_RE, body);
        let emails = find_all(&EMAIL_RE, body);

        // URLs carry `?`, digits and `@`; keep them out of the punctuation counts.
        let without_links = remove_all(body, [&links]);

        let question_marks = find_all(&QUESTION_MARK_RE, &without_links);
        let exclamation_marks = find_all(&EXCLAMATION_MARK_RE, &without_links);
        let mentions = find_all(&MENTION_RE, &without_links);
        let numbers = find_all(&NUMBERS_RE, &without_links);
        let laughs = LAUGHS_RE
            .captures_iter(&without_links)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect::<Vec<_>>();
        let emoticons = find_all(&EMOTICONS_RE, &without_links);

        let net_text = remove_all(body, [&mentions, &links, &emails, &emojis]);
        let pure_text = remove_all(&net_text, [&laughs, &emojis, &emoticons, &numbers]);

        Self {
            total_chars: body.chars().count(),
            words: body.split_whitespace().count(),
            emojis,
            links,
            emails,
            question_marks,
            exclamation_marks,
            mentions,
            numbers,
            laughs,
            emoticons,
            net_text,
            pure_text,
        }
    }

    /// Emojis followed by emoticons.
    pub fn marks(&self) -> impl Iterator<Item = &str> + '_ {
        self.emojis
            .iter()
            .chain(self.emoticons.iter())
            .map(String::as_str)
    }

    /// Characters in the net text.
    pub fn net_chars(&self) -> usize {
        self.net_text.chars().count()
    }

    /// Characters in the pure text.
    pub fn pure_chars(&self) -> usize {
        self.pure_text.chars().count()
    }
}

fn find_all(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

fn remove_all<'a, const N: usize>(text: &str, groups: [&'a Vec<String>; N]) -> String {
    let mut out = text.to_string();
    for incidence in groups.iter().flat_map(|group| group.iter()) {
        if !incidence.is_empty() {
            out = out.replace(incidence.as_str(), "");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_has_no_incidences() {
        let profile = ContentProfile::of("We are fine");
        assert_eq!(profile.total_chars, 11);
        assert_eq!(profile.words, 3);
        assert!(profile.links.is_empty());
        assert!(profile.laughs.is_empty());
        assert_eq!(profile.net_text, "We are fine");
        assert_eq!(profile.pure_text, "We are fine");
    }

    #[test]
    fn links_are_removed_before_punctuation() {
        let profile = ContentProfile::of("look https://example.com/?q=1 now?!");
        assert_eq!(profile.links, vec!["https://example.com/?q=1"]);
        assert_eq!(profile.question_marks, vec!["?"]);
        assert_eq!(profile.exclamation_marks, vec!["!"]);
        assert!(profile.numbers.is_empty());
        assert_eq!(profile.net_text, "look  now?!");
    }

    #[test]
    fn emails_and_mentions() {
        let profile = ContentProfile::of("mail ana@example.org or ping @5511999999999");
        assert_eq!(profile.emails, vec!["ana@example.org"]);
        assert_eq!(profile.mentions, vec!["@5511999999999"]);
        assert!(!profile.net_text.contains("ana@example.org"));
        assert!(!profile.net_text.contains("@5511999999999"));
    }

    #[test]
    fn laughs_numbers_and_emoticons_leave_pure_text() {
        let profile = ContentProfile::of("won 3 games kkkk :) hahaha");
        assert_eq!(profile.laughs, vec!["kkkk", "hahaha"]);
        assert_eq!(profile.numbers, vec!["3"]);
        assert_eq!(profile.emoticons, vec![":)"]);
        assert_eq!(profile.pure_text.split_whitespace().collect::<Vec<_>>(), vec!["won", "games"]);
    }

    #[test]
    fn emoji_sequences_count_once() {
        let profile = ContentProfile::of("great 👍🏽 party 🎉");
        assert_eq!(profile.emojis, vec!["👍🏽", "🎉"]);
        assert_eq!(profile.marks().count(), 2);
        assert!(!profile.net_text.contains('🎉'));
    }

    #[test]
    fn words_inside_laugh_like_tokens_are_not_laughs() {
        let profile = ContentProfile::of("the hash is hidden");
        assert!(profile.laughs.is_empty());
    }
}
