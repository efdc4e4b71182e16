use super::line::Header;
use crate::error::{AnalysisError, AnalysisResult};
use chatscope_core::constants::{HEADER_YEARS, TWO_DIGIT_YEAR_BASE};
use chatscope_core::NoticeKind;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static AUTHORED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<actor>.+?):(?:\s+(?P<body>.*))?$").expect("authored pattern is valid")
});

/// Notices that name a participant without an `actor: ` prefix. Participant
/// names never contain a colon, which keeps `Mary: Joel left` a message.
static AUTHORLESS_TEMPLATES: Lazy<Vec<(NoticeKind, Regex)>> = Lazy::new(|| {
    [
        (
            NoticeKind::ParticipantJoined,
            r"^(?P<subject>[^:]+?) joined using this group['’]s invite link$",
        ),
        (NoticeKind::ParticipantJoined, r"^(?P<subject>[^:]+?) joined$"),
        (NoticeKind::ParticipantLeft, r"^(?P<subject>[^:]+?) left$"),
        (
            NoticeKind::ParticipantAdded,
            r"^(?P<subject>[^:]+?) added (?P<target>[^:]+)$",
        ),
        (
            NoticeKind::ParticipantRemoved,
            r"^(?P<subject>[^:]+?) removed (?P<target>[^:]+)$",
        ),
        (
            NoticeKind::SubjectChanged,
            r"^(?P<subject>[^:]+?) changed the subject (?:from .+ )?to .+$",
        ),
        (
            NoticeKind::IconChanged,
            r"^(?P<subject>[^:]+?) changed this group['’]s icon$",
        ),
        (NoticeKind::GroupCreated, r"^(?P<subject>[^:]+?) created group .+$"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("notice pattern is valid")))
    .collect()
});

/// `report.pdf document omitted` or `report.pdf • 3 pages document omitted`.
static DOCUMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\S(?:.*\S)?\.[A-Za-z0-9]{1,5}(?: • [^•]+)? document omitted$")
        .expect("document pattern is valid")
});

const ENCRYPTION_PREFIXES: [&str; 2] = [
    "Messages and calls are end-to-end encrypted",
    "Messages to this group are now secured with end-to-end encryption",
];

/// What a header's text turned out to be, before actors are interned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventBody<'a> {
    /// `actor: body`.
    Authored {
        /// Display name as written.
        actor: &'a str,
        /// First body fragment, possibly empty.
        body: &'a str,
    },
    /// A platform notice.
    Notice {
        /// Matched template.
        kind: NoticeKind,
        /// Participant the notice is about, as written.
        subject: Option<&'a str>,
        /// Second participant for added/removed notices.
        target: Option<&'a str>,
    },
}

/// A header line resolved into a timestamp and a typed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent<'a> {
    /// Transcript-local timestamp.
    pub timestamp: NaiveDateTime,
    /// Header text after the timestamp.
    pub text: &'a str,
    /// Message or notice.
    pub body: EventBody<'a>,
}

/// Turns matched headers into typed events.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventParser;

impl EventParser {
    /// Parse a header found on 1-based line `line`.
    pub fn parse<'a>(&self, header: &Header<'a>, line: usize) -> AnalysisResult<ParsedEvent<'a>> {
        let timestamp = parse_timestamp(header.date, header.time, line)?;
        Ok(ParsedEvent {
            timestamp,
            text: header.rest,
            body: classify_body(header.rest, line),
        })
    }
}

/// Parse `dd/mm/yy(yy)` and `hh:mm:ss` into a timestamp.
pub fn parse_timestamp(date: &str, time: &str, line: usize) -> AnalysisResult<NaiveDateTime> {
    let malformed = || AnalysisError::MalformedTimestamp {
        line,
        value: format!("{} {}", date, time),
    };

    let mut date_parts = date.split('/');
    let day = next_number(&mut date_parts).ok_or_else(malformed)?;
    let month = next_number(&mut date_parts).ok_or_else(malformed)?;
    let year_part = date_parts.next().ok_or_else(malformed)?;
    let year: i32 = year_part.parse().map_err(|_| malformed())?;
    let year = if year_part.len() == 2 {
        TWO_DIGIT_YEAR_BASE + year
    } else {
        year
    };
    if !HEADER_YEARS.contains(&year) {
        return Err(malformed());
    }

    let mut time_parts = time.split(':');
    let hour = next_number(&mut time_parts).ok_or_else(malformed)?;
    let minute = next_number(&mut time_parts).ok_or_else(malformed)?;
    let second = next_number(&mut time_parts).ok_or_else(malformed)?;

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(malformed)?;
    Ok(NaiveDateTime::new(date, time))
}

fn next_number<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Option<u32> {
    parts.next()?.parse().ok()
}

/// Classify the text after a header. Total and deterministic.
pub fn classify_body(rest: &str, line: usize) -> EventBody<'_> {
    if ENCRYPTION_PREFIXES.iter().any(|prefix| rest.starts_with(prefix)) {
        return EventBody::Notice {
            kind: NoticeKind::EncryptionNotice,
            subject: None,
            target: None,
        };
    }

    for (kind, template) in AUTHORLESS_TEMPLATES.iter() {
        if let Some(caps) = template.captures(rest) {
            return EventBody::Notice {
                kind: *kind,
                subject: caps.name("subject").map(|m| m.as_str()),
                target: caps.name("target").map(|m| m.as_str()),
            };
        }
    }

    let Some(caps) = AUTHORED_RE.captures(rest) else {
        debug!(line, text = rest, "Header matches no notice template and names no actor");
        return EventBody::Notice {
            kind: NoticeKind::Other,
            subject: None,
            target: None,
        };
    };

    let actor = caps.name("actor").map(|m| m.as_str()).unwrap_or_default();
    let body = caps.name("body").map(|m| m.as_str()).unwrap_or_default();

    match authored_notice(body) {
        Some(kind) => EventBody::Notice {
            kind,
            subject: Some(actor),
            target: None,
        },
        None => {
            if looks_like_notice(body) {
                debug!(line, actor, body, "Unknown system notice variant kept as message");
            }
            EventBody::Authored { actor, body }
        }
    }
}

/// Notice templates that appear as an authored body. Case-sensitive.
pub fn authored_notice(body: &str) -> Option<NoticeKind> {
    let body = body.trim();
    let kind = match body {
        "image omitted" => NoticeKind::ImageOmitted,
        "video omitted" => NoticeKind::VideoOmitted,
        "audio omitted" => NoticeKind::AudioOmitted,
        "sticker omitted" => NoticeKind::StickerOmitted,
        "GIF omitted" => NoticeKind::GifOmitted,
        "Contact card omitted" => NoticeKind::ContactCardOmitted,
        "<Media omitted>" => NoticeKind::MediaOmitted,
        "document omitted" => NoticeKind::DocumentOmitted,
        "This message was deleted" | "You deleted this message" => NoticeKind::MessageDeleted,
        _ if DOCUMENT_RE.is_match(body) => NoticeKind::DocumentOmitted,
        _ if ENCRYPTION_PREFIXES.iter().any(|prefix| body.starts_with(prefix)) => {
            NoticeKind::EncryptionNotice
        }
        _ => return None,
    };
    Some(kind)
}

fn looks_like_notice(body: &str) -> bool {
    let body = body.trim();
    (body.starts_with('<') && body.ends_with('>'))
        || body.ends_with(" omitted")
        || body.ends_with(" deleted")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn notice_kind(rest: &str) -> Option<NoticeKind> {
        match classify_body(rest, 1) {
            EventBody::Notice { kind, .. } => Some(kind),
            EventBody::Authored { .. } => None,
        }
    }

    #[test]
    fn parses_both_year_widths() {
        let short = parse_timestamp("01/02/21", "07:52:45", 1).unwrap();
        assert_eq!((short.day(), short.month(), short.year()), (1, 2, 2021));
        assert_eq!((short.hour(), short.minute(), short.second()), (7, 52, 45));

        let long = parse_timestamp("1/2/2099", "23:59:59", 1).unwrap();
        assert_eq!(long.year(), 2099);
    }

    #[test]
    fn rejects_impossible_dates_and_times() {
        for (date, time) in [
            ("01/13/21", "07:52:45"),
            ("32/01/21", "07:52:45"),
            ("29/02/21", "07:52:45"),
            ("01/01/21", "24:00:00"),
            ("01/01/21", "12:60:00"),
            ("01/01/21", "12:00:60"),
            ("01/01/0099", "07:52:45"),
            ("01/01/1999", "07:52:45"),
            ("01/01/2101", "07:52:45"),
        ] {
            let err = parse_timestamp(date, time, 7).unwrap_err();
            match err {
                AnalysisError::MalformedTimestamp { line, value } => {
                    assert_eq!(line, 7);
                    assert_eq!(value, format!("{} {}", date, time));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn authored_lines_split_at_first_colon() {
        assert_eq!(
            classify_body("Mary: We are fine: really", 1),
            EventBody::Authored {
                actor: "Mary",
                body: "We are fine: really"
            }
        );
        assert_eq!(
            classify_body("Joel:", 1),
            EventBody::Authored {
                actor: "Joel",
                body: ""
            }
        );
    }

    #[test]
    fn media_and_deletion_templates() {
        assert_eq!(notice_kind("Joel: image omitted"), Some(NoticeKind::ImageOmitted));
        assert_eq!(notice_kind("Joel: GIF omitted"), Some(NoticeKind::GifOmitted));
        assert_eq!(notice_kind("Joel: <Media omitted>"), Some(NoticeKind::MediaOmitted));
        assert_eq!(
            notice_kind("Joel: report.pdf • 3 pages document omitted"),
            Some(NoticeKind::DocumentOmitted)
        );
        assert_eq!(
            notice_kind("Joel: This message was deleted"),
            Some(NoticeKind::MessageDeleted)
        );
    }

    #[test]
    fn templates_are_case_sensitive() {
        assert_eq!(notice_kind("Joel: Image omitted"), None);
        assert_eq!(notice_kind("Joel: image omitted please"), None);
    }

    #[test]
    fn document_notice_needs_a_file_name() {
        assert_eq!(
            notice_kind("Joel: notes.txt document omitted"),
            Some(NoticeKind::DocumentOmitted)
        );
        assert_eq!(
            notice_kind("Joel: Relatório final.docx • 12 pages document omitted"),
            Some(NoticeKind::DocumentOmitted)
        );
        assert_eq!(notice_kind("Joel: sorry, the signed document omitted"), None);
        assert_eq!(notice_kind("Joel: ok. the document omitted"), None);
    }

    #[test]
    fn authored_notice_keeps_actor_as_subject() {
        assert_eq!(
            classify_body("Joel: image omitted", 1),
            EventBody::Notice {
                kind: NoticeKind::ImageOmitted,
                subject: Some("Joel"),
                target: None
            }
        );
    }

    #[test]
    fn membership_templates() {
        assert_eq!(
            classify_body("John left", 1),
            EventBody::Notice {
                kind: NoticeKind::ParticipantLeft,
                subject: Some("John"),
                target: None
            }
        );
        assert_eq!(
            classify_body("Ana added Bob", 1),
            EventBody::Notice {
                kind: NoticeKind::ParticipantAdded,
                subject: Some("Ana"),
                target: Some("Bob")
            }
        );
        assert_eq!(
            notice_kind("Bob joined using this group's invite link"),
            Some(NoticeKind::ParticipantJoined)
        );
        assert_eq!(notice_kind("Ana removed Bob"), Some(NoticeKind::ParticipantRemoved));
        assert_eq!(
            notice_kind("Ana changed the subject from \"A\" to \"B: c\""),
            Some(NoticeKind::SubjectChanged)
        );
    }

    #[test]
    fn quoted_membership_text_stays_a_message() {
        assert_eq!(
            classify_body("Mary: Joel left", 1),
            EventBody::Authored {
                actor: "Mary",
                body: "Joel left"
            }
        );
    }

    #[test]
    fn unknown_notice_variant_stays_a_message() {
        assert_eq!(
            classify_body("Joel: <attached: 0001-PHOTO.jpg>", 1),
            EventBody::Authored {
                actor: "Joel",
                body: "<attached: 0001-PHOTO.jpg>"
            }
        );
    }

    #[test]
    fn unrecognized_authorless_header_is_other_notice() {
        assert_eq!(
            notice_kind("Your security code with Ana changed"),
            Some(NoticeKind::Other)
        );
    }

    #[test]
    fn encryption_banner_with_or_without_author() {
        assert_eq!(
            notice_kind("Messages and calls are end-to-end encrypted. No one outside of this chat can read them."),
            Some(NoticeKind::EncryptionNotice)
        );
        assert_eq!(
            notice_kind("Family: Messages and calls are end-to-end encrypted. Tap to learn more."),
            Some(NoticeKind::EncryptionNotice)
        );
    }
}
