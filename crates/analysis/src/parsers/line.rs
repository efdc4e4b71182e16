use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\[(?P<date>\d{1,2}/\d{1,2}/(?:\d{4}|\d{2})) (?P<time>\d{2}:\d{2}:\d{2})\] (?P<rest>.*)$",
    )
    .expect("header pattern is valid")
});

/// The pieces of a line that opens a new event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header<'a> {
    /// `dd/mm/yy` or `dd/mm/yyyy`.
    pub date: &'a str,
    /// `hh:mm:ss`.
    pub time: &'a str,
    /// Everything after the bracketed timestamp.
    pub rest: &'a str,
}

impl<'a> Header<'a> {
    /// Match a raw line against the bracketed header convention.
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = HEADER_RE.captures(line)?;
        Some(Self {
            date: caps.name("date")?.as_str(),
            time: caps.name("time")?.as_str(),
            rest: caps.name("rest")?.as_str(),
        })
    }
}

/// Decision taken for one raw line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// The line opens a new event.
    Header(Header<'a>),
    /// The line extends the body of the open event.
    Continuation(&'a str),
    /// The line precedes any event and is dropped.
    Orphan(&'a str),
}

/// Decides whether a line starts a new event or continues the open one.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineClassifier;

impl LineClassifier {
    /// Classify `line` given whether an event is currently open.
    pub fn classify<'a>(&self, line: &'a str, has_open_event: bool) -> LineKind<'a> {
        match Header::parse(line) {
            Some(header) => LineKind::Header(header),
            None if has_open_event => LineKind::Continuation(line),
            None => LineKind::Orphan(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_two_and_four_digit_years() {
        let short = Header::parse("[01/01/21 07:52:45] Joel: Hello!").unwrap();
        assert_eq!(short.date, "01/01/21");
        assert_eq!(short.time, "07:52:45");
        assert_eq!(short.rest, "Joel: Hello!");

        let long = Header::parse("[1/12/2021 23:00:00] Mary: Hi").unwrap();
        assert_eq!(long.date, "1/12/2021");
    }

    #[test]
    fn rejects_near_misses() {
        assert!(Header::parse("01/01/21 07:52:45 Joel: Hello!").is_none());
        assert!(Header::parse("[01/01/021 07:52:45] Joel: Hello!").is_none());
        assert!(Header::parse("[01/01/21 7:52] Joel: Hello!").is_none());
        assert!(Header::parse("[01/01/21 07:52:45]Joel: Hello!").is_none());
        assert!(Header::parse("How about you?").is_none());
    }

    #[test]
    fn non_header_lines_depend_on_open_event() {
        let classifier = LineClassifier;
        assert_eq!(
            classifier.classify("How about you?", true),
            LineKind::Continuation("How about you?")
        );
        assert_eq!(
            classifier.classify("How about you?", false),
            LineKind::Orphan("How about you?")
        );
        assert!(matches!(
            classifier.classify("[01/01/21 07:53:03] John left", false),
            LineKind::Header(_)
        ));
    }

    #[test]
    fn calendar_validation_is_not_done_here() {
        // Month 13 still has the header shape; the event parser rejects it.
        assert!(Header::parse("[01/13/21 07:52:45] Joel: Hello!").is_some());
    }
}
