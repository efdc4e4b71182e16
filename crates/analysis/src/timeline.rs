use crate::error::{AnalysisError, AnalysisResult};
use crate::parsers::{EventBody, EventParser, LineClassifier, LineKind};
use crate::temporal;
use chatscope_core::{NoticeKind, Period, SubPeriod};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use tracing::{debug, info};

const RENDER_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Stable identity of an actor: its first-seen position in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ActorId(u32);

impl ActorId {
    /// Zero-based registry index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A conversation participant. Only the timeline builder creates actors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    id: ActorId,
    display_name: String,
}

impl Actor {
    /// Registry identity.
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Contact string as it appears in the transcript.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Where and when an event sits in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Moment {
    ordinal: usize,
    timestamp: NaiveDateTime,
    period: Period,
    sub_period: SubPeriod,
}

impl Moment {
    fn new(ordinal: usize, timestamp: NaiveDateTime) -> Self {
        let (period, sub_period) = temporal::classify(timestamp);
        Self {
            ordinal,
            timestamp,
            period,
            sub_period,
        }
    }

    /// Zero-based position among all events.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Transcript-local timestamp.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Cached period of the day.
    pub fn period(&self) -> Period {
        self.period
    }

    /// Cached sub-period of the day.
    pub fn sub_period(&self) -> SubPeriod {
        self.sub_period
    }
}

/// Content authored by a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    #[serde(flatten)]
    moment: Moment,
    actor: ActorId,
    body: String,
}

impl Message {
    /// Position and time of the message.
    pub fn moment(&self) -> &Moment {
        &self.moment
    }

    /// Author.
    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Message text; continuation lines are joined with `\n`.
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// A notice generated by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemMessage {
    #[serde(flatten)]
    moment: Moment,
    kind: NoticeKind,
    text: String,
    subject: Option<String>,
    target: Option<String>,
    actor: Option<ActorId>,
}

impl SystemMessage {
    /// Position and time of the notice.
    pub fn moment(&self) -> &Moment {
        &self.moment
    }

    /// Matched notice template.
    pub fn kind(&self) -> NoticeKind {
        self.kind
    }

    /// Header text after the timestamp, plus any continuation lines.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Participant named by the notice, as written.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Second participant of an added/removed notice, as written.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// The subject, when it is also a message author.
    pub fn actor(&self) -> Option<ActorId> {
        self.actor
    }
}

/// A timestamped transcript occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Authored content.
    Message(Message),
    /// Platform notice.
    System(SystemMessage),
}

impl Event {
    /// Position and time of the event.
    pub fn moment(&self) -> &Moment {
        match self {
            Event::Message(message) => &message.moment,
            Event::System(notice) => &notice.moment,
        }
    }

    /// Transcript-local timestamp.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.moment().timestamp
    }

    /// Zero-based position among all events.
    pub fn ordinal(&self) -> usize {
        self.moment().ordinal
    }

    /// Actor credited with the event, if any.
    pub fn actor(&self) -> Option<ActorId> {
        match self {
            Event::Message(message) => Some(message.actor),
            Event::System(notice) => notice.actor,
        }
    }

    /// The message, if this event is one.
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Event::Message(message) => Some(message),
            Event::System(_) => None,
        }
    }

    /// The notice, if this event is one.
    pub fn as_system(&self) -> Option<&SystemMessage> {
        match self {
            Event::Message(_) => None,
            Event::System(notice) => Some(notice),
        }
    }

    fn append_line(&mut self, line: &str) {
        let text = match self {
            Event::Message(message) => &mut message.body,
            Event::System(notice) => &mut notice.text,
        };
        text.push('\n');
        text.push_str(line);
    }
}

/// The sealed, ordered events of one transcript plus its actor registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    events: Vec<Event>,
    actors: Vec<Actor>,
}

impl Timeline {
    /// Events in transcript order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Actors in first-seen order.
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Look up an actor by identity.
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id.index())
    }

    /// Display name of `id`, or an empty string for a foreign id.
    pub fn actor_name(&self, id: ActorId) -> &str {
        self.actor(id).map(Actor::display_name).unwrap_or_default()
    }

    /// Look up an actor by exact display name.
    pub fn actor_by_name(&self, name: &str) -> Option<&Actor> {
        self.actors.iter().find(|actor| actor.display_name == name)
    }

    /// Authored messages in transcript order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.events.iter().filter_map(Event::as_message)
    }

    /// Platform notices in transcript order.
    pub fn system_messages(&self) -> impl Iterator<Item = &SystemMessage> + '_ {
        self.events.iter().filter_map(Event::as_system)
    }

    /// Messages authored by `actor`.
    pub fn messages_by(&self, actor: ActorId) -> impl Iterator<Item = &Message> + '_ {
        self.messages().filter(move |message| message.actor == actor)
    }

    /// Number of authored messages.
    pub fn message_count(&self) -> usize {
        self.messages().count()
    }

    /// Number of platform notices.
    pub fn system_message_count(&self) -> usize {
        self.system_messages().count()
    }

    /// Earliest and latest timestamps. Transcript order is kept as-is, so
    /// these are not necessarily the first and last events.
    pub fn span(&self) -> (NaiveDateTime, NaiveDateTime) {
        let first = self.events[0].timestamp();
        self.events
            .iter()
            .map(Event::timestamp)
            .fold((first, first), |(lo, hi), ts| (lo.min(ts), hi.max(ts)))
    }

    /// Render the canonical transcript text. Parsing it gives back an equal
    /// timeline.
    pub fn to_transcript(&self) -> String {
        let mut out = String::new();
        for event in &self.events {
            let timestamp = event.timestamp().format(RENDER_FORMAT);
            // Writing to a String cannot fail.
            let _ = match event {
                Event::Message(message) => writeln!(
                    out,
                    "[{}] {}: {}",
                    timestamp,
                    self.actor_name(message.actor),
                    message.body
                ),
                Event::System(notice) => writeln!(out, "[{}] {}", timestamp, notice.text),
            };
        }
        out
    }
}

/// Drives line classification and event parsing into a [`Timeline`].
///
/// The builder is the only owner of the actor registry; once
/// [`finish`](Self::finish) returns, the timeline is read-only.
#[derive(Debug, Default)]
pub struct TimelineBuilder {
    classifier: LineClassifier,
    parser: EventParser,
    events: Vec<Event>,
    actors: Vec<Actor>,
    registry: HashMap<String, ActorId>,
    line_number: usize,
    orphan_lines: usize,
}

impl TimelineBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next raw line (without its line terminator).
    pub fn push_line(&mut self, line: &str) -> AnalysisResult<()> {
        self.line_number += 1;

        match self.classifier.classify(line, !self.events.is_empty()) {
            LineKind::Header(header) => {
                let parsed = self.parser.parse(&header, self.line_number)?;
                let moment = Moment::new(self.events.len(), parsed.timestamp);
                let event = match parsed.body {
                    EventBody::Authored { actor, body } => Event::Message(Message {
                        moment,
                        actor: self.intern(actor),
                        body: body.to_string(),
                    }),
                    EventBody::Notice {
                        kind,
                        subject,
                        target,
                    } => Event::System(SystemMessage {
                        moment,
                        kind,
                        text: parsed.text.to_string(),
                        subject: subject.map(str::to_string),
                        target: target.map(str::to_string),
                        actor: None,
                    }),
                };
                self.events.push(event);
            }
            LineKind::Continuation(text) => {
                if let Some(open) = self.events.last_mut() {
                    open.append_line(text);
                }
            }
            LineKind::Orphan(text) => {
                self.orphan_lines += 1;
                debug!(line = self.line_number, text, "Dropping line before first event");
            }
        }

        Ok(())
    }

    /// Seal the timeline. Fails when no line opened an event.
    pub fn finish(self) -> AnalysisResult<Timeline> {
        if self.events.is_empty() {
            return Err(AnalysisError::EmptyTranscript);
        }

        let registry = self.registry;
        let mut events = self.events;
        for event in &mut events {
            if let Event::System(notice) = event {
                notice.actor = notice
                    .subject
                    .as_deref()
                    .and_then(|name| registry.get(name).copied());
            }
        }

        let timeline = Timeline {
            events,
            actors: self.actors,
        };
        info!(
            events = timeline.events.len(),
            messages = timeline.message_count(),
            system_messages = timeline.system_message_count(),
            actors = timeline.actors.len(),
            orphan_lines = self.orphan_lines,
            "Timeline sealed"
        );
        Ok(timeline)
    }

    fn intern(&mut self, name: &str) -> ActorId {
        if let Some(id) = self.registry.get(name) {
            return *id;
        }
        let id = ActorId(self.actors.len() as u32);
        self.actors.push(Actor {
            id,
            display_name: name.to_string(),
        });
        self.registry.insert(name.to_string(), id);
        id
    }
}
