use super::{AggregationResult, Cell, Column, Feature, RowKey};
use crate::content::ContentProfile;
use crate::error::AnalysisResult;
use crate::timeline::{Event, Timeline};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeSet;

/// Participation of each actor, busiest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActorsFeature;

#[derive(Debug, Default)]
struct Participation {
    messages: usize,
    system_messages: usize,
    first_seen: Option<NaiveDateTime>,
    last_seen: Option<NaiveDateTime>,
    active_days: BTreeSet<NaiveDate>,
    net_chars: usize,
    pure_chars: usize,
}

impl Participation {
    fn seen(&mut self, timestamp: NaiveDateTime) {
        self.first_seen = Some(self.first_seen.map_or(timestamp, |t| t.min(timestamp)));
        self.last_seen = Some(self.last_seen.map_or(timestamp, |t| t.max(timestamp)));
    }

    fn cells(&self) -> Vec<Cell> {
        let span = match (self.first_seen, self.last_seen) {
            (Some(first), Some(last)) => Some(last - first),
            _ => None,
        };
        vec![
            Cell::count(self.messages),
            Cell::count(self.system_messages),
            self.first_seen.map_or(Cell::Empty, Cell::Time),
            self.last_seen.map_or(Cell::Empty, Cell::Time),
            span.map_or(Cell::Empty, |s| Cell::Count(s.num_seconds().max(0) as u64)),
            span.map_or(Cell::Empty, |s| Cell::Count(s.num_days().max(0) as u64)),
            Cell::count(self.active_days.len()),
            Cell::count(self.net_chars),
            Cell::count(self.pure_chars),
        ]
    }
}

impl Feature for ActorsFeature {
    fn name(&self) -> &str {
        "actors"
    }

    fn compute(&self, timeline: &Timeline) -> AnalysisResult<AggregationResult> {
        let mut participation: Vec<Participation> = timeline
            .actors()
            .iter()
            .map(|_| Participation::default())
            .collect();

        for event in timeline.events() {
            let Some(id) = event.actor() else {
                continue;
            };
            let Some(entry) = participation.get_mut(id.index()) else {
                continue;
            };
            entry.seen(event.timestamp());
            match event {
                Event::Message(message) => {
                    let profile = ContentProfile::of(message.body());
                    entry.messages += 1;
                    entry.active_days.insert(event.timestamp().date());
                    entry.net_chars += profile.net_chars();
                    entry.pure_chars += profile.pure_chars();
                }
                Event::System(_) => entry.system_messages += 1,
            }
        }

        let mut ranked: Vec<_> = timeline.actors().iter().zip(&participation).collect();
        ranked.sort_by(|(_, a), (_, b)| b.messages.cmp(&a.messages));

        let mut result = AggregationResult::new(
            self.name(),
            "Actors",
            vec![
                Column::new("messages", "Messages", "messages"),
                Column::new("system_messages", "System messages", "notices"),
                Column::new("first_seen", "First seen", "timestamp"),
                Column::new("last_seen", "Last seen", "timestamp"),
                Column::new("span_seconds", "Participation span", "seconds"),
                Column::new("span_days", "Participation span", "days"),
                Column::new("active_days", "Active days", "days"),
                Column::new("net_chars", "Net characters", "characters"),
                Column::new("pure_chars", "Pure characters", "characters"),
            ],
        );
        for (actor, entry) in ranked {
            result.push_row(RowKey::actor(actor.id()), actor.display_name(), entry.cells());
        }
        Ok(result)
    }
}
