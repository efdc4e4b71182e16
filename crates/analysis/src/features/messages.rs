use super::{mean_median, AggregationResult, Bucket, Cell, Column, Feature, RowKey};
use crate::content::ContentProfile;
use crate::error::AnalysisResult;
use crate::timeline::{Event, Timeline};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Message and notice counts by actor, day and month, with message length
/// distributions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessagesFeature;

#[derive(Debug, Default)]
struct Tally {
    messages: usize,
    system_messages: usize,
    chars: Vec<usize>,
    words: Vec<usize>,
    net_chars: usize,
    pure_chars: usize,
}

impl Tally {
    fn add_message(&mut self, profile: &ContentProfile) {
        self.messages += 1;
        self.chars.push(profile.total_chars);
        self.words.push(profile.words);
        self.net_chars += profile.net_chars();
        self.pure_chars += profile.pure_chars();
    }

    fn into_cells(mut self) -> Vec<Cell> {
        let mut cells = vec![
            Cell::count(self.messages),
            Cell::count(self.system_messages),
        ];
        cells.extend(distribution(&mut self.chars));
        cells.extend(distribution(&mut self.words));
        cells.push(Cell::count(self.net_chars));
        cells.push(Cell::count(self.pure_chars));
        cells
    }
}

fn distribution(values: &mut [usize]) -> Vec<Cell> {
    let min = values.iter().min().copied();
    let max = values.iter().max().copied();
    match (min, max, mean_median(values)) {
        (Some(min), Some(max), Some((mean, median))) => vec![
            Cell::count(min),
            Cell::count(max),
            Cell::Number(mean),
            Cell::Number(median),
        ],
        _ => vec![Cell::Empty; 4],
    }
}

impl Feature for MessagesFeature {
    fn name(&self) -> &str {
        "messages"
    }

    fn compute(&self, timeline: &Timeline) -> AnalysisResult<AggregationResult> {
        let mut global = Tally::default();
        let mut by_actor: Vec<Tally> = timeline.actors().iter().map(|_| Tally::default()).collect();
        let mut by_day: BTreeMap<NaiveDate, Tally> = BTreeMap::new();
        let mut by_month: BTreeMap<(i32, u32), Tally> = BTreeMap::new();

        for event in timeline.events() {
            let timestamp = event.timestamp();
            let day = by_day.entry(timestamp.date()).or_default();
            let month = by_month
                .entry((timestamp.year(), timestamp.month()))
                .or_default();
            let actor = match event.actor() {
                Some(id) => by_actor.get_mut(id.index()),
                None => None,
            };

            match event {
                Event::Message(message) => {
                    let profile = ContentProfile::of(message.body());
                    global.add_message(&profile);
                    day.add_message(&profile);
                    month.add_message(&profile);
                    if let Some(actor) = actor {
                        actor.add_message(&profile);
                    }
                }
                Event::System(_) => {
                    global.system_messages += 1;
                    day.system_messages += 1;
                    month.system_messages += 1;
                    if let Some(actor) = actor {
                        actor.system_messages += 1;
                    }
                }
            }
        }

        let mut result = AggregationResult::new(
            self.name(),
            "Messages",
            vec![
                Column::new("messages", "Messages", "messages"),
                Column::new("system_messages", "System messages", "notices"),
                Column::new("chars_min", "Shortest message", "characters"),
                Column::new("chars_max", "Longest message", "characters"),
                Column::new("chars_mean", "Mean length", "characters"),
                Column::new("chars_median", "Median length", "characters"),
                Column::new("words_min", "Fewest words", "words"),
                Column::new("words_max", "Most words", "words"),
                Column::new("words_mean", "Mean words", "words"),
                Column::new("words_median", "Median words", "words"),
                Column::new("net_chars", "Net characters", "characters"),
                Column::new("pure_chars", "Pure characters", "characters"),
            ],
        );

        result.push_row(RowKey::global(), "All", global.into_cells());
        for (actor, tally) in timeline.actors().iter().zip(by_actor) {
            result.push_row(
                RowKey::actor(actor.id()),
                actor.display_name(),
                tally.into_cells(),
            );
        }
        for (date, tally) in by_day {
            let bucket = Bucket::Day(date);
            result.push_row(RowKey::bucket(bucket), bucket.label(), tally.into_cells());
        }
        for ((year, month), tally) in by_month {
            let bucket = Bucket::Month { year, month };
            result.push_row(RowKey::bucket(bucket), bucket.label(), tally.into_cells());
        }

        Ok(result)
    }
}
