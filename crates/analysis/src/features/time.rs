use super::{AggregationResult, Bucket, Cell, Column, Feature, RowKey, WEEKDAYS};
use crate::content::ContentProfile;
use crate::error::AnalysisResult;
use crate::timeline::{ActorId, Message, Timeline};
use chatscope_core::{Period, SubPeriod};
use chrono::Datelike;
use std::collections::BTreeMap;

/// Message activity by period, sub-period and weekday of the day, globally,
/// per month and per actor. Every bucket gets a row, even when it is empty.
///
/// Rows carry the message count, its share of the enclosing scope in
/// percent, and net and pure character totals.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeFeature;

struct Sample<'a> {
    message: &'a Message,
    net_chars: usize,
    pure_chars: usize,
}

/// Which messages a group of bucket rows is computed over.
#[derive(Clone, Copy)]
enum Scope<'a> {
    All,
    Month(Bucket),
    Actor(ActorId, &'a str),
}

impl Scope<'_> {
    fn key(&self, bucket: Bucket) -> RowKey {
        match *self {
            Scope::All => RowKey::bucket(bucket),
            Scope::Month(month) => RowKey::nested(month, bucket),
            Scope::Actor(id, _) => RowKey::actor_bucket(id, bucket),
        }
    }

    fn label(&self, bucket: Bucket) -> String {
        match self {
            Scope::All => bucket.label(),
            Scope::Month(month) => format!("{} / {}", month.label(), bucket.label()),
            Scope::Actor(_, name) => format!("{} / {}", name, bucket.label()),
        }
    }
}

fn push_buckets(
    result: &mut AggregationResult,
    samples: &[&Sample<'_>],
    scope: Scope<'_>,
    buckets: impl IntoIterator<Item = Bucket>,
) {
    let total = samples.len();
    for bucket in buckets {
        let (mut count, mut net_chars, mut pure_chars) = (0, 0, 0);
        for sample in samples.iter().filter(|s| in_bucket(&bucket, s.message)) {
            count += 1;
            net_chars += sample.net_chars;
            pure_chars += sample.pure_chars;
        }
        let share = if total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / total as f64
        };
        result.push_row(
            scope.key(bucket),
            scope.label(bucket),
            vec![
                Cell::count(count),
                Cell::Number(share),
                Cell::count(net_chars),
                Cell::count(pure_chars),
            ],
        );
    }
}

fn in_bucket(bucket: &Bucket, message: &Message) -> bool {
    let moment = message.moment();
    match bucket {
        Bucket::Period(period) => moment.period() == *period,
        Bucket::SubPeriod(sub_period) => moment.sub_period() == *sub_period,
        Bucket::Weekday(weekday) => moment.timestamp().weekday() == *weekday,
        Bucket::Day(date) => moment.timestamp().date() == *date,
        Bucket::Month { year, month } => {
            moment.timestamp().year() == *year && moment.timestamp().month() == *month
        }
    }
}

fn day_buckets() -> impl Iterator<Item = Bucket> {
    Period::ALL
        .into_iter()
        .map(Bucket::Period)
        .chain(SubPeriod::ALL.into_iter().map(Bucket::SubPeriod))
}

fn week_buckets() -> impl Iterator<Item = Bucket> {
    WEEKDAYS.into_iter().map(Bucket::Weekday)
}

impl Feature for TimeFeature {
    fn name(&self) -> &str {
        "time"
    }

    fn compute(&self, timeline: &Timeline) -> AnalysisResult<AggregationResult> {
        let mut result = AggregationResult::new(
            self.name(),
            "Messages by time of day",
            vec![
                Column::new("messages", "Messages", "messages"),
                Column::new("share", "Share", "percent"),
                Column::new("net_chars", "Net characters", "characters"),
                Column::new("pure_chars", "Pure characters", "characters"),
            ],
        );

        let samples: Vec<Sample<'_>> = timeline
            .messages()
            .map(|message| {
                let profile = ContentProfile::of(message.body());
                Sample {
                    message,
                    net_chars: profile.net_chars(),
                    pure_chars: profile.pure_chars(),
                }
            })
            .collect();

        let all: Vec<&Sample<'_>> = samples.iter().collect();
        push_buckets(&mut result, &all, Scope::All, day_buckets().chain(week_buckets()));

        let mut by_month: BTreeMap<(i32, u32), Vec<&Sample<'_>>> = BTreeMap::new();
        for sample in &samples {
            let timestamp = sample.message.moment().timestamp();
            by_month
                .entry((timestamp.year(), timestamp.month()))
                .or_default()
                .push(sample);
        }
        for ((year, month), own) in by_month {
            push_buckets(
                &mut result,
                &own,
                Scope::Month(Bucket::Month { year, month }),
                day_buckets().chain(week_buckets()),
            );
        }

        for actor in timeline.actors() {
            let own: Vec<&Sample<'_>> = samples
                .iter()
                .filter(|sample| sample.message.actor() == actor.id())
                .collect();
            push_buckets(
                &mut result,
                &own,
                Scope::Actor(actor.id(), actor.display_name()),
                day_buckets(),
            );
        }

        Ok(result)
    }
}
