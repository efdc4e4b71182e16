use super::{AggregationResult, Bucket, Cell, Column, Feature, RowKey};
use crate::content::ContentProfile;
use crate::error::AnalysisResult;
use crate::timeline::Timeline;
use chrono::Datelike;
use std::collections::BTreeMap;

/// One occurrence count taken from a content profile.
struct Aspect {
    key: &'static str,
    label: &'static str,
    unit: &'static str,
    measure: fn(&ContentProfile) -> usize,
}

fn laughs(profile: &ContentProfile) -> usize {
    profile.laughs.len()
}

fn marks(profile: &ContentProfile) -> usize {
    profile.marks().count()
}

fn emojis(profile: &ContentProfile) -> usize {
    profile.emojis.len()
}

fn numbers(profile: &ContentProfile) -> usize {
    profile.numbers.len()
}

fn pure_words(profile: &ContentProfile) -> usize {
    profile.pure_text.split_whitespace().count()
}

fn links(profile: &ContentProfile) -> usize {
    profile.links.len()
}

fn emails(profile: &ContentProfile) -> usize {
    profile.emails.len()
}

fn mentions(profile: &ContentProfile) -> usize {
    profile.mentions.len()
}

fn net_words(profile: &ContentProfile) -> usize {
    profile.net_text.split_whitespace().count()
}

const FABRICATIONS: &[Aspect] = &[
    Aspect {
        key: "laughs",
        label: "Laughs",
        unit: "occurrences",
        measure: laughs,
    },
    Aspect {
        key: "marks",
        label: "Marks",
        unit: "occurrences",
        measure: marks,
    },
    Aspect {
        key: "emojis",
        label: "Emojis",
        unit: "occurrences",
        measure: emojis,
    },
    Aspect {
        key: "numbers",
        label: "Numbers",
        unit: "occurrences",
        measure: numbers,
    },
    Aspect {
        key: "pure_words",
        label: "Pure words",
        unit: "words",
        measure: pure_words,
    },
];

const LAMINATIONS: &[Aspect] = &[
    Aspect {
        key: "links",
        label: "Links",
        unit: "occurrences",
        measure: links,
    },
    Aspect {
        key: "emails",
        label: "E-mails",
        unit: "occurrences",
        measure: emails,
    },
    Aspect {
        key: "mentions",
        label: "Mentions",
        unit: "occurrences",
        measure: mentions,
    },
    Aspect {
        key: "net_words",
        label: "Net words",
        unit: "words",
        measure: net_words,
    },
];

/// Per-aspect totals plus the message count, in column order.
#[derive(Debug, Clone)]
struct Totals(Vec<usize>);

impl Totals {
    fn new(aspects: &[Aspect]) -> Self {
        Self(vec![0; aspects.len() + 1])
    }

    fn add(&mut self, aspects: &[Aspect], profile: &ContentProfile) {
        for (total, aspect) in self.0.iter_mut().zip(aspects) {
            *total += (aspect.measure)(profile);
        }
        if let Some(messages) = self.0.last_mut() {
            *messages += 1;
        }
    }

    fn cells(&self) -> Vec<Cell> {
        self.0.iter().map(|&n| Cell::count(n)).collect()
    }
}

fn aggregate(
    name: &str,
    title: &str,
    aspects: &[Aspect],
    timeline: &Timeline,
) -> AggregationResult {
    let mut columns: Vec<Column> = aspects
        .iter()
        .map(|aspect| Column::new(aspect.key, aspect.label, aspect.unit))
        .collect();
    columns.push(Column::new("messages", "Messages", "messages"));

    let mut global = Totals::new(aspects);
    let mut by_month: BTreeMap<(i32, u32), Totals> = BTreeMap::new();
    let mut by_actor = vec![Totals::new(aspects); timeline.actors().len()];

    for message in timeline.messages() {
        let profile = ContentProfile::of(message.body());
        let timestamp = message.moment().timestamp();
        global.add(aspects, &profile);
        by_month
            .entry((timestamp.year(), timestamp.month()))
            .or_insert_with(|| Totals::new(aspects))
            .add(aspects, &profile);
        if let Some(totals) = by_actor.get_mut(message.actor().index()) {
            totals.add(aspects, &profile);
        }
    }

    let mut result = AggregationResult::new(name, title, columns);
    result.push_row(RowKey::global(), "All", global.cells());
    for ((year, month), totals) in by_month {
        let bucket = Bucket::Month { year, month };
        result.push_row(RowKey::bucket(bucket), bucket.label(), totals.cells());
    }
    for (actor, totals) in timeline.actors().iter().zip(&by_actor) {
        result.push_row(
            RowKey::actor(actor.id()),
            actor.display_name(),
            totals.cells(),
        );
    }
    result
}

/// Laughs, marks, emojis and numbers by month and by actor.
#[derive(Debug, Clone, Copy, Default)]
pub struct FabricationsFeature;

impl Feature for FabricationsFeature {
    fn name(&self) -> &str {
        "fabrications"
    }

    fn compute(&self, timeline: &Timeline) -> AnalysisResult<AggregationResult> {
        Ok(aggregate(self.name(), "Fabrications", FABRICATIONS, timeline))
    }
}

/// Links, e-mails and mentions by month and by actor.
#[derive(Debug, Clone, Copy, Default)]
pub struct LaminationsFeature;

impl Feature for LaminationsFeature {
    fn name(&self) -> &str {
        "laminations"
    }

    fn compute(&self, timeline: &Timeline) -> AnalysisResult<AggregationResult> {
        Ok(aggregate(self.name(), "Laminations", LAMINATIONS, timeline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::TranscriptParser;

    fn timeline() -> Timeline {
        TranscriptParser::new()
            .parse_str(
                "[01/01/21 07:52:45] Joel: kkkk 3 gols :)\n\
                 [05/01/21 07:52:47] Mary: see https://example.com and mail ana@example.org\n\
                 [02/02/21 07:52:49] Joel: hahaha 🎉 @5511999999999\n\
                 [02/02/21 07:53:00] Mary: image omitted\n",
            )
            .unwrap()
    }

    fn count(result: &AggregationResult, key: RowKey, column: &str) -> Option<u64> {
        result.value(&key, column).and_then(Cell::as_count)
    }

    #[test]
    fn fabrications_by_month_and_actor() {
        let timeline = timeline();
        let result = FabricationsFeature.compute(&timeline).unwrap();
        let january = RowKey::bucket(Bucket::Month {
            year: 2021,
            month: 1,
        });
        let joel = RowKey::actor(timeline.actor_by_name("Joel").unwrap().id());

        assert_eq!(count(&result, RowKey::global(), "messages"), Some(3));
        assert_eq!(count(&result, RowKey::global(), "laughs"), Some(2));
        assert_eq!(count(&result, january, "numbers"), Some(1));
        assert_eq!(count(&result, january, "messages"), Some(2));
        assert_eq!(count(&result, joel, "marks"), Some(2));
        assert_eq!(count(&result, joel, "emojis"), Some(1));
    }

    #[test]
    fn laminations_by_month_and_actor() {
        let timeline = timeline();
        let result = LaminationsFeature.compute(&timeline).unwrap();
        let mary = RowKey::actor(timeline.actor_by_name("Mary").unwrap().id());
        let february = RowKey::bucket(Bucket::Month {
            year: 2021,
            month: 2,
        });

        assert_eq!(count(&result, mary, "links"), Some(1));
        assert_eq!(count(&result, mary, "emails"), Some(1));
        assert_eq!(count(&result, february, "mentions"), Some(1));
        assert_eq!(count(&result, february, "messages"), Some(1));
        assert_eq!(result.row(&february).unwrap().label, "February 2021");
    }
}
