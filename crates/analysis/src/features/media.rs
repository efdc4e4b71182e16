use super::{push_ranked, AggregationResult, Cell, Column, Feature, Frequencies, RowKey};
use crate::content::ContentProfile;
use crate::error::AnalysisResult;
use crate::timeline::{Event, Timeline};
use chatscope_core::NoticeKind;
use url::Url;

/// Sites grouped under one display name regardless of the host used.
const KNOWN_SITES: &[(&str, &str)] = &[
    ("youtu.be", "YouTube"),
    ("youtube.com", "YouTube"),
    ("whatsapp.com", "WhatsApp"),
    ("t.me", "Telegram"),
    ("uol.com.br", "UOL"),
    ("glo.bo", "Globo"),
    ("globo.com", "Globo"),
    ("bit.ly", "Bitly"),
    ("metropoles.com", "Metrópoles"),
    ("theintercept.com", "The Intercept"),
    ("estadao.com.br", "Estadão"),
    ("diarioonline.com.br", "Diário Online"),
    ("brasildefato.com.br", "Brasil de Fato"),
    ("ig.com.br", "IG"),
    ("terrabrasilnoticias.com", "Terra Brasil Notícias"),
    ("folhadapolitica.com", "Folha da Política"),
    ("gazetadopovo.com.br", "Gazeta do Povo"),
];

/// Display name of the site a link points to: a known site name, or the
/// host without `www.`. `None` when the link has no host.
pub fn site_of(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let known = KNOWN_SITES.iter().find(|(domain, _)| {
        host == *domain
            || host
                .strip_suffix(domain)
                .is_some_and(|sub| sub.ends_with('.'))
    });
    Some(match known {
        Some((_, name)) => name.to_string(),
        None => host.to_string(),
    })
}

/// Notice kinds that stand in for shared media, in declaration order.
fn media_kinds() -> impl Iterator<Item = NoticeKind> {
    NoticeKind::ALL.into_iter().filter(NoticeKind::is_media)
}

#[derive(Debug)]
struct Repertoire {
    messages: usize,
    links: usize,
    net_words: usize,
    media: Vec<usize>,
}

impl Repertoire {
    fn new() -> Self {
        Self {
            messages: 0,
            links: 0,
            net_words: 0,
            media: vec![0; media_kinds().count()],
        }
    }

    fn add_notice(&mut self, kind: NoticeKind) {
        if let Some(i) = media_kinds().position(|media| media == kind) {
            self.media[i] += 1;
        }
    }

    fn media_count(&self, kind: NoticeKind) -> usize {
        media_kinds()
            .position(|media| media == kind)
            .map_or(0, |i| self.media[i])
    }

    /// Net words count once, videos twice and stickers three times.
    fn participation(&self) -> f64 {
        let videos = self.media_count(NoticeKind::VideoOmitted);
        let stickers = self.media_count(NoticeKind::StickerOmitted);
        (self.net_words + 2 * videos + 3 * stickers) as f64 / 6.0
    }

    fn into_cells(self) -> Vec<Cell> {
        let links_per_message = if self.messages == 0 {
            Cell::Empty
        } else {
            Cell::Number(self.links as f64 / self.messages as f64)
        };
        let participation = self.participation();

        let mut cells = vec![
            Cell::count(self.messages),
            Cell::count(self.links),
            links_per_message,
        ];
        cells.extend(self.media.into_iter().map(Cell::count));
        cells.push(Cell::count(self.net_words));
        cells.push(Cell::Number(participation));
        cells
    }
}

/// Shared links and omitted-media notices, globally and per actor, with a
/// participation score weighing written words against videos and stickers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaFeature;

impl Feature for MediaFeature {
    fn name(&self) -> &str {
        "media"
    }

    fn compute(&self, timeline: &Timeline) -> AnalysisResult<AggregationResult> {
        let mut global = Repertoire::new();
        let mut by_actor: Vec<Repertoire> =
            timeline.actors().iter().map(|_| Repertoire::new()).collect();

        for event in timeline.events() {
            let mut actor = match event.actor() {
                Some(id) => by_actor.get_mut(id.index()),
                None => None,
            };
            match event {
                Event::Message(message) => {
                    let profile = ContentProfile::of(message.body());
                    let words = profile.net_text.split_whitespace().count();
                    for repertoire in [Some(&mut global), actor.as_deref_mut()]
                        .into_iter()
                        .flatten()
                    {
                        repertoire.messages += 1;
                        repertoire.links += profile.links.len();
                        repertoire.net_words += words;
                    }
                }
                Event::System(notice) => {
                    global.add_notice(notice.kind());
                    if let Some(repertoire) = actor {
                        repertoire.add_notice(notice.kind());
                    }
                }
            }
        }

        let mut columns = vec![
            Column::new("messages", "Messages", "messages"),
            Column::new("links", "Links", "links"),
            Column::new("links_per_message", "Links per message", "links"),
        ];
        columns.extend(media_kinds().map(|kind| Column::new(kind.key(), kind.key(), "notices")));
        columns.push(Column::new("net_words", "Net words", "words"));
        columns.push(Column::new("participation", "Participation score", "score"));

        let mut result = AggregationResult::new(self.name(), "Media repertoire", columns);
        result.push_row(RowKey::global(), "All", global.into_cells());
        for (actor, repertoire) in timeline.actors().iter().zip(by_actor) {
            result.push_row(
                RowKey::actor(actor.id()),
                actor.display_name(),
                repertoire.into_cells(),
            );
        }

        Ok(result)
    }
}

/// Sites linked to, most linked first, globally and per actor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainsFeature;

impl Feature for DomainsFeature {
    fn name(&self) -> &str {
        "domains"
    }

    fn compute(&self, timeline: &Timeline) -> AnalysisResult<AggregationResult> {
        let mut global = Frequencies::default();
        let mut by_actor: Vec<Frequencies> = timeline
            .actors()
            .iter()
            .map(|_| Frequencies::default())
            .collect();

        for message in timeline.messages() {
            for link in ContentProfile::of(message.body()).links {
                let Some(site) = site_of(&link) else {
                    continue;
                };
                global.add(&site);
                if let Some(frequencies) = by_actor.get_mut(message.actor().index()) {
                    frequencies.add(&site);
                }
            }
        }

        let mut result = AggregationResult::new(
            self.name(),
            "Linked sites",
            vec![
                Column::new("site", "Site", ""),
                Column::new("count", "Links", "links"),
                Column::new("rank", "Rank", ""),
            ],
        );
        push_ranked(&mut result, RowKey::global(), global, None);
        for (actor, frequencies) in timeline.actors().iter().zip(by_actor) {
            push_ranked(&mut result, RowKey::actor(actor.id()), frequencies, None);
        }

        Ok(result)
    }
}
