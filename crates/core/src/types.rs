use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse period of the day a transcript event happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// 00:00 - 05:59.
    Dawn,

    /// 06:00 - 11:59.
    Morning,

    /// 12:00 - 17:59.
    Evening,

    /// 18:00 - 23:59.
    Night,
}

impl Period {
    /// All periods in chronological order.
    pub const ALL: [Period; 4] = [
        Period::Dawn,
        Period::Morning,
        Period::Evening,
        Period::Night,
    ];

    /// Period containing the given hour (0-23).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => Period::Dawn,
            6..=11 => Period::Morning,
            12..=17 => Period::Evening,
            _ => Period::Night,
        }
    }

    /// Period containing the given time of day.
    pub fn from_time(time: NaiveTime) -> Self {
        Self::from_hour(time.hour())
    }

    /// Display label used in charts.
    pub fn label(&self) -> &'static str {
        match self {
            Period::Dawn => "Dawn",
            Period::Morning => "Morning",
            Period::Evening => "Evening",
            Period::Night => "Night",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Finer routine-oriented slice of the day.
///
/// Every sub-period lies entirely inside one [`Period`], see
/// [`SubPeriod::period`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubPeriod {
    /// 00:00 - 05:59.
    Resting,

    /// 06:00 - 08:59.
    TransportMorning,

    /// 09:00 - 11:59.
    WorkMorning,

    /// 12:00 - 14:59.
    Lunch,

    /// 15:00 - 17:59.
    WorkEvening,

    /// 18:00 - 20:59.
    TransportEvening,

    /// 21:00 - 23:59.
    SecondOfficeHour,
}

impl SubPeriod {
    /// All sub-periods in chronological order.
    pub const ALL: [SubPeriod; 7] = [
        SubPeriod::Resting,
        SubPeriod::TransportMorning,
        SubPeriod::WorkMorning,
        SubPeriod::Lunch,
        SubPeriod::WorkEvening,
        SubPeriod::TransportEvening,
        SubPeriod::SecondOfficeHour,
    ];

    /// Sub-period containing the given hour (0-23).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => SubPeriod::Resting,
            6..=8 => SubPeriod::TransportMorning,
            9..=11 => SubPeriod::WorkMorning,
            12..=14 => SubPeriod::Lunch,
            15..=17 => SubPeriod::WorkEvening,
            18..=20 => SubPeriod::TransportEvening,
            _ => SubPeriod::SecondOfficeHour,
        }
    }

    /// Sub-period containing the given time of day.
    pub fn from_time(time: NaiveTime) -> Self {
        Self::from_hour(time.hour())
    }

    /// The coarse period this sub-period refines.
    pub fn period(&self) -> Period {
        match self {
            SubPeriod::Resting => Period::Dawn,
            SubPeriod::TransportMorning | SubPeriod::WorkMorning => Period::Morning,
            SubPeriod::Lunch | SubPeriod::WorkEvening => Period::Evening,
            SubPeriod::TransportEvening | SubPeriod::SecondOfficeHour => Period::Night,
        }
    }

    /// Display label used in charts.
    pub fn label(&self) -> &'static str {
        match self {
            SubPeriod::Resting => "Resting",
            SubPeriod::TransportMorning => "Transport (morning)",
            SubPeriod::WorkMorning => "Work (morning)",
            SubPeriod::Lunch => "Lunch",
            SubPeriod::WorkEvening => "Work (evening)",
            SubPeriod::TransportEvening => "Transport (evening)",
            SubPeriod::SecondOfficeHour => "Second Office Hour",
        }
    }
}

impl fmt::Display for SubPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of a platform-generated notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// `image omitted`.
    ImageOmitted,

    /// `video omitted`.
    VideoOmitted,

    /// `audio omitted`.
    AudioOmitted,

    /// `sticker omitted`.
    StickerOmitted,

    /// `GIF omitted`.
    GifOmitted,

    /// `document omitted`, optionally preceded by the file description.
    DocumentOmitted,

    /// `Contact card omitted`.
    ContactCardOmitted,

    /// `<Media omitted>`, the media type is not named.
    MediaOmitted,

    /// `This message was deleted` / `You deleted this message`.
    MessageDeleted,

    /// End-to-end encryption banner.
    EncryptionNotice,

    /// A participant left the group.
    ParticipantLeft,

    /// A participant joined the group.
    ParticipantJoined,

    /// A participant added someone to the group.
    ParticipantAdded,

    /// A participant removed someone from the group.
    ParticipantRemoved,

    /// The group subject changed.
    SubjectChanged,

    /// The group icon changed.
    IconChanged,

    /// The group was created.
    GroupCreated,

    /// An authorless header matching no known template.
    Other,
}

impl NoticeKind {
    /// Every notice kind in declaration order.
    pub const ALL: [NoticeKind; 18] = [
        NoticeKind::ImageOmitted,
        NoticeKind::VideoOmitted,
        NoticeKind::AudioOmitted,
        NoticeKind::StickerOmitted,
        NoticeKind::GifOmitted,
        NoticeKind::DocumentOmitted,
        NoticeKind::ContactCardOmitted,
        NoticeKind::MediaOmitted,
        NoticeKind::MessageDeleted,
        NoticeKind::EncryptionNotice,
        NoticeKind::ParticipantLeft,
        NoticeKind::ParticipantJoined,
        NoticeKind::ParticipantAdded,
        NoticeKind::ParticipantRemoved,
        NoticeKind::SubjectChanged,
        NoticeKind::IconChanged,
        NoticeKind::GroupCreated,
        NoticeKind::Other,
    ];

    /// Stable snake_case key.
    pub fn key(&self) -> &'static str {
        match self {
            NoticeKind::ImageOmitted => "image_omitted",
            NoticeKind::VideoOmitted => "video_omitted",
            NoticeKind::AudioOmitted => "audio_omitted",
            NoticeKind::StickerOmitted => "sticker_omitted",
            NoticeKind::GifOmitted => "gif_omitted",
            NoticeKind::DocumentOmitted => "document_omitted",
            NoticeKind::ContactCardOmitted => "contact_card_omitted",
            NoticeKind::MediaOmitted => "media_omitted",
            NoticeKind::MessageDeleted => "message_deleted",
            NoticeKind::EncryptionNotice => "encryption_notice",
            NoticeKind::ParticipantLeft => "participant_left",
            NoticeKind::ParticipantJoined => "participant_joined",
            NoticeKind::ParticipantAdded => "participant_added",
            NoticeKind::ParticipantRemoved => "participant_removed",
            NoticeKind::SubjectChanged => "subject_changed",
            NoticeKind::IconChanged => "icon_changed",
            NoticeKind::GroupCreated => "group_created",
            NoticeKind::Other => "other",
        }
    }

    /// Whether the notice stands in for omitted media.
    pub fn is_media(&self) -> bool {
        matches!(
            self,
            NoticeKind::ImageOmitted
                | NoticeKind::VideoOmitted
                | NoticeKind::AudioOmitted
                | NoticeKind::StickerOmitted
                | NoticeKind::GifOmitted
                | NoticeKind::DocumentOmitted
                | NoticeKind::ContactCardOmitted
                | NoticeKind::MediaOmitted
        )
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Grammatical category returned by a tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartOfSpeech {
    /// Common or proper noun.
    Noun,

    /// Verb.
    Verb,

    /// Adjective.
    Adjective,

    /// Adverb.
    Adverb,

    /// Pronoun.
    Pronoun,

    /// Function words: articles, prepositions, conjunctions.
    Function,

    /// Digits and numerals.
    Numeral,

    /// Punctuation and symbols.
    Punctuation,

    /// Anything the tagger could not place.
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_hour_has_one_period_and_a_refining_sub_period() {
        for hour in 0..24 {
            let period = Period::from_hour(hour);
            let sub_period = SubPeriod::from_hour(hour);
            assert_eq!(sub_period.period(), period, "hour {}", hour);
        }
    }

    #[test]
    fn period_boundaries() {
        assert_eq!(Period::from_hour(5), Period::Dawn);
        assert_eq!(Period::from_hour(6), Period::Morning);
        assert_eq!(Period::from_hour(12), Period::Evening);
        assert_eq!(Period::from_hour(18), Period::Night);
        assert_eq!(Period::from_hour(23), Period::Night);
    }

    #[test]
    fn sub_period_boundaries() {
        let expected = [
            (0, SubPeriod::Resting),
            (6, SubPeriod::TransportMorning),
            (9, SubPeriod::WorkMorning),
            (12, SubPeriod::Lunch),
            (15, SubPeriod::WorkEvening),
            (18, SubPeriod::TransportEvening),
            (21, SubPeriod::SecondOfficeHour),
        ];
        for (hour, sub_period) in expected {
            assert_eq!(SubPeriod::from_hour(hour), sub_period);
            if hour > 0 {
                assert_ne!(SubPeriod::from_hour(hour - 1), sub_period);
            }
        }
    }

    #[test]
    fn resting_only_coincides_with_dawn() {
        for hour in 0..24 {
            if SubPeriod::from_hour(hour) == SubPeriod::Resting {
                assert_eq!(Period::from_hour(hour), Period::Dawn);
            }
        }
    }

    #[test]
    fn notice_kinds_serialize_as_snake_case_keys() {
        for kind in NoticeKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.key()));
        }
    }
}
