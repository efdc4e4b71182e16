use chatscope_core::{Period, SubPeriod};
use chrono::NaiveDateTime;

/// Period and sub-period of the day a timestamp falls in.
pub fn classify(timestamp: NaiveDateTime) -> (Period, SubPeriod) {
    let time = timestamp.time();
    (Period::from_time(time), SubPeriod::from_time(time))
}
