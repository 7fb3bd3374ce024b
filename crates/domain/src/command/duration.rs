//! Duration phrases such as `2 hours 30 minutes` or `45 sec`.
//!
//! Hours, minutes and seconds are extracted independently; each part is
//! optional and defaults to zero.

use std::sync::LazyLock;

use regex::Regex;

use crate::timer::TimerDuration;

struct DurationPatterns {
    hours: Regex,
    minutes: Regex,
    seconds: Regex,
}

impl DurationPatterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            hours: Regex::new(r"(\d+)\s*(?:hours?|hrs?|h|ghante|ghanta)")?,
            minutes: Regex::new(r"(\d+)\s*(?:minutes?|mins?|m)")?,
            seconds: Regex::new(r"(\d+)\s*(?:seconds?|secs?|s)")?,
        })
    }
}

static PATTERNS: LazyLock<Option<DurationPatterns>> =
    LazyLock::new(|| DurationPatterns::compile().ok());

fn first_number(re: &Regex, text: &str) -> u64 {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Extract the hours/minutes/seconds mentioned in `text`.
///
/// Text without a recognisable duration yields a zero duration.
#[must_use]
pub fn parse_duration(text: &str) -> TimerDuration {
    let Some(patterns) = PATTERNS.as_ref() else {
        return TimerDuration::default();
    };
    TimerDuration::new(
        first_number(&patterns.hours, text),
        first_number(&patterns.minutes, text),
        first_number(&patterns.seconds, text),
    )
}

/// Like [`parse_duration`] but treats a zero total as "no duration".
#[must_use]
pub fn find_duration(text: &str) -> Option<TimerDuration> {
    Some(parse_duration(text)).filter(|d| d.total_seconds() > 0)
}
