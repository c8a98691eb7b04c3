// Copyright 2021-2022 System76 <info@system76.com>
// SPDX-License-Identifier: MPL-2.0

//! Small time helpers shared by the schedule kinds: weekday name lookup,
//! interval remaining-time arithmetic, and human-readable durations.

use chrono::{NaiveDateTime, TimeDelta, Timelike};

use crate::error::Error;

/// Canonical weekday vocabulary, Sunday first. Lookup is case-insensitive and
/// matches on the first three letters, so `"mon"`, `"Mon"`, and `"monday"`
/// all resolve to `1`.
const DAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// Map a weekday name to its index, with `0` being Sunday.
pub fn weekday_index(name: &str) -> Result<u32, Error> {
    let abbreviation: String = name.chars().take(3).flat_map(char::to_lowercase).collect();
    DAY_NAMES
        .iter()
        .position(|day| *day == abbreviation)
        .map(|index| index as u32)
        .ok_or_else(|| Error::InvalidWeekday(name.to_string()))
}

/// Signed time left until `last_run_at + period`, measured from `now`.
///
/// With `relative` anchoring the end instant is truncated to the period's
/// resolution first, so e.g. an hourly schedule lands on the top of the hour
/// rather than N minutes past it.
pub fn remaining(
    last_run_at: NaiveDateTime,
    period: TimeDelta,
    relative: bool,
    now: NaiveDateTime,
) -> TimeDelta {
    let mut end = last_run_at + period;
    if relative {
        end = delta_resolution(end, period);
    }
    end - now
}

/// Truncate `instant` to the largest whole unit `period` spans: midnight for
/// day-or-longer periods, the top of the hour for hour-or-longer, the top of
/// the minute for minute-or-longer. Sub-minute periods pass through untouched.
fn delta_resolution(instant: NaiveDateTime, period: TimeDelta) -> NaiveDateTime {
    let date = instant.date();
    let truncated = if period.num_days() >= 1 {
        date.and_hms_opt(0, 0, 0)
    } else if period.num_hours() >= 1 {
        date.and_hms_opt(instant.hour(), 0, 0)
    } else if period.num_minutes() >= 1 {
        date.and_hms_opt(instant.hour(), instant.minute(), 0)
    } else {
        return instant;
    };
    // Hour and minute come from a valid datetime, so this cannot fail.
    truncated.unwrap_or(instant)
}

/// Whole seconds of a delta, with negative deltas clamped to zero.
pub fn seconds(delta: TimeDelta) -> u64 {
    u64::try_from(delta.num_seconds()).unwrap_or(0)
}

/// Render a second count with its largest sensible unit: `"2 days"`,
/// `"1 hour"`, `"15 minutes"`, `"30 seconds"`, or `"now"` for zero.
/// Partial units round up, so 90 seconds reads as `"2 minutes"`.
pub fn humanize_seconds(secs: u64) -> String {
    const UNITS: [(&str, u64); 3] = [("day", 86_400), ("hour", 3_600), ("minute", 60)];

    for (unit, divider) in UNITS {
        if secs >= divider {
            let count = (secs + divider - 1) / divider;
            return format!("{count} {unit}{}", plural(count));
        }
    }

    match secs {
        0 => "now".to_string(),
        count => format!("{count} second{}", plural(count)),
    }
}

fn plural(count: u64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
