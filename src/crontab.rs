// Copyright 2021-2022 System76 <info@system76.com>
// SPDX-License-Identifier: MPL-2.0

//! Cron-style schedules: field normalization and the next-occurrence search.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use crate::error::Error;
use crate::parser::CrontabParser;
use crate::schedule::{DueStatus, Schedule};
use crate::time;
use crate::Clock;

/// One cron field, before expansion.
///
/// Each variant resolves to a concrete value set at construction: a literal
/// becomes a singleton, a pattern goes through [`CrontabParser`], and
/// collections are taken as-is. `From` conversions keep call sites short, so
/// `CronSchedule::new("*/15", 8u32, [1u32, 2, 3], clock)` mixes the shapes freely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldSpec {
    /// A single field value, like `30`.
    Literal(u32),
    /// A crontab pattern, like `"*/15"` or `"mon-fri"`.
    Pattern(String),
    /// An explicit set of field values.
    Set(BTreeSet<u32>),
    /// Any other collection of field values; duplicates merge.
    List(Vec<u32>),
}

impl FieldSpec {
    fn resolve(self, bound: u32) -> Result<BTreeSet<u32>, Error> {
        let values = match self {
            FieldSpec::Literal(value) => BTreeSet::from([value]),
            FieldSpec::Pattern(pattern) => CrontabParser::new(bound).parse(&pattern)?,
            FieldSpec::Set(values) => values,
            FieldSpec::List(values) => values.into_iter().collect(),
        };

        if values.is_empty() {
            return Err(Error::EmptyField);
        }

        if let Some(&value) = values.iter().find(|&&value| value >= bound) {
            return Err(Error::OutOfRange {
                value,
                max: bound - 1,
            });
        }

        Ok(values)
    }
}

impl From<u32> for FieldSpec {
    fn from(value: u32) -> Self {
        FieldSpec::Literal(value)
    }
}

impl From<&str> for FieldSpec {
    fn from(pattern: &str) -> Self {
        FieldSpec::Pattern(pattern.to_string())
    }
}

impl From<String> for FieldSpec {
    fn from(pattern: String) -> Self {
        FieldSpec::Pattern(pattern)
    }
}

impl From<BTreeSet<u32>> for FieldSpec {
    fn from(values: BTreeSet<u32>) -> Self {
        FieldSpec::Set(values)
    }
}

impl From<Vec<u32>> for FieldSpec {
    fn from(values: Vec<u32>) -> Self {
        FieldSpec::List(values)
    }
}

impl From<&[u32]> for FieldSpec {
    fn from(values: &[u32]) -> Self {
        FieldSpec::List(values.to_vec())
    }
}

impl<const N: usize> From<[u32; N]> for FieldSpec {
    fn from(values: [u32; N]) -> Self {
        FieldSpec::List(values.to_vec())
    }
}

/// The normalized minute, hour, and weekday sets a cron schedule matches.
///
/// Weekday `0` is Sunday. Built once, immutable afterward. Two field sets
/// compare equal iff their value sets are equal, regardless of the pattern
/// text they were expanded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CronFieldSet {
    minutes: BTreeSet<u32>,
    hours: BTreeSet<u32>,
    weekdays: BTreeSet<u32>,
}

impl CronFieldSet {
    /// Resolve and validate three field specifications. Bounds are 60 for the
    /// minute, 24 for the hour, and 7 for the weekday; the first value at or
    /// above its bound fails construction.
    pub fn new(
        minute: impl Into<FieldSpec>,
        hour: impl Into<FieldSpec>,
        weekday: impl Into<FieldSpec>,
    ) -> Result<Self, Error> {
        Ok(Self {
            minutes: minute.into().resolve(60)?,
            hours: hour.into().resolve(24)?,
            weekdays: weekday.into().resolve(7)?,
        })
    }

    pub fn minutes(&self) -> &BTreeSet<u32> {
        &self.minutes
    }

    pub fn hours(&self) -> &BTreeSet<u32> {
        &self.hours
    }

    pub fn weekdays(&self) -> &BTreeSet<u32> {
        &self.weekdays
    }
}

impl fmt::Display for CronFieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_field(f, &self.minutes, 60)?;
        f.write_str(" ")?;
        write_field(f, &self.hours, 24)?;
        f.write_str(" ")?;
        write_field(f, &self.weekdays, 7)
    }
}

// A full field renders as `*`; anything else as the sorted value list.
fn write_field(f: &mut fmt::Formatter<'_>, values: &BTreeSet<u32>, bound: u32) -> fmt::Result {
    if values.len() == bound as usize {
        return f.write_str("*");
    }
    let mut sep = "";
    for value in values {
        write!(f, "{sep}{value}")?;
        sep = ",";
    }
    Ok(())
}

/// A cron-style schedule over minutes, hours, and weekdays.
///
/// Evaluation walks the field sets with ripple carry: a later minute in the
/// current hour, else a later hour today, else the next matching weekday,
/// wrapping to the following week when today is the only match left.
pub struct CronSchedule<C: Clock> {
    fields: CronFieldSet,
    clock: C,
}

impl<C: Clock> CronSchedule<C> {
    /// Build a schedule from three field specifications and the clock it will
    /// be evaluated against.
    ///
    /// ```
    /// use periodic_schedules::{CronSchedule, SystemClock};
    ///
    /// // Every 15 minutes during office hours, weekdays only.
    /// let schedule = CronSchedule::new("*/15", "8-17", "mon-fri", SystemClock).unwrap();
    /// ```
    pub fn new(
        minute: impl Into<FieldSpec>,
        hour: impl Into<FieldSpec>,
        weekday: impl Into<FieldSpec>,
        clock: C,
    ) -> Result<Self, Error> {
        Ok(Self::from_fields(CronFieldSet::new(minute, hour, weekday)?, clock))
    }

    /// Build a schedule from an already-validated field set.
    pub fn from_fields(fields: CronFieldSet, clock: C) -> Self {
        Self { fields, clock }
    }

    pub fn fields(&self) -> &CronFieldSet {
        &self.fields
    }

    /// The instant of the first matching occurrence strictly after
    /// `last_run_at`, at second resolution.
    pub fn next_occurrence(&self, last_run_at: NaiveDateTime) -> NaiveDateTime {
        let fields = &self.fields;
        // Sunday is day 0, not day 7.
        let weekday = last_run_at.weekday().num_days_from_sunday();
        let day_matches = fields.weekdays.contains(&weekday);

        // A later minute within the current hour.
        if day_matches && fields.hours.contains(&last_run_at.hour()) {
            if let Some(&minute) = fields.minutes.range(last_run_at.minute() + 1..).next() {
                return at(last_run_at.date(), last_run_at.hour(), minute);
            }
        }

        // Carry into a later hour today.
        let minute = first(&fields.minutes);
        if day_matches {
            if let Some(&hour) = fields.hours.range(last_run_at.hour() + 1..).next() {
                return at(last_run_at.date(), hour, minute);
            }
        }

        // Carry into the next matching weekday, wrapping past the week end.
        // When the chosen day is today, no later slot exists today, so a full
        // week elapses.
        let hour = first(&fields.hours);
        let next_day = fields
            .weekdays
            .range(weekday + 1..)
            .next()
            .copied()
            .unwrap_or_else(|| first(&fields.weekdays));
        let days_ahead = match (7 + next_day - weekday) % 7 {
            0 => 7,
            ahead => ahead,
        };
        at(
            last_run_at.date() + Days::new(u64::from(days_ahead)),
            hour,
            minute,
        )
    }
}

// Field sets are validated non-empty at construction.
fn first(values: &BTreeSet<u32>) -> u32 {
    values.iter().next().copied().unwrap_or(0)
}

// Hour and minute are validated below their field bounds.
fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_hms_opt(hour, minute, 0)
        .expect("field values are within time-of-day bounds")
}

impl<C: Clock> Schedule for CronSchedule<C> {
    fn remaining_estimate(&self, last_run_at: NaiveDateTime) -> TimeDelta {
        self.next_occurrence(last_run_at) - self.clock.now()
    }

    fn is_due(&self, last_run_at: NaiveDateTime) -> DueStatus {
        let remaining = time::seconds(self.remaining_estimate(last_run_at));
        if remaining == 0 {
            // Re-anchor on the current instant so the caller learns the time
            // to the occurrence after the one being triggered.
            let now = self.clock.now();
            let next = time::seconds(self.next_occurrence(now) - now);

            #[cfg(feature = "logging")]
            tracing::debug!(next_in_secs = next, schedule = %self, "cron schedule due");

            DueStatus {
                due: true,
                next_check_in: Duration::from_secs(next),
            }
        } else {
            DueStatus {
                due: false,
                next_check_in: Duration::from_secs(remaining),
            }
        }
    }
}

// Equality is over the normalized field sets alone: the clock and the pattern
// text a schedule was built from do not participate.
impl<C1: Clock, C2: Clock> PartialEq<CronSchedule<C2>> for CronSchedule<C1> {
    fn eq(&self, other: &CronSchedule<C2>) -> bool {
        self.fields == other.fields
    }
}

impl<C: Clock> PartialEq<CronFieldSet> for CronSchedule<C> {
    fn eq(&self, other: &CronFieldSet) -> bool {
        self.fields == *other
    }
}

impl<C: Clock> fmt::Display for CronSchedule<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "crontab: {} (m/h/d)", self.fields)
    }
}

impl<C: Clock> fmt::Debug for CronSchedule<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CronSchedule")
            .field("fields", &self.fields)
            .finish()
    }
}
