// Copyright 2021-2022 System76 <info@system76.com>
// SPDX-License-Identifier: MPL-2.0

//! Fixed-period schedules.

use chrono::{NaiveDateTime, TimeDelta};
use std::fmt;
use std::time::Duration;

use crate::schedule::{DueStatus, Schedule};
use crate::time;
use crate::Clock;

/// A schedule that is due every fixed period, counted from the last run.
///
/// With [`relative`](IntervalSchedule::relative) anchoring, occurrences snap
/// to period boundaries (top of the hour for hourly periods, midnight for
/// daily ones) instead of the literal last-run instant.
pub struct IntervalSchedule<C: Clock> {
    period: Duration,
    relative: bool,
    clock: C,
}

impl<C: Clock> IntervalSchedule<C> {
    /// Run every `period`, evaluated against `clock`.
    pub fn every(period: Duration, clock: C) -> Self {
        Self {
            period,
            relative: false,
            clock,
        }
    }

    /// Run every `secs` seconds, evaluated against `clock`.
    pub fn every_secs(secs: u64, clock: C) -> Self {
        Self::every(Duration::from_secs(secs), clock)
    }

    /// Anchor occurrences to multiples of the period rather than to the
    /// literal elapsed time since the last run.
    pub fn relative(mut self, relative: bool) -> Self {
        self.relative = relative;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_relative(&self) -> bool {
        self.relative
    }

    fn period_delta(&self) -> TimeDelta {
        TimeDelta::from_std(self.period).unwrap_or(TimeDelta::MAX)
    }
}

impl<C: Clock> Schedule for IntervalSchedule<C> {
    fn remaining_estimate(&self, last_run_at: NaiveDateTime) -> TimeDelta {
        time::remaining(
            last_run_at,
            self.period_delta(),
            self.relative,
            self.clock.now(),
        )
    }

    fn is_due(&self, last_run_at: NaiveDateTime) -> DueStatus {
        let remaining = time::seconds(self.remaining_estimate(last_run_at));
        if remaining == 0 {
            #[cfg(feature = "logging")]
            tracing::debug!(
                next_in_secs = self.period.as_secs(),
                schedule = %self,
                "interval schedule due"
            );

            DueStatus {
                due: true,
                next_check_in: self.period,
            }
        } else {
            DueStatus {
                due: false,
                next_check_in: Duration::from_secs(remaining),
            }
        }
    }
}

// Equality is over the normalized period alone, never the clock, matching the
// registry's deduplication needs.
impl<C1: Clock, C2: Clock> PartialEq<IntervalSchedule<C2>> for IntervalSchedule<C1> {
    fn eq(&self, other: &IntervalSchedule<C2>) -> bool {
        self.period == other.period
    }
}

impl<C: Clock> PartialEq<Duration> for IntervalSchedule<C> {
    fn eq(&self, other: &Duration) -> bool {
        self.period == *other
    }
}

impl<C: Clock> fmt::Display for IntervalSchedule<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "every {}", time::humanize_seconds(self.period.as_secs()))
    }
}

impl<C: Clock> fmt::Debug for IntervalSchedule<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalSchedule")
            .field("period", &self.period)
            .field("relative", &self.relative)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixedClock, SystemClock};
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 11, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn not_due_before_the_period_elapses() {
        let schedule = IntervalSchedule::every_secs(300, FixedClock(at(10, 2)));
        let status = schedule.is_due(at(10, 0));
        assert!(!status.due);
        assert_eq!(status.next_check_in, Duration::from_secs(180));
    }

    #[test]
    fn due_exactly_when_the_period_elapses() {
        let schedule = IntervalSchedule::every_secs(300, FixedClock(at(10, 5)));
        let status = schedule.is_due(at(10, 0));
        assert!(status.due);
        assert_eq!(status.next_check_in, Duration::from_secs(300));
    }

    #[test]
    fn due_when_overdue() {
        let schedule = IntervalSchedule::every_secs(300, FixedClock(at(11, 0)));
        assert!(schedule.is_due(at(10, 0)).due);
    }

    #[test]
    fn remaining_is_self_correcting() {
        let last = at(10, 0);
        let early = IntervalSchedule::every_secs(1_800, FixedClock(at(10, 10)));
        let late = IntervalSchedule::every_secs(1_800, FixedClock(at(10, 20)));
        assert_eq!(early.remaining_estimate(last), TimeDelta::minutes(20));
        assert_eq!(late.remaining_estimate(last), TimeDelta::minutes(10));
    }

    #[test]
    fn relative_anchors_to_period_boundaries() {
        // Hourly period from 10:20 anchors to 11:00 instead of 11:20.
        let last = at(10, 20);
        let anchored = IntervalSchedule::every_secs(3_600, FixedClock(at(10, 20))).relative(true);
        let literal = IntervalSchedule::every_secs(3_600, FixedClock(at(10, 20)));
        assert_eq!(anchored.remaining_estimate(last), TimeDelta::minutes(40));
        assert_eq!(literal.remaining_estimate(last), TimeDelta::hours(1));
    }

    #[test]
    fn equality_ignores_the_clock() {
        let a = IntervalSchedule::every_secs(300, FixedClock(at(10, 0)));
        let b = IntervalSchedule::every_secs(300, SystemClock);
        assert_eq!(a, b);
        assert_eq!(b, a);
    }

    #[test]
    fn equality_against_a_raw_period() {
        let schedule = IntervalSchedule::every_secs(300, SystemClock);
        assert_eq!(schedule, Duration::from_secs(300));
        assert_ne!(schedule, Duration::from_secs(600));
    }

    #[test]
    fn display_humanizes_the_period() {
        assert_eq!(
            IntervalSchedule::every_secs(900, SystemClock).to_string(),
            "every 15 minutes"
        );
        assert_eq!(
            IntervalSchedule::every_secs(30, SystemClock).to_string(),
            "every 30 seconds"
        );
    }
}
