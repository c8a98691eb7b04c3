// Copyright 2021-2022 System76 <info@system76.com>
// SPDX-License-Identifier: MPL-2.0

//! Drives schedules through the public API the way a runner loop would:
//! poll, sleep for the reported interval, record the run, poll again.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use periodic_schedules::{Clock, CronSchedule, IntervalSchedule, Schedule};
use std::cell::Cell;
use std::time::Duration;

/// A clock that only advances when the simulated runner "sleeps".
struct SteppedClock {
    now: Cell<NaiveDateTime>,
}

impl SteppedClock {
    fn starting_at(now: NaiveDateTime) -> Self {
        Self { now: Cell::new(now) }
    }

    fn sleep(&self, duration: Duration) {
        let delta = TimeDelta::from_std(duration).unwrap_or_else(|_| TimeDelta::zero());
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for &SteppedClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

// 2022-11-07 was a Monday.
fn monday(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 11, 7)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// Poll until `limit` runs have fired, sleeping exactly as instructed, and
/// return the instants the schedule fired at.
fn drive<S: Schedule>(
    schedule: &S,
    clock: &SteppedClock,
    mut last_run_at: NaiveDateTime,
    limit: usize,
) -> Vec<NaiveDateTime> {
    let mut fired = Vec::new();
    while fired.len() < limit {
        let status = schedule.is_due(last_run_at);
        if status.due {
            last_run_at = clock.now.get();
            fired.push(last_run_at);
        }
        clock.sleep(status.next_check_in);
    }
    fired
}

#[test]
fn cron_schedule_fires_on_the_half_hour() {
    let clock = SteppedClock::starting_at(monday(8, 55));
    let schedule = CronSchedule::new("0,30", "9-17", "mon-fri", &clock).unwrap();

    let fired = drive(&schedule, &clock, monday(8, 0), 3);
    assert_eq!(fired, vec![monday(9, 0), monday(9, 30), monday(10, 0)]);
}

#[test]
fn cron_schedule_sleeps_over_the_weekend() {
    // Friday 2022-11-11, 17:45: the 09:00 weekday schedule next fires Monday.
    let friday_evening = NaiveDate::from_ymd_opt(2022, 11, 11)
        .unwrap()
        .and_hms_opt(17, 45, 0)
        .unwrap();
    let clock = SteppedClock::starting_at(friday_evening);
    let schedule = CronSchedule::new(0u32, 9u32, "mon-fri", &clock).unwrap();

    let fired = drive(&schedule, &clock, friday_evening, 1);
    assert_eq!(fired, vec![monday(9, 0) + TimeDelta::days(7)]);
}

#[test]
fn interval_schedule_fires_every_period() {
    let clock = SteppedClock::starting_at(monday(12, 0));
    let schedule = IntervalSchedule::every(Duration::from_secs(900), &clock);

    let fired = drive(&schedule, &clock, monday(12, 0), 3);
    assert_eq!(fired, vec![monday(12, 15), monday(12, 30), monday(12, 45)]);
}

#[test]
fn reported_sleep_never_overshoots_the_next_occurrence() {
    let clock = SteppedClock::starting_at(monday(9, 10));
    let schedule = CronSchedule::new("*/15", "*", "*", &clock).unwrap();

    let status = schedule.is_due(monday(9, 0));
    assert!(!status.due);
    assert_eq!(status.next_check_in, Duration::from_secs(300));

    clock.sleep(status.next_check_in);
    assert!(schedule.is_due(monday(9, 0)).due);
}
