// Copyright 2021-2022 System76 <info@system76.com>
// SPDX-License-Identifier: MPL-2.0

//! Simple lightweight deterministic due-check evaluation for periodic tasks with cron expression support
//!
//! # Features
//!
//! - **Simple**: Two schedule kinds behind one trait, integrate easily in any codebase.
//! - **Lightweight**: Minimal dependencies with a small amount of code implementing it.
//! - **Deterministic**: The evaluation clock is an explicit capability, never a hidden
//!   wall-clock default, so every answer is reproducible in tests.
//! - **Pure**: Evaluation is synchronous and non-blocking with no I/O; field sets are
//!   immutable once built and safe to poll from any number of threads.
//! - **Cron Expressions**: Compact field patterns (`*/15`, `1,13,30-45`, `mon-fri`)
//!   expanded once, at construction, into concrete value sets.
//!
//! # Tips
//!
//! Schedules only answer *whether* a task is due and *how long* until the next
//! occurrence. The poll loop that sleeps between checks, runs the task, and records
//! the last-run timestamp is the caller's. Sleep at most
//! [`DueStatus::next_check_in`] (or your own maximum loop interval, whichever is
//! smaller) before polling again, since schedule changes only take effect on the
//! next poll.
//!
//! # Demo
//!
//! The entire API wrapped up in one example.
//!
//! ```
//! use chrono::NaiveDate;
//! use periodic_schedules::*;
//! use std::time::Duration;
//!
//! // Freeze the evaluation clock at Tuesday 2022-11-01 08:30:00.
//! let now = NaiveDate::from_ymd_opt(2022, 11, 1)
//!     .unwrap()
//!     .and_hms_opt(8, 30, 0)
//!     .unwrap();
//! let clock = FixedClock(now);
//!
//! // Weekday mornings at quarter to nine and quarter to ten.
//! let cron = CronSchedule::new("45", "8-9", "mon-fri", clock).unwrap();
//! let status = cron.is_due(now - chrono::TimeDelta::minutes(30));
//! assert!(!status.due);
//! assert_eq!(status.next_check_in, Duration::from_secs(15 * 60));
//!
//! // Every five minutes, counted from the last run.
//! let interval = IntervalSchedule::every(Duration::from_secs(300), clock);
//! let status = interval.is_due(now - chrono::TimeDelta::minutes(5));
//! assert!(status.due);
//! assert_eq!(status.next_check_in, Duration::from_secs(300));
//! ```

use chrono::NaiveDateTime;

mod crontab;
mod error;
mod interval;
mod parser;
mod schedule;
pub mod time;

pub use self::crontab::{CronFieldSet, CronSchedule, FieldSpec};
pub use self::error::Error;
pub use self::interval::IntervalSchedule;
pub use self::parser::CrontabParser;
pub use self::schedule::{DueStatus, Schedule};

/// The time source schedules are evaluated against.
///
/// Passed explicitly at construction. Schedules never reach for the wall clock
/// on their own, which keeps evaluation deterministic under test. The instant
/// is a [`NaiveDateTime`]: whatever local representation the caller supplies,
/// with no timezone conversion applied.
pub trait Clock {
    /// Get the current instant.
    fn now(&self) -> NaiveDateTime;
}

/// The local wall clock.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// A clock pinned to a single instant, for deterministic evaluation in tests.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Lifts any `Fn() -> NaiveDateTime` closure into a [`Clock`], so scripted
/// clocks need no hand-written impl.
///
/// ```
/// use chrono::NaiveDate;
/// use periodic_schedules::{Clock, ClockFn};
///
/// let instant = NaiveDate::from_ymd_opt(2022, 11, 1)
///     .unwrap()
///     .and_hms_opt(8, 30, 0)
///     .unwrap();
/// let clock = ClockFn(move || instant);
/// assert_eq!(clock.now(), instant);
/// ```
#[derive(Copy, Clone, Debug)]
pub struct ClockFn<F: Fn() -> NaiveDateTime>(pub F);

impl<F: Fn() -> NaiveDateTime> Clock for ClockFn<F> {
    fn now(&self) -> NaiveDateTime {
        (self.0)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};
    use std::cell::Cell;
    use std::time::Duration;

    #[test]
    fn closure_clock_drives_a_schedule() {
        let start = NaiveDate::from_ymd_opt(2022, 11, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let now = Cell::new(start);
        let schedule = IntervalSchedule::every(Duration::from_secs(60), ClockFn(|| now.get()));

        assert!(!schedule.is_due(start).due);
        now.set(start + TimeDelta::seconds(60));
        assert!(schedule.is_due(start).due);
    }
}
