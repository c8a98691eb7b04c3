// Copyright 2021-2022 System76 <info@system76.com>
// SPDX-License-Identifier: MPL-2.0

//! The contract between schedules and the poll loop that drives them.

use chrono::{NaiveDateTime, TimeDelta};
use std::time::Duration;

/// The outcome of a single due-check poll.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DueStatus {
    /// Whether the task should run now.
    pub due: bool,

    /// Time until the next occurrence. When `due` is set this already points
    /// past the occurrence being triggered, so the caller can act, then sleep
    /// for this long (or its own maximum loop interval, whichever is smaller)
    /// before polling again.
    pub next_check_in: Duration,
}

/// A periodic schedule that can be polled for due-ness.
///
/// Implementations are pure: state is fixed at construction and a poll is a
/// single bounded computation, so one schedule may be evaluated concurrently
/// by any number of readers. The only time-varying input is the clock the
/// schedule was built with.
pub trait Schedule {
    /// Signed time left until the next occurrence after `last_run_at`,
    /// measured from the schedule's clock reading, not from `last_run_at`.
    /// Measuring from "now" makes the estimate self-correcting when polls
    /// are delayed; an overdue occurrence yields a negative delta.
    fn remaining_estimate(&self, last_run_at: NaiveDateTime) -> TimeDelta;

    /// Whether the task is due, and how long until it is due again.
    fn is_due(&self, last_run_at: NaiveDateTime) -> DueStatus;
}
