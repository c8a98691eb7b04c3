// Copyright 2021-2022 System76 <info@system76.com>
// SPDX-License-Identifier: MPL-2.0

use thiserror::Error;

/// Errors raised while constructing a schedule.
///
/// Everything here surfaces eagerly, at construction time, so a misconfigured
/// schedule fails registration instead of misbehaving inside a live poll loop.
/// Evaluation itself never errors: a validated field set is non-empty and
/// in-bounds, so the next-occurrence search always converges.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A comma split produced an empty segment, e.g. `"1,,2"` or a trailing comma.
    #[error("empty part")]
    EmptyPart,

    /// A `/` step suffix with nothing after it, e.g. `"*/"`.
    #[error("empty filter")]
    EmptyFilter,

    /// A step value of `0` would filter by modulo zero.
    #[error("step values must be positive")]
    ZeroStep,

    #[error("negative numbers not supported")]
    NegativeNumber,

    /// A literal that is neither a decimal number nor a known weekday name.
    #[error("invalid weekday literal '{0}'")]
    InvalidWeekday(String),

    /// A non-numeric token where only digits are accepted, e.g. a step value.
    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    /// A field value at or above its field's exclusive bound.
    #[error("invalid value {value}: valid range is 0-{max}")]
    OutOfRange { value: u32, max: u32 },

    /// A field specification that expands to no values at all. A schedule that
    /// can never match is treated as misconfiguration, not as "never run".
    #[error("field set matches no values")]
    EmptyField,
}
