// Copyright 2021-2022 System76 <info@system76.com>
// SPDX-License-Identifier: MPL-2.0

//! Grammar-driven expansion of crontab field patterns into value sets.

use std::collections::BTreeSet;

use crate::error::Error;
use crate::time::weekday_index;

/// Parser for one crontab field. Any expression of the form `group` below is
/// accepted and expanded into the set of field values it matches:
///
/// ```text
/// digit  := '0'..'9'
/// name   := letter+                      (weekday abbreviation)
/// number := digit+ | name
/// range  := number ('-' number)?
/// spec   := '*' | range
/// expr   := spec ('/' steps)?
/// group  := expr (',' expr)*
/// ```
///
/// The parser is general purpose: the same grammar serves minutes, hours, and
/// weekdays, with `bound` supplying the exclusive upper limit that `*` expands
/// to. Parsing is a pure function of the pattern, so a given pattern always
/// expands to the same set.
///
/// ```
/// use periodic_schedules::CrontabParser;
///
/// let minutes = CrontabParser::new(60).parse("*/15").unwrap();
/// assert!(minutes.into_iter().eq([0, 15, 30, 45]));
///
/// let hours = CrontabParser::new(24).parse("*/4").unwrap();
/// assert!(hours.into_iter().eq([0, 4, 8, 12, 16, 20]));
///
/// let weekdays = CrontabParser::new(7).parse("mon-fri").unwrap();
/// assert!(weekdays.into_iter().eq([1, 2, 3, 4, 5]));
/// ```
#[derive(Copy, Clone, Debug)]
pub struct CrontabParser {
    bound: u32,
}

impl CrontabParser {
    /// Create a parser for a field whose values are `0..bound`. A zero bound
    /// is degenerate: `*` and ranges expand to nothing.
    pub fn new(bound: u32) -> Self {
        Self { bound }
    }

    /// Expand a pattern into the set of matching field values.
    ///
    /// Comma-separated segments are expanded independently and unioned;
    /// duplicates merge silently.
    pub fn parse(&self, spec: &str) -> Result<BTreeSet<u32>, Error> {
        let mut acc = BTreeSet::new();
        for part in spec.split(',') {
            if part.is_empty() {
                return Err(Error::EmptyPart);
            }
            acc.extend(self.parse_part(part)?);
        }
        Ok(acc)
    }

    // Matching priority: range with step, plain range, star with step, plain
    // star, then a bare literal number or weekday name.
    fn parse_part(&self, part: &str) -> Result<Vec<u32>, Error> {
        let (base, step) = match part.split_once('/') {
            Some((base, step)) => (base, Some(self.parse_step(step)?)),
            None => (part, None),
        };

        let numbers = if base == "*" {
            (0..self.bound).collect()
        } else {
            self.expand_range(base)?
        };

        Ok(match step {
            Some(step) => numbers.into_iter().filter(|n| n % step == 0).collect(),
            None => numbers,
        })
    }

    fn parse_step(&self, text: &str) -> Result<u32, Error> {
        if text.is_empty() {
            return Err(Error::EmptyFilter);
        }
        let step = text
            .parse::<u32>()
            .map_err(|_| Error::InvalidNumber(text.to_string()))?;
        if step == 0 {
            return Err(Error::ZeroStep);
        }
        Ok(step)
    }

    fn expand_range(&self, text: &str) -> Result<Vec<u32>, Error> {
        match text.split_once('-') {
            // An empty left side means a leading '-'; let expand_number
            // report it as a negative literal.
            Some((from, to)) if !from.is_empty() => {
                let from = self.expand_number(from)?;
                let to = self.expand_number(to)?;
                Ok((from..=to.min(self.bound.saturating_sub(1))).collect())
            }
            _ => Ok(vec![self.expand_number(text)?]),
        }
    }

    fn expand_number(&self, text: &str) -> Result<u32, Error> {
        if text.starts_with('-') {
            return Err(Error::NegativeNumber);
        }
        match text.parse::<u32>() {
            Ok(number) => Ok(number),
            Err(_) => weekday_index(text),
        }
    }
}
