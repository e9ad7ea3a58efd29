// Copyright 2020-2021 bd_
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions: The above copyright
// notice and this permission notice shall be included in all copies or
// substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use std::fmt;
use std::str::FromStr;

use chrono::prelude::*;
use chrono::Duration;
use serde::Deserialize;

use crate::error::{CalendarError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartOfWeek {
    #[serde(alias = "sun")]
    Sunday,
    #[serde(alias = "mon")]
    Monday,
}

impl Default for StartOfWeek {
    fn default() -> Self {
        StartOfWeek::Sunday
    }
}

impl StartOfWeek {
    pub fn weekday(self) -> Weekday {
        match self {
            StartOfWeek::Sunday => Weekday::Sun,
            StartOfWeek::Monday => Weekday::Mon,
        }
    }

    /// The seven weekdays in column order.
    pub fn columns(self) -> [Weekday; 7] {
        let mut wd = self.weekday();
        let mut cols = [wd; 7];
        for col in cols.iter_mut() {
            *col = wd;
            wd = wd.succ();
        }
        cols
    }

    /// Column index of `wd` in a grid starting on this day.
    pub fn column_of(self, wd: Weekday) -> u32 {
        (wd.num_days_from_monday() + 7 - self.weekday().num_days_from_monday()) % 7
    }
}

impl FromStr for StartOfWeek {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sun" | "sunday" => Ok(StartOfWeek::Sunday),
            "mon" | "monday" => Ok(StartOfWeek::Monday),
            _ => Err(format!("expected 'sun' or 'mon', got {:?}", s)),
        }
    }
}

impl fmt::Display for StartOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartOfWeek::Sunday => f.write_str("sun"),
            StartOfWeek::Monday => f.write_str("mon"),
        }
    }
}

pub type Week = [NaiveDate; 7];

/// Weeks of real dates covering a whole month, padded with days of the
/// neighbouring months.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateGrid {
    year: i32,
    month: u32,
    weeks: Vec<Week>,
}

impl DateGrid {
    pub fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    pub fn rows(&self) -> usize {
        self.weeks.len()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.weeks.iter().flat_map(|w| w.iter().copied())
    }

    pub fn first(&self) -> NaiveDate {
        self.weeks[0][0]
    }

    pub fn last(&self) -> NaiveDate {
        self.weeks[self.weeks.len() - 1][6]
    }

    /// True when `date` falls in the month this grid was generated for.
    pub fn is_current_month(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

pub fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::InvalidDate { year, month })
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let first = first_of_month(year, month)?;
    let next = if month == 12 {
        first_of_month(year + 1, 1)?
    } else {
        first_of_month(year, month + 1)?
    };

    Ok(next.signed_duration_since(first).num_days() as u32)
}

/// Builds the date grid for `year`-`month`, starting each row on
/// `start_of_week` and emitting at least `min_rows` rows.
pub fn generate(year: i32, month: u32, start_of_week: StartOfWeek, min_rows: usize) -> Result<DateGrid> {
    let invalid = || CalendarError::InvalidDate { year, month };

    let first = first_of_month(year, month)?;
    let month_len = days_in_month(year, month)? as usize;

    let lead = start_of_week.column_of(first.weekday()) as usize;
    let grid_start = first
        .checked_sub_signed(Duration::days(lead as i64))
        .ok_or_else(invalid)?;

    let rows = std::cmp::max(min_rows, (lead + month_len + 6) / 7);

    let days: Vec<NaiveDate> = grid_start.iter_days().take(rows * 7).collect();
    if days.len() != rows * 7 {
        return Err(invalid());
    }

    let weeks = days
        .chunks_exact(7)
        .map(|w| {
            let mut week = [w[0]; 7];
            week.copy_from_slice(w);
            week
        })
        .collect();

    Ok(DateGrid { year, month, weeks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn march_2025_sunday_start() {
        let grid = generate(2025, 3, StartOfWeek::Sunday, 6).unwrap();

        assert_eq!(grid.rows(), 6);
        assert_eq!(grid.first(), ymd(2025, 2, 23));
        assert_eq!(grid.last(), ymd(2025, 4, 5));
        assert_eq!(grid.weeks()[1][0], ymd(2025, 3, 2));
    }

    #[test]
    fn march_2025_monday_start() {
        let grid = generate(2025, 3, StartOfWeek::Monday, 6).unwrap();

        assert_eq!(grid.first(), ymd(2025, 2, 24));
        assert_eq!(grid.first().weekday(), Weekday::Mon);
        assert_eq!(grid.last(), ymd(2025, 4, 6));
    }

    #[test]
    fn no_walk_back_when_month_starts_on_week_start() {
        // June 2025 starts on a Sunday.
        let grid = generate(2025, 6, StartOfWeek::Sunday, 6).unwrap();
        assert_eq!(grid.first(), ymd(2025, 6, 1));

        // September 2025 starts on a Monday.
        let grid = generate(2025, 9, StartOfWeek::Monday, 6).unwrap();
        assert_eq!(grid.first(), ymd(2025, 9, 1));
    }

    #[test]
    fn short_february_is_padded_to_min_rows() {
        // February 2015: 28 days, starts on Sunday, fits four rows exactly.
        let grid = generate(2015, 2, StartOfWeek::Sunday, 6).unwrap();
        assert_eq!(grid.rows(), 6);
        assert_eq!(grid.last(), ymd(2015, 3, 14));

        let grid = generate(2015, 2, StartOfWeek::Sunday, 0).unwrap();
        assert_eq!(grid.rows(), 4);
    }

    #[test]
    fn grows_past_min_rows_when_month_needs_it() {
        // August 2026 starts on a Saturday and has 31 days: six Sunday rows.
        let grid = generate(2026, 8, StartOfWeek::Sunday, 5).unwrap();
        assert_eq!(grid.rows(), 6);
        assert_eq!(grid.last(), ymd(2026, 9, 5));
    }

    #[test]
    fn year_rollover_uses_real_dates() {
        let grid = generate(2025, 1, StartOfWeek::Sunday, 6).unwrap();
        assert_eq!(grid.first(), ymd(2024, 12, 29));

        let grid = generate(2024, 12, StartOfWeek::Monday, 6).unwrap();
        assert_eq!(grid.first(), ymd(2024, 11, 25));
        assert_eq!(grid.last(), ymd(2025, 1, 5));
    }

    #[test]
    fn leap_day_included() {
        let grid = generate(2024, 2, StartOfWeek::Sunday, 6).unwrap();
        assert!(grid.days().any(|d| d == ymd(2024, 2, 29)));
        assert!(grid.days().any(|d| d == ymd(2024, 3, 1)));
    }

    #[test]
    fn invariants_hold_for_every_month() {
        for year in 1899..=2101 {
            for month in 1..=12 {
                for &sow in &[StartOfWeek::Sunday, StartOfWeek::Monday] {
                    let grid = generate(year, month, sow, 6).unwrap();
                    assert!(grid.rows() >= 6);
                    assert_eq!(grid.first().weekday(), sow.weekday());

                    let days: Vec<_> = grid.days().collect();
                    assert_eq!(days.len(), grid.rows() * 7);
                    for pair in days.windows(2) {
                        assert_eq!(pair[0].succ_opt(), Some(pair[1]));
                    }

                    let in_month = days.iter().filter(|d| grid.is_current_month(**d)).count();
                    assert_eq!(in_month as u32, days_in_month(year, month).unwrap());
                }
            }
        }
    }

    #[test]
    fn week_start_only_shifts_the_grid() {
        for month in 1..=12 {
            let sun = generate(2023, month, StartOfWeek::Sunday, 7).unwrap();
            let mon = generate(2023, month, StartOfWeek::Monday, 7).unwrap();

            let month_days = |g: &DateGrid| -> BTreeSet<NaiveDate> {
                g.days().filter(|d| g.is_current_month(*d)).collect()
            };
            assert_eq!(month_days(&sun), month_days(&mon));

            let offset = mon.first().signed_duration_since(sun.first()).num_days();
            assert!(offset == 1 || offset == -6, "offset {}", offset);
        }
    }

    #[test]
    fn rejects_invalid_month() {
        for &month in &[0, 13] {
            match generate(2025, month, StartOfWeek::Sunday, 6) {
                Err(CalendarError::InvalidDate { year: 2025, month: m }) => assert_eq!(m, month),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn columns_follow_week_start() {
        assert_eq!(StartOfWeek::Sunday.columns()[0], Weekday::Sun);
        assert_eq!(StartOfWeek::Sunday.columns()[6], Weekday::Sat);
        assert_eq!(StartOfWeek::Monday.columns()[6], Weekday::Sun);
        assert_eq!(StartOfWeek::Monday.column_of(Weekday::Sun), 6);
        assert_eq!(StartOfWeek::Sunday.column_of(Weekday::Sun), 0);
    }

    #[test]
    fn parses_week_start_names() {
        assert_eq!("sun".parse::<StartOfWeek>().unwrap(), StartOfWeek::Sunday);
        assert_eq!("Monday".parse::<StartOfWeek>().unwrap(), StartOfWeek::Monday);
        assert!("tue".parse::<StartOfWeek>().is_err());
    }
}
