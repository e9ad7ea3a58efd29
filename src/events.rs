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

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::prelude::*;
use rusqlite::{Connection, OpenFlags};
use tracing::{info, warn};

use crate::diagnostics::Diagnostic;
use crate::error::Result;

const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M";

/// Display strings per calendar date, in source order.
pub type EventsByDate = BTreeMap<NaiveDate, Vec<String>>;

/// One stored event, exactly as the store hands it out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawEvent {
    pub timestamp: String,
    pub title: String,
}

impl RawEvent {
    pub fn new(timestamp: impl Into<String>, title: impl Into<String>) -> Self {
        RawEvent {
            timestamp: timestamp.into(),
            title: title.into(),
        }
    }
}

pub trait EventSource {
    /// All stored events in a stable order.
    fn raw_events(&self) -> Result<Vec<RawEvent>>;
}

impl EventSource for Vec<RawEvent> {
    fn raw_events(&self) -> Result<Vec<RawEvent>> {
        Ok(self.clone())
    }
}

/// Reads the `events(event_datetime, title)` table of the event database.
/// The connection is read-only; editing events is somebody else's job.
pub struct SqliteEventStore {
    path: PathBuf,
    conn: Connection,
}

impl SqliteEventStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        Ok(SqliteEventStore { path, conn })
    }
}

impl EventSource for SqliteEventStore {
    #[tracing::instrument(skip(self))]
    fn raw_events(&self) -> Result<Vec<RawEvent>> {
        let mut stmt = self
            .conn
            .prepare("SELECT event_datetime, title FROM events ORDER BY rowid")?;

        let rows = stmt.query_map([], |row| {
            let timestamp: Option<String> = row.get(0)?;
            let title: Option<String> = row.get(1)?;
            Ok(RawEvent {
                timestamp: timestamp.unwrap_or_default(),
                title: title.unwrap_or_default(),
            })
        })?;

        let events = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        info!("Read {} events from {:?}", events.len(), self.path);

        Ok(events)
    }
}

/// The date-keyed event map plus the rows that had to be dropped.
#[derive(Clone, Debug, Default)]
pub struct Projection {
    pub events: EventsByDate,
    pub skipped: Vec<Diagnostic>,
}

fn display_string(at: NaiveDateTime, title: &str) -> String {
    let title = title.trim();
    if at.hour() == 0 && at.minute() == 0 {
        title.to_string()
    } else {
        format!("{} - {}", at.format("%H:%M"), title)
    }
}

/// Turns stored rows into per-date display strings. Rows with malformed
/// timestamps are skipped, never fatal.
pub fn project<'a, I>(rows: I) -> Projection
where
    I: IntoIterator<Item = &'a RawEvent>,
{
    let mut projection = Projection::default();

    for (row, event) in rows.into_iter().enumerate() {
        let at = match NaiveDateTime::parse_from_str(event.timestamp.trim(), TIMESTAMP_FMT) {
            Ok(at) => at,
            Err(e) => {
                warn!(
                    "Invalid event timestamp {:?} in row {}: {}",
                    event.timestamp, row, e
                );
                projection.skipped.push(Diagnostic::EventParseSkipped {
                    row,
                    timestamp: event.timestamp.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        projection
            .events
            .entry(at.date())
            .or_default()
            .push(display_string(at, &event.title));
    }

    projection
}

/// Reads everything from `source` and projects it.
pub fn load(source: &dyn EventSource) -> Result<Projection> {
    let rows = source.raw_events()?;
    Ok(project(&rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn midnight_events_have_no_time_prefix() {
        let rows = vec![
            RawEvent::new("2025-03-10 00:00", "Birthday"),
            RawEvent::new("2025-03-10 09:30", "Standup"),
        ];

        let p = project(&rows);
        assert!(p.skipped.is_empty());
        assert_eq!(p.events.len(), 1);
        assert_eq!(
            p.events[&ymd(2025, 3, 10)],
            vec!["Birthday".to_string(), "09:30 - Standup".to_string()]
        );
    }

    #[test]
    fn source_order_is_preserved() {
        let rows = vec![
            RawEvent::new("2025-03-10 18:00", "Late"),
            RawEvent::new("2025-03-10 08:00", "Early"),
            RawEvent::new("2025-03-11 12:15", "  Lunch  "),
        ];

        let p = project(&rows);
        assert_eq!(p.events[&ymd(2025, 3, 10)], vec!["18:00 - Late", "08:00 - Early"]);
        assert_eq!(p.events[&ymd(2025, 3, 11)], vec!["12:15 - Lunch"]);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let rows = vec![
            RawEvent::new("2025/03/10", "X"),
            RawEvent::new("2025-03-12 07:05", "Kept"),
            RawEvent::new("", "Empty"),
            RawEvent::new("2025-02-30 10:00", "No such day"),
        ];

        let p = project(&rows);
        assert_eq!(p.events.len(), 1);
        assert_eq!(p.events[&ymd(2025, 3, 12)], vec!["07:05 - Kept"]);
        assert!(p.events.values().flatten().all(|e| e != "X"));

        let skipped_rows: Vec<usize> = p
            .skipped
            .iter()
            .map(|d| match d {
                Diagnostic::EventParseSkipped { row, .. } => *row,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(skipped_rows, vec![0, 2, 3]);
    }

    #[test]
    fn surrounding_whitespace_in_timestamp_is_ignored() {
        let rows = vec![RawEvent::new(" 2025-02-28 00:00 ", "Edge")];
        let p = project(&rows);
        assert_eq!(p.events[&ymd(2025, 2, 28)], vec!["Edge"]);
    }

    #[test]
    fn in_memory_rows_load_like_a_store() {
        let rows = vec![
            RawEvent::new("2025-03-10 00:00", "Birthday"),
            RawEvent::new("not a date", "Dropped"),
            RawEvent::new("2025-03-10 09:30", "Standup"),
        ];

        let p = load(&rows).unwrap();
        assert_eq!(p.events[&ymd(2025, 3, 10)], vec!["Birthday", "09:30 - Standup"]);
        assert_eq!(p.skipped.len(), 1);
    }

    #[test]
    fn dates_without_events_are_absent() {
        let p = project(&Vec::<RawEvent>::new());
        assert!(p.events.is_empty());
    }
}
