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

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::prelude::*;
use clap::Parser;
use itertools::Itertools;
use tracing::{debug, error, info, warn};

use calendar_wallpaper::events::{self, Projection};
use calendar_wallpaper::{logging, render, RenderRequest, Settings, SqliteEventStore, StartOfWeek};

#[derive(Parser)]
#[clap(version = "1.0", author = "bd_ <bdunderscore@fushizen.net>")]
/// Generate a calendar image with events.
struct Opts {
    /// Year for the calendar (default: current year)
    #[clap(short, long)]
    year: Option<i32>,

    /// Month for the calendar, 1-12 (default: current month)
    #[clap(short, long, validator = valid_month)]
    month: Option<u32>,

    /// First day of the week: 'sun' or 'mon' (default: from config)
    #[clap(short, long)]
    start_of_week: Option<StartOfWeek>,

    /// TOML settings file
    #[clap(short, long, env = "CALENDAR_WALLPAPER_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the SQLite event database
    #[clap(short, long)]
    database: Option<PathBuf>,

    /// Where to write the image (png, bmp, jpg)
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Date to highlight as today, YYYY-MM-DD
    #[clap(long)]
    today: Option<NaiveDate>,
}

fn valid_month(s: &str) -> std::result::Result<(), String> {
    match s.parse::<u32>() {
        Ok(1..=12) => Ok(()),
        _ => Err(format!("{:?} is not a month between 1 and 12", s)),
    }
}

fn load_settings(opts: &Opts) -> Result<Settings> {
    let mut settings = match &opts.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    if let Some(sow) = opts.start_of_week {
        settings.start_of_week = sow;
    }
    if let Some(db) = &opts.database {
        settings.events_db = db.clone();
    }
    if let Some(output) = &opts.output {
        settings.output = output.clone();
    }

    Ok(settings)
}

/// A calendar without events beats no calendar, so store failures are
/// logged and rendering carries on.
fn load_events(settings: &Settings) -> Projection {
    let loaded = SqliteEventStore::open(&settings.events_db)
        .and_then(|store| events::load(&store));

    match loaded {
        Ok(projection) => {
            if !projection.skipped.is_empty() {
                warn!("Skipped {} malformed event rows", projection.skipped.len());
            }
            projection
        }
        Err(e) => {
            error!("Failed to read events from {:?}: {}", settings.events_db, e);
            Projection::default()
        }
    }
}

fn main() -> Result<()> {
    let opts: Opts = Opts::parse();

    let settings = load_settings(&opts)?;
    let _log_guard = logging::init(&settings.logging)?;
    info!("Starting calendar generation");

    let config = settings.resolve().context("Invalid configuration")?;

    let today = opts.today.unwrap_or_else(|| Local::now().date_naive());
    let request = RenderRequest {
        year: opts.year.unwrap_or_else(|| today.year()),
        month: opts.month.unwrap_or_else(|| today.month()),
        start_of_week: config.start_of_week,
        today,
    };

    let projection = load_events(&settings);
    debug!("Events: {:?}", projection.events);

    let report = render(&request, &projection.events, &config)
        .with_context(|| format!("Rendering {}-{:02}", request.year, request.month))?;

    if !report.diagnostics.is_empty() {
        warn!("Render notes: {}", report.diagnostics.iter().join("; "));
    }
    println!("Calendar image generated: {}", report.output.display());

    Ok(())
}
