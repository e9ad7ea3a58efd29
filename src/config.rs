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

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::color::{ColorSpec, Rgb};
use crate::error::{CalendarError, Result};
use crate::grid::StartOfWeek;

pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;

pub const DEFAULT_MIN_ROWS: usize = 6;
/// A year of weeks; anything above this is a typo, not a calendar.
pub const MAX_MIN_ROWS: usize = 52;

/// Space above the grid reserved for the title and weekday labels.
pub const HEADER_BAND_HEIGHT: u32 = 100;
/// Weekday labels sit this far below the top margin.
pub const WEEKDAY_LABEL_OFFSET: f64 = 60.0;

pub const GRID_LINE_WIDTH: f64 = 2.0;
pub const DAY_NUMBER_INSET_X: f64 = 7.0;
pub const DAY_NUMBER_INSET_Y: f64 = 5.0;
pub const EVENT_INSET_X: f64 = 10.0;
pub const EVENT_TOP_GAP: f64 = 2.0;

pub const ADJACENT_DAY_DIM: f64 = 0.5;
pub const ADJACENT_EVENT_DIM: f64 = 0.6;

pub const DEFAULT_FONT_FAMILY: &str = "Sans";
pub const DEFAULT_FONT_SIZES: FontSizes = FontSizes {
    title: 16,
    day: 16,
    event: 11,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Margins {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Default for Margins {
    fn default() -> Self {
        Margins {
            top: 50,
            bottom: 450,
            left: 500,
            right: 500,
        }
    }
}

/// Pixel sizes for the title, the day numbers and weekday labels, and event text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontSizes {
    pub title: u32,
    pub day: u32,
    pub event: u32,
}

impl Default for FontSizes {
    fn default() -> Self {
        DEFAULT_FONT_SIZES
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorSettings {
    pub background: ColorSpec,
    pub grid: ColorSpec,
    pub text: ColorSpec,
    pub event: ColorSpec,
    pub today_background: ColorSpec,
    pub today_event: ColorSpec,
}

impl Default for ColorSettings {
    fn default() -> Self {
        ColorSettings {
            background: "#000000".into(),
            grid: "#141414".into(),
            text: "#FFFFFF".into(),
            event: "#646464".into(),
            today_background: "#0F0F0F".into(),
            today_event: "#E0E0E0".into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    pub grid: Rgb,
    pub text: Rgb,
    pub event: Rgb,
    pub today_background: Rgb,
    pub today_event: Rgb,
}

impl ColorSettings {
    pub fn resolve(&self) -> Result<Palette> {
        Ok(Palette {
            background: self.background.resolve()?,
            grid: self.grid.resolve()?,
            text: self.text.resolve()?,
            event: self.event.resolve()?,
            today_background: self.today_background.resolve()?,
            today_event: self.today_event.resolve()?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    /// Filter directive, e.g. `info` or `calendar_wallpaper=debug`.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            level: "error".into(),
            file: Some(PathBuf::from("output/app.log")),
        }
    }
}

/// The configuration file as written by the user. Every field is optional.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub width: u32,
    pub height: u32,
    pub margins: Margins,
    pub header_band: u32,
    pub min_rows: usize,
    pub colors: ColorSettings,
    pub font: String,
    pub font_sizes: FontSizes,
    pub start_of_week: StartOfWeek,
    pub output: PathBuf,
    pub events_db: PathBuf,
    pub logging: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            margins: Margins::default(),
            header_band: HEADER_BAND_HEIGHT,
            min_rows: DEFAULT_MIN_ROWS,
            colors: ColorSettings::default(),
            font: "Roboto".into(),
            font_sizes: FontSizes::default(),
            start_of_week: StartOfWeek::Sunday,
            output: PathBuf::from("output/calendar.png"),
            events_db: PathBuf::from("db/events.sqlite3"),
            logging: LogSettings::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Settings> {
        let text = std::fs::read_to_string(path).map_err(|source| CalendarError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let settings = toml::from_str(&text).map_err(|source| CalendarError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Resolves colors and checks the geometry, producing the immutable
    /// configuration a render runs against.
    pub fn resolve(&self) -> Result<CalendarConfig> {
        let palette = self.colors.resolve()?;
        let output_format = OutputFormat::from_path(&self.output)?;

        let config = CalendarConfig {
            width: self.width,
            height: self.height,
            margins: self.margins,
            header_band: self.header_band,
            min_rows: self.min_rows,
            palette,
            font_family: self.font.clone(),
            font_sizes: self.font_sizes,
            start_of_week: self.start_of_week,
            output: self.output.clone(),
            output_format,
        };

        config.drawable_area()?;
        Ok(config)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Bmp,
    Jpeg,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<OutputFormat> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("png") => Ok(OutputFormat::Png),
            Some("bmp") => Ok(OutputFormat::Bmp),
            Some("jpg") | Some("jpeg") => Ok(OutputFormat::Jpeg),
            _ => Err(CalendarError::UnsupportedImageFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Everything a render needs, resolved and validated. Not modified after
/// construction.
#[derive(Clone, Debug, PartialEq)]
pub struct CalendarConfig {
    pub width: u32,
    pub height: u32,
    pub margins: Margins,
    pub header_band: u32,
    pub min_rows: usize,
    pub palette: Palette,
    pub font_family: String,
    pub font_sizes: FontSizes,
    pub start_of_week: StartOfWeek,
    pub output: PathBuf,
    pub output_format: OutputFormat,
}

impl CalendarConfig {
    /// Width and height of the grid area below the header band.
    pub fn drawable_area(&self) -> Result<(f64, f64)> {
        if self.min_rows > MAX_MIN_ROWS {
            return Err(CalendarError::LayoutInfeasible(format!(
                "min_rows {} exceeds the limit of {}",
                self.min_rows, MAX_MIN_ROWS
            )));
        }

        let m = &self.margins;
        let w = self.width as i64 - m.left as i64 - m.right as i64;
        let h = self.height as i64 - m.top as i64 - m.bottom as i64 - self.header_band as i64;

        if w <= 0 || h <= 0 {
            return Err(CalendarError::LayoutInfeasible(format!(
                "{}x{} canvas with margins {:?} and a {}px header leaves {}x{} for the grid",
                self.width, self.height, m, self.header_band, w, h
            )));
        }

        Ok((w as f64, h as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve() {
        let config = Settings::default().resolve().unwrap();

        assert_eq!(config.palette.background, Rgb(0, 0, 0));
        assert_eq!(config.palette.grid, Rgb(0x14, 0x14, 0x14));
        assert_eq!(config.palette.today_event, Rgb(0xE0, 0xE0, 0xE0));
        assert_eq!(config.output_format, OutputFormat::Png);
        assert_eq!(config.drawable_area().unwrap(), (920.0, 480.0));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r##"
            width = 800
            start_of_week = "mon"
            output = "out/cal.JPG"

            [margins]
            left = 10
            right = 10

            [colors]
            today_background = [1, 2, 3]
            text = "abcdef"
            "##,
        )
        .unwrap();

        assert_eq!(settings.height, DEFAULT_HEIGHT);
        assert_eq!(settings.margins.top, 50);
        assert_eq!(settings.margins.left, 10);

        let config = settings.resolve().unwrap();
        assert_eq!(config.start_of_week, StartOfWeek::Monday);
        assert_eq!(config.output_format, OutputFormat::Jpeg);
        assert_eq!(config.palette.today_background, Rgb(1, 2, 3));
        assert_eq!(config.palette.text, Rgb(0xab, 0xcd, 0xef));
        assert_eq!(config.palette.event, Rgb(0x64, 0x64, 0x64));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Settings>("colour = \"#000000\"").is_err());
    }

    #[test]
    fn bad_color_fails_before_render() {
        let mut settings = Settings::default();
        settings.colors.grid = "#12345".into();

        match settings.resolve() {
            Err(CalendarError::InvalidColorFormat { value }) => assert_eq!(value, "#12345"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn margins_must_leave_room() {
        let mut settings = Settings::default();
        settings.margins.left = 960;
        settings.margins.right = 960;
        assert!(matches!(settings.resolve(), Err(CalendarError::LayoutInfeasible(_))));

        let mut settings = Settings::default();
        settings.margins.bottom = 930;
        assert!(matches!(settings.resolve(), Err(CalendarError::LayoutInfeasible(_))));

        let mut settings = Settings::default();
        settings.margins.bottom = 929;
        assert!(settings.resolve().is_ok());
    }

    #[test]
    fn min_rows_is_capped() {
        let mut settings = Settings::default();
        settings.min_rows = MAX_MIN_ROWS;
        assert!(settings.resolve().is_ok());

        settings.min_rows = MAX_MIN_ROWS + 1;
        assert!(matches!(settings.resolve(), Err(CalendarError::LayoutInfeasible(_))));

        let parsed: Settings = toml::from_str("min_rows = 1000000").unwrap();
        assert!(matches!(parsed.resolve(), Err(CalendarError::LayoutInfeasible(_))));
    }

    #[test]
    fn output_extension_is_checked() {
        for ok in &["a.png", "b.BMP", "c.jpeg", "dir/d.jpg"] {
            assert!(OutputFormat::from_path(Path::new(ok)).is_ok(), "{}", ok);
        }
        for bad in &["a.gif", "noext", "png"] {
            assert!(matches!(
                OutputFormat::from_path(Path::new(bad)),
                Err(CalendarError::UnsupportedImageFormat { .. })
            ));
        }
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, CalendarError::ConfigRead { .. }));
    }
}
