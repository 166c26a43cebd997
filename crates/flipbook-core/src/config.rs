//! Viewer configuration.
//!
//! Defaults reproduce the stock flipbook page: a 900px book with 40px of
//! horizontal padding, each page taking 48% of the spread. Hosts can
//! override any field through a JSON blob or through individual key/value
//! attributes (the web binding reads both from the root element).

use crate::error::ConfigError;
use log::LevelFilter;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_BOOK_WIDTH: f64 = 900.0;
pub const DEFAULT_HORIZONTAL_PADDING: f64 = 40.0;
pub const DEFAULT_PAGE_FRACTION: f64 = 0.48;
pub const DEFAULT_MIN_PAGE_WIDTH: f64 = 1.0;
pub const DEFAULT_ZOOM_QUIET_PERIOD_MS: u64 = 250;
pub const DEFAULT_LOAD_ERROR_MESSAGE: &str = "Failed to load flipbook PDF.";
pub const DEFAULT_WORKER_SRC: &str = "/js/pdf.worker.mjs";

/// Keys understood by [`FlipbookConfig::apply_attributes`].
pub const ATTRIBUTE_KEYS: &[&str] = &[
    "max-width",
    "padding",
    "page-fraction",
    "min-page-width",
    "zoom-quiet-ms",
    "error-message",
    "worker-src",
    "log-level",
];

/// Configuration for a single viewer instance.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlipbookConfig {
    /// Upper bound on the width of the whole two-page book, in CSS pixels
    pub max_book_width: f64,
    /// Horizontal space reserved around the book, in CSS pixels
    pub horizontal_padding: f64,
    /// Share of the book width given to one page; the rest is gutter
    pub page_fraction: f64,
    /// Floor applied to the computed page width on degenerate viewports
    pub min_page_width: f64,
    /// Quiet period after the last pinch-zoom signal before layout resumes
    pub zoom_quiet_period_ms: u64,
    /// Text shown in place of the viewer when the document cannot be opened
    pub load_error_message: String,
    /// Script URL for the document renderer's worker
    pub worker_src: String,
    pub log_level: String,
}

impl Default for FlipbookConfig {
    fn default() -> Self {
        Self {
            max_book_width: DEFAULT_MAX_BOOK_WIDTH,
            horizontal_padding: DEFAULT_HORIZONTAL_PADDING,
            page_fraction: DEFAULT_PAGE_FRACTION,
            min_page_width: DEFAULT_MIN_PAGE_WIDTH,
            zoom_quiet_period_ms: DEFAULT_ZOOM_QUIET_PERIOD_MS,
            load_error_message: DEFAULT_LOAD_ERROR_MESSAGE.to_string(),
            worker_src: DEFAULT_WORKER_SRC.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl FlipbookConfig {
    /// Parses a JSON object; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a config from host attributes, e.g. `("page-fraction", "0.45")`.
    ///
    /// Unknown keys are ignored so the host can carry unrelated data
    /// attributes on the same element.
    pub fn from_attributes<I, K, V>(attributes: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        config.apply_attributes(attributes)?;
        Ok(config)
    }

    /// Overrides fields from host attributes on top of the current values.
    pub fn apply_attributes<I, K, V>(&mut self, attributes: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in attributes {
            let key = key.as_ref().trim();
            let value = value.as_ref().trim();

            match key {
                "max-width" => self.max_book_width = parse_value(key, value)?,
                "padding" => self.horizontal_padding = parse_value(key, value)?,
                "page-fraction" => self.page_fraction = parse_value(key, value)?,
                "min-page-width" => self.min_page_width = parse_value(key, value)?,
                "zoom-quiet-ms" => self.zoom_quiet_period_ms = parse_value(key, value)?,
                "error-message" => self.load_error_message = value.to_string(),
                "worker-src" => self.worker_src = value.to_string(),
                "log-level" => self.log_level = value.to_string(),
                _ => {}
            }
        }

        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_book_width.is_finite() && self.max_book_width > 0.0) {
            return Err(ConfigError::OutOfRange {
                key: "max_book_width",
                value: self.max_book_width,
            });
        }

        if !(self.horizontal_padding.is_finite() && self.horizontal_padding >= 0.0) {
            return Err(ConfigError::OutOfRange {
                key: "horizontal_padding",
                value: self.horizontal_padding,
            });
        }

        if !(self.page_fraction > 0.0 && self.page_fraction <= 1.0) {
            return Err(ConfigError::OutOfRange {
                key: "page_fraction",
                value: self.page_fraction,
            });
        }

        if !(self.min_page_width.is_finite() && self.min_page_width > 0.0) {
            return Err(ConfigError::OutOfRange {
                key: "min_page_width",
                value: self.min_page_width,
            });
        }

        if LevelFilter::from_str(&self.log_level).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "log_level".to_string(),
                value: self.log_level.clone(),
            });
        }

        Ok(())
    }

    pub fn with_max_book_width(mut self, width: f64) -> Self {
        self.max_book_width = width;
        self
    }

    pub fn with_horizontal_padding(mut self, padding: f64) -> Self {
        self.horizontal_padding = padding;
        self
    }

    pub fn with_page_fraction(mut self, fraction: f64) -> Self {
        self.page_fraction = fraction;
        self
    }

    pub fn with_zoom_quiet_period(mut self, period: Duration) -> Self {
        self.zoom_quiet_period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_load_error_message(mut self, message: impl Into<String>) -> Self {
        self.load_error_message = message.into();
        self
    }

    pub fn zoom_quiet_period(&self) -> Duration {
        Duration::from_millis(self.zoom_quiet_period_ms)
    }

    /// Log level; falls back to `Info` when the stored name is unknown.
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
