//! Date-keyed chapter store.
//!
//! The store is a flat JSON object mapping `"MM-DD"` keys to plain-text
//! chapter content. It is written wholesale by the extractor, read-only
//! for the sender, and safe to hand-edit for corrections.

use crate::error::{AppError, Result};
use chrono::{Datelike, Local, NaiveDate};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Days per month on the 366-day leap calendar.
const DAYS_IN_MONTH: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// A two-part calendar key, rendered as zero-padded `"MM-DD"`.
///
/// February 29 is a valid key. `today()` can only produce it on an actual
/// leap day, so on non-leap years a stored `02-29` entry is simply never
/// selected; the sender needs no special case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey {
    month: u32,
    day: u32,
}

impl DateKey {
    /// Create a key, validating month and day ranges.
    pub fn new(month: u32, day: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(AppError::InvalidFormat(format!("invalid month: {month}")));
        }
        let max_day = DAYS_IN_MONTH[(month - 1) as usize];
        if day < 1 || day > max_day {
            return Err(AppError::InvalidFormat(format!(
                "invalid day {day:02} for month {month:02}"
            )));
        }
        Ok(Self { month, day })
    }

    /// Today's key, from the local clock.
    pub fn today() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    /// Key for a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    /// Map a 1-based day-of-year onto the leap calendar, so "Day 60" in a
    /// 366-entry book is February 29.
    pub fn from_day_of_year(day: u32) -> Option<Self> {
        NaiveDate::from_yo_opt(2024, day).map(Self::from_date)
    }

    /// Month component (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Day component (1-31).
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Human-readable form, e.g. "January 1".
    pub fn readable(&self) -> String {
        // 2024 is a leap year, so 02-29 renders too.
        NaiveDate::from_ymd_opt(2024, self.month, self.day)
            .map(|d| d.format("%B %-d").to_string())
            .unwrap_or_else(|| self.to_string())
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for DateKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let (month, day) = s
            .split_once('-')
            .ok_or_else(|| AppError::InvalidFormat(format!("invalid date-key: {s:?}")))?;
        let month: u32 = month
            .parse()
            .map_err(|_| AppError::InvalidFormat(format!("invalid date-key: {s:?}")))?;
        let day: u32 = day
            .parse()
            .map_err(|_| AppError::InvalidFormat(format!("invalid date-key: {s:?}")))?;
        Self::new(month, day)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = DateKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a date-key in MM-DD form")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<DateKey, E> {
                v.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(KeyVisitor)
    }
}

/// The date-keyed chapter mapping. Keys are unique and kept sorted, so
/// saves are stable and diffs stay readable after hand edits.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterStore {
    chapters: BTreeMap<DateKey, String>,
}

impl ChapterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Save the store as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut data = serde_json::to_string_pretty(self)?;
        data.push('\n');
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Look up the chapter for a key.
    pub fn get(&self, key: &DateKey) -> Option<&str> {
        self.chapters.get(key).map(String::as_str)
    }

    /// Insert a chapter, returning any previous content for the key.
    pub fn insert(&mut self, key: DateKey, content: String) -> Option<String> {
        self.chapters.insert(key, content)
    }

    /// Number of stored chapters.
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    /// Whether the store holds no chapters.
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Iterate chapters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&DateKey, &String)> {
        self.chapters.iter()
    }

    /// First and last keys present.
    pub fn date_range(&self) -> Option<(DateKey, DateKey)> {
        let first = self.chapters.keys().next()?;
        let last = self.chapters.keys().next_back()?;
        Some((*first, *last))
    }

    /// Mean content length in characters, for the extraction summary.
    pub fn average_content_len(&self) -> usize {
        if self.chapters.is_empty() {
            return 0;
        }
        let total: usize = self.chapters.values().map(|c| c.chars().count()).sum();
        total / self.chapters.len()
    }

    /// Keys absent from the full 366-day leap calendar, in order.
    pub fn missing_dates(&self) -> Vec<DateKey> {
        let mut missing = Vec::new();
        for month in 1..=12u32 {
            for day in 1..=DAYS_IN_MONTH[(month - 1) as usize] {
                let key = DateKey { month, day };
                if !self.chapters.contains_key(&key) {
                    missing.push(key);
                }
            }
        }
        missing
    }
}
