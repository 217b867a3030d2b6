//! Date derivation from chapter titles and inline headers.

use crate::store::DateKey;
use regex::Regex;
use std::sync::LazyLock;

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|november|december";
const MONTHS_ABBR: &str =
    "jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec";

/// "January 1", "Jan 1".
static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b({MONTHS}|{MONTHS_ABBR})\.?\s+(\d{{1,2}})\b"
    ))
    .expect("month-day pattern compiles")
});

/// "1 January", "1st January", "2nd Feb".
static DAY_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+({MONTHS}|{MONTHS_ABBR})\b"
    ))
    .expect("day-month pattern compiles")
});

/// "Day 1" through "Day 366", numbered from January 1.
static DAY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bday\s+(\d{1,3})\b").expect("day pattern compiles"));

/// A bare "Month Day" line separating entries inside one document. Only
/// full month names count here; abbreviations show up too often in prose.
static INLINE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?im)^\s*({MONTHS})\s+(\d{{1,2}})\s*$"))
        .expect("inline header pattern compiles")
});

/// Convert a month name or abbreviation to its number.
pub fn month_number(name: &str) -> Option<u32> {
    let n = match name.to_ascii_lowercase().as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(n)
}

/// Derive a date-key from a chapter title, if it carries one.
///
/// Accepted shapes, tried in order: "January 1" / "Jan 1", "1 January" /
/// "1st January", "Day N" (N mapped onto the leap calendar). Titles with
/// an impossible date ("February 30") yield `None`, so the caller skips
/// the item rather than storing a key no clock will ever produce.
pub fn date_from_title(title: &str) -> Option<DateKey> {
    if let Some(caps) = MONTH_DAY.captures(title) {
        let month = month_number(&caps[1])?;
        let day = caps[2].parse().ok()?;
        return DateKey::new(month, day).ok();
    }

    if let Some(caps) = DAY_MONTH.captures(title) {
        let day = caps[1].parse().ok()?;
        let month = month_number(&caps[2])?;
        return DateKey::new(month, day).ok();
    }

    if let Some(caps) = DAY_NUMBER.captures(title) {
        let day: u32 = caps[1].parse().ok()?;
        if (1..=366).contains(&day) {
            return DateKey::from_day_of_year(day);
        }
    }

    None
}

/// Split plain text into entries at bare "Month Day" header lines.
///
/// This is the "Calendar of Wisdom" shape: one document holding many
/// dated entries under their own header lines. Returns the entries in
/// document order; text before the first header is discarded.
pub fn split_inline_entries(text: &str) -> Vec<(DateKey, String)> {
    let matches: Vec<_> = INLINE_HEADER.captures_iter(text).collect();
    let mut entries = Vec::with_capacity(matches.len());

    for (i, caps) in matches.iter().enumerate() {
        let Some(month) = month_number(&caps[1]) else {
            continue;
        };
        let Ok(day) = caps[2].parse() else { continue };
        let Ok(key) = DateKey::new(month, day) else {
            continue;
        };

        let start = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());

        entries.push((key, text[start..end].trim().to_string()));
    }

    entries
}
