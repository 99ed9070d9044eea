//! Finds explicit date ranges in chat messages
//!
//! Recognizes "Dec 28 to Jan 3", "March 3-7, 2027", "12/28 - 1/3" and
//! "2026-12-28 to 2027-01-03". Dates without a year resolve to their next
//! occurrence on or after `today`; an end date that would fall before the
//! start rolls into the following year.

use chrono::{Datelike, NaiveDate};
use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::models::DateRange;

const SEPARATOR: &str = r"\s*(?:to|through|thru|until|till|-|–)\s*";
const MONTH: &str = r"(january|february|march|april|may|june|july|august|september|october|november|december|sept|jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec)\.?";
const DAY: &str = r"(\d{1,2})(?:st|nd|rd|th)?";

static ISO_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(\d{{4}})-(\d{{2}})-(\d{{2}}){SEPARATOR}(\d{{4}})-(\d{{2}})-(\d{{2}})\b"
    ))
    .expect("iso range regex")
});

static NAMED_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{MONTH}\s+{DAY}(?:,?\s+(\d{{4}}))?{SEPARATOR}(?:{MONTH}\s+)?{DAY}(?:,?\s+(\d{{4}}))?\b"
    ))
    .expect("named month range regex")
});

static NUMERIC_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(\d{{1,2}})/(\d{{1,2}})(?:/(\d{{4}}|\d{{2}}))?{SEPARATOR}(\d{{1,2}})/(\d{{1,2}})(?:/(\d{{4}}|\d{{2}}))?\b"
    ))
    .expect("numeric range regex")
});

/// First explicit date range mentioned in `text`, resolved against `today`
#[must_use]
pub fn find_date_range(text: &str, today: NaiveDate) -> Option<DateRange> {
    if let Some(caps) = ISO_RANGE.captures(text) {
        let start = ymd(number(&caps, 1)?, number(&caps, 2)?, number(&caps, 3)?)?;
        let end = ymd(number(&caps, 4)?, number(&caps, 5)?, number(&caps, 6)?)?;
        return DateRange::new(start, end).ok();
    }

    if let Some(caps) = NAMED_RANGE.captures(text) {
        let start_month = month_number(caps.get(1)?.as_str())?;
        let end_month = match caps.get(4) {
            Some(m) => month_number(m.as_str())?,
            None => start_month,
        };
        return resolve(
            today,
            (start_month, number(&caps, 2)?, year(&caps, 3)),
            (end_month, number(&caps, 5)?, year(&caps, 6)),
        );
    }

    if let Some(caps) = NUMERIC_RANGE.captures(text) {
        return resolve(
            today,
            (number(&caps, 1)?, number(&caps, 2)?, year(&caps, 3)),
            (number(&caps, 4)?, number(&caps, 5)?, year(&caps, 6)),
        );
    }

    None
}

/// Next occurrence of `month`/`day` on or after `today`
#[must_use]
pub fn next_occurrence(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    // Feb 29 may be up to four years away
    (today.year()..=today.year() + 4)
        .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
        .find(|d| *d >= today)
}

fn resolve(
    today: NaiveDate,
    (start_month, start_day, start_year): (u32, u32, Option<i32>),
    (end_month, end_day, end_year): (u32, u32, Option<i32>),
) -> Option<DateRange> {
    let start = match start_year {
        Some(y) => NaiveDate::from_ymd_opt(y, start_month, start_day)?,
        // "Dec 28 - Jan 3, 2027": the explicit end year anchors the start
        None => match end_year {
            Some(y) if (end_month, end_day) < (start_month, start_day) => {
                NaiveDate::from_ymd_opt(y - 1, start_month, start_day)?
            }
            Some(y) => NaiveDate::from_ymd_opt(y, start_month, start_day)?,
            None => next_occurrence(start_month, start_day, today)?,
        },
    };

    let end = match end_year {
        Some(y) => NaiveDate::from_ymd_opt(y, end_month, end_day)?,
        None => {
            let same_year = NaiveDate::from_ymd_opt(start.year(), end_month, end_day);
            match same_year {
                Some(d) if d >= start => d,
                _ => NaiveDate::from_ymd_opt(start.year() + 1, end_month, end_day)?,
            }
        }
    };

    DateRange::new(start, end).ok()
}

fn ymd(year: u32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

fn number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

fn year(caps: &Captures<'_>, group: usize) -> Option<i32> {
    let raw = caps.get(group)?.as_str();
    let value: i32 = raw.parse().ok()?;
    Some(if raw.len() == 2 { 2000 + value } else { value })
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().trim_end_matches('.').get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
