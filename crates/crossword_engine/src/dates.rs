//! Date token resolution.
//!
//! A token is empty (today), one date expression, or `START:END`. Numeric
//! dates such as `03/04/2024` are ambiguous, so ranges are read day-first and,
//! when that yields an inverted range, re-read month-first.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_english::{parse_date_string, Dialect};
use chrono_tz::Tz;
use engine_logging::engine_debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ParameterError;

/// Publication timezone of the puzzles.
pub const REFERENCE_TZ: Tz = chrono_tz::Australia::Sydney;

static NUMERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})$")
        .expect("numeric date pattern compiles")
});

static YEAR_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})(?:[/.\-](\d{1,2})[/.\-](\d{1,2})|(\d{2})(\d{2}))$")
        .expect("year-first date pattern compiles")
});

static ORDINAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("ordinal pattern compiles")
});

/// Month-name layouts tried after ordinals and commas are removed. `%b` and
/// `%a` also accept full names.
const NAMED_FORMATS: [&str; 4] = ["%d %b %Y", "%b %d %Y", "%a %d %b %Y", "%a %b %d %Y"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    DayFirst,
    MonthFirst,
}

impl DateOrder {
    fn dialect(self) -> Dialect {
        match self {
            DateOrder::DayFirst => Dialect::Uk,
            DateOrder::MonthFirst => Dialect::Us,
        }
    }
}

pub fn now_in_reference_tz() -> DateTime<Tz> {
    Utc::now().with_timezone(&REFERENCE_TZ)
}

pub fn today() -> NaiveDate {
    now_in_reference_tz().date_naive()
}

/// Resolve `token` against the current time.
pub fn resolve_dates(token: Option<&str>) -> Result<Vec<NaiveDate>, ParameterError> {
    resolve_dates_at(token, now_in_reference_tz())
}

/// Resolve `token` relative to `now`, returning consecutive dates in order.
pub fn resolve_dates_at(
    token: Option<&str>,
    now: DateTime<Tz>,
) -> Result<Vec<NaiveDate>, ParameterError> {
    let token = token.map(str::trim).unwrap_or_default();
    if token.is_empty() {
        return Ok(vec![now.date_naive()]);
    }

    // Timestamps carry their own colons; try them before splitting a range.
    if let Some(date) = parse_timestamp(token) {
        return Ok(vec![date]);
    }

    let dates = match token.split_once(':') {
        Some((start, end)) => {
            let (start, end) = resolve_range(start.trim(), end.trim(), now)?;
            days_inclusive(start, end)
        }
        None => vec![parse_single_date(token, DateOrder::DayFirst, now)
            .or_else(|_| parse_single_date(token, DateOrder::MonthFirst, now))?],
    };
    engine_debug!("date token {:?} resolved to {} date(s)", token, dates.len());
    Ok(dates)
}

/// Day-first, then month-first if day-first fails or runs backwards.
pub fn resolve_range(
    start: &str,
    end: &str,
    now: DateTime<Tz>,
) -> Result<(NaiveDate, NaiveDate), ParameterError> {
    if start.is_empty() || end.is_empty() {
        return Err(ParameterError::EmptyRangeBound);
    }

    if let Ok((first, last)) = parse_range(start, end, DateOrder::DayFirst, now) {
        if first <= last {
            return Ok((first, last));
        }
    }

    let (first, last) = parse_range(start, end, DateOrder::MonthFirst, now)?;
    if last < first {
        return Err(ParameterError::InvertedRange {
            start: first,
            end: last,
        });
    }
    Ok((first, last))
}

/// Parse both ends of a range with one precedence. Ordering is not checked.
pub fn parse_range(
    start: &str,
    end: &str,
    order: DateOrder,
    now: DateTime<Tz>,
) -> Result<(NaiveDate, NaiveDate), ParameterError> {
    Ok((
        parse_single_date(start, order, now)?,
        parse_single_date(end, order, now)?,
    ))
}

/// Parse one date expression. Timezone-aware timestamps are converted to the
/// reference timezone before the calendar date is taken.
pub fn parse_single_date(
    raw: &str,
    order: DateOrder,
    now: DateTime<Tz>,
) -> Result<NaiveDate, ParameterError> {
    let raw = raw.trim();
    if let Some(date) = parse_timestamp(raw) {
        return Ok(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Some(caps) = NUMERIC_DATE.captures(raw) {
        return numeric_date(raw, &caps[1], &caps[2], &caps[3], order);
    }
    if let Some(date) = year_first_date(raw) {
        return Ok(date);
    }
    if let Some(date) = named_month_date(raw) {
        return Ok(date);
    }

    parse_date_string(raw, now, order.dialect())
        .map(|parsed| parsed.date_naive())
        .map_err(|err| ParameterError::UnparseableDate {
            input: raw.to_string(),
            message: err.to_string(),
        })
}

fn parse_timestamp(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .map(|parsed| parsed.with_timezone(&REFERENCE_TZ).date_naive())
}

fn numeric_date(
    raw: &str,
    first: &str,
    second: &str,
    year: &str,
    order: DateOrder,
) -> Result<NaiveDate, ParameterError> {
    let unparseable = |message: &str| ParameterError::UnparseableDate {
        input: raw.to_string(),
        message: message.to_string(),
    };
    let first: u32 = first.parse().map_err(|_| unparseable("bad day or month"))?;
    let second: u32 = second.parse().map_err(|_| unparseable("bad day or month"))?;
    let mut year: i32 = year.parse().map_err(|_| unparseable("bad year"))?;
    if year < 100 {
        year += 2000;
    }
    let (day, month) = match order {
        DateOrder::DayFirst => (first, second),
        DateOrder::MonthFirst => (second, first),
    };
    // the order is a preference: `12/31/2024` read day-first is still 31 Dec
    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(year, day, month))
        .ok_or_else(|| unparseable("no such calendar date"))
}

/// `2024/03/05`, `2024.3.5` or `20240305`.
fn year_first_date(raw: &str) -> Option<NaiveDate> {
    let caps = YEAR_FIRST.captures(raw)?;
    let year = caps[1].parse().ok()?;
    let (month, day) = match (caps.get(2), caps.get(3)) {
        (Some(month), Some(day)) => (month.as_str(), day.as_str()),
        _ => (caps.get(4)?.as_str(), caps.get(5)?.as_str()),
    };
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

/// `Mar 5 2024`, `5th March 2024`, `Tuesday, March 5th, 2024` and the like.
fn named_month_date(raw: &str) -> Option<NaiveDate> {
    let stripped = ORDINAL.replace_all(raw, "$1").replace(',', " ");
    let normalized = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    NAMED_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&normalized, format).ok())
}

fn days_inclusive(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}
