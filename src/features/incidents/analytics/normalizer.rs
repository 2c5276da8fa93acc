//! Lenient parsing of the report date and time columns

use chrono::{NaiveDate, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

use crate::core::error::{AppError, Result};
use crate::features::incidents::models::IncidentReport;

lazy_static! {
    /// Three numeric date parts with a `/`, `-` or `.` separator.
    /// Either day-first (`15/1/2024`, `15-01-24`) or year-first (`2024-01-15`).
    static ref DATE_REGEX: Regex =
        Regex::new(r"^(\d{1,4})([/.\-])(\d{1,2})([/.\-])(\d{1,4})$").unwrap();
}

/// Parse a day-first report date, ignoring any trailing time part.
///
/// When the day-first reading is not a calendar date but the month-first
/// one is (`1/15/2024`), the month-first reading is used.
pub fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw
        .trim()
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()?;

    let caps = DATE_REGEX.captures(date_part)?;
    if caps[2] != caps[4] {
        return None;
    }

    let first = &caps[1];
    let middle: u32 = caps[3].parse().ok()?;
    let last = &caps[5];

    if first.len() == 4 {
        if last.len() > 2 {
            return None;
        }
        let year: i32 = first.parse().ok()?;
        let day: u32 = last.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, middle, day);
    }

    if first.len() > 2 {
        return None;
    }
    let year = match last.len() {
        1 | 2 => 2000 + last.parse::<i32>().ok()?,
        4 => last.parse::<i32>().ok()?,
        _ => return None,
    };
    let day: u32 = first.parse().ok()?;

    NaiveDate::from_ymd_opt(year, middle, day).or_else(|| NaiveDate::from_ymd_opt(year, day, middle))
}

/// Parse a 24-hour `HH:MM:SS` report time
pub fn parse_report_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S").ok()
}

/// A report together with its parsed date
#[derive(Debug, Clone, Copy)]
pub struct Dated<'a> {
    pub report: &'a IncidentReport,
    pub date: NaiveDate,
}

/// Reports with a parseable date, in fetch order; the rest are dropped
pub fn dated_reports(reports: &[IncidentReport]) -> Vec<Dated<'_>> {
    reports
        .iter()
        .filter_map(|report| {
            let date = report.date_of_report.as_deref().and_then(parse_report_date)?;
            Some(Dated { report, date })
        })
        .collect()
}

/// Like [`dated_reports`], but fails when no report has a usable date
pub fn require_dated_reports(reports: &[IncidentReport]) -> Result<Vec<Dated<'_>>> {
    let dated = dated_reports(reports);
    if dated.is_empty() {
        return Err(AppError::NoValidDates);
    }
    if dated.len() < reports.len() {
        tracing::debug!(
            "Dropped {} reports with unparseable dates",
            reports.len() - dated.len()
        );
    }
    Ok(dated)
}
