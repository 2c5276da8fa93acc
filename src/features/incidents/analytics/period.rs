//! Latest reporting period resolution

use chrono::{Datelike, NaiveDate};
use std::fmt;

use super::normalizer::{require_dated_reports, Dated};
use crate::core::error::{AppError, Result};
use crate::features::incidents::models::IncidentReport;

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportingPeriod {
    pub year: i32,
    pub month: u32,
}

impl ReportingPeriod {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Month of the most recent date, or `NoValidDates` when there is none
    pub fn latest<I>(dates: I) -> Result<Self>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        dates
            .into_iter()
            .max()
            .map(Self::of)
            .ok_or(AppError::NoValidDates)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// The reports that fall in the latest month present in the data
#[derive(Debug)]
pub struct LatestPeriod<'a> {
    pub period: ReportingPeriod,
    pub reports: Vec<&'a IncidentReport>,
}

impl<'a> LatestPeriod<'a> {
    /// Normalize dates, find the latest month and keep every report in it.
    ///
    /// Reports with unparseable dates never belong to the bucket.
    pub fn resolve(reports: &'a [IncidentReport]) -> Result<Self> {
        let dated = require_dated_reports(reports)?;
        let period = ReportingPeriod::latest(dated.iter().map(|d| d.date))?;

        let reports: Vec<&IncidentReport> = dated
            .into_iter()
            .filter(|Dated { date, .. }| period.contains(*date))
            .map(|d| d.report)
            .collect();

        tracing::debug!("Latest period {} holds {} reports", period, reports.len());
        Ok(Self { period, reports })
    }
}
