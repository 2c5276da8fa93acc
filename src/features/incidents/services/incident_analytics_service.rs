use chrono::{Datelike, Timelike};
use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::incidents::analytics::aggregator::{
    count_matching, cross_tab, distinct, group_mean_count, mean, rate, top_n_by_date,
    value_counts, weekday_cross_tab, OrderedMap,
};
use crate::features::incidents::analytics::normalizer::{dated_reports, parse_report_time};
use crate::features::incidents::analytics::LatestPeriod;
use crate::features::incidents::dtos::*;
use crate::features::incidents::models::*;
use crate::modules::row_source::{RowQuery, RowSource};
use crate::shared::constants::{
    ALL_STATUS, ALL_TYPES, RECENT_REPORTS_LIMIT, STATUS_ACTIVE,
};

/// Service answering the reporting queries over the incident table.
///
/// Every query re-reads the table with a single row source call.
pub struct IncidentAnalyticsService {
    source: Arc<dyn RowSource>,
    table: String,
}

impl IncidentAnalyticsService {
    pub fn new(source: Arc<dyn RowSource>, table: impl Into<String>) -> Self {
        Self {
            source,
            table: table.into(),
        }
    }

    fn select(&self, columns: &[&str]) -> RowQuery {
        RowQuery::select(self.table.as_str(), columns)
    }

    async fn fetch_reports(&self, query: RowQuery) -> Result<Vec<IncidentReport>> {
        let rows = self.source.fetch(&query).await?;
        tracing::debug!(
            "Fetched {} rows from {} via {}",
            rows.len(),
            self.table,
            self.source.name()
        );
        Ok(rows.into_iter().map(IncidentReport::from_row).collect())
    }

    // ========================================================================
    // All-time counters
    // ========================================================================

    pub async fn active_reports_count_total(&self) -> Result<ActiveReportsCountDto> {
        let query = self.select(&[COL_ID]).eq(COL_STATUS, STATUS_ACTIVE);
        let active_reports_count = self.source.count(&query).await?;

        Ok(ActiveReportsCountDto {
            active_reports_count,
        })
    }

    pub async fn average_response_time_total(&self) -> Result<AverageResponseTimeDto> {
        let reports = self.fetch_reports(self.select(&[COL_TIME_TO_SOLVE])).await?;

        Ok(AverageResponseTimeDto {
            average_response_time: mean(reports.iter().filter_map(|r| r.time_taken_to_solve)),
        })
    }

    pub async fn resolution_rate_total(&self) -> Result<ResolutionRateDto> {
        let reports = self.fetch_reports(self.select(&[COL_STATUS])).await?;

        let total_reports = reports.len() as u64;
        let solved_reports = count_matching(&reports, IncidentReport::is_solved);

        Ok(ResolutionRateDto {
            total_reports,
            solved_reports,
            resolution_rate: rate(solved_reports, total_reports),
        })
    }

    pub async fn emergency_reports_total(&self) -> Result<EmergencyReportsTotalDto> {
        let reports = self.fetch_reports(self.select(&[COL_EMERGENCY_TYPE])).await?;

        Ok(EmergencyReportsTotalDto {
            emergency_reports_total: count_matching(&reports, IncidentReport::is_emergency),
        })
    }

    // ========================================================================
    // Latest month
    // ========================================================================

    pub async fn number_reports_latest_month(&self) -> Result<ReportsLatestMonthDto> {
        let reports = self.fetch_reports(self.select(&[COL_DATE_OF_REPORT])).await?;
        let latest = LatestPeriod::resolve(&reports)?;

        Ok(ReportsLatestMonthDto {
            number_reports_latest_month: latest.reports.len() as u64,
        })
    }

    pub async fn active_reports_count_latest(&self) -> Result<ActiveReportsLatestDto> {
        let reports = self
            .fetch_reports(self.select(&[COL_DATE_OF_REPORT, COL_STATUS]))
            .await?;
        let latest = LatestPeriod::resolve(&reports)?;

        Ok(ActiveReportsLatestDto {
            active_reports_count_latest: count_matching(
                latest.reports.iter().copied(),
                IncidentReport::is_active,
            ),
        })
    }

    pub async fn emergency_reports_latest_month(&self) -> Result<EmergencyReportsLatestDto> {
        let reports = self
            .fetch_reports(self.select(&[COL_DATE_OF_REPORT, COL_EMERGENCY_TYPE]))
            .await?;
        // No dated reports means no emergencies, not a data-quality error
        if dated_reports(&reports).is_empty() {
            return Ok(EmergencyReportsLatestDto {
                emergency_reports_latest_month: 0,
            });
        }
        let latest = LatestPeriod::resolve(&reports)?;

        Ok(EmergencyReportsLatestDto {
            emergency_reports_latest_month: count_matching(
                latest.reports.iter().copied(),
                IncidentReport::is_emergency,
            ),
        })
    }

    pub async fn average_response_time_latest(&self) -> Result<AverageResponseTimeLatestDto> {
        let reports = self
            .fetch_reports(self.select(&[COL_DATE_OF_REPORT, COL_TIME_TO_SOLVE]))
            .await?;
        let latest = LatestPeriod::resolve(&reports)?;

        Ok(AverageResponseTimeLatestDto {
            average_response_time_latest: mean(
                latest.reports.iter().filter_map(|r| r.time_taken_to_solve),
            ),
        })
    }

    pub async fn resolution_rate_latest(&self) -> Result<ResolutionRateLatestDto> {
        let reports = self
            .fetch_reports(self.select(&[COL_DATE_OF_REPORT, COL_STATUS]))
            .await?;
        let latest = LatestPeriod::resolve(&reports)?;

        let total_reports_latest = latest.reports.len() as u64;
        let solved_reports_latest =
            count_matching(latest.reports.iter().copied(), IncidentReport::is_solved);

        Ok(ResolutionRateLatestDto {
            total_reports_latest,
            solved_reports_latest,
            resolution_rate_latest: rate(solved_reports_latest, total_reports_latest),
        })
    }

    // ========================================================================
    // Listings
    // ========================================================================

    pub async fn recent_reports(&self) -> Result<RecentReportsDto> {
        let reports = self.fetch_reports(RowQuery::all(self.table.as_str())).await?;

        let recent_reports = top_n_by_date(dated_reports(&reports), RECENT_REPORTS_LIMIT)
            .into_iter()
            .cloned()
            .collect();

        Ok(RecentReportsDto { recent_reports })
    }

    pub async fn all_reports(&self, params: &AllReportsParams) -> Result<AllReportsDto> {
        let reports = self.fetch_reports(RowQuery::all(self.table.as_str())).await?;

        let status = Some(params.status_filter.as_str()).filter(|s| *s != ALL_STATUS);
        let report_type = Some(params.types_filter.as_str()).filter(|t| *t != ALL_TYPES);

        let all_reports = reports
            .into_iter()
            .filter(|r| status.is_none() || r.active_status.as_deref() == status)
            .filter(|r| report_type.is_none() || r.report_type.as_deref() == report_type)
            .collect();

        Ok(AllReportsDto { all_reports })
    }

    pub async fn unique_values(&self) -> Result<UniqueValuesDto> {
        let reports = self
            .fetch_reports(self.select(&[COL_STATUS, COL_REPORT_TYPE]))
            .await?;

        Ok(UniqueValuesDto {
            unique_active_values: distinct(reports.iter().filter_map(|r| r.active_status.as_deref())),
            unique_types_values: distinct(reports.iter().filter_map(|r| r.report_type.as_deref())),
        })
    }

    // ========================================================================
    // Distributions
    // ========================================================================

    pub async fn peak_hour_analysis(&self) -> Result<PeakHourAnalysisDto> {
        let reports = self
            .fetch_reports(self.select(&[COL_REPORT_TIME, COL_EMERGENCY_TYPE]))
            .await?;
        if reports.is_empty() {
            return Err(AppError::NoData);
        }

        let by_hour = reports.iter().filter_map(|r| {
            let time = r.report_time.as_deref().and_then(parse_report_time)?;
            Some((time.hour(), r.emergency_type.as_deref()?))
        });

        Ok(PeakHourAnalysisDto {
            peak_hour_analysis: cross_tab(by_hour),
        })
    }

    pub async fn weekly_patterns(&self) -> Result<WeeklyPatternsDto> {
        let reports = self
            .fetch_reports(self.select(&[COL_DATE_OF_REPORT, COL_EMERGENCY_TYPE]))
            .await?;
        if reports.is_empty() {
            return Ok(WeeklyPatternsDto {
                weekly_patterns: OrderedMap::default(),
            });
        }

        let dated = dated_reports(&reports);
        let by_day = dated
            .iter()
            .filter_map(|d| Some((d.date.weekday(), d.report.emergency_type.as_deref()?)));

        Ok(WeeklyPatternsDto {
            weekly_patterns: weekday_cross_tab(by_day),
        })
    }

    pub async fn report_types_distribution(&self) -> Result<ReportTypesDistributionDto> {
        let reports = self.fetch_reports(self.select(&[COL_REPORT_TYPE])).await?;

        Ok(ReportTypesDistributionDto {
            report_types_distribution: value_counts(
                reports.iter().filter_map(|r| r.report_type.as_deref()),
            ),
        })
    }

    pub async fn emergency_summary(&self) -> Result<Vec<EmergencySummaryItemDto>> {
        let reports = self
            .fetch_reports(self.select(&[COL_EMERGENCY_TYPE, COL_TIME_TO_SOLVE]))
            .await?;

        let pairs = reports
            .iter()
            .filter_map(|r| Some((r.emergency_type.as_deref()?, r.time_taken_to_solve?)));

        Ok(group_mean_count(pairs)
            .into_iter()
            .map(|stats| EmergencySummaryItemDto {
                emergency_type: stats.key,
                average_time_to_solve: stats.mean,
                number_of_reports: stats.count,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{FailingRowSource, StaticRowSource};
    use serde_json::json;

    fn service(rows: serde_json::Value) -> IncidentAnalyticsService {
        IncidentAnalyticsService::new(Arc::new(StaticRowSource::from_json(rows)), "Incident_Reports")
    }

    fn sample() -> IncidentAnalyticsService {
        service(json!([
            { "id": 1, "Active": "Active", "Types_of_report": "Fire", "emergency_type": "Emergency",
              "Date_of_report": "15/1/2024", "Report_Time": "09:15:00", "time_taken_to_solve": 30 },
            { "id": 2, "Active": "solved", "Types_of_report": "Flood", "emergency_type": "Minor",
              "Date_of_report": "1/2/2024", "Report_Time": "14:00:00", "time_taken_to_solve": 10 },
            { "id": 3, "Active": "Active", "Types_of_report": "Fire", "emergency_type": "Emergency",
              "Date_of_report": "20/2/2024", "Report_Time": "14:30:00", "time_taken_to_solve": null },
            { "id": 4, "Active": "solved", "Types_of_report": "Theft", "emergency_type": null,
              "Date_of_report": "bad date", "Report_Time": "late", "time_taken_to_solve": 5 }
        ]))
    }

    #[tokio::test]
    async fn test_active_reports_count_total() {
        let dto = sample().active_reports_count_total().await.unwrap();
        assert_eq!(dto.active_reports_count, 2);
    }

    #[tokio::test]
    async fn test_average_response_time_total_skips_nulls() {
        let dto = sample().average_response_time_total().await.unwrap();
        assert_eq!(dto.average_response_time.to_string(), "15.00");

        let empty = service(json!([{ "time_taken_to_solve": null }]));
        let dto = empty.average_response_time_total().await.unwrap();
        assert_eq!(dto.average_response_time.to_string(), "0.00");
    }

    #[tokio::test]
    async fn test_resolution_rate_total() {
        let dto = sample().resolution_rate_total().await.unwrap();
        assert_eq!(dto.total_reports, 4);
        assert_eq!(dto.solved_reports, 2);
        assert_eq!(dto.resolution_rate.to_string(), "50.00");

        let dto = service(json!([])).resolution_rate_total().await.unwrap();
        assert_eq!(dto.total_reports, 0);
        assert_eq!(dto.resolution_rate.to_string(), "0.00");
    }

    #[tokio::test]
    async fn test_latest_month_counters() {
        let svc = sample();
        assert_eq!(
            svc.number_reports_latest_month().await.unwrap().number_reports_latest_month,
            2
        );
        assert_eq!(
            svc.active_reports_count_latest().await.unwrap().active_reports_count_latest,
            1
        );
        assert_eq!(
            svc.emergency_reports_latest_month()
                .await
                .unwrap()
                .emergency_reports_latest_month,
            1
        );
        assert_eq!(
            svc.average_response_time_latest()
                .await
                .unwrap()
                .average_response_time_latest
                .to_string(),
            "10.00"
        );

        let rate = svc.resolution_rate_latest().await.unwrap();
        assert_eq!(rate.total_reports_latest, 2);
        assert_eq!(rate.solved_reports_latest, 1);
        assert_eq!(rate.resolution_rate_latest.to_string(), "50.00");
    }

    #[tokio::test]
    async fn test_latest_month_without_valid_dates() {
        let svc = service(json!([
            { "Date_of_report": "not-a-date" },
            { "Date_of_report": "" },
            { "Date_of_report": "99/99/9999" }
        ]));

        let err = svc.number_reports_latest_month().await.unwrap_err();
        assert_eq!(err.to_string(), "No valid dates found in Date_of_report column");
        assert!(matches!(
            svc.resolution_rate_latest().await,
            Err(AppError::NoValidDates)
        ));
    }

    #[tokio::test]
    async fn test_emergency_latest_defaults_to_zero_without_dates() {
        let undated = service(json!([
            { "Date_of_report": "bad", "emergency_type": "Emergency" }
        ]));
        let dto = undated.emergency_reports_latest_month().await.unwrap();
        assert_eq!(dto.emergency_reports_latest_month, 0);

        let dto = service(json!([]))
            .emergency_reports_latest_month()
            .await
            .unwrap();
        assert_eq!(dto.emergency_reports_latest_month, 0);
    }

    #[tokio::test]
    async fn test_emergency_reports_total() {
        let dto = sample().emergency_reports_total().await.unwrap();
        assert_eq!(dto.emergency_reports_total, 2);
    }

    #[tokio::test]
    async fn test_recent_reports_returns_latest_four() {
        let svc = service(json!([
            { "id": 1, "Date_of_report": "1/1/2024" },
            { "id": 2, "Date_of_report": "6/3/2024" },
            { "id": 3, "Date_of_report": "2/1/2024" },
            { "id": 4, "Date_of_report": "5/3/2024" },
            { "id": 5, "Date_of_report": "10/2/2024" },
            { "id": 6, "Date_of_report": "3/2/2024" },
            { "id": 7, "Date_of_report": "unknown" }
        ]));

        let dto = svc.recent_reports().await.unwrap();
        let ids: Vec<_> = serde_json::to_value(&dto.recent_reports)
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![2, 4, 5, 6]);

        let empty = service(json!([])).recent_reports().await.unwrap();
        assert!(empty.recent_reports.is_empty());
    }

    #[tokio::test]
    async fn test_all_reports_filters() {
        let svc = sample();
        let all = |status: &str, types: &str| AllReportsParams {
            status_filter: status.to_string(),
            types_filter: types.to_string(),
        };

        let dto = svc.all_reports(&all(ALL_STATUS, ALL_TYPES)).await.unwrap();
        assert_eq!(dto.all_reports.len(), 4);

        let dto = svc.all_reports(&all("Active", ALL_TYPES)).await.unwrap();
        assert_eq!(dto.all_reports.len(), 2);

        let dto = svc.all_reports(&all("solved", "Theft")).await.unwrap();
        assert_eq!(dto.all_reports.len(), 1);

        let dto = svc.all_reports(&all(ALL_STATUS, "fire")).await.unwrap();
        assert!(dto.all_reports.is_empty());
    }

    #[tokio::test]
    async fn test_unique_values() {
        let dto = sample().unique_values().await.unwrap();
        assert_eq!(dto.unique_active_values, vec!["Active", "solved"]);
        assert_eq!(dto.unique_types_values, vec!["Fire", "Flood", "Theft"]);
    }

    #[tokio::test]
    async fn test_peak_hour_analysis() {
        let dto = sample().peak_hour_analysis().await.unwrap();
        let hours = &dto.peak_hour_analysis;
        assert_eq!(hours.keys().copied().collect::<Vec<_>>(), vec![9, 14]);
        assert_eq!(hours[&9]["Emergency"], 1);
        assert_eq!(hours[&9]["Minor"], 0);
        assert_eq!(hours[&14]["Emergency"], 1);
        assert_eq!(hours[&14]["Minor"], 1);

        assert!(matches!(
            service(json!([])).peak_hour_analysis().await,
            Err(AppError::NoData)
        ));
    }

    #[tokio::test]
    async fn test_weekly_patterns_zero_fills_missing_days() {
        // 2024-01-15 is a Monday, 2024-01-19 a Friday
        let svc = service(json!([
            { "Date_of_report": "15/1/2024", "emergency_type": "Emergency" },
            { "Date_of_report": "19/1/2024", "emergency_type": "Minor" },
            { "Date_of_report": "19/1/2024", "emergency_type": "Emergency" }
        ]));

        let dto = svc.weekly_patterns().await.unwrap();
        let json = serde_json::to_value(&dto.weekly_patterns).unwrap();
        let days = json.as_object().unwrap();
        assert_eq!(days.len(), 7);
        assert_eq!(json["Monday"], json!({ "Emergency": 1, "Minor": 0 }));
        assert_eq!(json["Friday"], json!({ "Emergency": 1, "Minor": 1 }));
        for day in ["Tuesday", "Wednesday", "Thursday", "Saturday", "Sunday"] {
            assert_eq!(json[day], json!({ "Emergency": 0, "Minor": 0 }), "{}", day);
        }

        let empty = service(json!([])).weekly_patterns().await.unwrap();
        assert_eq!(serde_json::to_value(&empty.weekly_patterns).unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_report_types_distribution() {
        let dto = sample().report_types_distribution().await.unwrap();
        assert_eq!(
            serde_json::to_string(&dto.report_types_distribution).unwrap(),
            r#"{"Fire":2,"Flood":1,"Theft":1}"#
        );
    }

    #[tokio::test]
    async fn test_emergency_summary() {
        let svc = service(json!([
            { "emergency_type": "Emergency", "time_taken_to_solve": 10 },
            { "emergency_type": "Emergency", "time_taken_to_solve": 15 },
            { "emergency_type": "Minor", "time_taken_to_solve": 7 },
            { "emergency_type": "Minor", "time_taken_to_solve": null },
            { "emergency_type": null, "time_taken_to_solve": 100 }
        ]));

        let summary = svc.emergency_summary().await.unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].emergency_type, "Emergency");
        assert_eq!(summary[0].average_time_to_solve.to_string(), "12.50");
        assert_eq!(summary[0].number_of_reports, 2);
        assert_eq!(summary[1].emergency_type, "Minor");
        assert_eq!(summary[1].number_of_reports, 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_reported() {
        let svc = IncidentAnalyticsService::new(Arc::new(FailingRowSource), "Incident_Reports");
        assert!(matches!(
            svc.recent_reports().await,
            Err(AppError::RowSource(_))
        ));
        assert!(matches!(
            svc.active_reports_count_total().await,
            Err(AppError::RowSource(_))
        ));
    }

    #[tokio::test]
    async fn test_each_query_fetches_once() {
        let source = Arc::new(StaticRowSource::from_json(json!([
            { "Date_of_report": "1/2/2024", "Active": "solved" }
        ])));
        let svc = IncidentAnalyticsService::new(source.clone(), "Incident_Reports");

        svc.resolution_rate_latest().await.unwrap();
        assert_eq!(source.calls(), 1);
        svc.active_reports_count_total().await.unwrap();
        assert_eq!(source.calls(), 2);
    }
}
