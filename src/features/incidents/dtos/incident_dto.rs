use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

use crate::features::incidents::analytics::aggregator::OrderedMap;
use crate::features::incidents::models::IncidentReport;

// ============================================================================
// All-time counters
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct ActiveReportsCountDto {
    pub active_reports_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AverageResponseTimeDto {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 42.5)]
    pub average_response_time: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResolutionRateDto {
    pub total_reports: u64,
    pub solved_reports: u64,
    /// Percentage of solved reports
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 66.67)]
    pub resolution_rate: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmergencyReportsTotalDto {
    pub emergency_reports_total: u64,
}

// ============================================================================
// Latest month
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportsLatestMonthDto {
    pub number_reports_latest_month: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActiveReportsLatestDto {
    pub active_reports_count_latest: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmergencyReportsLatestDto {
    pub emergency_reports_latest_month: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AverageResponseTimeLatestDto {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 42.5)]
    pub average_response_time_latest: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResolutionRateLatestDto {
    pub total_reports_latest: u64,
    pub solved_reports_latest: u64,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 50.0)]
    pub resolution_rate_latest: Decimal,
}

// ============================================================================
// Listings
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct RecentReportsDto {
    /// Raw report rows, newest first
    #[schema(value_type = Vec<Object>)]
    pub recent_reports: Vec<IncidentReport>,
}

/// Filters for the report listing.
///
/// `"All Status"` and `"All Types"` disable the respective filter.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AllReportsParams {
    /// Exact `Active` value, or "All Status"
    pub status_filter: String,
    /// Exact `Types_of_report` value, or "All Types"
    pub types_filter: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AllReportsDto {
    #[schema(value_type = Vec<Object>)]
    pub all_reports: Vec<IncidentReport>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UniqueValuesDto {
    pub unique_active_values: Vec<String>,
    pub unique_types_values: Vec<String>,
}

// ============================================================================
// Distributions
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct PeakHourAnalysisDto {
    /// Hour of day (0-23) -> emergency type -> report count
    #[schema(value_type = Object)]
    pub peak_hour_analysis: BTreeMap<u32, BTreeMap<String, u64>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WeeklyPatternsDto {
    /// Weekday name (Monday first) -> emergency type -> report count
    #[schema(value_type = Object)]
    pub weekly_patterns: OrderedMap<BTreeMap<String, u64>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportTypesDistributionDto {
    /// Report type -> count, most frequent first
    #[schema(value_type = Object)]
    pub report_types_distribution: OrderedMap<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmergencySummaryItemDto {
    pub emergency_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 12.25)]
    pub average_time_to_solve: Decimal,
    pub number_of_reports: u64,
}
