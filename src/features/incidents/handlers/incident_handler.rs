use axum::extract::State;
use std::sync::Arc;

use crate::core::extractor::AppQuery;
use crate::features::incidents::dtos::*;
use crate::features::incidents::services::IncidentAnalyticsService;
use crate::shared::types::{ErrorBody, ReportOutcome};

// Every report answers 200: either its body or `{"error": "..."}`.

// ============================================================================
// All-time counters
// ============================================================================

/// Count reports whose status is "Active"
#[utoipa::path(
    get,
    path = "/active_reports_count_total",
    tag = "reports",
    responses(
        (status = 200, description = "Active report count, or an error body", body = ActiveReportsCountDto)
    )
)]
pub async fn active_reports_count_total(
    State(service): State<Arc<IncidentAnalyticsService>>,
) -> ReportOutcome<ActiveReportsCountDto> {
    service.active_reports_count_total().await.into()
}

/// Mean resolution time over all reports that have one
#[utoipa::path(
    get,
    path = "/average_response_time_total",
    tag = "reports",
    responses(
        (status = 200, description = "Average resolution time, or an error body", body = AverageResponseTimeDto)
    )
)]
pub async fn average_response_time_total(
    State(service): State<Arc<IncidentAnalyticsService>>,
) -> ReportOutcome<AverageResponseTimeDto> {
    service.average_response_time_total().await.into()
}

/// Share of solved reports
#[utoipa::path(
    get,
    path = "/resolution_rate_total",
    tag = "reports",
    responses(
        (status = 200, description = "Resolution rate, or an error body", body = ResolutionRateDto)
    )
)]
pub async fn resolution_rate_total(
    State(service): State<Arc<IncidentAnalyticsService>>,
) -> ReportOutcome<ResolutionRateDto> {
    service.resolution_rate_total().await.into()
}

#[utoipa::path(
    get,
    path = "/emergency_reports_total",
    tag = "reports",
    responses(
        (status = 200, description = "Emergency report count, or an error body", body = EmergencyReportsTotalDto)
    )
)]
pub async fn emergency_reports_total(
    State(service): State<Arc<IncidentAnalyticsService>>,
) -> ReportOutcome<EmergencyReportsTotalDto> {
    service.emergency_reports_total().await.into()
}

// ============================================================================
// Latest month
// ============================================================================

/// Number of reports in the latest month present in the data
#[utoipa::path(
    get,
    path = "/number_reports_latest_month",
    tag = "reports",
    responses(
        (status = 200, description = "Latest month report count, or an error body", body = ReportsLatestMonthDto)
    )
)]
pub async fn number_reports_latest_month(
    State(service): State<Arc<IncidentAnalyticsService>>,
) -> ReportOutcome<ReportsLatestMonthDto> {
    service.number_reports_latest_month().await.into()
}

#[utoipa::path(
    get,
    path = "/active_reports_count_latest",
    tag = "reports",
    responses(
        (status = 200, description = "Active reports in the latest month, or an error body", body = ActiveReportsLatestDto)
    )
)]
pub async fn active_reports_count_latest(
    State(service): State<Arc<IncidentAnalyticsService>>,
) -> ReportOutcome<ActiveReportsLatestDto> {
    service.active_reports_count_latest().await.into()
}

#[utoipa::path(
    get,
    path = "/emergency_reports_latest_month",
    tag = "reports",
    responses(
        (status = 200, description = "Emergency reports in the latest month, or an error body", body = EmergencyReportsLatestDto)
    )
)]
pub async fn emergency_reports_latest_month(
    State(service): State<Arc<IncidentAnalyticsService>>,
) -> ReportOutcome<EmergencyReportsLatestDto> {
    service.emergency_reports_latest_month().await.into()
}

#[utoipa::path(
    get,
    path = "/average_response_time_latest",
    tag = "reports",
    responses(
        (status = 200, description = "Average resolution time in the latest month, or an error body", body = AverageResponseTimeLatestDto)
    )
)]
pub async fn average_response_time_latest(
    State(service): State<Arc<IncidentAnalyticsService>>,
) -> ReportOutcome<AverageResponseTimeLatestDto> {
    service.average_response_time_latest().await.into()
}

#[utoipa::path(
    get,
    path = "/resolution_rate_latest",
    tag = "reports",
    responses(
        (status = 200, description = "Resolution rate in the latest month, or an error body", body = ResolutionRateLatestDto)
    )
)]
pub async fn resolution_rate_latest(
    State(service): State<Arc<IncidentAnalyticsService>>,
) -> ReportOutcome<ResolutionRateLatestDto> {
    service.resolution_rate_latest().await.into()
}

// ============================================================================
// Listings
// ============================================================================

/// The four most recent reports by report date
#[utoipa::path(
    get,
    path = "/recent_reports",
    tag = "reports",
    responses(
        (status = 200, description = "Most recent reports, or an error body", body = RecentReportsDto)
    )
)]
pub async fn recent_reports(
    State(service): State<Arc<IncidentAnalyticsService>>,
) -> ReportOutcome<RecentReportsDto> {
    service.recent_reports().await.into()
}

/// All reports, optionally filtered by status and type
#[utoipa::path(
    get,
    path = "/all_reports",
    tag = "reports",
    params(AllReportsParams),
    responses(
        (status = 200, description = "Filtered reports, or an error body", body = AllReportsDto),
        (status = 400, description = "Missing or invalid filters", body = ErrorBody)
    )
)]
pub async fn all_reports(
    State(service): State<Arc<IncidentAnalyticsService>>,
    AppQuery(params): AppQuery<AllReportsParams>,
) -> ReportOutcome<AllReportsDto> {
    service.all_reports(&params).await.into()
}

/// Distinct status and report type values
#[utoipa::path(
    get,
    path = "/unique_values",
    tag = "reports",
    responses(
        (status = 200, description = "Distinct filter values, or an error body", body = UniqueValuesDto)
    )
)]
pub async fn unique_values(
    State(service): State<Arc<IncidentAnalyticsService>>,
) -> ReportOutcome<UniqueValuesDto> {
    service.unique_values().await.into()
}

// ============================================================================
// Distributions
// ============================================================================

/// Report counts per hour of day and emergency type
#[utoipa::path(
    get,
    path = "/peak_hour_analysis",
    tag = "reports",
    responses(
        (status = 200, description = "Hourly distribution, or an error body", body = PeakHourAnalysisDto)
    )
)]
pub async fn peak_hour_analysis(
    State(service): State<Arc<IncidentAnalyticsService>>,
) -> ReportOutcome<PeakHourAnalysisDto> {
    service.peak_hour_analysis().await.into()
}

/// Report counts per weekday and emergency type
#[utoipa::path(
    get,
    path = "/weekly_patterns",
    tag = "reports",
    responses(
        (status = 200, description = "Weekday distribution, or an error body", body = WeeklyPatternsDto)
    )
)]
pub async fn weekly_patterns(
    State(service): State<Arc<IncidentAnalyticsService>>,
) -> ReportOutcome<WeeklyPatternsDto> {
    service.weekly_patterns().await.into()
}

#[utoipa::path(
    get,
    path = "/report_types_distribution",
    tag = "reports",
    responses(
        (status = 200, description = "Report type counts, or an error body", body = ReportTypesDistributionDto)
    )
)]
pub async fn report_types_distribution(
    State(service): State<Arc<IncidentAnalyticsService>>,
) -> ReportOutcome<ReportTypesDistributionDto> {
    service.report_types_distribution().await.into()
}

/// Mean resolution time and report count per emergency type
#[utoipa::path(
    get,
    path = "/emergency_summary",
    tag = "reports",
    responses(
        (status = 200, description = "Per emergency type summary, or an error body", body = Vec<EmergencySummaryItemDto>)
    )
)]
pub async fn emergency_summary(
    State(service): State<Arc<IncidentAnalyticsService>>,
) -> ReportOutcome<Vec<EmergencySummaryItemDto>> {
    service.emergency_summary().await.into()
}
