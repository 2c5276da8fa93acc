use utoipa::{Modify, OpenApi};

use crate::features::incidents::{dtos as incidents_dtos, handlers as incidents_handlers};
use crate::shared::types::ErrorBody;

#[derive(OpenApi)]
#[openapi(
    paths(
        // All-time counters
        incidents_handlers::incident_handler::active_reports_count_total,
        incidents_handlers::incident_handler::average_response_time_total,
        incidents_handlers::incident_handler::resolution_rate_total,
        incidents_handlers::incident_handler::emergency_reports_total,
        // Latest month
        incidents_handlers::incident_handler::number_reports_latest_month,
        incidents_handlers::incident_handler::active_reports_count_latest,
        incidents_handlers::incident_handler::emergency_reports_latest_month,
        incidents_handlers::incident_handler::average_response_time_latest,
        incidents_handlers::incident_handler::resolution_rate_latest,
        // Listings
        incidents_handlers::incident_handler::recent_reports,
        incidents_handlers::incident_handler::all_reports,
        incidents_handlers::incident_handler::unique_values,
        // Distributions
        incidents_handlers::incident_handler::peak_hour_analysis,
        incidents_handlers::incident_handler::weekly_patterns,
        incidents_handlers::incident_handler::report_types_distribution,
        incidents_handlers::incident_handler::emergency_summary,
    ),
    components(
        schemas(
            ErrorBody,
            incidents_dtos::ActiveReportsCountDto,
            incidents_dtos::AverageResponseTimeDto,
            incidents_dtos::ResolutionRateDto,
            incidents_dtos::EmergencyReportsTotalDto,
            incidents_dtos::ReportsLatestMonthDto,
            incidents_dtos::ActiveReportsLatestDto,
            incidents_dtos::EmergencyReportsLatestDto,
            incidents_dtos::AverageResponseTimeLatestDto,
            incidents_dtos::ResolutionRateLatestDto,
            incidents_dtos::RecentReportsDto,
            incidents_dtos::AllReportsDto,
            incidents_dtos::UniqueValuesDto,
            incidents_dtos::PeakHourAnalysisDto,
            incidents_dtos::WeeklyPatternsDto,
            incidents_dtos::ReportTypesDistributionDto,
            incidents_dtos::EmergencySummaryItemDto,
        )
    ),
    tags(
        (name = "reports", description = "Incident report analytics (every response is 200 with either the report or an error body)"),
    ),
    info(
        title = "Incident Analytics API",
        version = "0.1.0",
        description = "Reporting endpoints over incident reports",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
