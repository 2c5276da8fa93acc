use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::incidents::handlers;
use crate::features::incidents::services::IncidentAnalyticsService;

/// Create report routes (paths kept stable for existing dashboards)
pub fn routes(service: Arc<IncidentAnalyticsService>) -> Router {
    Router::new()
        // All-time counters
        .route(
            "/active_reports_count_total",
            get(handlers::active_reports_count_total),
        )
        .route(
            "/average_response_time_total",
            get(handlers::average_response_time_total),
        )
        .route("/resolution_rate_total", get(handlers::resolution_rate_total))
        .route(
            "/emergency_reports_total",
            get(handlers::emergency_reports_total),
        )
        // Latest month
        .route(
            "/number_reports_latest_month",
            get(handlers::number_reports_latest_month),
        )
        .route(
            "/active_reports_count_latest",
            get(handlers::active_reports_count_latest),
        )
        .route(
            "/emergency_reports_latest_month",
            get(handlers::emergency_reports_latest_month),
        )
        .route(
            "/average_response_time_latest",
            get(handlers::average_response_time_latest),
        )
        .route(
            "/resolution_rate_latest",
            get(handlers::resolution_rate_latest),
        )
        // Listings
        .route("/recent_reports", get(handlers::recent_reports))
        .route("/all_reports", get(handlers::all_reports))
        .route("/unique_values", get(handlers::unique_values))
        // Distributions
        .route("/peak_hour_analysis", get(handlers::peak_hour_analysis))
        .route("/weekly_patterns", get(handlers::weekly_patterns))
        .route(
            "/report_types_distribution",
            get(handlers::report_types_distribution),
        )
        .route("/emergency_summary", get(handlers::emergency_summary))
        .with_state(service)
}
