mod incident_analytics_service;

pub use incident_analytics_service::IncidentAnalyticsService;
