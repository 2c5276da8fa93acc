/// Error text returned when no row carries a parseable report date
pub const NO_VALID_DATES_MESSAGE: &str = "No valid dates found in Date_of_report column";

// =============================================================================
// STATUS / TYPE VALUES
// =============================================================================

// Casing differs between the two status values in the source table; matched verbatim.

/// `Active` column value for open reports
pub const STATUS_ACTIVE: &str = "Active";

/// `Active` column value for resolved reports
pub const STATUS_SOLVED: &str = "solved";

/// `emergency_type` value counted as an emergency
pub const EMERGENCY: &str = "Emergency";

// =============================================================================
// FILTER SENTINELS
// =============================================================================

/// `status_filter` value that disables status filtering
pub const ALL_STATUS: &str = "All Status";

/// `types_filter` value that disables type filtering
pub const ALL_TYPES: &str = "All Types";

/// Number of rows returned by the recent reports endpoint
pub const RECENT_REPORTS_LIMIT: usize = 4;
