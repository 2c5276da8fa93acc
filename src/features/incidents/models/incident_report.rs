use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::modules::row_source::Row;
use crate::shared::constants::{EMERGENCY, STATUS_ACTIVE, STATUS_SOLVED};

// Physical column names of the incident report table
pub const COL_ID: &str = "id";
pub const COL_STATUS: &str = "Active";
pub const COL_REPORT_TYPE: &str = "Types_of_report";
pub const COL_EMERGENCY_TYPE: &str = "emergency_type";
pub const COL_DATE_OF_REPORT: &str = "Date_of_report";
pub const COL_REPORT_TIME: &str = "Report_Time";
pub const COL_TIME_TO_SOLVE: &str = "time_taken_to_solve";

/// One incident report row.
///
/// Typed fields are read leniently from the fetched record; the record
/// itself is kept so pass-through listings return every fetched column.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentReport {
    pub active_status: Option<String>,
    pub report_type: Option<String>,
    pub emergency_type: Option<String>,
    pub date_of_report: Option<String>,
    pub report_time: Option<String>,
    pub time_taken_to_solve: Option<f64>,
    columns: Row,
}

impl IncidentReport {
    pub fn from_row(row: Row) -> Self {
        Self {
            active_status: text(&row, COL_STATUS),
            report_type: text(&row, COL_REPORT_TYPE),
            emergency_type: text(&row, COL_EMERGENCY_TYPE),
            date_of_report: text(&row, COL_DATE_OF_REPORT),
            report_time: text(&row, COL_REPORT_TIME),
            time_taken_to_solve: number(&row, COL_TIME_TO_SOLVE),
            columns: row,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active_status.as_deref() == Some(STATUS_ACTIVE)
    }

    pub fn is_solved(&self) -> bool {
        self.active_status.as_deref() == Some(STATUS_SOLVED)
    }

    pub fn is_emergency(&self) -> bool {
        self.emergency_type.as_deref() == Some(EMERGENCY)
    }
}

impl Serialize for IncidentReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.columns.serialize(serializer)
    }
}

fn text(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number(row: &Row, column: &str) -> Option<f64> {
    match row.get(column)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}
