mod incident_report;

pub use incident_report::*;
