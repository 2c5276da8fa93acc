#![cfg(test)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::error::{AppError, Result};
use crate::features::incidents::models::IncidentReport;
use crate::modules::row_source::{Columns, Row, RowQuery, RowSource};

/// Unwrap a JSON object literal into a row
pub fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

/// A report with only a report date set
pub fn report_on(date: &str) -> IncidentReport {
    IncidentReport::from_row(row(json!({ "Date_of_report": date })))
}

/// In-memory table honoring projection and equality filters
pub struct StaticRowSource {
    rows: Vec<Row>,
    calls: AtomicUsize,
}

impl StaticRowSource {
    pub fn from_json(rows: Value) -> Self {
        let rows = match rows {
            Value::Array(items) => items.into_iter().map(row).collect(),
            other => panic!("expected a JSON array, got {}", other),
        };
        Self {
            rows,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of fetch or count calls served
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn matching(&self, query: &RowQuery) -> impl Iterator<Item = &Row> + '_ {
        let filter = query.filter.clone();
        self.rows.iter().filter(move |row| match &filter {
            Some(f) => match row.get(&f.column) {
                Some(Value::String(s)) => *s == f.value,
                Some(Value::Null) | None => false,
                Some(other) => other.to_string() == f.value,
            },
            None => true,
        })
    }
}

#[async_trait]
impl RowSource for StaticRowSource {
    async fn fetch(&self, query: &RowQuery) -> Result<Vec<Row>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .matching(query)
            .map(|r| match &query.columns {
                Columns::All => r.clone(),
                Columns::Only(columns) => columns
                    .iter()
                    .map(|c| (c.clone(), r.get(c).cloned().unwrap_or(Value::Null)))
                    .collect(),
            })
            .collect())
    }

    async fn count(&self, query: &RowQuery) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.matching(query).count() as u64)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Row source whose every call fails like an unreachable upstream
pub struct FailingRowSource;

#[async_trait]
impl RowSource for FailingRowSource {
    async fn fetch(&self, query: &RowQuery) -> Result<Vec<Row>> {
        Err(AppError::RowSource(format!(
            "Failed to fetch '{}': connection refused",
            query.table
        )))
    }

    async fn count(&self, query: &RowQuery) -> Result<u64> {
        Err(AppError::RowSource(format!(
            "Failed to count '{}': connection refused",
            query.table
        )))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}
