//! Row source module for reading the incident report table
//!
//! The table lives in an external store. A [`RowSource`] fetches flat
//! key/value rows for a column projection, optionally narrowed by one
//! equality filter, or counts the matching rows.

mod postgres_source;
mod rest_source;

pub use postgres_source::PostgresRowSource;
pub use rest_source::RestRowSource;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::core::error::Result;

/// One fetched record, keyed by column name
pub type Row = Map<String, Value>;

/// Column projection for a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Columns {
    All,
    Only(Vec<String>),
}

/// `column = value` restriction applied by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqFilter {
    pub column: String,
    pub value: String,
}

/// Read request against a single table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowQuery {
    pub table: String,
    pub columns: Columns,
    pub filter: Option<EqFilter>,
}

impl RowQuery {
    /// Select every column of `table`
    pub fn all(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Columns::All,
            filter: None,
        }
    }

    /// Select only the given columns of `table`
    pub fn select(table: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            table: table.into(),
            columns: Columns::Only(columns.iter().map(|c| c.to_string()).collect()),
            filter: None,
        }
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter = Some(EqFilter {
            column: column.into(),
            value: value.into(),
        });
        self
    }
}

/// Source of incident report rows
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Fetch every row matching `query`
    async fn fetch(&self, query: &RowQuery) -> Result<Vec<Row>>;

    /// Count the rows matching `query`; the projection is ignored
    async fn count(&self, query: &RowQuery) -> Result<u64>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let query = RowQuery::select("Incident_Reports", &["id"]).eq("Active", "Active");
        assert_eq!(query.columns, Columns::Only(vec!["id".to_string()]));
        assert_eq!(
            query.filter,
            Some(EqFilter {
                column: "Active".to_string(),
                value: "Active".to_string(),
            })
        );
        assert_eq!(RowQuery::all("t").columns, Columns::All);
    }
}
