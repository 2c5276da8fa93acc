//! Direct Postgres access to the incident report table
//!
//! Rows are returned as `to_jsonb` objects so both backends hand the
//! service the same flat key/value shape.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use std::time::Duration;

use super::{Columns, Row, RowQuery, RowSource};
use crate::core::config::DatabaseConfig;
use crate::core::error::{AppError, Result};

/// Row source backed by a Postgres connection pool
pub struct PostgresRowSource {
    pool: PgPool,
}

impl PostgresRowSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool sized from `config`
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.url)
            .await?;

        Ok(Self::new(pool))
    }

    /// Inner `SELECT ... FROM ... [WHERE col = $1]` for `query`
    fn select_sql(query: &RowQuery) -> String {
        let projection = match &query.columns {
            Columns::All => "*".to_string(),
            Columns::Only(columns) => columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", "),
        };

        format!(
            "SELECT {} FROM {}{}",
            projection,
            quote_ident(&query.table),
            Self::where_sql(query)
        )
    }

    fn where_sql(query: &RowQuery) -> String {
        match &query.filter {
            // Compare as text so the filter value binds the same way for any column type
            Some(filter) => format!(" WHERE {}::text = $1", quote_ident(&filter.column)),
            None => String::new(),
        }
    }

    fn fetch_sql(query: &RowQuery) -> String {
        format!("SELECT to_jsonb(t) FROM ({}) t", Self::select_sql(query))
    }

    fn count_sql(query: &RowQuery) -> String {
        format!(
            "SELECT COUNT(*) FROM {}{}",
            quote_ident(&query.table),
            Self::where_sql(query)
        )
    }
}

/// Double-quote an identifier, escaping embedded quotes
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[async_trait]
impl RowSource for PostgresRowSource {
    async fn fetch(&self, query: &RowQuery) -> Result<Vec<Row>> {
        let sql = Self::fetch_sql(query);
        let mut statement = sqlx::query_scalar::<_, Json<Value>>(&sql);
        if let Some(filter) = &query.filter {
            statement = statement.bind(filter.value.as_str());
        }

        let values = statement.fetch_all(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to fetch rows from {}: {:?}", query.table, e);
            AppError::Database(e)
        })?;

        values
            .into_iter()
            .map(|Json(value)| match value {
                Value::Object(row) => Ok(row),
                other => Err(AppError::Internal(format!(
                    "Expected a JSON object per row, got {}",
                    other
                ))),
            })
            .collect()
    }

    async fn count(&self, query: &RowQuery) -> Result<u64> {
        let sql = Self::count_sql(query);
        let mut statement = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(filter) = &query.filter {
            statement = statement.bind(filter.value.as_str());
        }

        let count = statement.fetch_one(&self.pool).await.map_err(|e| {
            tracing::error!("Failed to count rows in {}: {:?}", query.table, e);
            AppError::Database(e)
        })?;

        Ok(count.max(0) as u64)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
