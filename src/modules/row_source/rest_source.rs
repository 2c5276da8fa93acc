//! Hosted table API client (PostgREST / Supabase REST)

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, Response};
use serde::Deserialize;

use super::{Columns, Row, RowQuery, RowSource};
use crate::core::config::RestSourceConfig;
use crate::core::error::{AppError, Result};

/// PostgREST error payload
#[derive(Debug, Deserialize)]
struct RestErrorResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

/// Row source backed by the hosted REST table API
pub struct RestRowSource {
    base_url: String,
    http_client: Client,
}

impl RestRowSource {
    pub fn new(config: &RestSourceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| AppError::Internal(format!("Invalid SUPABASE_KEY: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| AppError::Internal(format!("Invalid SUPABASE_KEY: {}", e)))?;
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let http_client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, urlencoding::encode(table))
    }

    /// Query string pairs for `query`: projection first, then the filter
    fn query_pairs(query: &RowQuery) -> Vec<(String, String)> {
        let select = match &query.columns {
            Columns::All => "*".to_string(),
            Columns::Only(columns) => columns.join(","),
        };

        let mut pairs = vec![("select".to_string(), select)];
        if let Some(filter) = &query.filter {
            pairs.push((filter.column.clone(), format!("eq.{}", filter.value)));
        }
        pairs
    }

    /// Turn a non-success response into a row source error
    async fn error_from(table: &str, response: Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let detail = match serde_json::from_str::<RestErrorResponse>(&body) {
            Ok(err) if !err.message.is_empty() => {
                let mut detail = err.message;
                if let Some(code) = err.code {
                    detail = format!("{} ({})", detail, code);
                }
                if let Some(hint) = err.hint {
                    detail = format!("{}; hint: {}", detail, hint);
                }
                detail
            }
            _ if body.is_empty() => status.to_string(),
            _ => body,
        };

        AppError::RowSource(format!("Query on '{}' failed with {}: {}", table, status, detail))
    }
}

/// Total row count from a `Content-Range` header (`0-24/3573` or `*/0`)
fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}

#[async_trait]
impl RowSource for RestRowSource {
    async fn fetch(&self, query: &RowQuery) -> Result<Vec<Row>> {
        let url = self.table_url(&query.table);
        tracing::debug!("Fetching rows from {} ({:?})", query.table, query.columns);

        let response = self
            .http_client
            .get(&url)
            .query(&Self::query_pairs(query))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach table API: {}", e);
                AppError::RowSource(format!("Failed to fetch '{}': {}", query.table, e))
            })?;

        if !response.status().is_success() {
            return Err(Self::error_from(&query.table, response).await);
        }

        let rows = response.json::<Vec<Row>>().await.map_err(|e| {
            tracing::error!("Failed to parse table API response: {}", e);
            AppError::RowSource(format!("Invalid rows for '{}': {}", query.table, e))
        })?;

        tracing::debug!("Fetched {} rows from {}", rows.len(), query.table);
        Ok(rows)
    }

    async fn count(&self, query: &RowQuery) -> Result<u64> {
        let url = self.table_url(&query.table);

        let response = self
            .http_client
            .head(&url)
            .query(&Self::query_pairs(query))
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach table API: {}", e);
                AppError::RowSource(format!("Failed to count '{}': {}", query.table, e))
            })?;

        if !response.status().is_success() {
            return Err(Self::error_from(&query.table, response).await);
        }

        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range_total)
            .ok_or_else(|| {
                AppError::RowSource(format!(
                    "Count for '{}' missing from Content-Range header",
                    query.table
                ))
            })
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn source() -> RestRowSource {
        RestRowSource::new(&RestSourceConfig {
            base_url: "https://project.supabase.co/".to_string(),
            api_key: "anon-key".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_table_url() {
        assert_eq!(
            source().table_url("Incident_Reports"),
            "https://project.supabase.co/rest/v1/Incident_Reports"
        );
        assert_eq!(
            source().table_url("incident reports"),
            "https://project.supabase.co/rest/v1/incident%20reports"
        );
    }

    #[test]
    fn test_query_pairs_projection_and_filter() {
        let query =
            RowQuery::select("Incident_Reports", &["Active", "Types_of_report"]).eq("Active", "solved");
        assert_eq!(
            RestRowSource::query_pairs(&query),
            vec![
                ("select".to_string(), "Active,Types_of_report".to_string()),
                ("Active".to_string(), "eq.solved".to_string()),
            ]
        );

        let all = RowQuery::all("Incident_Reports");
        assert_eq!(
            RestRowSource::query_pairs(&all),
            vec![("select".to_string(), "*".to_string())]
        );
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-24/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let result = RestRowSource::new(&RestSourceConfig {
            base_url: "https://project.supabase.co".to_string(),
            api_key: "bad\nkey".to_string(),
            timeout: Duration::from_secs(5),
        });
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
