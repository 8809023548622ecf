//! Socrata SODA API trip source.
//!
//! Pages are fetched with the `$limit`, `$offset`, and `$where` query
//! parameters. The matching row count uses the same `$where` either as a
//! `count(*)` aggregate or, with [`CountStrategy::FullScan`], by fetching
//! every matching row and measuring the array.

use async_trait::async_trait;
use taxi_map_source_models::{CountStrategy, DatasetDefinition, RawTripRecord};
use taxi_map_trip_models::TripFilters;

use crate::http::send_json;
use crate::normalize::record_from_value;
use crate::soql::{COUNT_ALIAS, count_params, page_params, scan_params};
use crate::{PageQuery, SourceError, TripSource};

/// Header carrying the Socrata application token.
pub const APP_TOKEN_HEADER: &str = "X-App-Token";

/// Configuration for a [`SocrataTripSource`].
#[derive(Debug, Clone)]
pub struct SocrataConfig {
    /// Dataset to query.
    pub dataset: DatasetDefinition,
    /// Resource URL to use instead of the dataset's `api_url`.
    pub api_url_override: Option<String>,
    /// Optional application token for higher rate limits.
    pub app_token: Option<String>,
    /// How total counts are measured.
    pub count_strategy: CountStrategy,
}

/// A [`TripSource`] backed by a Socrata dataset.
pub struct SocrataTripSource {
    client: reqwest::Client,
    dataset: DatasetDefinition,
    api_url: String,
    app_token: Option<String>,
    count_strategy: CountStrategy,
}

impl SocrataTripSource {
    /// Creates a source with a default HTTP client.
    #[must_use]
    pub fn new(config: SocrataConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Creates a source that sends its requests through `client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: SocrataConfig) -> Self {
        let api_url = config
            .api_url_override
            .unwrap_or_else(|| config.dataset.api_url.clone());
        Self {
            client,
            dataset: config.dataset,
            api_url,
            app_token: config.app_token.filter(|t| !t.is_empty()),
            count_strategy: config.count_strategy,
        }
    }

    /// Resource URL requests are sent to.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn request(&self, params: &[(&str, String)]) -> reqwest::RequestBuilder {
        let request = self.client.get(&self.api_url).query(params);
        match &self.app_token {
            Some(token) => request.header(APP_TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn fetch_rows(
        &self,
        params: &[(&str, String)],
    ) -> Result<Vec<serde_json::Value>, SourceError> {
        match send_json(self.request(params)).await? {
            serde_json::Value::Array(rows) => Ok(rows),
            other => Err(SourceError::UnexpectedResponse {
                message: format!("expected a JSON array of rows, got {}", json_kind(&other)),
            }),
        }
    }
}

#[async_trait]
impl TripSource for SocrataTripSource {
    fn id(&self) -> &str {
        &self.dataset.id
    }

    async fn fetch_page(&self, query: &PageQuery) -> Result<Vec<RawTripRecord>, SourceError> {
        let params = page_params(query, &self.dataset.fields);
        log::debug!(
            "Fetching {} page: offset={}, limit={}",
            self.dataset.id,
            query.offset,
            query.limit
        );
        let rows = self.fetch_rows(&params).await?;
        Ok(rows
            .iter()
            .map(|row| record_from_value(row, &self.dataset.fields))
            .collect())
    }

    async fn count(&self, filters: &TripFilters) -> Result<u64, SourceError> {
        match self.count_strategy {
            CountStrategy::Aggregate => {
                let rows = self
                    .fetch_rows(&count_params(filters, &self.dataset.fields))
                    .await?;
                parse_count(&rows)
            }
            CountStrategy::FullScan => {
                let rows = self
                    .fetch_rows(&scan_params(filters, &self.dataset.fields))
                    .await?;
                log::debug!("Counted {} {} rows by full scan", rows.len(), self.dataset.id);
                Ok(rows.len() as u64)
            }
        }
    }
}

/// Reads the `count(*)` value from an aggregate response such as
/// `[{"total": "42"}]`. An empty array counts as zero.
///
/// # Errors
///
/// Returns [`SourceError::UnexpectedResponse`] if the count column is missing
/// or not a non-negative integer.
pub fn parse_count(rows: &[serde_json::Value]) -> Result<u64, SourceError> {
    let Some(row) = rows.first() else {
        return Ok(0);
    };
    let value = row
        .get(COUNT_ALIAS)
        .ok_or_else(|| SourceError::UnexpectedResponse {
            message: format!("count response has no `{COUNT_ALIAS}` column"),
        })?;
    let count = match value {
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        serde_json::Value::Number(n) => n.as_u64(),
        _ => None,
    };
    count.ok_or_else(|| SourceError::UnexpectedResponse {
        message: format!("count `{value}` is not a non-negative integer"),
    })
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
