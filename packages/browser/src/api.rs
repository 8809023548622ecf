//! Access to the trip query service.

use async_trait::async_trait;
use taxi_map_server_models::{ApiError, TripQueryParams, TripsResponse};
use taxi_map_trip_models::TripFilters;

use crate::FetchError;

/// One page request issued by the browser.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchRequest {
    /// Token identifying this fetch; only the latest may update state.
    pub generation: u64,
    /// 1-based page number.
    pub page: u64,
    /// Trips per page.
    pub page_size: u64,
    /// Filters to apply.
    pub filters: TripFilters,
}

impl FetchRequest {
    /// Query parameters sent to `GET /trips`.
    #[must_use]
    pub fn query_params(&self) -> TripQueryParams {
        let f = &self.filters;
        TripQueryParams {
            page: Some(self.page),
            limit: Some(self.page_size),
            service: Some(f.service_code().to_string()),
            payment: Some(f.payment_code().to_string()),
            min_distance: Some(f.min_distance),
            max_distance: Some(f.max_distance),
            min_fare: Some(f.min_fare),
            max_fare: Some(f.max_fare),
        }
    }
}

/// Source of result pages.
#[async_trait]
pub trait TripsApi: Send + Sync {
    /// Fetches one page of trips and the total matching count.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the service is unreachable or answers with
    /// an error.
    async fn fetch_trips(&self, request: &FetchRequest) -> Result<TripsResponse, FetchError>;
}

/// [`TripsApi`] backed by the HTTP trip query service.
#[derive(Debug, Clone)]
pub struct HttpTripsApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTripsApi {
    /// Creates a client for the service at `base_url` (e.g.
    /// `http://localhost:5000`).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a client reusing `client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// URL of the `/trips` endpoint.
    #[must_use]
    pub fn trips_url(&self) -> String {
        format!("{}/trips", self.base_url)
    }
}

#[async_trait]
impl TripsApi for HttpTripsApi {
    async fn fetch_trips(&self, request: &FetchRequest) -> Result<TripsResponse, FetchError> {
        let url = self.trips_url();
        log::debug!(
            "Fetching page {} (generation {}) from {url}",
            request.page,
            request.generation
        );

        let response = self
            .client
            .get(&url)
            .query(&request.query_params())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body);
            log::error!("Trip API error {status} from {url}: {message}");
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<TripsResponse>().await?)
    }
}

/// Extracts `message` from an [`ApiError`] body, falling back to the raw
/// body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiError>(body).map_or_else(|_| body.trim().to_string(), |e| e.message)
}
