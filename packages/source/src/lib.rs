#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Taxi trip data source trait, Socrata implementation, and normalization.
//!
//! The query service talks to the upstream only through the [`TripSource`]
//! trait: one call for a page of raw rows and one for the number of rows
//! matching the same filters. [`service::query_trips`] stitches the two
//! together and normalizes each row into a
//! [`NormalizedTrip`](taxi_map_trip_models::NormalizedTrip).

pub mod http;
pub mod normalize;
pub mod parsing;
pub mod registry;
pub mod service;
pub mod socrata;
pub mod soql;

use async_trait::async_trait;
use taxi_map_source_models::RawTripRecord;
use taxi_map_trip_models::TripFilters;

/// Errors that can occur while talking to the upstream data source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The upstream answered with a non-success status.
    #[error("Upstream returned HTTP {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Request URL.
        url: String,
    },

    /// The requested page starts beyond the addressable row range.
    #[error("Page {page} of size {page_size} is out of range")]
    PageOutOfRange {
        /// Requested 1-based page.
        page: u64,
        /// Requested page size.
        page_size: u64,
    },

    /// The upstream answered with a body we could not interpret.
    #[error("Unexpected upstream response: {message}")]
    UnexpectedResponse {
        /// Description of what went wrong.
        message: String,
    },
}

/// One page of rows to fetch from the upstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageQuery {
    /// Maximum number of rows.
    pub limit: u64,
    /// Number of matching rows to skip.
    pub offset: u64,
    /// Filters every row must satisfy.
    pub filters: TripFilters,
}

/// Trait that every upstream trip data source implements.
#[async_trait]
pub trait TripSource: Send + Sync {
    /// Returns a unique identifier for this source (e.g.,
    /// `"nyc_yellow_taxi_2014"`).
    fn id(&self) -> &str;

    /// Fetches one page of raw rows matching the query's filters.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the upstream is unreachable, answers with a
    /// non-success status, or sends a body that is not a JSON array.
    async fn fetch_page(&self, query: &PageQuery) -> Result<Vec<RawTripRecord>, SourceError>;

    /// Counts every upstream row matching `filters`, independent of paging.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the upstream is unreachable, answers with a
    /// non-success status, or the count cannot be read from the body.
    async fn count(&self, filters: &TripFilters) -> Result<u64, SourceError>;
}
