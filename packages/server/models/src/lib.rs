#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the taxi map server.
//!
//! These types are serialized to JSON for the REST API and deserialized by
//! the browser client, so both sides share one contract.

use serde::{Deserialize, Serialize};
use taxi_map_trip_models::NormalizedTrip;

/// Query parameters for `GET /trips`.
///
/// Every parameter is optional; the handler fills in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripQueryParams {
    /// 1-based page number.
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
    /// Vendor code (`CMT`, `VTS`, or empty for any).
    pub service: Option<String>,
    /// Payment code (`CSH`, `CRD`, or empty for any).
    pub payment: Option<String>,
    /// Minimum trip distance in miles.
    pub min_distance: Option<f64>,
    /// Maximum trip distance in miles.
    pub max_distance: Option<f64>,
    /// Minimum fare in dollars.
    pub min_fare: Option<f64>,
    /// Maximum fare in dollars.
    pub max_fare: Option<f64>,
}

/// Response from `GET /trips`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripsResponse {
    /// Normalized trips for the requested page.
    pub trips: Vec<NormalizedTrip>,
    /// Number of trips matching the filters across all pages.
    pub total: u64,
}

/// Error body returned with any non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable description.
    pub message: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Identifier of the upstream dataset being served.
    pub dataset: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_use_camel_case() {
        let params: TripQueryParams = serde_json::from_value(serde_json::json!({
            "page": 2,
            "minDistance": 1.5,
            "maxFare": 40.0,
            "service": "VTS"
        }))
        .unwrap();
        assert_eq!(params.page, Some(2));
        assert_eq!(params.min_distance, Some(1.5));
        assert_eq!(params.max_fare, Some(40.0));
        assert_eq!(params.service.as_deref(), Some("VTS"));
        assert!(params.limit.is_none());
    }

    #[test]
    fn error_body_has_message_key() {
        let json = serde_json::to_value(ApiError::new("Error fetching trips")).unwrap();
        assert_eq!(json, serde_json::json!({"message": "Error fetching trips"}));
    }
}
