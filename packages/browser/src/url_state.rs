//! Encoding of the browser state in a URL query string.
//!
//! The query string is the only persistent copy of the user's view: parsing
//! never fails, every missing or malformed value falls back to its default,
//! and [`UrlState::to_query_string`] followed by [`UrlState::parse`] gives
//! back the same state.

use taxi_map_trip_models::{
    DEFAULT_MAX_DISTANCE, DEFAULT_MAX_FARE, DEFAULT_MIN_DISTANCE, DEFAULT_MIN_FARE, PaymentMethod,
    TripFilters, Vendor,
};
use url::form_urlencoded;

/// Query key for the service code.
pub const SERVICE_KEY: &str = "service";
/// Query key for the payment code.
pub const PAYMENT_KEY: &str = "payment";
/// Query key for the minimum distance in miles.
pub const MIN_DISTANCE_KEY: &str = "minDistance";
/// Query key for the maximum distance in miles.
pub const MAX_DISTANCE_KEY: &str = "maxDistance";
/// Query key for the minimum fare.
pub const MIN_FARE_KEY: &str = "minFare";
/// Query key for the maximum fare.
pub const MAX_FARE_KEY: &str = "maxFare";
/// Query key for the 1-based page.
pub const PAGE_KEY: &str = "page";

/// Filters and page as carried by the URL.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UrlState {
    /// Active filters.
    pub filters: TripFilters,
    /// 1-based page number.
    pub page: u64,
}

impl Default for UrlState {
    fn default() -> Self {
        Self {
            filters: TripFilters::default(),
            page: 1,
        }
    }
}

impl UrlState {
    /// Parses a query string, with or without its leading `?`.
    ///
    /// Unknown keys are ignored. When a key repeats, the last value wins.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut state = Self::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let filters = &mut state.filters;
            match key.as_ref() {
                SERVICE_KEY => filters.service = Vendor::parse_code(&value).unwrap_or(None),
                PAYMENT_KEY => filters.payment = PaymentMethod::parse_code(&value).unwrap_or(None),
                MIN_DISTANCE_KEY => {
                    filters.min_distance = parse_bound(&value, DEFAULT_MIN_DISTANCE);
                }
                MAX_DISTANCE_KEY => {
                    filters.max_distance = parse_bound(&value, DEFAULT_MAX_DISTANCE);
                }
                MIN_FARE_KEY => filters.min_fare = parse_bound(&value, DEFAULT_MIN_FARE),
                MAX_FARE_KEY => filters.max_fare = parse_bound(&value, DEFAULT_MAX_FARE),
                PAGE_KEY => state.page = parse_page(&value),
                _ => log::trace!("Ignoring unknown query key {key:?}"),
            }
        }

        state
    }

    /// Serializes every key, defaults included, in a fixed order.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let f = &self.filters;
        form_urlencoded::Serializer::new(String::new())
            .append_pair(SERVICE_KEY, f.service_code())
            .append_pair(PAYMENT_KEY, f.payment_code())
            .append_pair(MIN_DISTANCE_KEY, &f.min_distance.to_string())
            .append_pair(MAX_DISTANCE_KEY, &f.max_distance.to_string())
            .append_pair(MIN_FARE_KEY, &f.min_fare.to_string())
            .append_pair(MAX_FARE_KEY, &f.max_fare.to_string())
            .append_pair(PAGE_KEY, &self.page.to_string())
            .finish()
    }
}

fn parse_bound(value: &str, default: f64) -> f64 {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => default,
    }
}

fn parse_page(value: &str) -> u64 {
    match value.trim().parse::<u64>() {
        Ok(page) if page >= 1 => page,
        _ => 1,
    }
}
