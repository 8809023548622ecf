#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Taxi trip domain types shared by the query service and the browser.
//!
//! This crate defines the filter criteria a user can apply to the trip
//! listing, the normalized trip shape produced from raw upstream records,
//! and the pagination arithmetic both sides agree on.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Default lower bound for trip distance (miles).
pub const DEFAULT_MIN_DISTANCE: f64 = 0.0;
/// Default upper bound for trip distance (miles).
pub const DEFAULT_MAX_DISTANCE: f64 = 100.0;
/// Default lower bound for the fare (dollars).
pub const DEFAULT_MIN_FARE: f64 = 0.0;
/// Default upper bound for the fare (dollars).
pub const DEFAULT_MAX_FARE: f64 = 1000.0;

/// Placeholder used when a record has no vendor or payment type.
pub const UNKNOWN: &str = "unknown";

/// Taxi technology vendor that recorded the trip.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Vendor {
    /// Creative Mobile Technologies
    Cmt,
    /// `VeriFone` Transportation Systems
    Vts,
}

impl Vendor {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Cmt, Self::Vts]
    }

    /// Parses a filter code where the empty string means "any vendor".
    ///
    /// # Errors
    ///
    /// Returns [`strum::ParseError`] if the code is neither empty nor a
    /// known vendor.
    pub fn parse_code(code: &str) -> Result<Option<Self>, strum::ParseError> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }
        code.parse().map(Some)
    }
}

/// How the passenger paid.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash
    Csh,
    /// Credit card
    Crd,
}

impl PaymentMethod {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Csh, Self::Crd]
    }

    /// Human-readable label shown next to a trip.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Csh => "Cash",
            Self::Crd => "Credit Card",
        }
    }

    /// Parses a filter code where the empty string means "any payment type".
    ///
    /// # Errors
    ///
    /// Returns [`strum::ParseError`] if the code is neither empty nor a
    /// known payment type.
    pub fn parse_code(code: &str) -> Result<Option<Self>, strum::ParseError> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(None);
        }
        code.parse().map(Some)
    }
}

/// Filter criteria applied to the trip listing.
///
/// A missing bound is never represented by omission: minimums default to
/// zero and maximums to a generous ceiling. `None` for `service` or
/// `payment` means no constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripFilters {
    /// Restrict to a single vendor.
    pub service: Option<Vendor>,
    /// Restrict to a single payment type.
    pub payment: Option<PaymentMethod>,
    /// Minimum trip distance in miles.
    pub min_distance: f64,
    /// Maximum trip distance in miles.
    pub max_distance: f64,
    /// Minimum fare in dollars.
    pub min_fare: f64,
    /// Maximum fare in dollars.
    pub max_fare: f64,
}

impl Default for TripFilters {
    fn default() -> Self {
        Self {
            service: None,
            payment: None,
            min_distance: DEFAULT_MIN_DISTANCE,
            max_distance: DEFAULT_MAX_DISTANCE,
            min_fare: DEFAULT_MIN_FARE,
            max_fare: DEFAULT_MAX_FARE,
        }
    }
}

impl TripFilters {
    /// Vendor code as sent over the wire (`""` when unconstrained).
    #[must_use]
    pub fn service_code(&self) -> &str {
        self.service.as_ref().map_or("", AsRef::as_ref)
    }

    /// Payment code as sent over the wire (`""` when unconstrained).
    #[must_use]
    pub fn payment_code(&self) -> &str {
        self.payment.as_ref().map_or("", AsRef::as_ref)
    }
}

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl LatLng {
    /// Creates a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A taxi trip normalized from a raw upstream record.
///
/// Coordinates and timestamps are `None` when the source record was missing
/// them or they could not be parsed. Every numeric amount falls back to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTrip {
    /// Identifier unique within the filtered result set (`trip-{n}`).
    pub id: String,
    /// Where the passenger was picked up.
    pub pickup_point: Option<LatLng>,
    /// Where the passenger was dropped off.
    pub dropoff_point: Option<LatLng>,
    /// Pickup time (ISO 8601, UTC).
    #[serde(rename = "pickupTimeISO")]
    pub pickup_time_iso: Option<String>,
    /// Dropoff time (ISO 8601, UTC).
    #[serde(rename = "dropoffTimeISO")]
    pub dropoff_time_iso: Option<String>,
    /// Whole minutes between pickup and dropoff.
    pub trip_duration_minutes: u32,
    /// Metered fare.
    pub fare_amount: f64,
    /// MTA tax.
    pub mta_tax: f64,
    /// `fare_amount + mta_tax`.
    pub total_amount: f64,
    /// Distance travelled in miles.
    pub trip_distance_miles: f64,
    /// Vendor code, or `"unknown"`.
    pub vendor_id: String,
    /// Payment type code, or `"unknown"`.
    pub payment_type: String,
}

/// Zero-based row offset of a 1-based `page`.
///
/// Pages below 1 are treated as page 1. Returns `None` when the end of the
/// page (`offset + page_size`) does not fit in a `u64`, so callers can
/// iterate `offset..offset + page_size` without overflow.
#[must_use]
pub const fn page_offset(page: u64, page_size: u64) -> Option<u64> {
    let page = if page == 0 { 1 } else { page };
    match page.checked_mul(page_size) {
        Some(end) => Some(end - page_size),
        None => None,
    }
}

/// Number of pages needed to show `total` rows, `page_size` at a time.
///
/// Zero rows means zero pages.
#[must_use]
pub const fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Clamps `page` into `1..=max(total_pages, 1)`.
#[must_use]
pub fn clamp_page(page: u64, total_pages: u64) -> u64 {
    page.clamp(1, total_pages.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_for_first_page() {
        assert_eq!(page_offset(1, 10), Some(0));
        assert_eq!(page_offset(3, 10), Some(20));
        assert_eq!(page_offset(0, 10), Some(0));
    }

    #[test]
    fn offset_overflow_is_none() {
        assert_eq!(page_offset(u64::MAX, 10), None);
        assert_eq!(page_offset(u64::MAX / 10 + 1, 10), None);
        assert_eq!(page_offset(u64::MAX / 10, 10), Some(u64::MAX / 10 * 10 - 10));
        assert_eq!(page_offset(u64::MAX, 1), Some(u64::MAX - 1));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(95, 10), 10);
        assert_eq!(total_pages(100, 10), 10);
        assert_eq!(total_pages(101, 10), 11);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn clamp_page_keeps_page_in_range() {
        assert_eq!(clamp_page(0, 5), 1);
        assert_eq!(clamp_page(7, 5), 5);
        assert_eq!(clamp_page(3, 0), 1);
        assert_eq!(clamp_page(3, 5), 3);
    }

    #[test]
    fn empty_codes_mean_no_constraint() {
        assert_eq!(Vendor::parse_code("").unwrap(), None);
        assert_eq!(PaymentMethod::parse_code("  ").unwrap(), None);
        assert_eq!(Vendor::parse_code("VTS").unwrap(), Some(Vendor::Vts));
        assert_eq!(
            PaymentMethod::parse_code("CRD").unwrap(),
            Some(PaymentMethod::Crd)
        );
        assert!(Vendor::parse_code("XYZ").is_err());
    }

    #[test]
    fn codes_round_trip_through_filters() {
        let filters = TripFilters {
            service: Some(Vendor::Cmt),
            payment: Some(PaymentMethod::Csh),
            ..TripFilters::default()
        };
        assert_eq!(filters.service_code(), "CMT");
        assert_eq!(filters.payment_code(), "CSH");
        assert_eq!(Vendor::Cmt.to_string(), "CMT");
        assert_eq!(TripFilters::default().service_code(), "");
    }

    #[test]
    fn normalized_trip_uses_camel_case_keys() {
        let trip = NormalizedTrip {
            id: "trip-0".to_string(),
            pickup_point: Some(LatLng::new(40.7, -73.9)),
            dropoff_point: None,
            pickup_time_iso: Some("2014-01-01T00:00:00.000Z".to_string()),
            dropoff_time_iso: None,
            trip_duration_minutes: 5,
            fare_amount: 12.5,
            mta_tax: 0.5,
            total_amount: 13.0,
            trip_distance_miles: 2.1,
            vendor_id: "VTS".to_string(),
            payment_type: UNKNOWN.to_string(),
        };
        let json = serde_json::to_value(&trip).unwrap();
        assert_eq!(json["pickupTimeISO"], "2014-01-01T00:00:00.000Z");
        assert_eq!(json["pickupPoint"]["lat"], 40.7);
        assert_eq!(json["tripDurationMinutes"], 5);
        assert!(json["dropoffPoint"].is_null());
    }
}
