//! Reshaping of normalized trips into what the map and list render.

use chrono::{DateTime, Utc};
use taxi_map_trip_models::{LatLng, NormalizedTrip, PaymentMethod};

/// Shown in place of a pickup time that is missing or unparseable.
pub const INVALID_TIME: &str = "Invalid Date";

/// A trip as shown in the list and on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayTrip {
    /// Trip id, unique across pages.
    pub id: String,
    /// `[pickup, dropoff]`, or `None` when either end has no coordinates.
    pub route: Option<[LatLng; 2]>,
    /// Pickup time formatted as `dd/mm/yyyy, hh:mm am`.
    pub time: String,
    /// Fare in dollars.
    pub fare: f64,
    /// Distance in miles.
    pub distance: f64,
    /// Whole minutes between pickup and dropoff.
    pub trip_minutes: u32,
    /// Service code, e.g. `CMT`.
    pub vendor_id: String,
    /// Payment code, e.g. `CSH`.
    pub payment_type: String,
    /// Fare plus MTA tax.
    pub total_amount: f64,
}

impl DisplayTrip {
    /// Prepares a normalized trip for display.
    #[must_use]
    pub fn from_trip(trip: &NormalizedTrip) -> Self {
        Self {
            id: trip.id.clone(),
            route: trip.pickup_point.zip(trip.dropoff_point).map(|(a, b)| [a, b]),
            time: format_pickup_time(trip.pickup_time_iso.as_deref()),
            fare: trip.fare_amount,
            distance: trip.trip_distance_miles,
            trip_minutes: trip.trip_duration_minutes,
            vendor_id: trip.vendor_id.clone(),
            payment_type: trip.payment_type.clone(),
            total_amount: trip.total_amount,
        }
    }

    /// "Credit Card" for card payments, "Cash" for everything else.
    #[must_use]
    pub fn payment_label(&self) -> &'static str {
        if self.payment_type == PaymentMethod::Crd.as_ref() {
            PaymentMethod::Crd.label()
        } else {
            PaymentMethod::Csh.label()
        }
    }

    /// Total formatted as dollars with two decimals.
    #[must_use]
    pub fn total_label(&self) -> String {
        format!("${:.2}", self.total_amount)
    }
}

/// Formats an ISO 8601 timestamp the en-GB way with a 12-hour clock, in UTC.
#[must_use]
pub fn format_pickup_time(iso: Option<&str>) -> String {
    iso.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or_else(
            || INVALID_TIME.to_string(),
            |dt| dt.with_timezone(&Utc).format("%d/%m/%Y, %I:%M %P").to_string(),
        )
}

/// `Page X of Y`, or `Page 0 of 0` when nothing matched.
#[must_use]
pub fn page_label(page: u64, total_count: u64, total_pages: u64) -> String {
    if total_count == 0 {
        "Page 0 of 0".to_string()
    } else {
        format!("Page {page} of {total_pages}")
    }
}
