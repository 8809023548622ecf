//! Maps raw upstream rows onto [`NormalizedTrip`].

use taxi_map_source_models::{FieldMapping, RawTripRecord};
use taxi_map_trip_models::{NormalizedTrip, UNKNOWN};

use crate::parsing::{
    duration_minutes, parse_amount, parse_lat_lng_str, parse_socrata_date, to_iso_string,
};

/// Extracts the trip fields from one JSON row using the dataset's column
/// names. Numbers and booleans are stringified; `null` and other shapes are
/// treated as missing.
#[must_use]
pub fn record_from_value(row: &serde_json::Value, fields: &FieldMapping) -> RawTripRecord {
    let get = |column: &str| field_str(row, column);
    RawTripRecord {
        pickup_latitude: get(&fields.pickup_latitude),
        pickup_longitude: get(&fields.pickup_longitude),
        dropoff_latitude: get(&fields.dropoff_latitude),
        dropoff_longitude: get(&fields.dropoff_longitude),
        pickup_datetime: get(&fields.pickup_datetime),
        dropoff_datetime: get(&fields.dropoff_datetime),
        fare_amount: get(&fields.fare_amount),
        mta_tax: get(&fields.mta_tax),
        trip_distance: get(&fields.trip_distance),
        vendor_id: get(&fields.vendor_id),
        payment_type: get(&fields.payment_type),
    }
}

fn field_str(row: &serde_json::Value, column: &str) -> Option<String> {
    match row.get(column)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Normalizes one raw row.
///
/// `totalAmount` is always `fareAmount + mtaTax`, whatever total the upstream
/// reports. Empty vendor and payment codes become `"unknown"`.
#[must_use]
pub fn normalize_trip(id: String, raw: &RawTripRecord) -> NormalizedTrip {
    let pickup_at = raw.pickup_datetime.as_deref().and_then(parse_socrata_date);
    let dropoff_at = raw.dropoff_datetime.as_deref().and_then(parse_socrata_date);

    let trip_duration_minutes = match (&pickup_at, &dropoff_at) {
        (Some(pickup), Some(dropoff)) => {
            if dropoff < pickup {
                log::debug!("{id}: dropoff precedes pickup, clamping duration to 0");
            }
            duration_minutes(pickup, dropoff)
        }
        _ => 0,
    };

    let fare_amount = parse_amount(raw.fare_amount.as_deref());
    let mta_tax = parse_amount(raw.mta_tax.as_deref());

    NormalizedTrip {
        pickup_point: parse_lat_lng_str(
            raw.pickup_latitude.as_deref(),
            raw.pickup_longitude.as_deref(),
        ),
        dropoff_point: parse_lat_lng_str(
            raw.dropoff_latitude.as_deref(),
            raw.dropoff_longitude.as_deref(),
        ),
        pickup_time_iso: pickup_at.as_ref().map(to_iso_string),
        dropoff_time_iso: dropoff_at.as_ref().map(to_iso_string),
        trip_duration_minutes,
        fare_amount,
        mta_tax,
        total_amount: fare_amount + mta_tax,
        trip_distance_miles: parse_amount(raw.trip_distance.as_deref()),
        vendor_id: non_empty_or_unknown(raw.vendor_id.as_deref()),
        payment_type: non_empty_or_unknown(raw.payment_type.as_deref()),
        id,
    }
}

fn non_empty_or_unknown(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}
