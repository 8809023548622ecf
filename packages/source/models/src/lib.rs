#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Upstream dataset configuration types and the raw trip record format.
//!
//! A [`DatasetDefinition`] describes one Socrata dataset: where it lives and
//! which columns hold the values the trip listing filters on and displays.
//! Rows fetched from it are captured as [`RawTripRecord`]s before
//! normalization.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// How the total number of matching rows is measured upstream.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CountStrategy {
    /// Ask the upstream for `count(*)` over the filtered rows.
    #[default]
    Aggregate,
    /// Fetch every matching row and count them locally.
    FullScan,
}

/// A Socrata trip dataset definition.
///
/// Loaded from TOML files embedded at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier (e.g., `"nyc_yellow_taxi_2014"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// SODA resource endpoint (e.g.,
    /// `"https://data.cityofnewyork.us/resource/gkne-dk5s.json"`).
    pub api_url: String,
    /// Human-readable portal page for the dataset.
    #[serde(default)]
    pub portal_url: Option<String>,
    /// Column names used for filtering and normalization.
    pub fields: FieldMapping,
}

/// Maps the dataset's column names to the trip fields we read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldMapping {
    /// Pickup latitude column.
    pub pickup_latitude: String,
    /// Pickup longitude column.
    pub pickup_longitude: String,
    /// Dropoff latitude column.
    pub dropoff_latitude: String,
    /// Dropoff longitude column.
    pub dropoff_longitude: String,
    /// Pickup timestamp column.
    pub pickup_datetime: String,
    /// Dropoff timestamp column.
    pub dropoff_datetime: String,
    /// Metered fare column.
    pub fare_amount: String,
    /// MTA tax column.
    pub mta_tax: String,
    /// Trip distance (miles) column.
    pub trip_distance: String,
    /// Vendor code column.
    pub vendor_id: String,
    /// Payment type code column.
    pub payment_type: String,
}

/// One upstream row, reduced to the fields the trip listing uses.
///
/// Every field is kept as the text the upstream sent (numbers are
/// stringified) and may be missing. Parsing happens during normalization so
/// that one malformed field never discards the whole row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTripRecord {
    /// Pickup latitude.
    pub pickup_latitude: Option<String>,
    /// Pickup longitude.
    pub pickup_longitude: Option<String>,
    /// Dropoff latitude.
    pub dropoff_latitude: Option<String>,
    /// Dropoff longitude.
    pub dropoff_longitude: Option<String>,
    /// Pickup timestamp.
    pub pickup_datetime: Option<String>,
    /// Dropoff timestamp.
    pub dropoff_datetime: Option<String>,
    /// Metered fare.
    pub fare_amount: Option<String>,
    /// MTA tax.
    pub mta_tax: Option<String>,
    /// Trip distance in miles.
    pub trip_distance: Option<String>,
    /// Vendor code.
    pub vendor_id: Option<String>,
    /// Payment type code.
    pub payment_type: Option<String>,
}
