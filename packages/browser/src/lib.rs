#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client-side state controller for browsing taxi trips.
//!
//! Holds the authoritative filter + page tuple, mirrors it with a URL query
//! string, and makes sure the most recently issued fetch is the only one
//! allowed to update the visible result page. The pure transitions live in
//! [`state`]; [`controller`] drives them against a real [`api::TripsApi`]
//! on a tokio runtime.

pub mod api;
pub mod controller;
pub mod display;
pub mod form;
pub mod route;
pub mod state;
pub mod url_state;

/// Number of trips shown per page.
pub const TRIPS_PER_PAGE: u64 = 10;

/// Message shown when a result page could not be fetched.
pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch trip data";

/// Errors from fetching a result page from the trip API.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport or body decoding failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Trip API returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The `message` from the error body, or the raw body when it was
        /// not JSON.
        message: String,
    },
}

/// User input rejected before any state change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// One of the numeric filter fields was left blank.
    #[error("Please fill in all fields.")]
    EmptyField {
        /// Name of the blank field.
        field: &'static str,
    },

    /// A numeric filter field does not hold a number.
    #[error("{field} must be a number, got {value:?}")]
    InvalidNumber {
        /// Name of the field.
        field: &'static str,
        /// The offending text.
        value: String,
    },

    /// A numeric filter field holds a negative number.
    #[error("{field} must not be negative")]
    Negative {
        /// Name of the field.
        field: &'static str,
    },

    /// Jump target outside `1..=total_pages`.
    #[error("Please input between 1 and {total_pages}")]
    PageOutOfRange {
        /// The requested page.
        requested: i64,
        /// Pages currently available.
        total_pages: u64,
    },
}
