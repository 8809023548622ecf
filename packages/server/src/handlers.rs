//! HTTP handler functions for the taxi map API.

use actix_web::{HttpResponse, web};
use taxi_map_server_models::{ApiError, ApiHealth, TripQueryParams, TripsResponse};
use taxi_map_source::SourceError;
use taxi_map_source::service::query_trips;
use taxi_map_trip_models::{
    DEFAULT_MAX_DISTANCE, DEFAULT_MAX_FARE, DEFAULT_MIN_DISTANCE, DEFAULT_MIN_FARE, PaymentMethod,
    TripFilters, Vendor,
};

use crate::AppState;

/// Message returned with every upstream failure.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Error fetching trips";

/// `GET /`
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Yellow Taxi Trip API using Socrata")
}

/// `GET /health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        dataset: state.source.id().to_string(),
    })
}

/// `GET /trips`
///
/// Returns one page of normalized trips matching the filters together with
/// the total number of matching trips.
pub async fn trips(
    state: web::Data<AppState>,
    params: web::Query<TripQueryParams>,
) -> HttpResponse {
    let filters = match parse_filters(&params) {
        Ok(filters) => filters,
        Err(message) => {
            log::warn!("Rejected trip query: {message}");
            return HttpResponse::BadRequest().json(ApiError::new(message));
        }
    };

    let page = params.page.unwrap_or(1).max(1);
    let limit = state.limits.resolve(params.limit);

    match query_trips(state.source.as_ref(), page, limit, &filters).await {
        Ok(result) => HttpResponse::Ok().json(TripsResponse {
            trips: result.trips,
            total: result.total,
        }),
        Err(e @ SourceError::PageOutOfRange { .. }) => {
            log::warn!("Rejected trip query: {e}");
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
        Err(e) => {
            log::error!("Error fetching trips: {e}");
            HttpResponse::InternalServerError().json(ApiError::new(UPSTREAM_FAILURE_MESSAGE))
        }
    }
}

/// Builds [`TripFilters`] from the query parameters, applying defaults for
/// absent bounds.
///
/// Returns a human-readable message if a code is unknown or a bound is
/// negative.
fn parse_filters(params: &TripQueryParams) -> Result<TripFilters, String> {
    let service = Vendor::parse_code(params.service.as_deref().unwrap_or_default())
        .map_err(|_| format!("Unknown service {:?}", params.service.as_deref().unwrap_or_default()))?;
    let payment = PaymentMethod::parse_code(params.payment.as_deref().unwrap_or_default())
        .map_err(|_| format!("Unknown payment {:?}", params.payment.as_deref().unwrap_or_default()))?;

    Ok(TripFilters {
        service,
        payment,
        min_distance: bound("minDistance", params.min_distance, DEFAULT_MIN_DISTANCE)?,
        max_distance: bound("maxDistance", params.max_distance, DEFAULT_MAX_DISTANCE)?,
        min_fare: bound("minFare", params.min_fare, DEFAULT_MIN_FARE)?,
        max_fare: bound("maxFare", params.max_fare, DEFAULT_MAX_FARE)?,
    })
}

fn bound(name: &str, value: Option<f64>, default: f64) -> Result<f64, String> {
    match value {
        None => Ok(default),
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(format!("{name} must be a non-negative number, got {v}")),
    }
}
