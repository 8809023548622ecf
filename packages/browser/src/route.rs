//! Driving routes between a trip's pickup and dropoff.

use async_trait::async_trait;
use serde_json::Value;
use taxi_map_trip_models::LatLng;

/// Mapbox Directions endpoint for driving profiles.
pub const MAPBOX_DIRECTIONS_URL: &str = "https://api.mapbox.com/directions/v5/mapbox/driving";

/// Errors from a route lookup.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// Transport or body decoding failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The directions service answered with a non-success status.
    #[error("Directions service returned HTTP {0}")]
    Status(u16),

    /// The response held no usable route.
    #[error("No route found")]
    NoRoute,

    /// No directions service is configured.
    #[error("No route provider configured")]
    Unavailable,
}

/// Something that can plan a driving path between two points.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Returns the path from `from` to `to` as a polyline.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] if the lookup fails or finds no route.
    async fn driving_route(&self, from: LatLng, to: LatLng) -> Result<Vec<LatLng>, RouteError>;
}

/// [`RouteProvider`] using the Mapbox Directions API.
#[derive(Debug, Clone)]
pub struct MapboxDirections {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl MapboxDirections {
    /// Creates a client against the public Mapbox endpoint.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: MAPBOX_DIRECTIONS_URL.to_string(),
            access_token: access_token.into(),
        }
    }

    /// Points the provider at a different directions endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn route_url(&self, from: LatLng, to: LatLng) -> String {
        format!(
            "{}/{},{};{},{}",
            self.base_url, from.lng, from.lat, to.lng, to.lat
        )
    }
}

#[async_trait]
impl RouteProvider for MapboxDirections {
    async fn driving_route(&self, from: LatLng, to: LatLng) -> Result<Vec<LatLng>, RouteError> {
        let url = self.route_url(from, to);
        log::debug!("Requesting driving route {url}");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("geometries", "geojson"),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Directions request failed with {status}");
            return Err(RouteError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        parse_directions(&body)
    }
}

/// Reads the first route's GeoJSON line from a Directions response,
/// flipping each `[lng, lat]` pair.
///
/// # Errors
///
/// Returns [`RouteError::NoRoute`] if there is no route or its geometry has
/// no valid coordinates.
pub fn parse_directions(body: &Value) -> Result<Vec<LatLng>, RouteError> {
    let coordinates = body
        .pointer("/routes/0/geometry/coordinates")
        .and_then(Value::as_array)
        .ok_or(RouteError::NoRoute)?;

    let path: Vec<LatLng> = coordinates
        .iter()
        .filter_map(|pair| {
            let lng = pair.get(0)?.as_f64()?;
            let lat = pair.get(1)?.as_f64()?;
            Some(LatLng::new(lat, lng))
        })
        .collect();

    if path.is_empty() {
        return Err(RouteError::NoRoute);
    }
    Ok(path)
}
