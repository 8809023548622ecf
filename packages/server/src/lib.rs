#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the taxi map application.
//!
//! Proxies the Socrata yellow-taxi dataset behind a single `GET /trips`
//! endpoint that adds pagination, filtering, and field normalization. The
//! server keeps no state between requests beyond the shared upstream client.

pub mod config;
mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::error::InternalError;
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use taxi_map_server_models::ApiError;
use taxi_map_source::TripSource;
use taxi_map_source::socrata::SocrataTripSource;

use crate::config::{PageLimits, ServerConfig};

pub use handlers::UPSTREAM_FAILURE_MESSAGE;

/// Shared application state.
pub struct AppState {
    /// Upstream trip data source.
    pub source: Arc<dyn TripSource>,
    /// Page size bounds for `GET /trips`.
    pub limits: PageLimits,
}

/// Registers the API routes and the JSON error handler for malformed query
/// strings.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        log::warn!("Rejected query string: {message}");
        InternalError::from_response(err, HttpResponse::BadRequest().json(ApiError::new(message)))
            .into()
    }))
    .route("/", web::get().to(handlers::index))
    .route("/health", web::get().to(handlers::health))
    .route("/trips", web::get().to(handlers::trips));
}

/// Starts the taxi map API server.
///
/// Reads [`ServerConfig`] from the environment, builds the Socrata source,
/// and runs the Actix-Web HTTP server. The caller provides the async runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the configuration is invalid, or if
/// the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let source = SocrataTripSource::new(config.socrata.clone());
    log::info!(
        "Serving dataset {} from {}",
        config.socrata.dataset.id,
        source.api_url()
    );
    if config.socrata.app_token.is_none() {
        log::warn!("SOCRATA_APP_TOKEN is not set; upstream requests will be throttled");
    }

    let state = web::Data::new(AppState {
        source: Arc::new(source),
        limits: config.limits,
    });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
