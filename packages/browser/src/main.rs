#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front end for the trip browser.
//!
//! ```text
//! taxi_map_browser --query "service=VTS&page=2"
//! taxi_map_browser --query "page=2" next
//! taxi_map_browser jump 7
//! taxi_map_browser filter --payment Cash --max-fare 40
//! taxi_map_browser --route-token <mapbox token> select trip-3
//! ```
//!
//! Every invocation restores the view from `--query`, performs one action,
//! and prints the resulting page together with the query string to pass
//! next time.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use taxi_map_browser::TRIPS_PER_PAGE;
use taxi_map_browser::api::HttpTripsApi;
use taxi_map_browser::controller::TripBrowser;
use taxi_map_browser::form::{FilterForm, strip_leading_zeros};
use taxi_map_browser::route::{MapboxDirections, RouteProvider};
use taxi_map_browser::state::BrowserState;

#[derive(Parser)]
#[command(name = "taxi_map_browser", about = "Browse NYC yellow taxi trips")]
struct Cli {
    /// Base URL of the trip API server
    #[arg(long, default_value = "http://localhost:5000")]
    server: String,

    /// View to restore, as a URL query string
    #[arg(long, default_value = "")]
    query: String,

    /// Mapbox access token used to look up driving routes
    #[arg(long)]
    route_token: Option<String>,

    /// Trips per page
    #[arg(long, default_value_t = TRIPS_PER_PAGE)]
    page_size: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current page
    Show,
    /// Go to the next page
    Next,
    /// Go to the previous page
    Prev,
    /// Jump to a page
    Jump {
        /// Page number
        #[arg(allow_negative_numbers = true)]
        page: i64,
    },
    /// Change filters and return to page 1
    Filter {
        /// CMT, VTS, or anything else for all
        #[arg(long)]
        service: Option<String>,
        /// Cash, Credit Card, or anything else for all
        #[arg(long)]
        payment: Option<String>,
        #[arg(long)]
        min_distance: Option<String>,
        #[arg(long)]
        max_distance: Option<String>,
        #[arg(long)]
        min_fare: Option<String>,
        #[arg(long)]
        max_fare: Option<String>,
    },
    /// Select a trip and show its route
    Select {
        /// Trip id as listed (e.g. trip-3)
        trip_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let api = Arc::new(HttpTripsApi::new(&cli.server));
    let routes = cli
        .route_token
        .map(|token| Arc::new(MapboxDirections::new(token)) as Arc<dyn RouteProvider>);

    let browser = TripBrowser::open(api, routes, &cli.query, cli.page_size);
    let state = browser.settled().await;

    match cli.command.unwrap_or(Commands::Show) {
        Commands::Show => {}
        Commands::Next => {
            if !browser.next_page() {
                eprintln!("Already on the last page.");
            }
        }
        Commands::Prev => {
            if !browser.prev_page() {
                eprintln!("Already on the first page.");
            }
        }
        Commands::Jump { page } => {
            if let Err(e) = browser.jump_to_page(page) {
                eprintln!("{e}");
            }
        }
        Commands::Filter {
            service,
            payment,
            min_distance,
            max_distance,
            min_fare,
            max_fare,
        } => {
            let mut form = FilterForm::from_filters(state.filters());
            if let Some(service) = service {
                form.service = service;
            }
            if let Some(payment) = payment {
                form.payment = payment;
            }
            for (input, field) in [
                (min_distance, &mut form.min_distance),
                (max_distance, &mut form.max_distance),
                (min_fare, &mut form.min_fare),
                (max_fare, &mut form.max_fare),
            ] {
                if let Some(input) = input {
                    *field = strip_leading_zeros(&input);
                }
            }
            if let Err(e) = browser.submit_form(&form) {
                eprintln!("{e}");
            }
        }
        Commands::Select { trip_id } => {
            if !browser.select_trip(&trip_id) {
                eprintln!("{trip_id} is not on this page.");
            }
        }
    }

    let state = browser
        .wait_until(|s| !s.is_loading() && !s.is_route_loading())
        .await;
    print_state(&state);

    Ok(())
}

fn print_state(state: &BrowserState) {
    if let Some(error) = state.error() {
        println!("{error}");
    }

    if state.trips().is_empty() {
        println!("No Data");
    } else {
        println!(
            "{:<10} {:<22} {:<7} {:>9} {:>8} {:<12} {:>9}",
            "ID", "PICKUP", "VENDOR", "MILES", "MINUTES", "PAYMENT", "TOTAL"
        );
        for trip in state.trips() {
            let marker = if state.selected_trip_id() == Some(trip.id.as_str()) {
                "*"
            } else {
                ""
            };
            println!(
                "{:<10} {:<22} {:<7} {:>9} {:>8} {:<12} {:>9}{marker}",
                trip.id,
                trip.time,
                trip.vendor_id,
                trip.distance,
                trip.trip_minutes,
                trip.payment_label(),
                trip.total_label(),
            );
        }
    }

    if let Some(trip) = state.selected_trip() {
        match state.route() {
            Some(path) => println!("\nRoute for {}: {} points", trip.id, path.len()),
            None => println!("\nNo route for {}", trip.id),
        }
    }

    println!("\n{}", state.page_label());
    println!("--query \"{}\"", state.url());
}
