//! The browser state container and its transitions.
//!
//! Every user action is a method on [`BrowserState`] that updates the
//! filter/page tuple, rewrites the URL, and hands back the [`FetchRequest`]
//! the caller must run. Responses come back through
//! [`BrowserState::apply_response`], which drops anything but the most
//! recently issued request.

use taxi_map_server_models::TripsResponse;
use taxi_map_trip_models::{LatLng, TripFilters, clamp_page, total_pages};

use crate::api::FetchRequest;
use crate::display::{DisplayTrip, page_label};
use crate::form::FilterForm;
use crate::url_state::UrlState;
use crate::{FETCH_ERROR_MESSAGE, FetchError, ValidationError};

/// Whether a fetch is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    /// No fetch outstanding.
    Idle,
    /// The latest issued fetch has not been applied yet.
    Loading,
}

/// What [`BrowserState::apply_response`] did with a response.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The response belonged to a superseded request and was discarded.
    Stale,
    /// Trips and total were replaced.
    Applied,
    /// The fetch failed; the previous trips are still shown.
    Failed,
    /// The page was past the end and has been corrected; run this request.
    Redirected(FetchRequest),
}

/// A route lookup for the selected trip.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    /// Selection generation the result must be applied with.
    pub generation: u64,
    /// Id of the selected trip.
    pub trip_id: String,
    /// Pickup point.
    pub from: LatLng,
    /// Dropoff point.
    pub to: LatLng,
}

/// Everything the trip browser shows.
#[derive(Debug, Clone)]
pub struct BrowserState {
    filters: TripFilters,
    page: u64,
    page_size: u64,
    trips: Vec<DisplayTrip>,
    total_count: u64,
    phase: FetchPhase,
    error: Option<String>,
    selected_trip_id: Option<String>,
    route: Option<Vec<LatLng>>,
    route_loading: bool,
    generation: u64,
    route_generation: u64,
    url: String,
}

impl BrowserState {
    /// Restores the state from a query string and issues the first fetch.
    #[must_use]
    pub fn open(query: &str, page_size: u64) -> (Self, FetchRequest) {
        let parsed = UrlState::parse(query);
        let mut state = Self {
            filters: parsed.filters,
            page: parsed.page,
            page_size: page_size.max(1),
            trips: Vec::new(),
            total_count: 0,
            phase: FetchPhase::Idle,
            error: None,
            selected_trip_id: None,
            route: None,
            route_loading: false,
            generation: 0,
            route_generation: 0,
            url: String::new(),
        };
        state.sync_url();
        let request = state.begin_fetch();
        (state, request)
    }

    /// Follows a URL change (e.g. history navigation).
    ///
    /// Returns a fetch only when the parsed filters or page differ from the
    /// current ones.
    pub fn navigate(&mut self, query: &str) -> Option<FetchRequest> {
        let parsed = UrlState::parse(query);
        if parsed.filters == self.filters && parsed.page == self.page {
            return None;
        }
        self.filters = parsed.filters;
        self.page = parsed.page;
        self.sync_url();
        Some(self.begin_fetch())
    }

    /// Applies new filters and returns to page 1.
    ///
    /// Always fetches, so resubmitting the same filters retries a failed
    /// load.
    pub fn submit_filters(&mut self, filters: TripFilters) -> FetchRequest {
        self.filters = filters;
        self.page = 1;
        self.sync_url();
        self.begin_fetch()
    }

    /// Validates the filter form and applies it.
    ///
    /// # Errors
    ///
    /// Returns the form's [`ValidationError`]; the state is left untouched.
    pub fn submit_form(&mut self, form: &FilterForm) -> Result<FetchRequest, ValidationError> {
        let filters = form.validate()?;
        Ok(self.submit_filters(filters))
    }

    /// Moves to the next page, or does nothing on the last page.
    pub fn next_page(&mut self) -> Option<FetchRequest> {
        if !self.can_go_next() {
            return None;
        }
        self.page += 1;
        self.sync_url();
        Some(self.begin_fetch())
    }

    /// Moves to the previous page, or does nothing on the first page.
    pub fn prev_page(&mut self) -> Option<FetchRequest> {
        if !self.can_go_prev() {
            return None;
        }
        self.page -= 1;
        self.sync_url();
        Some(self.begin_fetch())
    }

    /// Jumps to `target`, which must lie in `1..=total_pages`.
    ///
    /// Jumping to the current page is accepted but fetches nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PageOutOfRange`] for any other target; the
    /// state is left untouched.
    pub fn jump_to_page(&mut self, target: i64) -> Result<Option<FetchRequest>, ValidationError> {
        let total_pages = self.total_pages();
        let page = u64::try_from(target)
            .ok()
            .filter(|p| (1..=total_pages).contains(p))
            .ok_or(ValidationError::PageOutOfRange {
                requested: target,
                total_pages,
            })?;

        if page == self.page {
            return Ok(None);
        }
        self.page = page;
        self.sync_url();
        Ok(Some(self.begin_fetch()))
    }

    /// Folds the result of `generation`'s fetch into the state.
    pub fn apply_response(
        &mut self,
        generation: u64,
        result: Result<TripsResponse, FetchError>,
    ) -> FetchOutcome {
        if generation != self.generation {
            log::debug!(
                "Discarding response for generation {generation}, latest is {}",
                self.generation
            );
            return FetchOutcome::Stale;
        }
        self.phase = FetchPhase::Idle;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                log::error!("Failed to fetch page {}: {e}", self.page);
                self.error = Some(FETCH_ERROR_MESSAGE.to_string());
                return FetchOutcome::Failed;
            }
        };

        self.trips = response.trips.iter().map(DisplayTrip::from_trip).collect();
        self.total_count = response.total;
        self.error = None;

        if let Some(id) = &self.selected_trip_id
            && !self.trips.iter().any(|t| &t.id == id)
        {
            self.deselect();
        }

        let total_pages = self.total_pages();
        if total_pages > 0 && self.page > total_pages {
            log::info!(
                "Page {} is past the last page, moving to {total_pages}",
                self.page
            );
            self.page = total_pages;
            self.sync_url();
            return FetchOutcome::Redirected(self.begin_fetch());
        }
        if total_pages == 0 && self.page > 1 {
            log::info!("No trips match, moving from page {} to 1", self.page);
            self.page = clamp_page(self.page, total_pages);
            self.sync_url();
        }

        FetchOutcome::Applied
    }

    /// Abandons the in-flight fetch; its response will be discarded.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.phase = FetchPhase::Idle;
    }

    /// Selects a trip on the current page.
    ///
    /// Returns the route lookup to run, or `None` if the trip is not on this
    /// page or lacks coordinates.
    pub fn select_trip(&mut self, id: &str) -> Option<RouteRequest> {
        let endpoints = self.trips.iter().find(|t| t.id == id)?.route;
        self.selected_trip_id = Some(id.to_string());
        self.route = None;
        self.route_loading = endpoints.is_some();
        self.route_generation += 1;

        let [from, to] = endpoints?;
        Some(RouteRequest {
            generation: self.route_generation,
            trip_id: id.to_string(),
            from,
            to,
        })
    }

    /// Clears the selection and its route.
    pub fn deselect(&mut self) {
        self.selected_trip_id = None;
        self.route = None;
        self.route_loading = false;
        self.route_generation += 1;
    }

    /// Stores a route for the selection that issued `generation`.
    ///
    /// Returns `false` if the selection has since changed.
    pub fn apply_route(
        &mut self,
        generation: u64,
        result: Result<Vec<LatLng>, crate::route::RouteError>,
    ) -> bool {
        if generation != self.route_generation {
            return false;
        }
        self.route_loading = false;
        self.route = match result {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Route lookup failed: {e}");
                None
            }
        };
        true
    }

    fn begin_fetch(&mut self) -> FetchRequest {
        self.generation += 1;
        self.phase = FetchPhase::Loading;
        FetchRequest {
            generation: self.generation,
            page: self.page,
            page_size: self.page_size,
            filters: self.filters,
        }
    }

    fn sync_url(&mut self) {
        self.url = UrlState {
            filters: self.filters,
            page: self.page,
        }
        .to_query_string();
    }

    /// Filters of the latest issued fetch.
    #[must_use]
    pub const fn filters(&self) -> &TripFilters {
        &self.filters
    }

    /// Current 1-based page.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Trips of the last applied page.
    #[must_use]
    pub fn trips(&self) -> &[DisplayTrip] {
        &self.trips
    }

    /// Matching trips across all pages, as last reported.
    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Number of pages; zero when nothing matches.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        total_pages(self.total_count, self.page_size)
    }

    /// Whether the latest issued fetch is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == FetchPhase::Loading
    }

    /// Whether a route lookup for the selection is outstanding.
    #[must_use]
    pub const fn is_route_loading(&self) -> bool {
        self.route_loading
    }

    #[must_use]
    pub const fn phase(&self) -> FetchPhase {
        self.phase
    }

    /// Message shown for the last failed fetch.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn selected_trip_id(&self) -> Option<&str> {
        self.selected_trip_id.as_deref()
    }

    /// The selected trip, if it is on the current page.
    #[must_use]
    pub fn selected_trip(&self) -> Option<&DisplayTrip> {
        let id = self.selected_trip_id.as_deref()?;
        self.trips.iter().find(|t| t.id == id)
    }

    /// Route of the selected trip, once looked up.
    #[must_use]
    pub fn route(&self) -> Option<&[LatLng]> {
        self.route.as_deref()
    }

    /// Current query string, without the leading `?`.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Latest issued fetch generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a previous page exists.
    #[must_use]
    pub const fn can_go_prev(&self) -> bool {
        self.total_count > 0 && self.page > 1
    }

    /// Whether a next page exists.
    #[must_use]
    pub const fn can_go_next(&self) -> bool {
        self.total_count > 0 && self.page < self.total_pages()
    }

    /// Pagination label, e.g. `Page 2 of 10`.
    #[must_use]
    pub fn page_label(&self) -> String {
        page_label(self.page, self.total_count, self.total_pages())
    }
}

#[cfg(test)]
mod tests {
    use taxi_map_trip_models::{NormalizedTrip, PaymentMethod, Vendor};

    use super::*;
    use crate::route::RouteError;

    fn trip(n: u64) -> NormalizedTrip {
        NormalizedTrip {
            id: format!("trip-{n}"),
            pickup_point: Some(LatLng::new(40.75, -73.99)),
            dropoff_point: Some(LatLng::new(40.71, -74.01)),
            pickup_time_iso: Some("2014-01-09T20:45:25.000Z".to_string()),
            dropoff_time_iso: None,
            trip_duration_minutes: 7,
            fare_amount: 12.5,
            mta_tax: 0.5,
            total_amount: 13.0,
            trip_distance_miles: 2.3,
            vendor_id: "VTS".to_string(),
            payment_type: "CRD".to_string(),
        }
    }

    fn page_of(first: u64, count: u64, total: u64) -> Result<TripsResponse, FetchError> {
        Ok(TripsResponse {
            trips: (first..first + count).map(trip).collect(),
            total,
        })
    }

    fn upstream_failure() -> Result<TripsResponse, FetchError> {
        Err(FetchError::Status {
            status: 500,
            message: "Error fetching trips".to_string(),
        })
    }

    /// State with `total` trips loaded on `page`.
    fn loaded(page: u64, total: u64) -> BrowserState {
        let (mut state, request) = BrowserState::open(&format!("page={page}"), 10);
        let first = (page - 1) * 10;
        assert_eq!(
            state.apply_response(request.generation, page_of(first, 10, total)),
            FetchOutcome::Applied
        );
        state
    }

    #[test]
    fn open_restores_url_and_starts_loading() {
        let (state, request) = BrowserState::open("?service=CMT&payment=CSH&maxFare=50&page=4", 10);
        assert!(state.is_loading());
        assert_eq!(request.page, 4);
        assert_eq!(request.page_size, 10);
        assert_eq!(request.filters.service, Some(Vendor::Cmt));
        assert_eq!(request.filters.payment, Some(PaymentMethod::Csh));
        assert!((request.filters.max_fare - 50.0).abs() < f64::EPSILON);
        assert_eq!(
            state.url(),
            "service=CMT&payment=CSH&minDistance=0&maxDistance=100&minFare=0&maxFare=50&page=4"
        );
    }

    #[test]
    fn empty_result_returns_to_first_page() {
        let (mut state, request) = BrowserState::open("page=5", 10);
        let generation = state.generation();
        assert_eq!(
            state.apply_response(request.generation, page_of(0, 0, 0)),
            FetchOutcome::Applied
        );
        assert_eq!(state.page(), 1);
        assert!(state.url().ends_with("page=1"));
        assert!(!state.is_loading());
        assert_eq!(state.generation(), generation);
        assert!(state.page() <= state.total_pages().max(1));
        assert!(!state.can_go_prev());
        assert_eq!(state.page_label(), "Page 0 of 0");
    }

    #[test]
    fn success_replaces_trips_and_total() {
        let state = loaded(1, 95);
        assert!(!state.is_loading());
        assert_eq!(state.trips().len(), 10);
        assert_eq!(state.total_count(), 95);
        assert_eq!(state.total_pages(), 10);
        assert_eq!(state.page_label(), "Page 1 of 10");
        assert!(state.error().is_none());
    }

    #[test]
    fn superseded_response_is_discarded() {
        let mut state = loaded(1, 95);
        let first = state.next_page().unwrap();
        let second = state.next_page().unwrap();
        assert_eq!(second.page, 3);

        assert_eq!(
            state.apply_response(second.generation, page_of(20, 10, 95)),
            FetchOutcome::Applied
        );
        assert_eq!(
            state.apply_response(first.generation, page_of(10, 10, 95)),
            FetchOutcome::Stale
        );
        assert_eq!(state.trips()[0].id, "trip-20");
        assert_eq!(state.page(), 3);
    }

    #[test]
    fn older_response_arriving_first_does_not_end_loading() {
        let mut state = loaded(1, 95);
        let first = state.next_page().unwrap();
        let _second = state.next_page().unwrap();

        assert_eq!(
            state.apply_response(first.generation, page_of(10, 10, 95)),
            FetchOutcome::Stale
        );
        assert!(state.is_loading());
        assert_eq!(state.trips()[0].id, "trip-0");
    }

    #[test]
    fn submitting_filters_resets_to_first_page() {
        let mut state = loaded(5, 95);
        let filters = TripFilters {
            service: Some(Vendor::Vts),
            ..TripFilters::default()
        };
        let request = state.submit_filters(filters);
        assert_eq!(request.page, 1);
        assert_eq!(request.filters, filters);
        assert_eq!(state.page(), 1);
        assert!(state.url().starts_with("service=VTS&"));
        assert!(state.url().ends_with("&page=1"));
    }

    #[test]
    fn invalid_form_leaves_state_alone() {
        let mut state = loaded(5, 95);
        let generation = state.generation();
        let form = FilterForm {
            min_distance: String::new(),
            ..FilterForm::from_filters(state.filters())
        };
        assert_eq!(
            state.submit_form(&form).unwrap_err().to_string(),
            "Please fill in all fields."
        );
        assert_eq!(state.page(), 5);
        assert_eq!(state.generation(), generation);
    }

    #[test]
    fn paging_is_clamped_at_both_ends() {
        let mut state = loaded(1, 25);
        assert!(!state.can_go_prev());
        assert!(state.prev_page().is_none());

        let request = state.next_page().unwrap();
        state.apply_response(request.generation, page_of(10, 10, 25));
        let request = state.next_page().unwrap();
        state.apply_response(request.generation, page_of(20, 5, 25));

        assert_eq!(state.page(), 3);
        assert!(!state.can_go_next());
        assert!(state.next_page().is_none());
        assert_eq!(state.prev_page().unwrap().page, 2);
    }

    #[test]
    fn paging_preserves_filters() {
        let (mut state, request) = BrowserState::open("service=VTS&minFare=5", 10);
        state.apply_response(request.generation, page_of(0, 10, 30));
        let next = state.next_page().unwrap();
        assert_eq!(next.filters, request.filters);
        assert!(state.url().contains("minFare=5"));
        assert!(state.url().ends_with("page=2"));
    }

    #[test]
    fn empty_result_disables_paging() {
        let (mut state, request) = BrowserState::open("", 10);
        state.apply_response(request.generation, page_of(0, 0, 0));
        assert_eq!(state.page_label(), "Page 0 of 0");
        assert!(!state.can_go_prev());
        assert!(!state.can_go_next());
        assert!(state.next_page().is_none());
        assert!(state.jump_to_page(1).is_err());
    }

    #[test]
    fn jump_validates_range() {
        let mut state = loaded(1, 95);
        let url = state.url().to_string();
        let generation = state.generation();

        for target in [0, 11, -3] {
            let err = state.jump_to_page(target).unwrap_err();
            assert_eq!(err.to_string(), "Please input between 1 and 10");
        }
        assert_eq!(state.url(), url);
        assert_eq!(state.generation(), generation);

        let request = state.jump_to_page(10).unwrap().unwrap();
        assert_eq!(request.page, 10);
        assert!(state.url().ends_with("page=10"));
        assert!(state.jump_to_page(10).unwrap().is_none());
    }

    #[test]
    fn page_past_the_end_is_corrected() {
        let (mut state, request) = BrowserState::open("page=50", 10);
        let outcome = state.apply_response(request.generation, page_of(0, 0, 95));
        let FetchOutcome::Redirected(next) = outcome else {
            panic!("expected a redirect, got {outcome:?}");
        };
        assert_eq!(next.page, 10);
        assert_eq!(state.page(), 10);
        assert!(state.url().ends_with("page=10"));
        assert!(state.is_loading());
    }

    #[test]
    fn failure_keeps_stale_trips() {
        let mut state = loaded(1, 95);
        let request = state.next_page().unwrap();
        assert_eq!(
            state.apply_response(request.generation, upstream_failure()),
            FetchOutcome::Failed
        );
        assert_eq!(state.error(), Some(FETCH_ERROR_MESSAGE));
        assert_eq!(state.trips()[0].id, "trip-0");
        assert!(!state.is_loading());

        let filters = *state.filters();
        let request = state.submit_filters(filters);
        state.apply_response(request.generation, page_of(0, 10, 95));
        assert!(state.error().is_none());
    }

    #[test]
    fn navigate_fetches_only_on_change() {
        let mut state = loaded(1, 95);
        let same = state.url().to_string();
        assert!(state.navigate(&same).is_none());

        let request = state.navigate("?payment=CRD&page=2").unwrap();
        assert_eq!(request.page, 2);
        assert_eq!(request.filters.payment, Some(PaymentMethod::Crd));
    }

    #[test]
    fn cancel_discards_in_flight_response() {
        let (mut state, request) = BrowserState::open("", 10);
        state.cancel();
        assert!(!state.is_loading());
        assert_eq!(
            state.apply_response(request.generation, page_of(0, 10, 95)),
            FetchOutcome::Stale
        );
        assert!(state.trips().is_empty());
    }

    #[test]
    fn selection_requests_route_and_accepts_latest_only() {
        let mut state = loaded(1, 95);
        let first = state.select_trip("trip-3").unwrap();
        assert_eq!(state.selected_trip_id(), Some("trip-3"));
        assert!((first.from.lat - 40.75).abs() < f64::EPSILON);

        let second = state.select_trip("trip-4").unwrap();
        assert!(state.is_route_loading());
        assert!(!state.apply_route(first.generation, Ok(vec![first.from, first.to])));
        assert!(state.route().is_none());

        assert!(state.apply_route(second.generation, Ok(vec![second.from, second.to])));
        assert!(!state.is_route_loading());
        assert_eq!(state.route().map(<[LatLng]>::len), Some(2));

        state.deselect();
        assert!(state.selected_trip_id().is_none());
        assert!(state.route().is_none());
    }

    #[test]
    fn selection_of_unknown_trip_is_ignored() {
        let mut state = loaded(1, 95);
        assert!(state.select_trip("trip-99").is_none());
        assert!(state.selected_trip_id().is_none());
    }

    #[test]
    fn route_failure_leaves_no_route() {
        let mut state = loaded(1, 95);
        let request = state.select_trip("trip-1").unwrap();
        assert!(state.apply_route(request.generation, Err(RouteError::NoRoute)));
        assert!(state.route().is_none());
        assert_eq!(state.selected_trip_id(), Some("trip-1"));
    }

    #[test]
    fn new_page_without_selected_trip_clears_route() {
        let mut state = loaded(1, 95);
        let route = state.select_trip("trip-2").unwrap();
        state.apply_route(route.generation, Ok(vec![route.from, route.to]));

        let request = state.next_page().unwrap();
        state.apply_response(request.generation, page_of(10, 10, 95));
        assert!(state.selected_trip_id().is_none());
        assert!(state.route().is_none());
    }
}
