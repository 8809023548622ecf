//! Async driver running [`BrowserState`] transitions against real services.
//!
//! Each transition that yields a [`FetchRequest`] spawns a tokio task for
//! it and aborts the task it supersedes. Generation tokens in the state
//! still guard against a response that slips in before the abort lands.
//! Dropping the [`TripBrowser`] aborts whatever is in flight.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use taxi_map_trip_models::TripFilters;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::ValidationError;
use crate::api::{FetchRequest, TripsApi};
use crate::form::FilterForm;
use crate::route::{RouteError, RouteProvider};
use crate::state::{BrowserState, FetchOutcome, RouteRequest};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// State shared between the browser and its tasks.
struct Shared {
    state: Mutex<BrowserState>,
    version: watch::Sender<u64>,
}

impl Shared {
    fn update<R>(&self, f: impl FnOnce(&mut BrowserState) -> R) -> R {
        let result = f(&mut lock(&self.state));
        self.version.send_modify(|v| *v += 1);
        result
    }
}

/// A live trip browser.
///
/// Must be created and used inside a tokio runtime.
pub struct TripBrowser {
    api: Arc<dyn TripsApi>,
    routes: Option<Arc<dyn RouteProvider>>,
    shared: Arc<Shared>,
    fetch_task: Mutex<Option<JoinHandle<()>>>,
    route_task: Mutex<Option<JoinHandle<()>>>,
}

impl TripBrowser {
    /// Opens the browser at the view described by `query` and starts
    /// loading it.
    #[must_use]
    pub fn open(
        api: Arc<dyn TripsApi>,
        routes: Option<Arc<dyn RouteProvider>>,
        query: &str,
        page_size: u64,
    ) -> Self {
        let (state, request) = BrowserState::open(query, page_size);
        let (version, _) = watch::channel(0);
        let browser = Self {
            api,
            routes,
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                version,
            }),
            fetch_task: Mutex::new(None),
            route_task: Mutex::new(None),
        };
        browser.spawn_fetch(request);
        browser
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> BrowserState {
        lock(&self.shared.state).clone()
    }

    /// Receiver that changes whenever the state does.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.version.subscribe()
    }

    /// Waits until `ready` holds for the state and returns that state.
    pub async fn wait_until(&self, ready: impl Fn(&BrowserState) -> bool) -> BrowserState {
        let mut changes = self.subscribe();
        loop {
            {
                let state = lock(&self.shared.state);
                if ready(&state) {
                    return state.clone();
                }
            }
            if changes.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }

    /// Waits until no fetch is outstanding.
    pub async fn settled(&self) -> BrowserState {
        self.wait_until(|s| !s.is_loading()).await
    }

    /// Applies `filters` from page 1 and fetches.
    pub fn submit_filters(&self, filters: TripFilters) {
        let request = self.shared.update(|s| s.submit_filters(filters));
        self.spawn_fetch(request);
    }

    /// # Errors
    ///
    /// Returns the form's [`ValidationError`]; nothing is fetched.
    pub fn submit_form(&self, form: &FilterForm) -> Result<(), ValidationError> {
        let request = self.shared.update(|s| s.submit_form(form))?;
        self.spawn_fetch(request);
        Ok(())
    }

    /// Returns `false` when already on the last page.
    pub fn next_page(&self) -> bool {
        self.run(BrowserState::next_page)
    }

    /// Returns `false` when already on the first page.
    pub fn prev_page(&self) -> bool {
        self.run(BrowserState::prev_page)
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::PageOutOfRange`] if `target` is not a
    /// valid page.
    pub fn jump_to_page(&self, target: i64) -> Result<(), ValidationError> {
        if let Some(request) = self.shared.update(|s| s.jump_to_page(target))? {
            self.spawn_fetch(request);
        }
        Ok(())
    }

    /// Follows a URL change. Returns `false` if it changed nothing.
    pub fn navigate(&self, query: &str) -> bool {
        self.run(|s| s.navigate(query))
    }

    /// Selects a trip and looks up its route. Returns `false` if the trip
    /// is not on the current page.
    pub fn select_trip(&self, id: &str) -> bool {
        let (found, request) = self.shared.update(|s| {
            let request = s.select_trip(id);
            (s.selected_trip_id() == Some(id), request)
        });
        if let Some(request) = request {
            self.spawn_route(request);
        }
        found
    }

    /// Clears the selection and abandons any route lookup.
    pub fn deselect(&self) {
        self.shared.update(BrowserState::deselect);
        if let Some(task) = lock(&self.route_task).take() {
            task.abort();
        }
    }

    fn run(&self, transition: impl FnOnce(&mut BrowserState) -> Option<FetchRequest>) -> bool {
        self.shared.update(transition).is_some_and(|request| {
            self.spawn_fetch(request);
            true
        })
    }

    fn spawn_fetch(&self, request: FetchRequest) {
        let api = Arc::clone(&self.api);
        let shared = Arc::clone(&self.shared);

        let task = tokio::spawn(async move {
            let mut request = request;
            loop {
                let result = api.fetch_trips(&request).await;
                match shared.update(|s| s.apply_response(request.generation, result)) {
                    FetchOutcome::Redirected(next) => request = next,
                    FetchOutcome::Stale | FetchOutcome::Applied | FetchOutcome::Failed => break,
                }
            }
        });

        if let Some(previous) = lock(&self.fetch_task).replace(task) {
            previous.abort();
        }
    }

    fn spawn_route(&self, request: RouteRequest) {
        let Some(routes) = self.routes.as_ref().map(Arc::clone) else {
            log::debug!("No route provider, skipping route for {}", request.trip_id);
            self.shared
                .update(|s| s.apply_route(request.generation, Err(RouteError::Unavailable)));
            return;
        };
        let shared = Arc::clone(&self.shared);

        let task = tokio::spawn(async move {
            let result = routes.driving_route(request.from, request.to).await;
            shared.update(|s| s.apply_route(request.generation, result));
        });

        if let Some(previous) = lock(&self.route_task).replace(task) {
            previous.abort();
        }
    }
}

impl Drop for TripBrowser {
    fn drop(&mut self) {
        for slot in [&self.fetch_task, &self.route_task] {
            if let Some(task) = lock(slot).take() {
                task.abort();
            }
        }
    }
}
