//! The trip query operation: one result page plus the filtered total.

use taxi_map_trip_models::{NormalizedTrip, TripFilters, page_offset};

use crate::normalize::normalize_trip;
use crate::{PageQuery, SourceError, TripSource};

/// Trips for one page together with the number of trips matching the
/// filters across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct TripResultPage {
    /// Normalized trips, in upstream order, at most `page_size` long.
    pub trips: Vec<NormalizedTrip>,
    /// Number of upstream rows matching the filters.
    pub total: u64,
}

/// Fetches and normalizes one page of trips, then counts every trip
/// matching the same filters.
///
/// The two upstream calls run one after the other: the page first, then the
/// count. Trip ids are `trip-{n}` where `n` is the row's position in the
/// whole filtered result, so they stay unique across pages.
///
/// # Errors
///
/// Returns [`SourceError::PageOutOfRange`] without calling the upstream if
/// the page's rows cannot be addressed with a `u64` offset, and
/// [`SourceError`] if either upstream call fails. No partial result is
/// returned.
pub async fn query_trips(
    source: &dyn TripSource,
    page: u64,
    page_size: u64,
    filters: &TripFilters,
) -> Result<TripResultPage, SourceError> {
    let offset =
        page_offset(page, page_size).ok_or(SourceError::PageOutOfRange { page, page_size })?;
    let query = PageQuery {
        limit: page_size,
        offset,
        filters: *filters,
    };

    let rows = source.fetch_page(&query).await?;
    let total = source.count(filters).await?;

    let trips = rows
        .iter()
        .zip(offset..offset + page_size)
        .map(|(raw, n)| normalize_trip(format!("trip-{n}"), raw))
        .collect::<Vec<_>>();

    log::debug!(
        "{}: page {page} (offset {offset}) returned {} of {total} trips",
        source.id(),
        trips.len()
    );

    Ok(TripResultPage { trips, total })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use taxi_map_source_models::RawTripRecord;

    use super::*;

    /// In-memory source recording the calls it receives.
    #[derive(Default)]
    struct FakeSource {
        rows: Vec<RawTripRecord>,
        total: u64,
        fail_count: bool,
        /// Serve every row regardless of offset and limit.
        ignore_paging: bool,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TripSource for FakeSource {
        fn id(&self) -> &str {
            "fake"
        }

        async fn fetch_page(&self, query: &PageQuery) -> Result<Vec<RawTripRecord>, SourceError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("page:{}:{}", query.limit, query.offset));
            if self.ignore_paging {
                return Ok(self.rows.clone());
            }
            Ok(self
                .rows
                .iter()
                .skip(usize::try_from(query.offset).unwrap())
                .take(usize::try_from(query.limit).unwrap())
                .cloned()
                .collect())
        }

        async fn count(&self, _filters: &TripFilters) -> Result<u64, SourceError> {
            self.calls.lock().unwrap().push("count".to_string());
            if self.fail_count {
                return Err(SourceError::Status {
                    status: 503,
                    url: "fake".to_string(),
                });
            }
            Ok(self.total)
        }
    }

    fn rows(n: usize) -> Vec<RawTripRecord> {
        (0..n)
            .map(|i| RawTripRecord {
                fare_amount: Some(format!("{i}.5")),
                mta_tax: Some("0.5".to_string()),
                vendor_id: Some("CMT".to_string()),
                ..RawTripRecord::default()
            })
            .collect()
    }

    #[tokio::test]
    async fn fetches_page_then_count() {
        let source = FakeSource {
            rows: rows(25),
            total: 25,
            ..FakeSource::default()
        };
        let result = query_trips(&source, 3, 10, &TripFilters::default())
            .await
            .unwrap();

        assert_eq!(result.total, 25);
        assert_eq!(result.trips.len(), 5);
        assert_eq!(result.trips[0].id, "trip-20");
        assert!((result.trips[0].total_amount - 21.0).abs() < f64::EPSILON);
        assert_eq!(
            *source.calls.lock().unwrap(),
            vec!["page:10:20".to_string(), "count".to_string()]
        );
    }

    #[tokio::test]
    async fn total_is_independent_of_paging() {
        let source = FakeSource {
            rows: rows(95),
            total: 95,
            ..FakeSource::default()
        };
        let first = query_trips(&source, 1, 10, &TripFilters::default())
            .await
            .unwrap();
        let last = query_trips(&source, 10, 100, &TripFilters::default())
            .await
            .unwrap();
        assert_eq!(first.total, last.total);
        assert_eq!(first.trips[0].id, "trip-0");
        assert!(last.trips.is_empty());
    }

    #[tokio::test]
    async fn unaddressable_page_is_rejected_before_fetching() {
        let source = FakeSource {
            rows: rows(2),
            total: 2,
            ignore_paging: true,
            ..FakeSource::default()
        };
        let err = query_trips(&source, u64::MAX, 10, &TripFilters::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SourceError::PageOutOfRange {
                page: u64::MAX,
                page_size: 10
            }
        ));
        assert!(source.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn ids_near_the_end_of_the_range_do_not_overflow() {
        let source = FakeSource {
            rows: rows(3),
            total: 3,
            ignore_paging: true,
            ..FakeSource::default()
        };
        let result = query_trips(&source, u64::MAX, 1, &TripFilters::default())
            .await
            .unwrap();
        // Rows beyond the page size are dropped.
        assert_eq!(result.trips.len(), 1);
        assert_eq!(result.trips[0].id, format!("trip-{}", u64::MAX - 1));
    }

    #[tokio::test]
    async fn count_failure_discards_page() {
        let source = FakeSource {
            rows: rows(3),
            total: 3,
            fail_count: true,
            ..FakeSource::default()
        };
        let err = query_trips(&source, 1, 10, &TripFilters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 503, .. }));
    }
}
