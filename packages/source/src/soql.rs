//! `SoQL` (Socrata Query Language) builders for the trip listing.
//!
//! Filters become a `$where` predicate list joined with `AND`. A bound is
//! only emitted when it is non-zero, so `minDistance=0` produces no lower
//! distance constraint at all. Vendor and payment codes come from closed
//! enums and are therefore safe to quote inline.

use taxi_map_source_models::FieldMapping;
use taxi_map_trip_models::TripFilters;

use crate::PageQuery;

/// Alias of the aggregate column in count queries.
pub const COUNT_ALIAS: &str = "total";

/// Builds the individual predicates for `filters`, in a stable order:
/// fare bounds, distance bounds, vendor, payment.
#[must_use]
pub fn build_predicates(filters: &TripFilters, fields: &FieldMapping) -> Vec<String> {
    let mut predicates = Vec::new();

    push_bound(&mut predicates, &fields.fare_amount, ">=", filters.min_fare);
    push_bound(&mut predicates, &fields.fare_amount, "<=", filters.max_fare);
    push_bound(
        &mut predicates,
        &fields.trip_distance,
        ">=",
        filters.min_distance,
    );
    push_bound(
        &mut predicates,
        &fields.trip_distance,
        "<=",
        filters.max_distance,
    );

    if filters.service.is_some() {
        predicates.push(format!(
            "{} = '{}'",
            fields.vendor_id,
            filters.service_code()
        ));
    }
    if filters.payment.is_some() {
        predicates.push(format!(
            "{} = '{}'",
            fields.payment_type,
            filters.payment_code()
        ));
    }

    predicates
}

/// Joins the predicates for `filters` into a single `$where` clause, or
/// `None` when nothing constrains the result.
#[must_use]
pub fn build_where_clause(filters: &TripFilters, fields: &FieldMapping) -> Option<String> {
    let predicates = build_predicates(filters, fields);
    if predicates.is_empty() {
        None
    } else {
        Some(predicates.join(" AND "))
    }
}

/// Query parameters for fetching one page of rows.
#[must_use]
pub fn page_params(query: &PageQuery, fields: &FieldMapping) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("$limit", query.limit.to_string()),
        ("$offset", query.offset.to_string()),
    ];
    if let Some(clause) = build_where_clause(&query.filters, fields) {
        params.push(("$where", clause));
    }
    params
}

/// Query parameters for an aggregate `count(*)` over the filtered rows.
#[must_use]
pub fn count_params(filters: &TripFilters, fields: &FieldMapping) -> Vec<(&'static str, String)> {
    let mut params = vec![("$select", format!("count(*) AS {COUNT_ALIAS}"))];
    if let Some(clause) = build_where_clause(filters, fields) {
        params.push(("$where", clause));
    }
    params
}

/// Query parameters for fetching every filtered row (no `$limit`/`$offset`).
#[must_use]
pub fn scan_params(filters: &TripFilters, fields: &FieldMapping) -> Vec<(&'static str, String)> {
    build_where_clause(filters, fields)
        .map(|clause| vec![("$where", clause)])
        .unwrap_or_default()
}

// Zero and non-finite bounds are skipped.
fn push_bound(predicates: &mut Vec<String>, column: &str, op: &str, value: f64) {
    if value == 0.0 || !value.is_finite() {
        return;
    }
    predicates.push(format!("{column} {op} {value}"));
}

#[cfg(test)]
mod tests {
    use taxi_map_trip_models::{PaymentMethod, Vendor};

    use super::*;
    use crate::registry::default_dataset;

    fn fields() -> FieldMapping {
        default_dataset().fields
    }

    #[test]
    fn default_filters_emit_only_upper_bounds() {
        let clause = build_where_clause(&TripFilters::default(), &fields()).unwrap();
        assert_eq!(clause, "fare_amount <= 1000 AND trip_distance <= 100");
    }

    #[test]
    fn zero_minimum_distance_is_omitted() {
        let filters = TripFilters {
            min_distance: 0.0,
            ..TripFilters::default()
        };
        let predicates = build_predicates(&filters, &fields());
        assert!(!predicates.iter().any(|p| p.starts_with("trip_distance >=")));
    }

    #[test]
    fn zero_maximum_is_omitted_too() {
        let filters = TripFilters {
            max_distance: 0.0,
            max_fare: 0.0,
            ..TripFilters::default()
        };
        assert_eq!(build_where_clause(&filters, &fields()), None);
    }

    #[test]
    fn all_filters_join_with_and() {
        let filters = TripFilters {
            service: Some(Vendor::Vts),
            payment: Some(PaymentMethod::Crd),
            min_distance: 1.5,
            max_distance: 10.0,
            min_fare: 5.0,
            max_fare: 50.0,
        };
        let clause = build_where_clause(&filters, &fields()).unwrap();
        assert_eq!(
            clause,
            "fare_amount >= 5 AND fare_amount <= 50 AND trip_distance >= 1.5 \
             AND trip_distance <= 10 AND vendor_id = 'VTS' AND payment_type = 'CRD'"
        );
    }

    #[test]
    fn page_params_carry_limit_and_offset() {
        let query = PageQuery {
            limit: 10,
            offset: 20,
            filters: TripFilters::default(),
        };
        let params = page_params(&query, &fields());
        assert_eq!(params[0], ("$limit", "10".to_string()));
        assert_eq!(params[1], ("$offset", "20".to_string()));
        assert_eq!(params[2].0, "$where");
    }

    #[test]
    fn count_params_share_the_page_predicate() {
        let filters = TripFilters {
            service: Some(Vendor::Cmt),
            ..TripFilters::default()
        };
        let count = count_params(&filters, &fields());
        let scan = scan_params(&filters, &fields());
        assert_eq!(count[0], ("$select", "count(*) AS total".to_string()));
        assert_eq!(count[1], scan[0]);
        assert!(!scan.iter().any(|(k, _)| *k == "$limit" || *k == "$offset"));
    }

    #[test]
    fn unconstrained_scan_has_no_params() {
        let filters = TripFilters {
            max_distance: 0.0,
            max_fare: 0.0,
            ..TripFilters::default()
        };
        assert!(scan_params(&filters, &fields()).is_empty());
    }
}
