//! The filter form: raw user input and its validation into [`TripFilters`].

use taxi_map_trip_models::{PaymentMethod, TripFilters, Vendor};

use crate::ValidationError;

/// Raw contents of the filter form.
///
/// Numeric inputs are kept as typed text so that a half-edited form can be
/// represented; [`FilterForm::validate`] turns it into filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterForm {
    /// Selected service (`CMT`, `VTS`, or anything else for all).
    pub service: String,
    /// Selected payment, either as a label (`Cash`, `Credit Card`) or a code
    /// (`CSH`, `CRD`). Anything else means all.
    pub payment: String,
    /// Minimum distance in miles, as typed.
    pub min_distance: String,
    /// Maximum distance in miles, as typed.
    pub max_distance: String,
    /// Minimum fare, as typed.
    pub min_fare: String,
    /// Maximum fare, as typed.
    pub max_fare: String,
}

impl FilterForm {
    /// Pre-fills the form from the active filters.
    #[must_use]
    pub fn from_filters(filters: &TripFilters) -> Self {
        Self {
            service: filters.service_code().to_string(),
            payment: filters
                .payment
                .map_or_else(String::new, |p| p.label().to_string()),
            min_distance: filters.min_distance.to_string(),
            max_distance: filters.max_distance.to_string(),
            min_fare: filters.min_fare.to_string(),
            max_fare: filters.max_fare.to_string(),
        }
    }

    /// Validates the form.
    ///
    /// # Errors
    ///
    /// * [`ValidationError::EmptyField`] if a numeric field is blank
    /// * [`ValidationError::InvalidNumber`] if a numeric field is not a number
    /// * [`ValidationError::Negative`] if a numeric field is below zero
    pub fn validate(&self) -> Result<TripFilters, ValidationError> {
        let fields = [
            ("minDistance", &self.min_distance),
            ("maxDistance", &self.max_distance),
            ("minFare", &self.min_fare),
            ("maxFare", &self.max_fare),
        ];
        if let Some((field, _)) = fields.into_iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ValidationError::EmptyField { field });
        }

        Ok(TripFilters {
            service: service_choice(&self.service),
            payment: payment_choice(&self.payment),
            min_distance: parse_field("minDistance", &self.min_distance)?,
            max_distance: parse_field("maxDistance", &self.max_distance)?,
            min_fare: parse_field("minFare", &self.min_fare)?,
            max_fare: parse_field("maxFare", &self.max_fare)?,
        })
    }
}

/// Normalizes typed numeric input by stripping leading zeros.
///
/// An input made only of zeros keeps a single `0` so the field can still
/// express zero.
#[must_use]
pub fn strip_leading_zeros(input: &str) -> String {
    let stripped = input.trim_start_matches('0');
    if stripped.is_empty() && !input.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

fn service_choice(value: &str) -> Option<Vendor> {
    match value.trim() {
        "CMT" => Some(Vendor::Cmt),
        "VTS" => Some(Vendor::Vts),
        _ => None,
    }
}

fn payment_choice(value: &str) -> Option<PaymentMethod> {
    match value.trim() {
        "Cash" | "CSH" => Some(PaymentMethod::Csh),
        "Credit Card" | "CRD" => Some(PaymentMethod::Crd),
        _ => None,
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<f64, ValidationError> {
    let number = value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| ValidationError::InvalidNumber {
            field,
            value: value.to_string(),
        })?;

    if number < 0.0 {
        return Err(ValidationError::Negative { field });
    }
    Ok(number)
}
