//! Dataset registry: dataset definitions loaded from embedded TOML configs.
//!
//! Each `.toml` file in `packages/source/datasets/` is baked into the binary
//! at compile time via [`include_str!`]. Pointing the service at another
//! Socrata trip dataset is a matter of adding a TOML file here.

use taxi_map_source_models::DatasetDefinition;

/// Identifier of the dataset served when none is configured.
pub const DEFAULT_DATASET_ID: &str = "nyc_yellow_taxi_2014";

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[(
    "nyc_yellow_taxi_2014",
    include_str!("../datasets/nyc_yellow_taxi_2014.toml"),
)];

/// Parses a dataset definition from TOML.
///
/// # Errors
///
/// Returns the TOML error message if the document is malformed or missing
/// required keys.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetDefinition, String> {
    toml::de::from_str(toml_str).map_err(|e| e.to_string())
}

/// Returns all configured dataset definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (the configs are embedded, so
/// this is caught by the tests below).
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_dataset_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a dataset definition by id.
#[must_use]
pub fn find_dataset(id: &str) -> Option<DatasetDefinition> {
    all_datasets().into_iter().find(|d| d.id == id)
}

/// Returns the dataset served by default.
///
/// # Panics
///
/// Panics if [`DEFAULT_DATASET_ID`] is not among the embedded configs.
#[must_use]
pub fn default_dataset() -> DatasetDefinition {
    find_dataset(DEFAULT_DATASET_ID)
        .unwrap_or_else(|| panic!("Default dataset {DEFAULT_DATASET_ID} is not registered"))
}
