use thiserror::Error;

/// Message reported when the geocoding service finds no match
pub const NO_RESULT_MESSAGE: &str = "No result found in the geocoding response.";

/// Failure to resolve an address to coordinates
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// The service answered with an empty result list
    #[error("No result found in the geocoding response.")]
    NoResult,

    /// The service answered, but not with usable coordinates
    #[error("Invalid geocoding response: {0}")]
    InvalidResponse(String),

    /// Connection failure, timeout or non-success status
    #[error("Geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
