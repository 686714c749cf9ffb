//! Address-to-coordinate resolution
//!
//! [`Geocoder`] is the seam between the distance workflow and the external
//! lookup service. [`NominatimGeocoder`] talks to OpenStreetMap's Nominatim;
//! tests substitute their own implementations.

mod error;
mod nominatim;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::Address;

pub use error::{GeocodingError, NO_RESULT_MESSAGE};
pub use nominatim::NominatimGeocoder;

/// A point on the globe in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Resolves an address to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &Address) -> Result<Coordinate, GeocodingError>;
}
