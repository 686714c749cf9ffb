//! Distance calculation between two addresses
//!
//! Both addresses are geocoded one after the other with a fixed pause in
//! between, since the public Nominatim instance allows at most one request
//! per second. The great-circle distance is then computed with the
//! haversine formula.

use std::sync::Arc;
use std::time::Duration;

use crate::geocoding::{Coordinate, Geocoder, GeocodingError};
use crate::models::{Address, Distance};

/// Sphere radius used for distances, in kilometers
pub const EARTH_RADIUS_KM: f64 = 6376.5;

/// Shortest allowed pause between two geocoding requests
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(1100);

/// Great-circle distance between two coordinates, in kilometers
pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (to.longitude - from.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Geocodes address pairs sequentially and measures the distance between them
#[derive(Clone)]
pub struct DistanceCalculator {
    geocoder: Arc<dyn Geocoder>,
    interval: Duration,
}

impl DistanceCalculator {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            geocoder,
            interval: MIN_REQUEST_INTERVAL,
        }
    }

    /// Lengthen the pause between lookups; shorter values are raised to the minimum
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_REQUEST_INTERVAL);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Geocode both addresses and return the distance between them
    ///
    /// The two lookups never overlap. Any lookup failure is returned as is.
    pub async fn calculate(
        &self,
        address1: Address,
        address2: Address,
    ) -> Result<Distance, GeocodingError> {
        let from = self.geocoder.geocode(&address1).await?;
        tokio::time::sleep(self.interval).await;
        let to = self.geocoder.geocode(&address2).await?;

        let distance = haversine_km(from, to);
        tracing::info!(
            address1 = address1.id,
            address2 = address2.id,
            distance_km = distance,
            "distance calculated"
        );

        Ok(Distance {
            address1,
            address2,
            distance,
        })
    }
}

impl std::fmt::Debug for DistanceCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistanceCalculator")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}
