//! Nominatim (OpenStreetMap) search API client

use async_trait::async_trait;
use serde::Deserialize;

use super::{Coordinate, Geocoder, GeocodingError};
use crate::config::GeocodingConfig;
use crate::models::Address;

/// One entry of a `/search?format=json` response
#[derive(Debug, Deserialize)]
struct Place {
    lat: Option<String>,
    lon: Option<String>,
}

/// Geocoder backed by a Nominatim-compatible `/search` endpoint
///
/// Holds one `reqwest::Client` for the life of the service; it is cheap to
/// clone and internally pooled.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    search_url: String,
}

impl NominatimGeocoder {
    /// Build a client with the configured User-Agent and timeout
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodingError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()?;

        Ok(Self::with_client(client, &config.base_url))
    }

    /// Use an existing client against `base_url`
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            search_url: format!("{}/search", base_url.trim_end_matches('/')),
        }
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &Address) -> Result<Coordinate, GeocodingError> {
        let query = address.query_text();
        tracing::debug!(address_id = address.id, query = %query, "geocoding address");

        let body = self
            .client
            .get(&self.search_url)
            .query(&[("format", "json"), ("q", query.as_str())])
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let places: Vec<Place> = serde_json::from_slice(&body)
            .map_err(|e| GeocodingError::InvalidResponse(format!("malformed JSON: {}", e)))?;

        let place = places.into_iter().next().ok_or(GeocodingError::NoResult)?;
        let coordinate = Coordinate {
            latitude: parse_degrees("lat", place.lat.as_deref(), 90.0)?,
            longitude: parse_degrees("lon", place.lon.as_deref(), 180.0)?,
        };

        tracing::debug!(
            address_id = address.id,
            latitude = coordinate.latitude,
            longitude = coordinate.longitude,
            "address geocoded"
        );
        Ok(coordinate)
    }
}

/// Parse a decimal-degree string (always `.` as separator)
fn parse_degrees(name: &str, raw: Option<&str>, limit: f64) -> Result<f64, GeocodingError> {
    let raw = raw.ok_or_else(|| GeocodingError::InvalidResponse(format!("missing {}", name)))?;
    let value: f64 = raw.trim().parse().map_err(|_| {
        GeocodingError::InvalidResponse(format!("{} is not a number: {:?}", name, raw))
    })?;

    if !value.is_finite() || value.abs() > limit {
        return Err(GeocodingError::InvalidResponse(format!(
            "{} out of range: {}",
            name, value
        )));
    }
    Ok(value)
}
