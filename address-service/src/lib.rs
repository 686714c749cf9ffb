//! # address-service
//!
//! HTTP API for storing postal addresses and measuring the great-circle
//! distance between two of them.
//!
//! - **Address store**: CRUD plus case-insensitive search and sorting, backed by SQLite
//! - **Distance**: both addresses are geocoded through Nominatim, then run through haversine
//! - **Middleware stack**: request tracking, panic recovery, body size limits, timeouts, CORS
//! - **Health checks**: liveness and readiness probes
//! - **Graceful shutdown**: proper signal handling (SIGTERM, SIGINT)
//!
//! ## Example
//!
//! ```rust,no_run
//! use address_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::builder()
//!         .config(config.clone())
//!         .without_tracing()
//!         .build()
//!         .await?;
//!
//!     Server::new(config).serve(router(state)).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod distance;
pub mod error;
pub mod geocoding;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repository;
pub mod responses;
pub mod routes;
pub mod server;
pub mod state;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::distance::{haversine_km, DistanceCalculator};
    pub use crate::error::{DatabaseError, DatabaseErrorKind, DatabaseOperation, Error, Result};
    pub use crate::geocoding::{Coordinate, Geocoder, GeocodingError, NominatimGeocoder};
    pub use crate::handlers::{ApiError, ApiErrorKind, ApiOperation};
    pub use crate::health::{health, readiness};
    pub use crate::models::{Address, AddressData, Distance};
    pub use crate::observability::init_tracing;
    pub use crate::repository::{
        Repository, RepositoryError, SearchQuery, Searchable, SqliteAddressRepository,
    };
    pub use crate::responses::{Created, FieldError, NoContent, ValidationError};
    pub use crate::routes::router;
    pub use crate::server::Server;
    pub use crate::state::{AppState, AppStateBuilder};

    pub use axum::Router;
}
