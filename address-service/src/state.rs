//! Application state management

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::Config;
use crate::database;
use crate::distance::DistanceCalculator;
use crate::error::Result;
use crate::geocoding::{Geocoder, NominatimGeocoder};
use crate::repository::SqliteAddressRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    addresses: SqliteAddressRepository,
    distances: DistanceCalculator,
}

impl AppState {
    /// Create a new AppState builder
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Address store
    pub fn addresses(&self) -> &SqliteAddressRepository {
        &self.addresses
    }

    /// Distance workflow
    pub fn distances(&self) -> &DistanceCalculator {
        &self.distances
    }

    /// Database pool backing the address store
    pub fn db(&self) -> &SqlitePool {
        self.addresses.pool()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service", &self.config.service.name)
            .field("distances", &self.distances)
            .finish_non_exhaustive()
    }
}

/// Builder for AppState
///
/// Anything not provided explicitly is created from the configuration.
pub struct AppStateBuilder {
    config: Option<Config>,
    db_pool: Option<SqlitePool>,
    geocoder: Option<Arc<dyn Geocoder>>,
    enable_tracing: bool,
}

impl AppStateBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: None,
            db_pool: None,
            geocoder: None,
            enable_tracing: true,
        }
    }

    /// Set the configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an existing database pool instead of connecting from config
    pub fn db_pool(mut self, pool: SqlitePool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Use a specific geocoder instead of the configured Nominatim client
    pub fn geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Disable automatic tracing initialization
    ///
    /// Use this when tracing is already configured (as `main` does) or in tests.
    pub fn without_tracing(mut self) -> Self {
        self.enable_tracing = false;
        self
    }

    /// Initialize tracing with sensible defaults
    ///
    /// Safe to call multiple times; subsequent calls are no-ops.
    fn init_tracing() {
        use std::sync::Once;
        static INIT: Once = Once::new();

        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::INFO)
                .with_target(false)
                .try_init();
            tracing::debug!("Tracing initialized with default configuration");
        });
    }

    /// Build the AppState
    ///
    /// This will:
    /// - Use provided config or `Config::default()` if not set
    /// - Open the database pool (with retries) and create the schema
    /// - Build the Nominatim client from the geocoding section
    pub async fn build(self) -> Result<AppState> {
        if self.enable_tracing {
            Self::init_tracing();
        }

        let config = self.config.unwrap_or_default();

        let pool = match self.db_pool {
            Some(pool) => pool,
            None => database::create_pool(&config.database).await?,
        };
        database::ensure_schema(&pool).await?;

        let geocoder: Arc<dyn Geocoder> = match self.geocoder {
            Some(geocoder) => geocoder,
            None => Arc::new(NominatimGeocoder::new(&config.geocoding).map_err(|e| {
                crate::error::Error::Internal(format!("Failed to build geocoding client: {}", e))
            })?),
        };

        let distances =
            DistanceCalculator::new(geocoder).with_interval(config.geocoding.rate_limit_delay());

        Ok(AppState {
            config: Arc::new(config),
            addresses: SqliteAddressRepository::new(pool),
            distances,
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
