//! Route table for the address API

use axum::{routing::get, Router};

use crate::handlers::{
    calculate_distance, create_address, delete_address, get_address, list_addresses,
    search_addresses, update_address,
};
use crate::health::{health, readiness};
use crate::state::AppState;

/// Build the application router
///
/// `/addresses/calculateDistance/...` is a static segment and wins over the
/// `{id}` parameter at the same position, so a search for the literal value
/// `calculateDistance` is not reachable.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/addresses", get(list_addresses).post(create_address))
        .route(
            "/addresses/{id}",
            get(get_address).put(update_address).delete(delete_address),
        )
        // The search value shares the `{id}` name; parameters at one
        // position must be named alike.
        .route("/addresses/{id}/{sort_by}/{ascending}", get(search_addresses))
        .route(
            "/addresses/calculateDistance/{id1}/{id2}",
            get(calculate_distance),
        )
        .route("/health", get(health))
        .route("/ready", get(readiness))
        .with_state(state)
}
