//! HTTP handlers for the address API
//!
//! Each handler maps one verb/path to the address store or the distance
//! workflow and translates the outcome to a status code. Failures travel as
//! [`ApiError`], which renders itself via `IntoResponse`.
//!
//! # Integration with Axum
//!
//! ```rust,ignore
//! use address_service::handlers::{get_address, list_addresses};
//!
//! let app = Router::new()
//!     .route("/addresses", get(list_addresses))
//!     .route("/addresses/{id}", get(get_address))
//!     .with_state(state);
//! ```

mod addresses;
mod error;

pub use addresses::{
    calculate_distance, create_address, delete_address, get_address, list_addresses,
    search_addresses, update_address,
};
pub use error::{ApiError, ApiErrorKind, ApiOperation};
