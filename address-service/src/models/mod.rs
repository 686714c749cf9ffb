//! Domain types exchanged over the API

mod address;
mod distance;

pub use address::{Address, AddressData};
pub use distance::Distance;
