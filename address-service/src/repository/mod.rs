//! Address store
//!
//! A generic [`Repository`] contract, a table-driven search/sort layer
//! ([`Searchable`], [`SearchQuery`]) and the SQLite implementation backing
//! the API.
//!
//! # Example
//!
//! ```rust,ignore
//! use address_service::repository::{Repository, SearchQuery, SqliteAddressRepository};
//!
//! let repo = SqliteAddressRepository::new(pool);
//! let created = repo.create(data).await?;
//! let hits = repo.search(&SearchQuery::new("main", "City", true)).await?;
//! ```

mod error;
mod fields;
mod sqlite;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use fields::{SearchField, SearchQuery, Searchable, SortField, SortKey};
pub use sqlite::SqliteAddressRepository;
pub use traits::{Repository, RepositoryResult};
