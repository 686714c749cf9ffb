//! Repository trait definitions
//!
//! Generic CRUD contract using RPITIT (Return Position Impl Trait In Traits),
//! so implementations write plain `async fn`s.
//!
//! # Example
//!
//! ```rust,ignore
//! use address_service::repository::{Repository, RepositoryResult};
//!
//! impl Repository<i64, Address, AddressData> for SqliteAddressRepository {
//!     async fn find_by_id(&self, id: &i64) -> RepositoryResult<Option<Address>> {
//!         sqlx::query_as("SELECT * FROM Addresses WHERE Id = ?")
//!             .bind(*id)
//!             .fetch_optional(&self.pool)
//!             .await
//!             .map_err(Into::into)
//!     }
//!     // ... other methods
//! }
//! ```

use std::future::Future;

use super::error::{RepositoryError, RepositoryOperation};
use super::fields::{SearchQuery, Searchable};

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// CRUD access to one entity type
///
/// `Data` is the payload accepted by `create` and `update`; it carries every
/// field except the store-assigned id.
pub trait Repository<Id, Entity, Data>: Send + Sync
where
    Id: Sync,
    Entity: Send,
    Data: Send,
{
    /// Point lookup; an absent entity is `Ok(None)`, not an error
    fn find_by_id(&self, id: &Id) -> impl Future<Output = RepositoryResult<Option<Entity>>> + Send;

    /// Every entity in storage order
    fn find_all(&self) -> impl Future<Output = RepositoryResult<Vec<Entity>>> + Send;

    fn count(&self) -> impl Future<Output = RepositoryResult<u64>> + Send;

    fn exists(&self, id: &Id) -> impl Future<Output = RepositoryResult<bool>> + Send;

    /// Persist a new entity and return it with its assigned id
    fn create(&self, data: Data) -> impl Future<Output = RepositoryResult<Entity>> + Send;

    /// Overwrite every field of the entity with `id`
    ///
    /// Returns a `NotFound` error with operation `Update` when nothing matches.
    fn update(&self, id: &Id, data: Data)
        -> impl Future<Output = RepositoryResult<Entity>> + Send;

    /// Remove the entity, returning the removed snapshot if there was one
    fn delete(&self, id: &Id) -> impl Future<Output = RepositoryResult<Option<Entity>>> + Send;

    /// Filter and order every entity according to `query`
    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = RepositoryResult<Vec<Entity>>> + Send
    where
        Entity: Searchable,
    {
        async move {
            let entities = self
                .find_all()
                .await
                .map_err(|e| e.with_operation(RepositoryOperation::Search))?;
            Ok(query.apply(entities))
        }
    }
}
