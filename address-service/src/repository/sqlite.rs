//! SQLite-backed address store

use sqlx::SqlitePool;

use super::error::{RepositoryError, RepositoryOperation};
use super::traits::{Repository, RepositoryResult};
use crate::error::DatabaseError;
use crate::models::{Address, AddressData};

const ENTITY: &str = "Address";

const SELECT_ALL: &str =
    "SELECT Id, Street, HouseNumber, Postcode, City, Country FROM Addresses ORDER BY Id";
const SELECT_ONE: &str =
    "SELECT Id, Street, HouseNumber, Postcode, City, Country FROM Addresses WHERE Id = ?";
const INSERT: &str = "INSERT INTO Addresses (Street, HouseNumber, Postcode, City, Country) \
     VALUES (?, ?, ?, ?, ?) \
     RETURNING Id, Street, HouseNumber, Postcode, City, Country";
const UPDATE: &str = "UPDATE Addresses \
     SET Street = ?, HouseNumber = ?, Postcode = ?, City = ?, Country = ? \
     WHERE Id = ? \
     RETURNING Id, Street, HouseNumber, Postcode, City, Country";
const DELETE: &str = "DELETE FROM Addresses WHERE Id = ? \
     RETURNING Id, Street, HouseNumber, Postcode, City, Country";

/// Address repository over a shared SQLite pool
///
/// Every operation is a single statement, so each is atomic on its own.
#[derive(Debug, Clone)]
pub struct SqliteAddressRepository {
    pool: SqlitePool,
}

impl SqliteAddressRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn failed(operation: RepositoryOperation) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |err| {
        let err = RepositoryError::database(operation, DatabaseError::from(err));
        tracing::error!(error = %err, "address store operation failed");
        err
    }
}

impl Repository<i64, Address, AddressData> for SqliteAddressRepository {
    async fn find_by_id(&self, id: &i64) -> RepositoryResult<Option<Address>> {
        sqlx::query_as::<_, Address>(SELECT_ONE)
            .bind(*id)
            .fetch_optional(&self.pool)
            .await
            .map_err(failed(RepositoryOperation::FindById))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Address>> {
        sqlx::query_as::<_, Address>(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(failed(RepositoryOperation::FindAll))
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Addresses")
            .fetch_one(&self.pool)
            .await
            .map_err(failed(RepositoryOperation::Count))?;
        Ok(count.max(0) as u64)
    }

    async fn exists(&self, id: &i64) -> RepositoryResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM Addresses WHERE Id = ?")
            .bind(*id)
            .fetch_optional(&self.pool)
            .await
            .map_err(failed(RepositoryOperation::Exists))?;
        Ok(found.is_some())
    }

    async fn create(&self, data: AddressData) -> RepositoryResult<Address> {
        let address = sqlx::query_as::<_, Address>(INSERT)
            .bind(data.street)
            .bind(data.house_number)
            .bind(data.postcode)
            .bind(data.city)
            .bind(data.country)
            .fetch_one(&self.pool)
            .await
            .map_err(failed(RepositoryOperation::Create))?;

        tracing::debug!(id = address.id, "address created");
        Ok(address)
    }

    async fn update(&self, id: &i64, data: AddressData) -> RepositoryResult<Address> {
        sqlx::query_as::<_, Address>(UPDATE)
            .bind(data.street)
            .bind(data.house_number)
            .bind(data.postcode)
            .bind(data.city)
            .bind(data.country)
            .bind(*id)
            .fetch_optional(&self.pool)
            .await
            .map_err(failed(RepositoryOperation::Update))?
            .ok_or_else(|| {
                RepositoryError::not_found(ENTITY, id.to_string())
                    .with_operation(RepositoryOperation::Update)
            })
    }

    async fn delete(&self, id: &i64) -> RepositoryResult<Option<Address>> {
        sqlx::query_as::<_, Address>(DELETE)
            .bind(*id)
            .fetch_optional(&self.pool)
            .await
            .map_err(failed(RepositoryOperation::Delete))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_pool, ensure_schema};
    use crate::config::DatabaseConfig;
    use crate::repository::{RepositoryErrorKind, SearchQuery};

    async fn repository() -> SqliteAddressRepository {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..Default::default()
        };
        let pool = create_pool(&config).await.unwrap();
        ensure_schema(&pool).await.unwrap();
        SqliteAddressRepository::new(pool)
    }

    fn main_st() -> AddressData {
        AddressData {
            street: "Main St".to_string(),
            house_number: "5".to_string(),
            postcode: "10001".to_string(),
            city: "NYC".to_string(),
            country: "US".to_string(),
        }
    }

    fn elm_rd() -> AddressData {
        AddressData {
            street: "Elm Rd".to_string(),
            house_number: "12".to_string(),
            postcode: "02108".to_string(),
            city: "Boston".to_string(),
            country: "US".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let repo = repository().await;
        let created = repo.create(main_st()).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created, main_st().into_address(created.id));

        let found = repo.find_by_id(&created.id).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_find_missing_is_none() {
        let repo = repository().await;
        assert_eq!(repo.find_by_id(&999).await.unwrap(), None);
        assert!(!repo.exists(&999).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_all_in_id_order() {
        let repo = repository().await;
        let first = repo.create(main_st()).await.unwrap();
        let second = repo.create(elm_rd()).await.unwrap();

        let all = repo.find_all().await.unwrap();
        assert_eq!(all, vec![first, second]);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_overwrites_fields() {
        let repo = repository().await;
        let created = repo.create(main_st()).await.unwrap();

        let updated = repo.update(&created.id, elm_rd()).await.unwrap();
        assert_eq!(updated, elm_rd().into_address(created.id));
        assert_eq!(repo.find_by_id(&created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = repository().await;
        let err = repo.update(&42, main_st()).await.unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::NotFound);
        assert_eq!(err.operation, RepositoryOperation::Update);
        assert_eq!(err.entity_id, Some("42".to_string()));
    }

    #[tokio::test]
    async fn test_delete_returns_snapshot() {
        let repo = repository().await;
        let created = repo.create(main_st()).await.unwrap();

        let deleted = repo.delete(&created.id).await.unwrap();
        assert_eq!(deleted, Some(created.clone()));
        assert_eq!(repo.find_by_id(&created.id).await.unwrap(), None);
        assert_eq!(repo.delete(&created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_search_against_store() {
        let repo = repository().await;
        let main = repo.create(main_st()).await.unwrap();
        let elm = repo.create(elm_rd()).await.unwrap();

        let found = repo.search(&SearchQuery::new("main", "Street", true)).await.unwrap();
        assert_eq!(found, vec![main.clone()]);

        let found = repo.search(&SearchQuery::new("us", "City", false)).await.unwrap();
        assert_eq!(found, vec![main, elm]);
    }
}
