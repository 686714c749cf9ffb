//! Repository error types
//!
//! Structured errors for repository operations, recording which operation
//! failed, why, and which entity was involved.
//!
//! # Example
//!
//! ```rust
//! use address_service::repository::{RepositoryError, RepositoryErrorKind};
//!
//! let error = RepositoryError::not_found("Address", "42");
//! assert!(matches!(error.kind, RepositoryErrorKind::NotFound));
//! assert!(error.entity_id.is_some());
//! ```

use std::fmt;

use crate::error::{DatabaseError, DatabaseErrorKind};

/// Operation being performed when the repository error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Finding a single entity by ID
    FindById,
    /// Listing every entity
    FindAll,
    /// Filtering and ordering entities
    Search,
    /// Counting entities
    Count,
    /// Checking if an entity exists
    Exists,
    /// Creating a new entity
    Create,
    /// Updating an existing entity
    Update,
    /// Deleting an entity
    Delete,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindById => write!(f, "find_by_id"),
            Self::FindAll => write!(f, "find_all"),
            Self::Search => write!(f, "search"),
            Self::Count => write!(f, "count"),
            Self::Exists => write!(f, "exists"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Entity was not found
    NotFound,
    /// Database constraint violation
    ConstraintViolation,
    /// The database could not be reached
    ConnectionFailed,
    /// Any other database failure
    DatabaseError,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::DatabaseError => write!(f, "database_error"),
        }
    }
}

/// Structured repository error with operation context
///
/// # Example
///
/// ```rust
/// use address_service::repository::{RepositoryError, RepositoryOperation};
///
/// let error = RepositoryError::not_found("Address", "7")
///     .with_operation(RepositoryOperation::Update);
/// assert_eq!(
///     error.to_string(),
///     "Repository not_found error during update: Entity not found [Address: 7]"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of entity involved (e.g., "Address")
    pub entity_type: Option<String>,
    /// The ID of the entity involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create a "not found" error with entity context
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            operation: RepositoryOperation::FindById,
            kind: RepositoryErrorKind::NotFound,
            message: "Entity not found".to_string(),
            entity_type: Some(entity_type.into()),
            entity_id: Some(entity_id.into()),
        }
    }

    /// Wrap a classified database failure raised during `operation`
    pub fn database(operation: RepositoryOperation, err: DatabaseError) -> Self {
        let kind = match err.kind {
            DatabaseErrorKind::NotFound => RepositoryErrorKind::NotFound,
            DatabaseErrorKind::ConstraintViolation => RepositoryErrorKind::ConstraintViolation,
            DatabaseErrorKind::ConnectionFailed | DatabaseErrorKind::PoolExhausted => {
                RepositoryErrorKind::ConnectionFailed
            }
            _ => RepositoryErrorKind::DatabaseError,
        };
        Self::new(operation, kind, err.message)
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(ref entity_type), Some(ref entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}
