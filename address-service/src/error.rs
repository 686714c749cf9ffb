//! Startup and storage error types
//!
//! [`Error`] is what `main` and the startup path (config loading, pool
//! creation, schema setup, tracing) return. Request handlers never see it;
//! they work with `RepositoryError` and `ApiError` instead.
//!
//! [`DatabaseError`] classifies a `sqlx::Error` once, so both the startup
//! path and the address store can report the same categories.

use std::fmt;
use thiserror::Error;

/// What the service was doing with SQLite when the error happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseOperation {
    /// Opening the database file or pool
    Connect,
    /// Waiting for a pooled connection
    Acquire,
    /// Creating the `Addresses` table
    Schema,
    /// Running a statement
    Query,
}

impl DatabaseOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Acquire => "acquire",
            Self::Schema => "schema",
            Self::Query => "query",
        }
    }
}

impl fmt::Display for DatabaseOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a SQLite failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseErrorKind {
    /// The database could not be opened or the connection dropped
    ConnectionFailed,
    /// No pooled connection became free in time
    PoolExhausted,
    /// A query expected a row that was not there
    NotFound,
    /// NOT NULL, UNIQUE, CHECK or foreign key violation
    ConstraintViolation,
    /// Statement rejected by SQLite
    QueryFailed,
    /// A column could not be decoded into the Rust type
    TypeConversion,
    /// Invalid connection URL or options
    Configuration,
    Other,
}

impl DatabaseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionFailed => "connection_failed",
            Self::PoolExhausted => "pool_exhausted",
            Self::NotFound => "not_found",
            Self::ConstraintViolation => "constraint_violation",
            Self::QueryFailed => "query_failed",
            Self::TypeConversion => "type_conversion",
            Self::Configuration => "configuration",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DatabaseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified SQLite failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseError {
    pub operation: DatabaseOperation,
    pub kind: DatabaseErrorKind,
    pub message: String,
    /// Sanitized URL or table name
    pub context: Option<String>,
}

impl DatabaseError {
    pub fn new(
        operation: DatabaseOperation,
        kind: DatabaseErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            context: None,
        }
    }

    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            DatabaseOperation::Connect,
            DatabaseErrorKind::ConnectionFailed,
            message,
        )
    }

    /// Whether opening the pool again may succeed
    ///
    /// A locked or missing file can change between attempts; a malformed
    /// URL cannot.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            DatabaseErrorKind::ConnectionFailed | DatabaseErrorKind::PoolExhausted
        )
    }

    #[must_use]
    pub fn with_operation(mut self, operation: DatabaseOperation) -> Self {
        self.operation = operation;
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Database {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        match &self.context {
            Some(context) => write!(f, " [{}]", context),
            None => Ok(()),
        }
    }
}

impl std::error::Error for DatabaseError {}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        use DatabaseErrorKind as K;
        use DatabaseOperation as Op;

        let (operation, kind) = match &err {
            sqlx::Error::RowNotFound => (Op::Query, K::NotFound),
            sqlx::Error::PoolTimedOut => (Op::Acquire, K::PoolExhausted),
            sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed | sqlx::Error::Io(_) => {
                (Op::Connect, K::ConnectionFailed)
            }
            sqlx::Error::Configuration(_) => (Op::Connect, K::Configuration),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                (Op::Query, K::TypeConversion)
            }
            sqlx::Error::ColumnNotFound(_) | sqlx::Error::Protocol(_) => (Op::Query, K::QueryFailed),
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation()
                    || db_err.is_foreign_key_violation()
                    || db_err.is_check_violation() =>
            {
                (Op::Query, K::ConstraintViolation)
            }
            sqlx::Error::Database(_) => (Op::Query, K::QueryFailed),
            _ => (Op::Query, K::Other),
        };

        Self::new(operation, kind, err.to_string())
    }
}

/// Mask credentials and drop query parameters before a URL is logged
pub fn sanitize_url(url: &str) -> String {
    let base = url.split('?').next().unwrap_or(url);
    match (base.find("://"), base.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}<redacted>@{}", &base[..scheme_end + 3], &base[at + 1..])
        }
        _ => base.to_string(),
    }
}

/// Result type alias for startup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned while starting or running the service
///
/// The figment error is boxed to keep the enum small.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Database(DatabaseError::from(err))
    }
}
