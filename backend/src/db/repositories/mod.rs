//! Repository implementations module.
//!
//! - `postgres`: PostgreSQL implementation with Diesel ORM
//! - `local`: In-memory implementation for unit testing and local development
pub mod local;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use postgres::{PostgresConfig, PostgresRepository};

use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::validation::require_non_blank;

/// Blank-field guard applied by every backend before touching storage.
pub(crate) fn check_field(
    operation: &str,
    entity: &str,
    field: &'static str,
    value: &str,
) -> RepositoryResult<()> {
    require_non_blank(field, value).map_err(|e| {
        RepositoryError::validation_with_context(
            e.to_string(),
            ErrorContext::new(operation).with_entity(entity),
        )
    })
}
