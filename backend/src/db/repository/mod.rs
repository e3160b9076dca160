//! Repository traits and error types.
//!
//! Handlers depend on these traits only, so the Postgres and in-memory
//! backends are interchangeable.

mod answer;
mod error;
mod question;

use async_trait::async_trait;

pub use answer::AnswerRepository;
pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use question::QuestionRepository;

/// Both entity contracts plus a storage liveness probe.
#[async_trait]
pub trait FullRepository: QuestionRepository + AnswerRepository {
    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
