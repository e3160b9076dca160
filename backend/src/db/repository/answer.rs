//! Answer repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Answer, AnswerId, QuestionId};

/// Repository trait for answer operations.
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Insert an answer under an existing question.
    ///
    /// # Returns
    /// * `Ok(Answer)` - With storage-assigned `id` and `created_at`
    /// * `Err(RepositoryError::NotFound)` - If the question does not exist at insert time
    /// * `Err(RepositoryError::ValidationError)` - If `user_id` or `text` is blank
    async fn create_answer(
        &self,
        question_id: QuestionId,
        user_id: &str,
        text: &str,
    ) -> RepositoryResult<Answer>;

    /// Fetch a single answer.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no answer has this id
    async fn get_answer(&self, id: AnswerId) -> RepositoryResult<Answer>;

    /// Delete a single answer. `Ok(false)` when nothing matched.
    async fn delete_answer(&self, id: AnswerId) -> RepositoryResult<bool>;
}
