//! Question repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Question, QuestionId, QuestionWithAnswers};

/// Repository trait for question operations.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Insert a question and return the stored row.
    ///
    /// # Arguments
    /// * `text` - Question text; must not be blank
    ///
    /// # Returns
    /// * `Ok(Question)` - With storage-assigned `id` and `created_at`
    /// * `Err(RepositoryError::ValidationError)` - If `text` is blank
    async fn create_question(&self, text: &str) -> RepositoryResult<Question>;

    /// Fetch a question without its answers.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no question has this id
    async fn get_question(&self, id: QuestionId) -> RepositoryResult<Question>;

    /// Fetch a question together with all of its answers, ordered by answer id.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no question has this id
    async fn get_question_with_answers(
        &self,
        id: QuestionId,
    ) -> RepositoryResult<QuestionWithAnswers>;

    /// List every question, ordered by id. Answers are never loaded here.
    async fn list_questions(&self) -> RepositoryResult<Vec<Question>>;

    /// Delete a question and, through the cascade, all of its answers.
    ///
    /// # Returns
    /// * `Ok(true)` - A row was removed
    /// * `Ok(false)` - No question had this id
    async fn delete_question(&self, id: QuestionId) -> RepositoryResult<bool>;
}
