//! In-memory repository for unit testing and local development.
//!
//! All state sits behind one lock, so a question delete and its cascade over
//! the answers happen in a single critical section, the same guarantee the
//! Postgres `ON DELETE CASCADE` constraint gives.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::check_field;
use crate::db::repository::{
    AnswerRepository, ErrorContext, FullRepository, QuestionRepository, RepositoryError,
    RepositoryResult,
};
use crate::models::{Answer, AnswerId, Question, QuestionId, QuestionWithAnswers};

#[derive(Debug, Default)]
struct Store {
    questions: BTreeMap<QuestionId, Question>,
    answers: BTreeMap<AnswerId, Answer>,
    last_question_id: i64,
    last_answer_id: i64,
}

/// Thread-safe in-memory repository. Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct LocalRepository {
    store: Arc<RwLock<Store>>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored questions.
    pub fn question_count(&self) -> usize {
        self.store.read().questions.len()
    }

    /// Number of stored answers across all questions.
    pub fn answer_count(&self) -> usize {
        self.store.read().answers.len()
    }
}

fn question_not_found(operation: &str, id: QuestionId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        "Question not found",
        ErrorContext::new(operation)
            .with_entity("question")
            .with_entity_id(id),
    )
}

#[async_trait]
impl QuestionRepository for LocalRepository {
    async fn create_question(&self, text: &str) -> RepositoryResult<Question> {
        check_field("create_question", "question", "text", text)?;

        let mut store = self.store.write();
        store.last_question_id += 1;
        let question = Question {
            id: QuestionId(store.last_question_id),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        store.questions.insert(question.id, question.clone());
        Ok(question)
    }

    async fn get_question(&self, id: QuestionId) -> RepositoryResult<Question> {
        self.store
            .read()
            .questions
            .get(&id)
            .cloned()
            .ok_or_else(|| question_not_found("get_question", id))
    }

    async fn get_question_with_answers(
        &self,
        id: QuestionId,
    ) -> RepositoryResult<QuestionWithAnswers> {
        let store = self.store.read();
        let question = store
            .questions
            .get(&id)
            .cloned()
            .ok_or_else(|| question_not_found("get_question_with_answers", id))?;
        let answers = store
            .answers
            .values()
            .filter(|a| a.question_id == id)
            .cloned()
            .collect();
        Ok(QuestionWithAnswers::new(question, answers))
    }

    async fn list_questions(&self) -> RepositoryResult<Vec<Question>> {
        Ok(self.store.read().questions.values().cloned().collect())
    }

    async fn delete_question(&self, id: QuestionId) -> RepositoryResult<bool> {
        let mut store = self.store.write();
        if store.questions.remove(&id).is_none() {
            return Ok(false);
        }
        store.answers.retain(|_, a| a.question_id != id);
        Ok(true)
    }
}

#[async_trait]
impl AnswerRepository for LocalRepository {
    async fn create_answer(
        &self,
        question_id: QuestionId,
        user_id: &str,
        text: &str,
    ) -> RepositoryResult<Answer> {
        check_field("create_answer", "answer", "user_id", user_id)?;
        check_field("create_answer", "answer", "text", text)?;

        let mut store = self.store.write();
        if !store.questions.contains_key(&question_id) {
            return Err(question_not_found("create_answer", question_id));
        }
        store.last_answer_id += 1;
        let answer = Answer {
            id: AnswerId(store.last_answer_id),
            question_id,
            user_id: user_id.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        store.answers.insert(answer.id, answer.clone());
        Ok(answer)
    }

    async fn get_answer(&self, id: AnswerId) -> RepositoryResult<Answer> {
        self.store.read().answers.get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                "Answer not found",
                ErrorContext::new("get_answer")
                    .with_entity("answer")
                    .with_entity_id(id),
            )
        })
    }

    async fn delete_answer(&self, id: AnswerId) -> RepositoryResult<bool> {
        Ok(self.store.write().answers.remove(&id).is_some())
    }
}

#[async_trait]
impl FullRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_question_assigns_increasing_ids() {
        let repo = LocalRepository::new();
        let before = Utc::now();
        let q1 = repo.create_question("What is Rust?").await.unwrap();
        let q2 = repo.create_question("What is Go?").await.unwrap();

        assert!(q1.id.value() > 0);
        assert!(q2.id > q1.id);
        assert_eq!(q1.text, "What is Rust?");
        assert!(q1.created_at >= before);
    }

    #[tokio::test]
    async fn test_create_question_rejects_blank_text() {
        let repo = LocalRepository::new();
        let err = repo.create_question("   ").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(repo.question_count(), 0);
    }

    #[tokio::test]
    async fn test_text_is_stored_verbatim() {
        let repo = LocalRepository::new();
        let q = repo.create_question("  padded  ").await.unwrap();
        assert_eq!(repo.get_question(q.id).await.unwrap().text, "  padded  ");
    }

    #[tokio::test]
    async fn test_get_missing_question_is_not_found() {
        let repo = LocalRepository::new();
        let err = repo.get_question(QuestionId(42)).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.context().entity_id.as_deref(), Some("42"));

        let err = repo
            .get_question_with_answers(QuestionId(42))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_answer_requires_existing_question() {
        let repo = LocalRepository::new();
        let err = repo
            .create_answer(QuestionId(7), "user123", "answer")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(repo.answer_count(), 0);
    }

    #[tokio::test]
    async fn test_create_answer_rejects_blank_fields() {
        let repo = LocalRepository::new();
        let q = repo.create_question("Q").await.unwrap();

        assert!(repo
            .create_answer(q.id, " ", "text")
            .await
            .unwrap_err()
            .is_validation());
        assert!(repo
            .create_answer(q.id, "user", "\t")
            .await
            .unwrap_err()
            .is_validation());
        assert_eq!(repo.answer_count(), 0);
    }

    #[tokio::test]
    async fn test_question_with_answers_only_includes_its_own() {
        let repo = LocalRepository::new();
        let q1 = repo.create_question("Q1").await.unwrap();
        let q2 = repo.create_question("Q2").await.unwrap();
        let a1 = repo.create_answer(q1.id, "u1", "first").await.unwrap();
        repo.create_answer(q2.id, "u2", "other").await.unwrap();
        let a2 = repo.create_answer(q1.id, "u1", "second").await.unwrap();

        let loaded = repo.get_question_with_answers(q1.id).await.unwrap();
        assert_eq!(loaded.question, q1);
        let ids: Vec<AnswerId> = loaded.answers.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![a1.id, a2.id]);
        assert!(loaded.answers.iter().all(|a| a.question_id == q1.id));
    }

    #[tokio::test]
    async fn test_delete_question_cascades_to_answers() {
        let repo = LocalRepository::new();
        let q = repo.create_question("What is Docker?").await.unwrap();
        let keep = repo.create_question("Unrelated").await.unwrap();
        let a1 = repo.create_answer(q.id, "u", "one").await.unwrap();
        let a2 = repo.create_answer(q.id, "u", "two").await.unwrap();
        let other = repo.create_answer(keep.id, "u", "stays").await.unwrap();

        assert!(repo.delete_question(q.id).await.unwrap());

        assert!(repo.get_question(q.id).await.unwrap_err().is_not_found());
        assert!(repo.get_answer(a1.id).await.unwrap_err().is_not_found());
        assert!(repo.get_answer(a2.id).await.unwrap_err().is_not_found());
        assert_eq!(repo.get_answer(other.id).await.unwrap(), other);
    }

    #[tokio::test]
    async fn test_delete_missing_rows_reports_false() {
        let repo = LocalRepository::new();
        assert!(!repo.delete_question(QuestionId(1)).await.unwrap());
        assert!(!repo.delete_answer(AnswerId(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let repo = LocalRepository::new();
        let q1 = repo.create_question("Q1").await.unwrap();
        repo.delete_question(q1.id).await.unwrap();
        let q2 = repo.create_question("Q2").await.unwrap();
        assert_ne!(q1.id, q2.id);
    }

    #[tokio::test]
    async fn test_list_questions_in_id_order() {
        let repo = LocalRepository::new();
        let q1 = repo.create_question("Q1").await.unwrap();
        let q2 = repo.create_question("Q2").await.unwrap();
        let listed = repo.list_questions().await.unwrap();
        assert_eq!(listed, vec![q1, q2]);
    }
}
