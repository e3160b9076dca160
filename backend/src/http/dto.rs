//! Data Transfer Objects for the HTTP API.
//!
//! Request bodies default missing fields to empty strings so that an absent
//! field fails validation (400) rather than deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Answer, Question, QuestionWithAnswers};

/// Request body for `POST /questions/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateQuestionRequest {
    #[serde(default)]
    pub text: String,
}

/// Request body for `POST /questions/{id}/answers/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAnswerRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub text: String,
}

/// A question as returned by create and list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A question with its answers, returned by `GET /questions/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionWithAnswersResponse {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub answers: Vec<AnswerResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub id: i64,
    pub question_id: i64,
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl From<Question> for QuestionResponse {
    fn from(q: Question) -> Self {
        Self {
            id: q.id.value(),
            text: q.text,
            created_at: q.created_at,
        }
    }
}

impl From<Answer> for AnswerResponse {
    fn from(a: Answer) -> Self {
        Self {
            id: a.id.value(),
            question_id: a.question_id.value(),
            user_id: a.user_id,
            text: a.text,
            created_at: a.created_at,
        }
    }
}

impl From<QuestionWithAnswers> for QuestionWithAnswersResponse {
    fn from(qa: QuestionWithAnswers) -> Self {
        Self {
            id: qa.question.id.value(),
            text: qa.question.text,
            created_at: qa.question.created_at,
            answers: qa.answers.into_iter().map(Into::into).collect(),
        }
    }
}
