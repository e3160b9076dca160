//! Question records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::answer::Answer;
use crate::define_id_type;

define_id_type!(i64, QuestionId);

/// A stored question, without its answers.
///
/// `id` and `created_at` are assigned by storage on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A question together with every answer currently attached to it.
///
/// Only produced by the single-question fetch; listings never carry answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionWithAnswers {
    #[serde(flatten)]
    pub question: Question,
    pub answers: Vec<Answer>,
}

impl QuestionWithAnswers {
    pub fn new(question: Question, answers: Vec<Answer>) -> Self {
        Self { question, answers }
    }
}
