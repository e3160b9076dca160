//! Answer records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::question::QuestionId;
use crate::define_id_type;

define_id_type!(i64, AnswerId);

/// A stored answer. Always owned by exactly one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub question_id: QuestionId,
    /// Free-form author identifier
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
