//! Domain records shared by the storage and HTTP layers.

pub mod answer;
pub mod macros;
pub mod question;

pub use answer::{Answer, AnswerId};
pub use question::{Question, QuestionId, QuestionWithAnswers};
