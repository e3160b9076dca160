//! Storage for questions and answers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers                                          │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository traits (repository/) - Abstract Interface   │
//! │  QuestionRepository, AnswerRepository, FullRepository   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────────────┐
//!     │                                      │
//! ┌───▼──────────────────┐   ┌───────────────▼──────────────┐
//! │  PostgresRepository  │   │  LocalRepository (in-memory) │
//! │  diesel + r2d2       │   │  tests / local development   │
//! └──────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! The cascade from a question to its answers is a schema constraint in
//! Postgres and a single locked section in the local backend.

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repositories;
pub mod repository;

#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    AnswerRepository, ErrorContext, FullRepository, QuestionRepository, RepositoryError,
    RepositoryResult,
};
