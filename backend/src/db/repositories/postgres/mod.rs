//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2 (bounded size, idle floor, max lifetime)
//! - Liveness check and automatic migration execution on startup
//! - Cascade delete of answers enforced by the schema, not by this code
//!
//! Every repository call is a single statement, except the question-with-answers
//! read, which runs its two selects in one read-only transaction.

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;
use tracing::debug;

use super::check_field;
use crate::db::repository::{
    AnswerRepository, ErrorContext, FullRepository, QuestionRepository, RepositoryError,
    RepositoryResult,
};
use crate::models::{Answer, AnswerId, Question, QuestionId, QuestionWithAnswers};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Clone)]
pub struct PostgresConfig {
    /// Connection string, URL or libpq keyword form (contains the password)
    pub database_url: String,
    /// Maximum number of open connections in the pool
    pub max_open_conns: u32,
    /// Number of idle connections the pool keeps ready
    pub max_idle_conns: u32,
    /// Maximum lifetime of a connection in seconds (0 disables recycling)
    pub conn_max_lifetime_sec: u64,
    /// How long a caller waits for a pooled connection, in seconds
    pub connection_timeout_sec: u64,
}

impl std::fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("database_url", &"<redacted>")
            .field("max_open_conns", &self.max_open_conns)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("conn_max_lifetime_sec", &self.conn_max_lifetime_sec)
            .field("connection_timeout_sec", &self.connection_timeout_sec)
            .finish()
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_open_conns: 25,
            max_idle_conns: 5,
            conn_max_lifetime_sec: 300,
            connection_timeout_sec: 5,
        }
    }
}

impl PostgresConfig {
    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }

    /// r2d2 panics on zero sizes and timeouts, so reject them up front.
    fn validate(&self) -> RepositoryResult<()> {
        let context = ErrorContext::new("create_pool");
        if self.database_url.trim().is_empty() {
            return Err(RepositoryError::ConfigurationError {
                message: "database_url must be set".to_string(),
                context,
            });
        }
        if self.max_open_conns == 0 {
            return Err(RepositoryError::ConfigurationError {
                message: "max_open_conns must be at least 1".to_string(),
                context,
            });
        }
        if self.connection_timeout_sec == 0 {
            return Err(RepositoryError::ConfigurationError {
                message: "connection_timeout_sec must be at least 1".to_string(),
                context,
            });
        }
        Ok(())
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Build the pool, verify the database answers, and run pending migrations.
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if configuration, connection or migration fails
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        config.validate()?;

        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
        let max_lifetime = match config.conn_max_lifetime_sec {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let pool = Pool::builder()
            .max_size(config.max_open_conns)
            .min_idle(Some(config.max_idle_conns.min(config.max_open_conns)))
            .max_lifetime(max_lifetime)
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_open_conns)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("startup_ping"),
                )
            })?;
            sql_query("SELECT 1").execute(&mut conn).map_err(|e| {
                RepositoryError::from(e).with_context(ErrorContext::new("startup_ping"))
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool })
    }

    /// Run pending database migrations.
    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Run a blocking diesel operation on a pooled connection.
    ///
    /// Waiting for a connection is bounded by the pool's connection timeout;
    /// failures are surfaced immediately without retry.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error, context: ErrorContext) -> RepositoryError {
    RepositoryError::from(err).with_context(context)
}

fn question_not_found(context: ErrorContext) -> RepositoryError {
    RepositoryError::not_found_with_context("Question not found", context)
}

#[async_trait]
impl QuestionRepository for PostgresRepository {
    async fn create_question(&self, text: &str) -> RepositoryResult<Question> {
        check_field("create_question", "question", "text", text)?;
        let text = text.to_string();

        self.with_conn(move |conn| {
            diesel::insert_into(questions::table)
                .values(NewQuestionRow { text: &text })
                .returning(QuestionRow::as_returning())
                .get_result::<QuestionRow>(conn)
                .map(Question::from)
                .map_err(|e| {
                    map_diesel_error(
                        e,
                        ErrorContext::new("create_question").with_entity("question"),
                    )
                })
        })
        .await
    }

    async fn get_question(&self, id: QuestionId) -> RepositoryResult<Question> {
        self.with_conn(move |conn| {
            let context = ErrorContext::new("get_question")
                .with_entity("question")
                .with_entity_id(id);

            questions::table
                .find(id.value())
                .select(QuestionRow::as_select())
                .first::<QuestionRow>(conn)
                .optional()
                .map_err(|e| map_diesel_error(e, context.clone()))?
                .map(Question::from)
                .ok_or_else(|| question_not_found(context))
        })
        .await
    }

    async fn get_question_with_answers(
        &self,
        id: QuestionId,
    ) -> RepositoryResult<QuestionWithAnswers> {
        self.with_conn(move |conn| {
            let context = ErrorContext::new("get_question_with_answers")
                .with_entity("question")
                .with_entity_id(id);

            conn.build_transaction()
                .read_only()
                .repeatable_read()
                .run(|tx| -> RepositoryResult<QuestionWithAnswers> {
                    let row = questions::table
                        .find(id.value())
                        .select(QuestionRow::as_select())
                        .first::<QuestionRow>(tx)
                        .optional()?
                        .ok_or_else(|| question_not_found(context.clone()))?;

                    let answer_rows = AnswerRow::belonging_to(&row)
                        .select(AnswerRow::as_select())
                        .order(answers::id.asc())
                        .load::<AnswerRow>(tx)?;

                    Ok(QuestionWithAnswers::new(
                        Question::from(row),
                        answer_rows.into_iter().map(Answer::from).collect(),
                    ))
                })
                .map_err(|e| {
                    if e.is_not_found() {
                        e
                    } else {
                        e.with_context(context)
                    }
                })
        })
        .await
    }

    async fn list_questions(&self) -> RepositoryResult<Vec<Question>> {
        self.with_conn(|conn| {
            let rows = questions::table
                .select(QuestionRow::as_select())
                .order(questions::id.asc())
                .load::<QuestionRow>(conn)
                .map_err(|e| {
                    map_diesel_error(
                        e,
                        ErrorContext::new("list_questions").with_entity("question"),
                    )
                })?;

            Ok(rows.into_iter().map(Question::from).collect())
        })
        .await
    }

    async fn delete_question(&self, id: QuestionId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            // answers go with it through ON DELETE CASCADE
            let deleted = diesel::delete(questions::table.find(id.value()))
                .execute(conn)
                .map_err(|e| {
                    map_diesel_error(
                        e,
                        ErrorContext::new("delete_question")
                            .with_entity("question")
                            .with_entity_id(id),
                    )
                })?;
            debug!(question_id = %id, deleted, "delete_question executed");
            Ok(deleted > 0)
        })
        .await
    }
}

#[async_trait]
impl AnswerRepository for PostgresRepository {
    async fn create_answer(
        &self,
        question_id: QuestionId,
        user_id: &str,
        text: &str,
    ) -> RepositoryResult<Answer> {
        check_field("create_answer", "answer", "user_id", user_id)?;
        check_field("create_answer", "answer", "text", text)?;
        let user_id = user_id.to_string();
        let text = text.to_string();

        self.with_conn(move |conn| {
            let context = ErrorContext::new("create_answer")
                .with_entity("question")
                .with_entity_id(question_id);

            diesel::insert_into(answers::table)
                .values(NewAnswerRow {
                    question_id: question_id.value(),
                    user_id: &user_id,
                    text: &text,
                })
                .returning(AnswerRow::as_returning())
                .get_result::<AnswerRow>(conn)
                .map(Answer::from)
                .map_err(|e| match map_diesel_error(e, context.clone()) {
                    // foreign key violation: the question is gone
                    err if err.is_not_found() => question_not_found(context),
                    err => err,
                })
        })
        .await
    }

    async fn get_answer(&self, id: AnswerId) -> RepositoryResult<Answer> {
        self.with_conn(move |conn| {
            let context = ErrorContext::new("get_answer")
                .with_entity("answer")
                .with_entity_id(id);

            answers::table
                .find(id.value())
                .select(AnswerRow::as_select())
                .first::<AnswerRow>(conn)
                .optional()
                .map_err(|e| map_diesel_error(e, context.clone()))?
                .map(Answer::from)
                .ok_or_else(|| RepositoryError::not_found_with_context("Answer not found", context))
        })
        .await
    }

    async fn delete_answer(&self, id: AnswerId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(answers::table.find(id.value()))
                .execute(conn)
                .map_err(|e| {
                    map_diesel_error(
                        e,
                        ErrorContext::new("delete_answer")
                            .with_entity("answer")
                            .with_entity_id(id),
                    )
                })?;
            Ok(deleted > 0)
        })
        .await
    }
}

#[async_trait]
impl FullRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(|e| map_diesel_error(e, ErrorContext::new("health_check")))
        })
        .await
    }
}
