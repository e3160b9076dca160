//! Postgres backend tests. Need a live database:
//!
//! ```bash
//! DATABASE_URL=postgres://qa:qa@localhost/qa_test \
//!   cargo test --features postgres-repo -- --ignored
//! ```

#![cfg(feature = "postgres-repo")]

use qa_service::db::{
    AnswerRepository, FullRepository, PostgresConfig, PostgresRepository, QuestionRepository,
};
use qa_service::models::{AnswerId, QuestionId};

fn repository() -> PostgresRepository {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PostgresRepository::new(PostgresConfig {
        max_open_conns: 4,
        max_idle_conns: 1,
        ..PostgresConfig::with_url(url)
    })
    .expect("connect to test database")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let repo = repository();
    assert!(repo.health_check().await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_question_roundtrip_with_answers() {
    let repo = repository();
    let question = repo.create_question("What is Go?").await.unwrap();
    assert!(question.id.value() > 0);

    let first = repo
        .create_answer(question.id, "user123", "A language")
        .await
        .unwrap();
    let second = repo
        .create_answer(question.id, "user123", "Made at Google")
        .await
        .unwrap();

    let loaded = repo.get_question_with_answers(question.id).await.unwrap();
    assert_eq!(loaded.question.text, "What is Go?");
    let ids: Vec<AnswerId> = loaded.answers.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);

    let listed = repo.list_questions().await.unwrap();
    assert!(listed.iter().any(|q| q.id == question.id));

    assert!(repo.delete_question(question.id).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_delete_question_cascades() {
    let repo = repository();
    let question = repo.create_question("What is Docker?").await.unwrap();
    let answer = repo
        .create_answer(question.id, "user456", "Containers")
        .await
        .unwrap();

    assert!(repo.delete_question(question.id).await.unwrap());
    assert!(!repo.delete_question(question.id).await.unwrap());

    assert!(repo.get_question(question.id).await.unwrap_err().is_not_found());
    assert!(repo.get_answer(answer.id).await.unwrap_err().is_not_found());
    assert!(!repo.delete_answer(answer.id).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_answer_for_missing_question_is_not_found() {
    let repo = repository();
    let err = repo
        .create_answer(QuestionId::new(i64::MAX), "user123", "Orphan")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore]
async fn test_blank_text_rejected() {
    let repo = repository();
    assert!(repo.create_question("   ").await.unwrap_err().is_validation());
}

#[tokio::test]
#[ignore]
async fn test_delete_answer_keeps_question() {
    let repo = repository();
    let question = repo.create_question("Keep me").await.unwrap();
    let answer = repo
        .create_answer(question.id, "user1", "Temporary")
        .await
        .unwrap();

    assert!(repo.delete_answer(answer.id).await.unwrap());
    let loaded = repo.get_question_with_answers(question.id).await.unwrap();
    assert!(loaded.answers.is_empty());

    repo.delete_question(question.id).await.unwrap();
}
