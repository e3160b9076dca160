//! # Q&A Service
//!
//! A small question-and-answer record service: clients create questions,
//! attach answers to them, fetch or delete either, and list all questions.
//!
//! ## Architecture
//!
//! - [`http`]: axum router, handlers, DTOs and error-to-status mapping
//! - [`db`]: repository traits plus the Postgres and in-memory backends
//! - [`models`]: `Question` / `Answer` records and their id types
//! - [`validation`]: blank-field rules shared by handlers and repositories
//! - [`config`] and [`logging`]: process configuration and tracing setup
//!
//! Deleting a question removes its answers through a storage-level cascade.

pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod validation;

#[cfg(feature = "http-server")]
pub mod http;
