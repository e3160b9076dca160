//! HTTP server module.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Router (router.rs)                                       │
//! │  - fixed (method, path) table, 404 / 405 fallbacks        │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Handlers (handlers.rs)                                   │
//! │  - id parsing, body decoding, validation                  │
//! │  - DTO shaping, error-to-status mapping (error.rs)        │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                   │
//! │  - LocalRepository / PostgresRepository                   │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::{create_router, with_timeouts};
pub use state::AppState;
