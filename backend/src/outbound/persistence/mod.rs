//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. No business logic resides here.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) are implementation details, never exposed to the domain.
//! - **Constraint-driven guards**: duplicate votes, scraps, and follows are
//!   decided by UNIQUE constraints with `ON CONFLICT DO NOTHING`, not by
//!   check-then-insert sequences.
//! - **Strongly typed errors**: all database failures map to the port error
//!   of the repository that raised them.

pub(crate) mod diesel_helpers;
mod diesel_follow_repository;
mod diesel_news_repository;
mod diesel_poll_repository;
mod diesel_scrap_repository;
mod diesel_token_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_follow_repository::DieselFollowRepository;
pub use diesel_news_repository::DieselNewsRepository;
pub use diesel_poll_repository::DieselPollRepository;
pub use diesel_scrap_repository::DieselScrapRepository;
pub use diesel_token_repository::DieselTokenRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
