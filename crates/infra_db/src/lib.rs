//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL persistence for the enrollment system
//! using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: repositories own the SQL and
//! row types, and adapters implement the domain's `EnrollmentStore` port on
//! top of them.
//!
//! # Schema
//!
//! Migrations live in `migrations/` and are embedded into the binary; call
//! [`run_migrations`] once at startup.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresEnrollmentStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/enrollment")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresEnrollmentStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use adapters::PostgresEnrollmentStore;
