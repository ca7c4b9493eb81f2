//! Port adapters
//!
//! `PostgresEnrollmentStore` implements `domain_enrollment::EnrollmentStore`,
//! mapping domain values to repository rows and database failures to
//! `PortError`.

pub mod enrollment;

pub use enrollment::PostgresEnrollmentStore;
