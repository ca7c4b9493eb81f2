//! Enrollment Domain
//!
//! This crate implements student enrollment and payment tracking, following
//! the same Hexagonal Architecture as the rest of the workspace.
//!
//! # Architecture
//!
//! - **Entities**: Student and Payment
//! - **Rules Engine**: pure lifecycle functions in [`lifecycle`]
//! - **Ports**: [`EnrollmentStore`], with an in-memory adapter here and a
//!   PostgreSQL adapter in `infra_db`
//! - **Application Service**: [`EnrollmentService`] runs load, rules and
//!   persistence as one unit per operation
//!
//! # Student Lifecycle
//!
//! ```text
//! Unenrolled -> Active -> Lapsed -> Active      (payment within the lookback)
//!                     \         \-> Disenrolled (no qualifying payment)
//!                      \-> Disenrolled          (manual)
//! Disenrolled -> Active                         (enroll / record_payment)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_enrollment::{EnrollmentService, InMemoryEnrollmentStore, NewStudent, StudentProfile};
//!
//! let service = EnrollmentService::new(Arc::new(InMemoryEnrollmentStore::new()), clock);
//! let student = service
//!     .create_student(NewStudent::new(StudentProfile::new("Ana").with_city("Fortaleza")))
//!     .await?;
//! service.enroll(student.id).await?;
//! ```

pub mod error;
pub mod student;
pub mod payment;
pub mod lifecycle;
pub mod ports;
pub mod services;

pub use error::{EnrollmentError, ValidationError};
pub use student::{LifecycleState, NewStudent, Student, StudentPatch, StudentProfile};
pub use payment::{NewPayment, Payment, PaymentDraft, PaymentMethod, PaymentPatch};
pub use lifecycle::{DelinquencyOutcome, ENROLLMENT_WINDOW_DAYS};
pub use ports::{EnrollmentStore, StudentQuery};
pub use ports::memory::InMemoryEnrollmentStore;
pub use services::{EnrollmentService, ServiceResult, StudentFilter, StudentView, SweepReport};
