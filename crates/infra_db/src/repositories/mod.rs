//! Repository implementations for the enrollment tables
//!
//! Repositories encapsulate SQL and map between database rows and plain row
//! structs; translation to domain types happens in the adapters.
//!
//! Queries are checked at runtime (`query_as::<_, Row>`), so the workspace
//! builds without a live database.

pub mod student;
pub mod payment;

pub use student::{StudentRepository, StudentRow, NewStudentRow, StudentFilterRow};
pub use payment::{PaymentRepository, PaymentRow, NewPaymentRow};
