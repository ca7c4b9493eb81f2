//! Enrollment Domain Ports
//!
//! This module defines the store port the enrollment domain persists through,
//! so the same service runs against PostgreSQL (infra_db) or memory.
//!
//! # Atomicity
//!
//! Every method is a single unit of work. `insert_payment` stores the payment
//! together with the owning student's recomputed dates, and `delete_student`
//! removes the student together with its payments; adapters must make each of
//! these all-or-nothing.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_enrollment::{EnrollmentService, EnrollmentStore};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn EnrollmentStore> = Arc::new(PostgresEnrollmentStore::new(pool));
//! let service = EnrollmentService::new(store, clock);
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DomainPort, HealthCheckable, PaymentId, PortError, StudentId};

use crate::payment::{NewPayment, Payment};
use crate::student::{NewStudent, Student};

/// Query parameters for listing students
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentQuery {
    /// Filter by state/region code
    pub state: Option<String>,
    /// Filter by city
    pub city: Option<String>,
    /// Limit results
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

impl StudentQuery {
    /// Creates a query to find by state
    pub fn by_state(state: impl Into<String>) -> Self {
        Self {
            state: Some(state.into()),
            ..Default::default()
        }
    }

    /// Adds pagination to the query
    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// Same filters, no pagination
    pub fn unpaginated(&self) -> Self {
        Self {
            limit: None,
            offset: None,
            ..self.clone()
        }
    }

    /// Returns true if the student passes the filters
    pub fn matches(&self, student: &Student) -> bool {
        let same = |filter: &Option<String>, value: &Option<String>| match filter {
            Some(wanted) => value.as_deref() == Some(wanted.as_str()),
            None => true,
        };
        same(&self.state, &student.profile.state) && same(&self.city, &student.profile.city)
    }
}

/// Persistence port for students and their payments
#[async_trait]
pub trait EnrollmentStore: DomainPort + HealthCheckable {
    /// Stores a new student and returns it with its assigned id
    async fn create_student(&self, student: NewStudent) -> Result<Student, PortError>;

    /// Loads a student, or `PortError::NotFound`
    async fn load_student(&self, id: StudentId) -> Result<Student, PortError>;

    /// Lists students ordered by id
    async fn list_students(&self, query: StudentQuery) -> Result<Vec<Student>, PortError>;

    /// Persists profile fields and lifecycle dates of an existing student
    async fn save_student(&self, student: &Student) -> Result<(), PortError>;

    /// Deletes a student and, with it, all its payments
    async fn delete_student(&self, student: &Student) -> Result<(), PortError>;

    /// Ids of students whose due date is before `today` and who are not disenrolled
    async fn students_past_due(&self, today: NaiveDate) -> Result<Vec<StudentId>, PortError>;

    /// Loads a payment, or `PortError::NotFound`
    async fn load_payment(&self, id: PaymentId) -> Result<Payment, PortError>;

    /// All payments of one student, in no particular order
    async fn load_payments_for(&self, student_id: StudentId) -> Result<Vec<Payment>, PortError>;

    /// All payments ordered by id
    async fn list_payments(&self) -> Result<Vec<Payment>, PortError>;

    /// Inserts a payment and saves the owning student in one unit of work
    async fn insert_payment(
        &self,
        student: &Student,
        payment: NewPayment,
    ) -> Result<Payment, PortError>;

    /// Persists date, amount and method of an existing payment
    async fn save_payment(&self, payment: &Payment) -> Result<(), PortError>;

    /// Deletes a single payment
    async fn delete_payment(&self, payment: &Payment) -> Result<(), PortError>;
}

/// In-memory implementation of EnrollmentStore
///
/// Keeps everything behind one lock, so each method is trivially atomic.
/// Used by tests and by the server when no database is configured.
pub mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use chrono::Utc;

    use core_kernel::{AdapterHealth, HealthCheckResult};

    #[derive(Debug, Default)]
    struct Tables {
        students: BTreeMap<StudentId, Student>,
        payments: BTreeMap<PaymentId, Payment>,
        next_student_id: i64,
        next_payment_id: i64,
    }

    /// In-memory store
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryEnrollmentStore {
        tables: Arc<RwLock<Tables>>,
    }

    impl InMemoryEnrollmentStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of stored payments, across all students
        pub async fn payment_count(&self) -> usize {
            self.tables.read().await.payments.len()
        }
    }

    impl DomainPort for InMemoryEnrollmentStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryEnrollmentStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "memory-enrollment-store".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("In-memory store always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl EnrollmentStore for InMemoryEnrollmentStore {
        async fn create_student(&self, student: NewStudent) -> Result<Student, PortError> {
            let mut tables = self.tables.write().await;
            tables.next_student_id += 1;
            let id = StudentId::new(tables.next_student_id);
            let student = Student::from_new(id, student);
            tables.students.insert(id, student.clone());
            Ok(student)
        }

        async fn load_student(&self, id: StudentId) -> Result<Student, PortError> {
            self.tables
                .read()
                .await
                .students
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Student", id))
        }

        async fn list_students(&self, query: StudentQuery) -> Result<Vec<Student>, PortError> {
            let tables = self.tables.read().await;
            let mut results: Vec<Student> = tables
                .students
                .values()
                .filter(|s| query.matches(s))
                .cloned()
                .collect();

            if let Some(offset) = query.offset {
                results = results.into_iter().skip(offset as usize).collect();
            }
            if let Some(limit) = query.limit {
                results.truncate(limit as usize);
            }
            Ok(results)
        }

        async fn save_student(&self, student: &Student) -> Result<(), PortError> {
            let mut tables = self.tables.write().await;
            let stored = tables
                .students
                .get_mut(&student.id)
                .ok_or_else(|| PortError::not_found("Student", student.id))?;
            *stored = student.clone();
            Ok(())
        }

        async fn delete_student(&self, student: &Student) -> Result<(), PortError> {
            let mut tables = self.tables.write().await;
            tables
                .students
                .remove(&student.id)
                .ok_or_else(|| PortError::not_found("Student", student.id))?;
            tables.payments.retain(|_, p| p.student_id != student.id);
            Ok(())
        }

        async fn students_past_due(&self, today: NaiveDate) -> Result<Vec<StudentId>, PortError> {
            Ok(self
                .tables
                .read()
                .await
                .students
                .values()
                .filter(|s| s.disenrolled_on.is_none() && s.due_on.is_some_and(|due| due < today))
                .map(|s| s.id)
                .collect())
        }

        async fn load_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
            self.tables
                .read()
                .await
                .payments
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Payment", id))
        }

        async fn load_payments_for(&self, student_id: StudentId) -> Result<Vec<Payment>, PortError> {
            Ok(self
                .tables
                .read()
                .await
                .payments
                .values()
                .filter(|p| p.student_id == student_id)
                .cloned()
                .collect())
        }

        async fn list_payments(&self) -> Result<Vec<Payment>, PortError> {
            Ok(self.tables.read().await.payments.values().cloned().collect())
        }

        async fn insert_payment(
            &self,
            student: &Student,
            payment: NewPayment,
        ) -> Result<Payment, PortError> {
            let mut tables = self.tables.write().await;
            if student.id != payment.student_id || !tables.students.contains_key(&student.id) {
                return Err(PortError::integrity(format!(
                    "payment references missing student {}",
                    payment.student_id
                )));
            }
            tables.next_payment_id += 1;
            let payment = Payment::from_new(PaymentId::new(tables.next_payment_id), payment);
            tables.payments.insert(payment.id, payment.clone());
            tables.students.insert(student.id, student.clone());
            Ok(payment)
        }

        async fn save_payment(&self, payment: &Payment) -> Result<(), PortError> {
            let mut tables = self.tables.write().await;
            let stored = tables
                .payments
                .get_mut(&payment.id)
                .ok_or_else(|| PortError::not_found("Payment", payment.id))?;
            // Ownership is fixed at insert time
            *stored = Payment {
                student_id: stored.student_id,
                ..payment.clone()
            };
            Ok(())
        }

        async fn delete_payment(&self, payment: &Payment) -> Result<(), PortError> {
            self.tables
                .write()
                .await
                .payments
                .remove(&payment.id)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Payment", payment.id))
        }
    }
}
