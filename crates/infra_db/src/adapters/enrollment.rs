//! PostgreSQL Enrollment Adapter
//!
//! This module provides the database adapter for the enrollment domain,
//! implementing the `EnrollmentStore` port on top of the student and payment
//! repositories.
//!
//! # Overview
//!
//! The `PostgresEnrollmentStore`:
//!
//! - Translates port calls into repository operations
//! - Converts database rows back to domain models, re-validating payments
//! - Translates `DatabaseError` into `PortError`
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresEnrollmentStore;
//! use domain_enrollment::EnrollmentStore;
//! use std::sync::Arc;
//!
//! let store: Arc<dyn EnrollmentStore> = Arc::new(PostgresEnrollmentStore::new(pool));
//! let student = store.load_student(student_id).await?;
//! ```

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PaymentId, PortError,
    StudentId,
};
use domain_enrollment::{
    EnrollmentStore, NewPayment, NewStudent, Payment, PaymentMethod, Student, StudentProfile,
    StudentQuery,
};

use crate::error::DatabaseError;
use crate::repositories::{
    NewPaymentRow, NewStudentRow, PaymentRepository, PaymentRow, StudentFilterRow,
    StudentRepository, StudentRow,
};

const ADAPTER_ID: &str = "postgres-enrollment-store";

/// PostgreSQL-backed implementation of the EnrollmentStore port
///
/// # Health Checking
///
/// Health checks run `SELECT 1` to verify the connection pool is operational
/// and the database is responsive.
#[derive(Debug, Clone)]
pub struct PostgresEnrollmentStore {
    students: StudentRepository,
    payments: PaymentRepository,
    pool: PgPool,
}

impl PostgresEnrollmentStore {
    /// Creates a new adapter over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            students: StudentRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DomainPort for PostgresEnrollmentStore {}

#[async_trait]
impl HealthCheckable for PostgresEnrollmentStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl EnrollmentStore for PostgresEnrollmentStore {
    #[instrument(skip(self, student), fields(name = %student.profile.name))]
    async fn create_student(&self, student: NewStudent) -> Result<Student, PortError> {
        let row = self.students.insert(new_student_row(student)).await?;
        debug!(student_id = row.id, "Student row inserted");
        Ok(row_to_student(row))
    }

    #[instrument(skip(self), fields(student_id = %id))]
    async fn load_student(&self, id: StudentId) -> Result<Student, PortError> {
        let row = self
            .students
            .get_by_id(id.value())
            .await
            .map_err(|e| not_found_as(e, "Student", id))?;
        Ok(row_to_student(row))
    }

    #[instrument(skip(self))]
    async fn list_students(&self, query: StudentQuery) -> Result<Vec<Student>, PortError> {
        let filter = StudentFilterRow {
            state: query.state,
            city: query.city,
            limit: query.limit.map(i64::from),
            offset: query.offset.map(i64::from),
        };
        let rows = self.students.list(filter).await?;
        Ok(rows.into_iter().map(row_to_student).collect())
    }

    #[instrument(skip(self, student), fields(student_id = %student.id))]
    async fn save_student(&self, student: &Student) -> Result<(), PortError> {
        self.students
            .update(&student_to_row(student))
            .await
            .map_err(|e| not_found_as(e, "Student", student.id))
    }

    #[instrument(skip(self, student), fields(student_id = %student.id))]
    async fn delete_student(&self, student: &Student) -> Result<(), PortError> {
        self.students
            .delete(student.id.value())
            .await
            .map_err(|e| not_found_as(e, "Student", student.id))
    }

    #[instrument(skip(self))]
    async fn students_past_due(&self, today: NaiveDate) -> Result<Vec<StudentId>, PortError> {
        let ids = self.students.past_due_ids(today).await?;
        Ok(ids.into_iter().map(StudentId::new).collect())
    }

    #[instrument(skip(self), fields(payment_id = %id))]
    async fn load_payment(&self, id: PaymentId) -> Result<Payment, PortError> {
        let row = self
            .payments
            .get_by_id(id.value())
            .await
            .map_err(|e| not_found_as(e, "Payment", id))?;
        row_to_payment(row)
    }

    #[instrument(skip(self), fields(student_id = %student_id))]
    async fn load_payments_for(&self, student_id: StudentId) -> Result<Vec<Payment>, PortError> {
        self.payments
            .list_for_student(student_id.value())
            .await?
            .into_iter()
            .map(row_to_payment)
            .collect()
    }

    #[instrument(skip(self))]
    async fn list_payments(&self) -> Result<Vec<Payment>, PortError> {
        self.payments
            .list_all()
            .await?
            .into_iter()
            .map(row_to_payment)
            .collect()
    }

    #[instrument(skip(self, student, payment), fields(student_id = %student.id))]
    async fn insert_payment(
        &self,
        student: &Student,
        payment: NewPayment,
    ) -> Result<Payment, PortError> {
        if student.id != payment.student_id {
            return Err(PortError::integrity(format!(
                "payment for {} attached to {}",
                payment.student_id, student.id
            )));
        }
        let new_row = NewPaymentRow {
            student_id: payment.student_id.value(),
            paid_on: payment.date,
            amount: payment.amount,
            method: payment.method.as_str().to_string(),
        };
        let row = self
            .payments
            .insert_with_student(new_row, &student_to_row(student))
            .await?;
        debug!(payment_id = row.id, "Payment row inserted");
        row_to_payment(row)
    }

    #[instrument(skip(self, payment), fields(payment_id = %payment.id))]
    async fn save_payment(&self, payment: &Payment) -> Result<(), PortError> {
        self.payments
            .update(&payment_to_row(payment))
            .await
            .map_err(|e| not_found_as(e, "Payment", payment.id))
    }

    #[instrument(skip(self, payment), fields(payment_id = %payment.id))]
    async fn delete_payment(&self, payment: &Payment) -> Result<(), PortError> {
        self.payments
            .delete(payment.id.value())
            .await
            .map_err(|e| not_found_as(e, "Payment", payment.id))
    }
}

// ============================================================================
// Row conversion
// ============================================================================

/// Reports not-found errors against the domain identifier
fn not_found_as(error: DatabaseError, entity: &'static str, id: impl std::fmt::Display) -> PortError {
    if error.is_not_found() {
        PortError::not_found(entity, id)
    } else {
        error.into()
    }
}

fn new_student_row(student: NewStudent) -> NewStudentRow {
    NewStudentRow {
        name: student.profile.name,
        address: student.profile.address,
        city: student.profile.city,
        state: student.profile.state,
        phone: student.profile.phone,
        enrolled_on: student.enrolled_on,
        due_on: student.due_on,
        disenrolled_on: student.disenrolled_on,
    }
}

fn student_to_row(student: &Student) -> StudentRow {
    StudentRow {
        id: student.id.value(),
        name: student.profile.name.clone(),
        address: student.profile.address.clone(),
        city: student.profile.city.clone(),
        state: student.profile.state.clone(),
        phone: student.profile.phone.clone(),
        enrolled_on: student.enrolled_on,
        due_on: student.due_on,
        disenrolled_on: student.disenrolled_on,
    }
}

fn row_to_student(row: StudentRow) -> Student {
    Student {
        id: StudentId::new(row.id),
        profile: StudentProfile {
            name: row.name,
            address: row.address,
            city: row.city,
            state: row.state,
            phone: row.phone,
        },
        enrolled_on: row.enrolled_on,
        due_on: row.due_on,
        disenrolled_on: row.disenrolled_on,
    }
}

fn payment_to_row(payment: &Payment) -> PaymentRow {
    PaymentRow {
        id: payment.id.value(),
        student_id: payment.student_id.value(),
        paid_on: payment.date,
        amount: payment.amount,
        method: payment.method.as_str().to_string(),
    }
}

/// Converts a row, rejecting values the domain would never have written
fn row_to_payment(row: PaymentRow) -> Result<Payment, PortError> {
    let method: PaymentMethod = row.method.parse().map_err(|e| {
        PortError::from(DatabaseError::CorruptRow(format!("payment {}: {}", row.id, e)))
    })?;
    let payment = Payment {
        id: PaymentId::new(row.id),
        student_id: StudentId::new(row.student_id),
        date: row.paid_on,
        amount: row.amount,
        method,
    };
    payment.validate().map_err(|e| {
        PortError::from(DatabaseError::CorruptRow(format!("payment {}: {}", row.id, e)))
    })?;
    Ok(payment)
}
