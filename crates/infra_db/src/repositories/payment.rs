//! Payment repository implementation
//!
//! Row-level access to the `payments` table. Recording a payment also
//! updates the owning student inside the same transaction.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::error::DatabaseError;
use crate::repositories::student::{StudentRepository, StudentRow};

const PAYMENT_COLUMNS: &str = "id, student_id, paid_on, amount, method";

/// A row of the `payments` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PaymentRow {
    pub id: i64,
    pub student_id: i64,
    pub paid_on: NaiveDate,
    pub amount: Decimal,
    /// `cash` or `card`, enforced by a check constraint
    pub method: String,
}

/// Data for inserting a payment
#[derive(Debug, Clone)]
pub struct NewPaymentRow {
    pub student_id: i64,
    pub paid_on: NaiveDate,
    pub amount: Decimal,
    pub method: String,
}

/// Repository for the `payments` table
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a payment and saves the owning student in a single transaction
    ///
    /// Either both rows are written or neither is; a dangling `student_id`
    /// fails the foreign key and rolls the transaction back.
    pub async fn insert_with_student(
        &self,
        payment: NewPaymentRow,
        student: &StudentRow,
    ) -> Result<PaymentRow, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO payments (student_id, paid_on, amount, method)
            VALUES ($1, $2, $3, $4)
            RETURNING {PAYMENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(payment.student_id)
            .bind(payment.paid_on)
            .bind(payment.amount)
            .bind(payment.method)
            .fetch_one(&mut *tx)
            .await?;

        StudentRepository::update_on(&mut *tx, student).await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Retrieves a payment by id
    pub async fn get_by_id(&self, id: i64) -> Result<PaymentRow, DatabaseError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1");
        sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Payment", id))
    }

    /// All payments of one student
    pub async fn list_for_student(&self, student_id: i64) -> Result<Vec<PaymentRow>, DatabaseError> {
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE student_id = $1 ORDER BY paid_on, id"
        );
        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(student_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// All payments ordered by id
    pub async fn list_all(&self) -> Result<Vec<PaymentRow>, DatabaseError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY id");
        let rows = sqlx::query_as::<_, PaymentRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Updates date, amount and method; the owning student is never changed
    pub async fn update(&self, row: &PaymentRow) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE payments SET paid_on = $2, amount = $3, method = $4 WHERE id = $1",
        )
        .bind(row.id)
        .bind(row.paid_on)
        .bind(row.amount)
        .bind(&row.method)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Payment", row.id));
        }
        Ok(())
    }

    /// Deletes a single payment
    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Payment", id));
        }
        Ok(())
    }
}
