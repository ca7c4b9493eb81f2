//! Student repository implementation
//!
//! Row-level access to the `students` table. Deleting a student removes its
//! payments through the `ON DELETE CASCADE` foreign key.

use chrono::NaiveDate;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::error::DatabaseError;

const STUDENT_COLUMNS: &str =
    "id, name, address, city, state, phone, enrolled_on, due_on, disenrolled_on";

/// A row of the `students` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StudentRow {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub enrolled_on: Option<NaiveDate>,
    pub due_on: Option<NaiveDate>,
    pub disenrolled_on: Option<NaiveDate>,
}

/// Data for inserting a student
#[derive(Debug, Clone)]
pub struct NewStudentRow {
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub enrolled_on: Option<NaiveDate>,
    pub due_on: Option<NaiveDate>,
    pub disenrolled_on: Option<NaiveDate>,
}

/// Listing filters; `None` means no filter
#[derive(Debug, Clone, Default)]
pub struct StudentFilterRow {
    pub state: Option<String>,
    pub city: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Repository for the `students` table
#[derive(Debug, Clone)]
pub struct StudentRepository {
    pool: PgPool,
}

impl StudentRepository {
    /// Creates a new StudentRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a student and returns the stored row
    pub async fn insert(&self, student: NewStudentRow) -> Result<StudentRow, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO students (
                name, address, city, state, phone, enrolled_on, due_on, disenrolled_on
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {STUDENT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, StudentRow>(&sql)
            .bind(student.name)
            .bind(student.address)
            .bind(student.city)
            .bind(student.state)
            .bind(student.phone)
            .bind(student.enrolled_on)
            .bind(student.due_on)
            .bind(student.disenrolled_on)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Retrieves a student by id
    pub async fn get_by_id(&self, id: i64) -> Result<StudentRow, DatabaseError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1");
        sqlx::query_as::<_, StudentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Student", id))
    }

    /// Lists students ordered by id
    pub async fn list(&self, filter: StudentFilterRow) -> Result<Vec<StudentRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {STUDENT_COLUMNS}
            FROM students
            WHERE ($1::text IS NULL OR state = $1)
              AND ($2::text IS NULL OR city = $2)
            ORDER BY id
            LIMIT $3 OFFSET COALESCE($4, 0)
            "#
        );
        let rows = sqlx::query_as::<_, StudentRow>(&sql)
            .bind(filter.state)
            .bind(filter.city)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Updates profile fields and lifecycle dates
    pub async fn update(&self, row: &StudentRow) -> Result<(), DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        Self::update_on(&mut *conn, row).await
    }

    /// Updates a student on an existing connection or transaction
    pub async fn update_on(conn: &mut PgConnection, row: &StudentRow) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE students SET
                name = $2, address = $3, city = $4, state = $5, phone = $6,
                enrolled_on = $7, due_on = $8, disenrolled_on = $9,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.address)
        .bind(&row.city)
        .bind(&row.state)
        .bind(&row.phone)
        .bind(row.enrolled_on)
        .bind(row.due_on)
        .bind(row.disenrolled_on)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Student", row.id));
        }
        Ok(())
    }

    /// Deletes a student; its payments go with it
    pub async fn delete(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Student", id));
        }
        Ok(())
    }

    /// Ids of enrolled, not disenrolled students whose due date is before `today`
    pub async fn past_due_ids(&self, today: NaiveDate) -> Result<Vec<i64>, DatabaseError> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM students
            WHERE disenrolled_on IS NULL AND due_on < $1
            ORDER BY id
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
