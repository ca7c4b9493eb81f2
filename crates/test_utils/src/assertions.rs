//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use chrono::NaiveDate;
use domain_enrollment::{EnrollmentError, LifecycleState, Student};
use rust_decimal::Decimal;

/// Asserts that a student is active on the given day
pub fn assert_active(student: &Student, today: NaiveDate) {
    assert!(
        student.is_active(today),
        "Expected {} to be active on {}, dates: enrolled={:?} due={:?} disenrolled={:?}",
        student.id,
        today,
        student.enrolled_on,
        student.due_on,
        student.disenrolled_on
    );
}

/// Asserts that a student is not active on the given day
pub fn assert_inactive(student: &Student, today: NaiveDate) {
    assert!(
        !student.is_active(today),
        "Expected {} to be inactive on {}, dates: enrolled={:?} due={:?} disenrolled={:?}",
        student.id,
        today,
        student.enrolled_on,
        student.due_on,
        student.disenrolled_on
    );
}

/// Asserts the derived lifecycle state on the given day
pub fn assert_state(student: &Student, today: NaiveDate, expected: LifecycleState) {
    let actual = student.state(today);
    assert_eq!(
        actual, expected,
        "Expected {} to be {:?} on {}, got {:?}",
        student.id, expected, today, actual
    );
}

/// Asserts all three lifecycle dates at once
pub fn assert_dates(
    student: &Student,
    enrolled_on: Option<NaiveDate>,
    due_on: Option<NaiveDate>,
    disenrolled_on: Option<NaiveDate>,
) {
    assert_eq!(
        (student.enrolled_on, student.due_on, student.disenrolled_on),
        (enrolled_on, due_on, disenrolled_on),
        "Lifecycle dates of {} differ (enrolled, due, disenrolled)",
        student.id
    );
}

/// Asserts that an error is a validation failure on the given field
pub fn assert_validation_error(err: &EnrollmentError, field: &str) {
    match err {
        EnrollmentError::Validation(v) => assert_eq!(
            v.field, field,
            "Expected validation error on '{}', got '{}': {}",
            field, v.field, v.reason
        ),
        other => panic!("Expected validation error on '{}', got {:?}", field, other),
    }
}

/// Asserts that an error is a not-found failure
pub fn assert_not_found(err: &EnrollmentError) {
    assert!(err.is_not_found(), "Expected not found, got {:?}", err);
}

/// Asserts that an error is a precondition failure
pub fn assert_precondition(err: &EnrollmentError) {
    assert!(
        matches!(err, EnrollmentError::Precondition(_)),
        "Expected precondition failure, got {:?}",
        err
    );
}

/// Asserts that two amounts are equal regardless of scale
pub fn assert_amount_eq(actual: Decimal, expected: Decimal) {
    assert_eq!(
        actual.normalize(),
        expected.normalize(),
        "Amounts differ: actual={}, expected={}",
        actual,
        expected
    );
}
