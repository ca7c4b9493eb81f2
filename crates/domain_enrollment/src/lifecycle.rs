//! Lifecycle Rules Engine
//!
//! Pure functions over a [`Student`] that derive its status and apply the
//! enrollment, disenrollment and payment transitions. Every function takes
//! the current date as an argument; nothing here reads the wall clock or
//! touches storage.
//!
//! # State machine
//!
//! ```text
//!                enroll / record_payment
//!  Unenrolled ───────────────────────────────► Active ◄──┐ enroll / record_payment
//!                                               │  │     │ (renewal)
//!                                               │  └─────┘
//!                  evaluate_delinquency         │        disenroll
//!          ┌────────────────────────────────────┴────────────────┐
//!          ▼                                                     ▼
//!   Inactive (expired) ── enroll / record_payment ──► Active ◄── Inactive (manual)
//! ```
//!
//! Only inactive students (those with `disenrolled_on` set) can be deleted.

use chrono::NaiveDate;

use crate::error::EnrollmentError;
use crate::payment::{NewPayment, Payment};
use crate::student::{LifecycleState, Student};
use core_kernel::{add_days, sub_days};

/// Length of an enrollment window in days
pub const ENROLLMENT_WINDOW_DAYS: u64 = 30;

/// Due date of a window opened on `start`
pub fn window_end(start: NaiveDate) -> NaiveDate {
    add_days(start, ENROLLMENT_WINDOW_DAYS)
}

/// Returns true if the student is active on `today`
///
/// Active means enrolled, not disenrolled, with a due date strictly after
/// the enrollment date, and `today` strictly before the due date.
pub fn is_active(student: &Student, today: NaiveDate) -> bool {
    match (student.enrolled_on, student.due_on, student.disenrolled_on) {
        (Some(enrolled_on), Some(due_on), None) => enrolled_on < due_on && today < due_on,
        _ => false,
    }
}

/// Derives the lifecycle state on `today`
pub fn state(student: &Student, today: NaiveDate) -> LifecycleState {
    if student.disenrolled_on.is_some() {
        LifecycleState::Disenrolled
    } else if is_active(student, today) {
        LifecycleState::Active
    } else if student.enrolled_on.is_none() {
        LifecycleState::Unenrolled
    } else {
        LifecycleState::Lapsed
    }
}

/// Enrolls or renews the student from `today`
///
/// Calling it again simply restarts the window from the new date.
pub fn enroll(student: &mut Student, today: NaiveDate) {
    student.enrolled_on = Some(today);
    student.due_on = Some(window_end(today));
    student.disenrolled_on = None;
}

/// Marks the student disenrolled on `today`
///
/// Always succeeds, whatever the current state.
pub fn disenroll(student: &mut Student, today: NaiveDate) {
    student.disenrolled_on = Some(today);
}

/// Result of a delinquency evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelinquencyOutcome {
    /// Not past due, already disenrolled, no due date, or the latest
    /// payment leaves the due date where it was
    Unchanged,
    /// A payment inside the lookback window moved the due date
    Extended { due_on: NaiveDate },
    /// No qualifying payment; the student was disenrolled
    Disenrolled { on: NaiveDate },
}

/// Picks the most recent payment
///
/// Payments sharing the latest date are ordered by amount, then by id, so
/// the choice is deterministic.
pub fn latest_payment(payments: &[Payment]) -> Option<&Payment> {
    payments.iter().max_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.amount.cmp(&b.amount))
            .then_with(|| a.id.cmp(&b.id))
    })
}

/// Disenrolls a past-due student unless a recent payment covers the cycle
///
/// Runs only when `due_on` is set, `today` is after it and the student is
/// not disenrolled. The most recent payment qualifies when it is dated on or
/// after `due_on - 30 days`; the lookback is anchored on the due date, not
/// on `today`. A qualifying payment moves `due_on` to the payment date plus
/// 30 days; otherwise the student is disenrolled on `today`.
pub fn evaluate_delinquency(
    student: &mut Student,
    payments: &[Payment],
    today: NaiveDate,
) -> DelinquencyOutcome {
    let due_on = match (student.due_on, student.disenrolled_on) {
        (Some(due_on), None) if today > due_on => due_on,
        _ => return DelinquencyOutcome::Unchanged,
    };

    let lookback_start = sub_days(due_on, ENROLLMENT_WINDOW_DAYS);
    if let Some(payment) = latest_payment(payments).filter(|p| p.date >= lookback_start) {
        let extended = window_end(payment.date);
        if extended == due_on {
            return DelinquencyOutcome::Unchanged;
        }
        student.due_on = Some(extended);
        return DelinquencyOutcome::Extended { due_on: extended };
    }

    student.disenrolled_on = Some(today);
    DelinquencyOutcome::Disenrolled { on: today }
}

/// Applies the side effects of attaching a payment to its student
///
/// The due date moves to the payment date plus 30 days, a first payment
/// also sets the enrollment date, and any disenrollment is cleared.
pub fn record_payment(student: &mut Student, payment: &NewPayment) {
    student.due_on = Some(window_end(payment.date));
    if student.enrolled_on.is_none() {
        student.enrolled_on = Some(payment.date);
    }
    student.disenrolled_on = None;
}

/// Checks that the student may be deleted
pub fn ensure_deletable(student: &Student) -> Result<(), EnrollmentError> {
    match (student.enrolled_on, student.disenrolled_on) {
        (_, Some(_)) => Ok(()),
        (Some(_), None) => Err(EnrollmentError::precondition(
            "active student cannot be deleted; disenroll the student first",
        )),
        (None, None) => Err(EnrollmentError::precondition(
            "only disenrolled students can be deleted",
        )),
    }
}
