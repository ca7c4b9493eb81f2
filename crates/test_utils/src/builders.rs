//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::NaiveDate;
use core_kernel::{PaymentId, StudentId};
use domain_enrollment::{
    lifecycle, NewPayment, NewStudent, Payment, PaymentMethod, Student, StudentProfile,
};
use rust_decimal::Decimal;

use crate::fixtures::{AmountFixtures, DateFixtures, ProfileFixtures};

/// Builder for constructing students in any lifecycle configuration
///
/// Dates are assigned verbatim; the builder does not enforce the window
/// invariant, so it can describe inconsistent records too.
#[derive(Debug, Clone)]
pub struct TestStudentBuilder {
    id: StudentId,
    profile: StudentProfile,
    enrolled_on: Option<NaiveDate>,
    due_on: Option<NaiveDate>,
    disenrolled_on: Option<NaiveDate>,
}

impl Default for TestStudentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStudentBuilder {
    /// Creates a new builder for a never-enrolled student
    pub fn new() -> Self {
        Self {
            id: StudentId::new(1),
            profile: ProfileFixtures::complete(),
            enrolled_on: None,
            due_on: None,
            disenrolled_on: None,
        }
    }

    /// Sets the student ID
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = StudentId::new(id);
        self
    }

    /// Sets the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.profile.name = name.into();
        self
    }

    /// Replaces the whole profile
    pub fn with_profile(mut self, profile: StudentProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Opens a 30-day window on the given date
    pub fn enrolled_on(mut self, date: NaiveDate) -> Self {
        self.enrolled_on = Some(date);
        self.due_on = Some(lifecycle::window_end(date));
        self
    }

    /// Enrolled on the standard enrollment day
    pub fn enrolled(self) -> Self {
        self.enrolled_on(DateFixtures::enrollment_day())
    }

    /// Overrides the due date
    pub fn due_on(mut self, date: NaiveDate) -> Self {
        self.due_on = Some(date);
        self
    }

    /// Marks the student disenrolled on the given date
    pub fn disenrolled_on(mut self, date: NaiveDate) -> Self {
        self.disenrolled_on = Some(date);
        self
    }

    /// Sets all three dates verbatim
    pub fn with_dates(
        mut self,
        enrolled_on: Option<NaiveDate>,
        due_on: Option<NaiveDate>,
        disenrolled_on: Option<NaiveDate>,
    ) -> Self {
        self.enrolled_on = enrolled_on;
        self.due_on = due_on;
        self.disenrolled_on = disenrolled_on;
        self
    }

    /// Builds a persisted-looking student
    pub fn build(self) -> Student {
        Student {
            id: self.id,
            profile: self.profile,
            enrolled_on: self.enrolled_on,
            due_on: self.due_on,
            disenrolled_on: self.disenrolled_on,
        }
    }

    /// Builds the unsaved form, for handing to a store
    pub fn build_new(self) -> NewStudent {
        NewStudent {
            profile: self.profile,
            enrolled_on: self.enrolled_on,
            due_on: self.due_on,
            disenrolled_on: self.disenrolled_on,
        }
    }
}

/// Builder for constructing test payments
#[derive(Debug, Clone)]
pub struct TestPaymentBuilder {
    id: PaymentId,
    student_id: StudentId,
    date: NaiveDate,
    amount: Decimal,
    method: PaymentMethod,
}

impl Default for TestPaymentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPaymentBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            id: PaymentId::new(1),
            student_id: StudentId::new(1),
            date: DateFixtures::mid_window(),
            amount: AmountFixtures::monthly_fee(),
            method: PaymentMethod::Cash,
        }
    }

    /// Sets the payment ID
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = PaymentId::new(id);
        self
    }

    /// Sets the owning student
    pub fn for_student(mut self, student_id: StudentId) -> Self {
        self.student_id = student_id;
        self
    }

    /// Sets the payment date
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Sets the amount
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    /// Sets the method
    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    /// Builds a persisted-looking payment without validating it
    pub fn build(self) -> Payment {
        Payment {
            id: self.id,
            student_id: self.student_id,
            date: self.date,
            amount: self.amount,
            method: self.method,
        }
    }

    /// Builds the unsaved form, bypassing amount validation
    pub fn build_new(self) -> NewPayment {
        NewPayment {
            student_id: self.student_id,
            date: self.date,
            amount: self.amount,
            method: self.method,
        }
    }
}
