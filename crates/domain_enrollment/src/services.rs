//! Enrollment Application Service
//!
//! Orchestrates load, rule application and persistence for every mutating
//! operation. Each operation mutates a copy of the loaded student and hands
//! it to the store in a single call, so a failed write leaves nothing behind.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use core_kernel::{Clock, PaymentId, StudentId};

use crate::error::EnrollmentError;
use crate::lifecycle::{self, DelinquencyOutcome};
use crate::payment::{Payment, PaymentDraft, PaymentPatch};
use crate::ports::{EnrollmentStore, StudentQuery};
use crate::student::{LifecycleState, NewStudent, Student, StudentPatch};

/// Result type for service operations
pub type ServiceResult<T> = Result<T, EnrollmentError>;

/// A student together with its payment history and derived status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentView {
    pub student: Student,
    /// Payments ordered by date, then id
    pub payments: Vec<Payment>,
    pub is_active: bool,
    pub state: LifecycleState,
}

/// Listing filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub query: StudentQuery,
    /// Keep only active (`true`) or inactive (`false`) students
    pub active: Option<bool>,
}

/// Summary of a delinquency sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Past-due students examined
    pub examined: usize,
    /// Students whose due date was extended by a recent payment
    pub extended: usize,
    /// Students disenrolled for non-payment
    pub disenrolled: usize,
    /// Students that could not be evaluated
    pub failed: usize,
}

/// Application service for the enrollment domain
#[derive(Clone)]
pub struct EnrollmentService {
    store: Arc<dyn EnrollmentStore>,
    clock: Arc<dyn Clock>,
}

impl EnrollmentService {
    /// Creates a new service over the given store and clock
    pub fn new(store: Arc<dyn EnrollmentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The store this service persists through
    pub fn store(&self) -> &Arc<dyn EnrollmentStore> {
        &self.store
    }

    /// Today's date according to the injected clock
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ========================================================================
    // Students
    // ========================================================================

    /// Creates a student, optionally already enrolled
    pub async fn create_student(&self, new: NewStudent) -> ServiceResult<Student> {
        new.profile.check()?;
        let student = self.store.create_student(new).await?;
        info!(student_id = %student.id, enrolled_on = ?student.enrolled_on, "Student created");
        Ok(student)
    }

    /// Loads a student with its payments and derived status
    pub async fn get_student(&self, id: StudentId) -> ServiceResult<StudentView> {
        let student = self.store.load_student(id).await?;
        let payments = self.payments_sorted(id).await?;
        Ok(self.view(student, payments))
    }

    /// Lists students
    ///
    /// The `active` filter is evaluated against today, so pagination is
    /// applied after it.
    pub async fn list_students(&self, filter: StudentFilter) -> ServiceResult<Vec<StudentView>> {
        let today = self.today();
        let students = match filter.active {
            None => self.store.list_students(filter.query).await?,
            Some(active) => {
                let offset = filter.query.offset.unwrap_or(0) as usize;
                let limit = filter.query.limit.map_or(usize::MAX, |l| l as usize);
                self.store
                    .list_students(filter.query.unpaginated())
                    .await?
                    .into_iter()
                    .filter(|s| lifecycle::is_active(s, today) == active)
                    .skip(offset)
                    .take(limit)
                    .collect()
            }
        };

        let mut views = Vec::with_capacity(students.len());
        for student in students {
            let payments = self.payments_sorted(student.id).await?;
            views.push(self.view(student, payments));
        }
        Ok(views)
    }

    /// Applies a partial update
    pub async fn update_student(&self, id: StudentId, patch: StudentPatch) -> ServiceResult<Student> {
        let mut student = self.store.load_student(id).await?;
        patch.apply(&mut student)?;
        self.store.save_student(&student).await?;
        info!(student_id = %id, "Student updated");
        Ok(student)
    }

    /// Deletes a disenrolled student and all its payments
    pub async fn delete_student(&self, id: StudentId) -> ServiceResult<()> {
        let student = self.store.load_student(id).await?;
        if let Err(err) = lifecycle::ensure_deletable(&student) {
            warn!(student_id = %id, error = %err, "Student deletion rejected");
            return Err(err);
        }
        self.store.delete_student(&student).await?;
        info!(student_id = %id, "Student deleted");
        Ok(())
    }

    /// Enrolls or renews a student from today
    pub async fn enroll(&self, id: StudentId) -> ServiceResult<Student> {
        let mut student = self.store.load_student(id).await?;
        lifecycle::enroll(&mut student, self.today());
        self.store.save_student(&student).await?;
        info!(student_id = %id, due_on = ?student.due_on, "Student enrolled");
        Ok(student)
    }

    /// Disenrolls a student as of today
    pub async fn disenroll(&self, id: StudentId) -> ServiceResult<Student> {
        let mut student = self.store.load_student(id).await?;
        lifecycle::disenroll(&mut student, self.today());
        self.store.save_student(&student).await?;
        info!(student_id = %id, disenrolled_on = ?student.disenrolled_on, "Student disenrolled");
        Ok(student)
    }

    /// Runs the delinquency rule for one student
    pub async fn evaluate_delinquency(
        &self,
        id: StudentId,
    ) -> ServiceResult<(Student, DelinquencyOutcome)> {
        let mut student = self.store.load_student(id).await?;
        let payments = self.store.load_payments_for(id).await?;
        let outcome = lifecycle::evaluate_delinquency(&mut student, &payments, self.today());

        match outcome {
            DelinquencyOutcome::Unchanged => {}
            DelinquencyOutcome::Extended { due_on } => {
                self.store.save_student(&student).await?;
                info!(student_id = %id, %due_on, "Due date extended by recent payment");
            }
            DelinquencyOutcome::Disenrolled { on } => {
                self.store.save_student(&student).await?;
                info!(student_id = %id, disenrolled_on = %on, "Student disenrolled for non-payment");
            }
        }
        Ok((student, outcome))
    }

    /// Runs the delinquency rule for every past-due student
    ///
    /// A failure on one student is logged and counted; the sweep continues.
    pub async fn sweep_delinquencies(&self) -> ServiceResult<SweepReport> {
        let ids = self.store.students_past_due(self.today()).await?;
        let mut report = SweepReport::default();

        for id in ids {
            report.examined += 1;
            match self.evaluate_delinquency(id).await {
                Ok((_, DelinquencyOutcome::Extended { .. })) => report.extended += 1,
                Ok((_, DelinquencyOutcome::Disenrolled { .. })) => report.disenrolled += 1,
                Ok((_, DelinquencyOutcome::Unchanged)) => {}
                Err(err) => {
                    report.failed += 1;
                    warn!(student_id = %id, error = %err, "Delinquency evaluation failed");
                }
            }
        }

        info!(
            examined = report.examined,
            extended = report.extended,
            disenrolled = report.disenrolled,
            failed = report.failed,
            "Delinquency sweep finished"
        );
        Ok(report)
    }

    // ========================================================================
    // Payments
    // ========================================================================

    /// Records a payment for a student
    ///
    /// The student must exist before the draft is validated. The payment and
    /// the student's recomputed dates are stored together.
    pub async fn record_payment(
        &self,
        student_id: StudentId,
        draft: PaymentDraft,
    ) -> ServiceResult<Payment> {
        let mut student = self.store.load_student(student_id).await?;
        let payment = draft.into_new_payment(student_id, self.today())?;
        lifecycle::record_payment(&mut student, &payment);

        let payment = self.store.insert_payment(&student, payment).await?;
        info!(
            student_id = %student_id,
            payment_id = %payment.id,
            amount = %payment.amount,
            method = %payment.method,
            due_on = ?student.due_on,
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Loads a payment
    pub async fn get_payment(&self, id: PaymentId) -> ServiceResult<Payment> {
        Ok(self.store.load_payment(id).await?)
    }

    /// All payments ordered by id
    pub async fn list_payments(&self) -> ServiceResult<Vec<Payment>> {
        Ok(self.store.list_payments().await?)
    }

    /// Payment history of one student, ordered by date
    pub async fn payments_for(&self, student_id: StudentId) -> ServiceResult<Vec<Payment>> {
        self.store.load_student(student_id).await?;
        self.payments_sorted(student_id).await
    }

    /// Applies a partial update to a payment; the student is not touched
    pub async fn update_payment(&self, id: PaymentId, patch: PaymentPatch) -> ServiceResult<Payment> {
        let mut payment = self.store.load_payment(id).await?;
        patch.apply(&mut payment)?;
        self.store.save_payment(&payment).await?;
        info!(payment_id = %id, "Payment updated");
        Ok(payment)
    }

    /// Deletes a payment; the student is not touched
    pub async fn delete_payment(&self, id: PaymentId) -> ServiceResult<()> {
        let payment = self.store.load_payment(id).await?;
        self.store.delete_payment(&payment).await?;
        info!(payment_id = %id, student_id = %payment.student_id, "Payment deleted");
        Ok(())
    }

    async fn payments_sorted(&self, student_id: StudentId) -> ServiceResult<Vec<Payment>> {
        let mut payments = self.store.load_payments_for(student_id).await?;
        payments.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(payments)
    }

    fn view(&self, student: Student, payments: Vec<Payment>) -> StudentView {
        let today = self.today();
        StudentView {
            is_active: student.is_active(today),
            state: student.state(today),
            student,
            payments,
        }
    }
}
