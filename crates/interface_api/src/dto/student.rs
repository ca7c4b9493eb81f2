//! Student DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use domain_enrollment::{
    DelinquencyOutcome, LifecycleState, NewStudent, Payment, Student, StudentPatch,
    StudentProfile, StudentView, SweepReport, ValidationError,
};

use super::double_option;
use super::payment::PaymentResponse;

/// Body of `POST /students`
///
/// `due_on` and `disenrolled_on` are derived and ignored if sent.
#[derive(Debug, Default, Deserialize)]
pub struct CreateStudentRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub enrolled_on: Option<NaiveDate>,
}

impl CreateStudentRequest {
    pub fn into_new_student(self) -> Result<NewStudent, ValidationError> {
        let name = self.name.ok_or_else(|| ValidationError::required("name"))?;
        let profile = StudentProfile {
            name,
            address: self.address,
            city: self.city,
            state: self.state,
            phone: self.phone,
        };
        let new = NewStudent::new(profile);
        Ok(match self.enrolled_on {
            Some(date) => new.enrolled_on(date),
            None => new,
        })
    }
}

/// Body of `PUT /students/:id`
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub enrolled_on: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub disenrolled_on: Option<Option<NaiveDate>>,
}

impl From<UpdateStudentRequest> for StudentPatch {
    fn from(req: UpdateStudentRequest) -> Self {
        StudentPatch {
            name: req.name,
            address: req.address,
            city: req.city,
            state: req.state,
            phone: req.phone,
            enrolled_on: req.enrolled_on,
            disenrolled_on: req.disenrolled_on,
        }
    }
}

/// Query string of `GET /students`
#[derive(Debug, Default, Deserialize)]
pub struct ListStudentsParams {
    pub state: Option<String>,
    pub city: Option<String>,
    pub active: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct StudentResponse {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub enrolled_on: Option<NaiveDate>,
    pub due_on: Option<NaiveDate>,
    pub disenrolled_on: Option<NaiveDate>,
    pub is_active: bool,
    pub status: LifecycleState,
    pub payments: Vec<PaymentResponse>,
}

impl StudentResponse {
    /// Renders a student as of `today`
    pub fn new(student: Student, payments: Vec<Payment>, today: NaiveDate) -> Self {
        Self {
            is_active: student.is_active(today),
            status: student.state(today),
            id: student.id.value(),
            name: student.profile.name,
            address: student.profile.address,
            city: student.profile.city,
            state: student.profile.state,
            phone: student.profile.phone,
            enrolled_on: student.enrolled_on,
            due_on: student.due_on,
            disenrolled_on: student.disenrolled_on,
            payments: payments.into_iter().map(PaymentResponse::from).collect(),
        }
    }
}

impl From<StudentView> for StudentResponse {
    fn from(view: StudentView) -> Self {
        let student = view.student;
        Self {
            id: student.id.value(),
            name: student.profile.name,
            address: student.profile.address,
            city: student.profile.city,
            state: student.profile.state,
            phone: student.profile.phone,
            enrolled_on: student.enrolled_on,
            due_on: student.due_on,
            disenrolled_on: student.disenrolled_on,
            is_active: view.is_active,
            status: view.state,
            payments: view.payments.into_iter().map(PaymentResponse::from).collect(),
        }
    }
}

/// Answer of the enroll and disenroll endpoints
#[derive(Debug, Serialize)]
pub struct LifecycleActionResponse {
    pub message: String,
    /// `enrolled_on` after enrolling, `disenrolled_on` after disenrolling
    pub date: Option<NaiveDate>,
    pub student: StudentResponse,
}

/// Answer of `POST /students/:id/delinquency`
#[derive(Debug, Serialize)]
pub struct DelinquencyResponse {
    /// `unchanged`, `extended` or `disenrolled`
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_on: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disenrolled_on: Option<NaiveDate>,
    pub student: StudentResponse,
}

impl DelinquencyResponse {
    pub fn new(outcome: DelinquencyOutcome, student: StudentResponse) -> Self {
        let (outcome, due_on, disenrolled_on) = match outcome {
            DelinquencyOutcome::Unchanged => ("unchanged", None, None),
            DelinquencyOutcome::Extended { due_on } => ("extended", Some(due_on), None),
            DelinquencyOutcome::Disenrolled { on } => ("disenrolled", None, Some(on)),
        };
        Self {
            outcome,
            due_on,
            disenrolled_on,
            student,
        }
    }
}

/// Answer of `POST /students/delinquency-sweep`
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub examined: usize,
    pub extended: usize,
    pub disenrolled: usize,
    pub failed: usize,
}

impl From<SweepReport> for SweepResponse {
    fn from(report: SweepReport) -> Self {
        Self {
            examined: report.examined,
            extended: report.extended,
            disenrolled: report.disenrolled,
            failed: report.failed,
        }
    }
}
