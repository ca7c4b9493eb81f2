//! Student handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use core_kernel::StudentId;
use domain_enrollment::{StudentFilter, StudentQuery};

use crate::dto::payment::{CreatePaymentRequest, PaymentResponse};
use crate::dto::student::*;
use crate::handlers::{ApiJson, ApiPath, ApiQuery};
use crate::{error::ApiError, AppState};

/// Creates a student
pub async fn create_student(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateStudentRequest>,
) -> Result<(StatusCode, Json<StudentResponse>), ApiError> {
    let new = request.into_new_student()?;
    let student = state.service.create_student(new).await?;
    let today = state.service.today();
    Ok((
        StatusCode::CREATED,
        Json(StudentResponse::new(student, Vec::new(), today)),
    ))
}

/// Lists students
pub async fn list_students(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListStudentsParams>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let filter = StudentFilter {
        query: StudentQuery {
            state: params.state,
            city: params.city,
            limit: params.limit,
            offset: params.offset,
        },
        active: params.active,
    };
    let views = state.service.list_students(filter).await?;
    Ok(Json(views.into_iter().map(StudentResponse::from).collect()))
}

/// Gets a student with its payments
pub async fn get_student(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<StudentResponse>, ApiError> {
    let view = state.service.get_student(StudentId::new(id)).await?;
    Ok(Json(view.into()))
}

/// Applies a partial update
pub async fn update_student(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateStudentRequest>,
) -> Result<Json<StudentResponse>, ApiError> {
    let id = StudentId::new(id);
    state.service.update_student(id, request.into()).await?;
    let view = state.service.get_student(id).await?;
    Ok(Json(view.into()))
}

/// Deletes a disenrolled student and its payments
pub async fn delete_student(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_student(StudentId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Enrolls or renews a student from today
pub async fn enroll(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<LifecycleActionResponse>, ApiError> {
    let id = StudentId::new(id);
    let student = state.service.enroll(id).await?;
    let date = student.enrolled_on;
    let view = state.service.get_student(id).await?;
    Ok(Json(LifecycleActionResponse {
        message: format!("Student {} enrolled", id.value()),
        date,
        student: view.into(),
    }))
}

/// Disenrolls a student as of today
pub async fn disenroll(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<LifecycleActionResponse>, ApiError> {
    let id = StudentId::new(id);
    let student = state.service.disenroll(id).await?;
    let date = student.disenrolled_on;
    let view = state.service.get_student(id).await?;
    Ok(Json(LifecycleActionResponse {
        message: format!("Student {} disenrolled", id.value()),
        date,
        student: view.into(),
    }))
}

/// Runs the delinquency rule for one student
pub async fn evaluate_delinquency(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<DelinquencyResponse>, ApiError> {
    let id = StudentId::new(id);
    let (_, outcome) = state.service.evaluate_delinquency(id).await?;
    let view = state.service.get_student(id).await?;
    Ok(Json(DelinquencyResponse::new(outcome, view.into())))
}

/// Runs the delinquency rule for every past-due student
pub async fn delinquency_sweep(
    State(state): State<AppState>,
) -> Result<Json<SweepResponse>, ApiError> {
    let report = state.service.sweep_delinquencies().await?;
    Ok(Json(report.into()))
}

/// Payment history of one student
pub async fn list_student_payments(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let payments = state.service.payments_for(StudentId::new(id)).await?;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

/// Records a payment for the student in the path
pub async fn record_student_payment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    let payment = state
        .service
        .record_payment(StudentId::new(id), request.into_draft())
        .await?;
    Ok((StatusCode::CREATED, Json(payment.into())))
}
