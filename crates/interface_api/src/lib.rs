//! HTTP API Layer
//!
//! This crate provides the REST API for the enrollment system using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for students, payments and health
//! - **Middleware**: Request ids, tracing, request logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! Handlers only translate between HTTP and the `EnrollmentService`; every
//! rule lives in `domain_enrollment`.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(AppState::new(service, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_enrollment::EnrollmentService;

use crate::config::ApiConfig;
use crate::handlers::{health, payments, students};
use crate::middleware::{request_logging_middleware, MakeRequestUuidV7};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EnrollmentService>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(service: EnrollmentService, config: ApiConfig) -> Self {
        Self {
            service: Arc::new(service),
            config,
        }
    }
}

/// Creates the main API router
///
/// All routes live under `/api/v1`.
pub fn create_router(state: AppState) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let student_routes = Router::new()
        .route("/", get(students::list_students).post(students::create_student))
        .route("/delinquency-sweep", post(students::delinquency_sweep))
        .route(
            "/:id",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
        .route("/:id/enroll", post(students::enroll))
        .route("/:id/disenroll", post(students::disenroll))
        .route("/:id/delinquency", post(students::evaluate_delinquency))
        .route(
            "/:id/payments",
            get(students::list_student_payments).post(students::record_student_payment),
        );

    let payment_routes = Router::new()
        .route("/", get(payments::list_payments).post(payments::create_payment))
        .route(
            "/:id",
            get(payments::get_payment)
                .put(payments::update_payment)
                .delete(payments::delete_payment),
        );

    let api_routes = Router::new()
        .merge(health_routes)
        .nest("/students", student_routes)
        .nest("/payments", payment_routes);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(
            // Outermost first: the id must exist before tracing and logging see the request
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(request_logging_middleware)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
