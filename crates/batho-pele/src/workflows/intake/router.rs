use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::assessment::classify;
use super::domain::{DocumentType, IntakeSubmission, LegalStatus, Nationality, PatientId};
use super::repository::{IntakeRepository, PatientQuery, ReferralPublisher, RepositoryError};
use super::service::{IntakeService, IntakeServiceError};
use crate::workflows::treatment::{format_rand, TreatmentRequest};

/// Router builder exposing HTTP endpoints for patient intake and classification.
pub fn intake_router<R, A>(service: Arc<IntakeService<R, A>>) -> Router
where
    R: IntakeRepository + 'static,
    A: ReferralPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/intake",
            post(submit_handler::<R, A>).get(search_handler::<R, A>),
        )
        .route("/api/v1/intake/:patient_id", get(status_handler::<R, A>))
        .route(
            "/api/v1/intake/:patient_id/treatment",
            post(treatment_handler::<R, A>),
        )
        .route(
            "/api/v1/intake/:patient_id/invoice",
            get(invoice_handler::<R, A>),
        )
        .route("/api/v1/dashboard/metrics", get(metrics_handler::<R, A>))
        .route(
            "/api/v1/documents/validate",
            post(validate_handler::<R, A>),
        )
        .route("/api/v1/eligibility/classify", post(classify_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentCheckRequest {
    pub(crate) nationality: Nationality,
    pub(crate) doc_type: DocumentType,
    #[serde(default)]
    pub(crate) doc_number: String,
}

/// `visit` is the 1-based number from the patient's history; the latest visit when absent.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct InvoiceQuery {
    #[serde(default)]
    pub(crate) visit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClassifyRequest {
    pub(crate) nationality: Nationality,
    pub(crate) doc_type: DocumentType,
    pub(crate) legal_status: LegalStatus,
}

pub(crate) async fn submit_handler<R, A>(
    State(service): State<Arc<IntakeService<R, A>>>,
    axum::Json(submission): axum::Json<IntakeSubmission>,
) -> Response
where
    R: IntakeRepository + 'static,
    A: ReferralPublisher + 'static,
{
    match service.submit(submission) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::ACCEPTED, axum::Json(view)).into_response()
        }
        Err(IntakeServiceError::Intake(error)) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
        }
        Err(IntakeServiceError::Repository(RepositoryError::Conflict)) => {
            error_response(StatusCode::CONFLICT, "patient already registered")
        }
        Err(other) => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

pub(crate) async fn search_handler<R, A>(
    State(service): State<Arc<IntakeService<R, A>>>,
    Query(query): Query<PatientQuery>,
) -> Response
where
    R: IntakeRepository + 'static,
    A: ReferralPublisher + 'static,
{
    match service.search(&query) {
        Ok(records) => {
            let patients: Vec<_> = records.iter().map(|record| record.status_view()).collect();
            let payload = json!({
                "count": patients.len(),
                "patients": patients,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

pub(crate) async fn status_handler<R, A>(
    State(service): State<Arc<IntakeService<R, A>>>,
    Path(patient_id): Path<String>,
) -> Response
where
    R: IntakeRepository + 'static,
    A: ReferralPublisher + 'static,
{
    let id = PatientId(patient_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => service_error_response(&id, error),
    }
}

pub(crate) async fn treatment_handler<R, A>(
    State(service): State<Arc<IntakeService<R, A>>>,
    Path(patient_id): Path<String>,
    axum::Json(request): axum::Json<TreatmentRequest>,
) -> Response
where
    R: IntakeRepository + 'static,
    A: ReferralPublisher + 'static,
{
    let id = PatientId(patient_id);
    match service.record_treatment(&id, request) {
        Ok(record) => {
            let latest = record.latest_visit();
            let payload = json!({
                "patient": record.status_view(),
                "visit": record.visits.len(),
                "cost_display": latest.map(|treatment| format_rand(treatment.cost)),
                "treatment": latest,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_error_response(&id, error),
    }
}

pub(crate) async fn invoice_handler<R, A>(
    State(service): State<Arc<IntakeService<R, A>>>,
    Path(patient_id): Path<String>,
    Query(query): Query<InvoiceQuery>,
) -> Response
where
    R: IntakeRepository + 'static,
    A: ReferralPublisher + 'static,
{
    let id = PatientId(patient_id);
    let invoice = match query.visit {
        Some(visit) => service.invoice_for_visit(&id, visit, None),
        None => service.invoice(&id, None),
    };
    match invoice {
        Ok(invoice) => {
            let payload = json!({
                "file_name": invoice.file_name(),
                "text": invoice.render(),
                "invoice": invoice,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => service_error_response(&id, error),
    }
}

pub(crate) async fn metrics_handler<R, A>(
    State(service): State<Arc<IntakeService<R, A>>>,
) -> Response
where
    R: IntakeRepository + 'static,
    A: ReferralPublisher + 'static,
{
    match service.metrics() {
        Ok(metrics) => (StatusCode::OK, axum::Json(metrics)).into_response(),
        Err(other) => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

pub(crate) async fn validate_handler<R, A>(
    State(service): State<Arc<IntakeService<R, A>>>,
    axum::Json(request): axum::Json<DocumentCheckRequest>,
) -> Response
where
    R: IntakeRepository + 'static,
    A: ReferralPublisher + 'static,
{
    let outcome = service.validate(&request.doc_type, &request.doc_number, request.nationality);
    let payload = json!({
        "summary": outcome.summary(),
        "legal_status": outcome.implied_legal_status(),
        "result": outcome,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn classify_handler(axum::Json(request): axum::Json<ClassifyRequest>) -> Response {
    let classification = classify(request.nationality, &request.doc_type, request.legal_status);
    let payload = json!({
        "legal_status": classification.legal_status,
        "consistency": classification.consistency.map(|flag| flag.describe()),
        "eligibility": classification.eligibility,
        "eligibility_label": classification.eligibility.label(),
        "cost_tier": classification.cost_tier,
        "cost_tier_label": classification.cost_tier.label(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

fn service_error_response(id: &PatientId, error: IntakeServiceError) -> Response {
    match error {
        IntakeServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({
                "patient_id": id,
                "error": "patient not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        error @ (IntakeServiceError::NoTreatment(_) | IntakeServiceError::NoSuchVisit { .. }) => {
            error_response(StatusCode::NOT_FOUND, error.to_string())
        }
        IntakeServiceError::Treatment(error) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
        }
        other => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({
        "error": message.into(),
    });
    (status, axum::Json(payload)).into_response()
}
