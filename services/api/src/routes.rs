use crate::infra::AppState;
use crate::session::{auth_clock, client_address, require_staff_session};
use axum::extract::{ConnectInfo, Path, Query};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware;
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use batho_pele::auth::StaffSession;
use batho_pele::error::AppError;
use batho_pele::workflows::intake::{
    intake_router, CostTier, IntakeRepository, IntakeService, ReferralPublisher,
};
use batho_pele::workflows::resources::{
    forecast, summarize_all, summarize_hospital, ForecastPoint, HospitalSummary, Observation,
    ResourceKind, ResourceSheet, MIN_OBSERVATIONS,
};
use batho_pele::workflows::treatment::{advise, format_rand, TreatmentAdvice, TreatmentQuote};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct TreatmentListResponse {
    pub(crate) conditions: Vec<String>,
    pub(crate) cost_tiers: Vec<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QuoteQuery {
    #[serde(default)]
    pub(crate) tier: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuoteResponse {
    #[serde(flatten)]
    pub(crate) quote: TreatmentQuote,
    pub(crate) cost_tier_label: &'static str,
    pub(crate) cost_display: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceSummaryRequest {
    pub(crate) sheet_csv: String,
    #[serde(default)]
    pub(crate) hospital: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResourceSummaryResponse {
    pub(crate) hospitals: Vec<HospitalSummary>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastRequest {
    pub(crate) resource: ResourceKind,
    pub(crate) history: Vec<Observation>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ForecastResponse {
    pub(crate) resource: ResourceKind,
    pub(crate) observations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) forecast: Option<Vec<ForecastPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
}

pub(crate) fn with_application_routes<R, A>(service: Arc<IntakeService<R, A>>) -> axum::Router
where
    R: IntakeRepository + 'static,
    A: ReferralPublisher + 'static,
{
    let staff_only = intake_router(service)
        .route(
            "/api/v1/resources/summary",
            axum::routing::post(resource_summary_endpoint),
        )
        .route(
            "/api/v1/resources/forecast",
            axum::routing::post(resource_forecast_endpoint),
        )
        .route("/api/v1/auth/logout", axum::routing::post(logout_endpoint))
        .route_layer(middleware::from_fn(require_staff_session));

    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/treatments", axum::routing::get(treatment_list_endpoint))
        .route(
            "/api/v1/treatments/:condition",
            axum::routing::get(treatment_quote_endpoint),
        )
        .route(
            "/api/v1/treatments/:condition/advice",
            axum::routing::get(treatment_advice_endpoint),
        )
        .route("/api/v1/auth/login", axum::routing::post(login_endpoint))
        .merge(staff_only)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn treatment_list_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<TreatmentListResponse> {
    Json(TreatmentListResponse {
        conditions: state
            .catalog
            .conditions()
            .into_iter()
            .map(str::to_string)
            .collect(),
        cost_tiers: CostTier::ordered().iter().map(|tier| tier.label()).collect(),
    })
}

pub(crate) async fn treatment_quote_endpoint(
    Extension(state): Extension<AppState>,
    Path(condition): Path<String>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<QuoteResponse>, AppError> {
    let tier = match query.tier.as_deref() {
        None => CostTier::SaResidents,
        Some(raw) => CostTier::from_label(raw)
            .ok_or_else(|| AppError::BadRequest(format!("unknown cost tier '{raw}'")))?,
    };

    let quote = state.catalog.quote(&condition, tier)?;
    Ok(Json(QuoteResponse {
        cost_tier_label: tier.label(),
        cost_display: format_rand(quote.cost),
        quote,
    }))
}

pub(crate) async fn treatment_advice_endpoint(
    Extension(state): Extension<AppState>,
    Path(condition): Path<String>,
) -> Result<Json<TreatmentAdvice>, AppError> {
    Ok(Json(advise(&state.catalog, &condition)?))
}

pub(crate) async fn login_endpoint(
    Extension(state): Extension<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let client_ip = client_address(state.trust_forwarded_for, &headers, peer.as_ref());
    let session = state.authenticator.login(
        &request.username,
        &request.password,
        client_ip.as_deref(),
        auth_clock(),
    )?;

    Ok(Json(json!({
        "status": "authenticated",
        "username": session.username,
        "token": session.token,
        "expires_at": session.expires_at,
    })))
}

pub(crate) async fn logout_endpoint(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<StaffSession>,
) -> Json<serde_json::Value> {
    state.authenticator.logout(&session.token);
    Json(json!({
        "status": "signed_out",
        "username": session.username,
    }))
}

pub(crate) async fn resource_summary_endpoint(
    Json(request): Json<ResourceSummaryRequest>,
) -> Result<Json<ResourceSummaryResponse>, AppError> {
    let sheet = ResourceSheet::from_reader(Cursor::new(request.sheet_csv.into_bytes()))?;

    let hospitals = match request.hospital.as_deref().map(str::trim) {
        Some(hospital) if !hospital.is_empty() => {
            let summary = summarize_hospital(&sheet, hospital).ok_or_else(|| {
                AppError::BadRequest(format!("no wards recorded for hospital '{hospital}'"))
            })?;
            vec![summary]
        }
        _ => summarize_all(&sheet),
    };

    Ok(Json(ResourceSummaryResponse { hospitals }))
}

pub(crate) async fn resource_forecast_endpoint(
    Json(request): Json<ForecastRequest>,
) -> Json<ForecastResponse> {
    let observations = request.history.len();
    let points = forecast(&request.history);
    let message = if points.is_none() {
        Some(format!(
            "at least {MIN_OBSERVATIONS} daily observations are needed for a forecast"
        ))
    } else {
        None
    };

    Json(ForecastResponse {
        resource: request.resource,
        observations,
        forecast: points,
        message,
    })
}
