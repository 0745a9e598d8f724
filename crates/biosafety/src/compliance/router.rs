use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    AlertThreshold, DocumentId, DocumentOwner, EmployeeId, NewDocument, NewEmployee, NewProvider,
    NewVehicle, ProviderId, VehicleId,
};
use super::repository::{ComplianceRepository, RepositoryError, SettingsStore};
use super::service::{ComplianceService, ComplianceServiceError};
use super::status::local_today;
use super::taxonomy::{NewTrainingType, TrainingTypeId};

/// Bounds accepted by the settings endpoint, matching the operator UI slider.
pub const MIN_ALERT_DAYS: u32 = 5;
pub const MAX_ALERT_DAYS: u32 = 180;
pub const ALERT_DAYS_STEP: u32 = 5;

/// Router builder exposing the compliance board, settings and record management.
pub fn compliance_router<R, S>(service: Arc<ComplianceService<R, S>>) -> Router
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    Router::new()
        .route("/api/v1/compliance/report", get(report_handler::<R, S>))
        .route("/api/v1/compliance/alerts", get(alerts_handler::<R, S>))
        .route("/api/v1/compliance/fleet", get(fleet_handler::<R, S>))
        .route(
            "/api/v1/compliance/employees/:employee_id",
            get(employee_card_handler::<R, S>),
        )
        .route(
            "/api/v1/compliance/employees/:employee_id/narrative",
            get(employee_narrative_handler::<R, S>),
        )
        .route(
            "/api/v1/compliance/providers/:provider_id/narrative",
            get(provider_narrative_handler::<R, S>),
        )
        .route(
            "/api/v1/settings/alert-threshold",
            get(threshold_handler::<R, S>).put(update_threshold_handler::<R, S>),
        )
        .route("/api/v1/providers", post(create_provider_handler::<R, S>))
        .route(
            "/api/v1/providers/:provider_id",
            delete(delete_provider_handler::<R, S>),
        )
        .route(
            "/api/v1/providers/:provider_id/employees",
            post(create_employee_handler::<R, S>),
        )
        .route(
            "/api/v1/providers/:provider_id/vehicles",
            post(create_vehicle_handler::<R, S>),
        )
        .route(
            "/api/v1/employees/:employee_id",
            delete(delete_employee_handler::<R, S>),
        )
        .route(
            "/api/v1/employees/:employee_id/documents",
            post(create_employee_document_handler::<R, S>),
        )
        .route(
            "/api/v1/vehicles/:vehicle_id",
            delete(delete_vehicle_handler::<R, S>),
        )
        .route(
            "/api/v1/vehicles/:vehicle_id/documents",
            post(create_vehicle_document_handler::<R, S>),
        )
        .route(
            "/api/v1/documents/:document_id",
            delete(delete_document_handler::<R, S>),
        )
        .route(
            "/api/v1/training-types",
            get(training_types_handler::<R, S>).post(create_training_type_handler::<R, S>),
        )
        .route(
            "/api/v1/training-types/:training_type_id",
            delete(delete_training_type_handler::<R, S>),
        )
        .with_state(service)
}

/// Optional evaluation date; defaults to the local calendar date.
#[derive(Debug, Default, Deserialize)]
pub struct TodayQuery {
    pub today: Option<NaiveDate>,
}

impl TodayQuery {
    fn resolve(&self) -> NaiveDate {
        self.today.unwrap_or_else(local_today)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdPayload {
    pub days: u32,
}

type SharedService<R, S> = State<Arc<ComplianceService<R, S>>>;

pub(crate) async fn report_handler<R, S>(
    State(service): SharedService<R, S>,
    Query(query): Query<TodayQuery>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    match service.report(query.resolve()) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn alerts_handler<R, S>(
    State(service): SharedService<R, S>,
    Query(query): Query<TodayQuery>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    match service.alerts(query.resolve()) {
        Ok(alerts) => (StatusCode::OK, Json(alerts)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fleet_handler<R, S>(
    State(service): SharedService<R, S>,
    Query(query): Query<TodayQuery>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    match service.fleet(query.resolve()) {
        Ok(fleet) => (StatusCode::OK, Json(fleet)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn employee_card_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(employee_id): Path<String>,
    Query(query): Query<TodayQuery>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    match service.employee_card(&EmployeeId(employee_id), query.resolve()) {
        Ok(card) => (StatusCode::OK, Json(card)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn employee_narrative_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(employee_id): Path<String>,
    Query(query): Query<TodayQuery>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    match service.employee_narrative(&EmployeeId(employee_id), query.resolve()) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn provider_narrative_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(provider_id): Path<String>,
    Query(query): Query<TodayQuery>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    match service.provider_narrative(&ProviderId(provider_id), query.resolve()) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn threshold_handler<R, S>(State(service): SharedService<R, S>) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    match service.alert_threshold() {
        Ok(threshold) => (
            StatusCode::OK,
            Json(ThresholdPayload {
                days: threshold.get(),
            }),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_threshold_handler<R, S>(
    State(service): SharedService<R, S>,
    Json(payload): Json<ThresholdPayload>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    if !(MIN_ALERT_DAYS..=MAX_ALERT_DAYS).contains(&payload.days)
        || payload.days % ALERT_DAYS_STEP != 0
    {
        let payload = json!({
            "error": format!(
                "alert threshold must be between {MIN_ALERT_DAYS} and {MAX_ALERT_DAYS} days in steps of {ALERT_DAYS_STEP}"
            ),
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
    }

    match service.set_alert_threshold(AlertThreshold::days(payload.days)) {
        Ok(threshold) => (
            StatusCode::OK,
            Json(ThresholdPayload {
                days: threshold.get(),
            }),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_provider_handler<R, S>(
    State(service): SharedService<R, S>,
    Json(provider): Json<NewProvider>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    match service.add_provider(provider) {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_provider_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(provider_id): Path<String>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    deleted(service.remove_provider(&ProviderId(provider_id)))
}

pub(crate) async fn create_employee_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(provider_id): Path<String>,
    Json(employee): Json<NewEmployee>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    match service.add_employee(&ProviderId(provider_id), employee) {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_employee_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(employee_id): Path<String>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    deleted(service.remove_employee(&EmployeeId(employee_id)))
}

pub(crate) async fn create_vehicle_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(provider_id): Path<String>,
    Json(vehicle): Json<NewVehicle>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    match service.add_vehicle(&ProviderId(provider_id), vehicle) {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_vehicle_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(vehicle_id): Path<String>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    deleted(service.remove_vehicle(&VehicleId(vehicle_id)))
}

pub(crate) async fn create_employee_document_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(employee_id): Path<String>,
    Json(document): Json<NewDocument>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    let owner = DocumentOwner::Employee(EmployeeId(employee_id));
    match service.add_document(&owner, document) {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_vehicle_document_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(vehicle_id): Path<String>,
    Json(document): Json<NewDocument>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    let owner = DocumentOwner::Vehicle(VehicleId(vehicle_id));
    match service.add_document(&owner, document) {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_document_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(document_id): Path<String>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    deleted(service.remove_document(&DocumentId(document_id)))
}

pub(crate) async fn training_types_handler<R, S>(State(service): SharedService<R, S>) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    match service.training_types() {
        Ok(types) => (StatusCode::OK, Json(types)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_training_type_handler<R, S>(
    State(service): SharedService<R, S>,
    Json(training_type): Json<NewTrainingType>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    match service.add_training_type(training_type) {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_training_type_handler<R, S>(
    State(service): SharedService<R, S>,
    Path(training_type_id): Path<String>,
) -> Response
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    deleted(service.remove_training_type(&TrainingTypeId(training_type_id)))
}

fn deleted(result: Result<(), ComplianceServiceError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ComplianceServiceError) -> Response {
    let status = match &error {
        error if error.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
        ComplianceServiceError::TrainingTypeHasChildren(_)
        | ComplianceServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ComplianceServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ComplianceServiceError::Repository(RepositoryError::Unavailable(_))
        | ComplianceServiceError::Settings(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!(%error, "compliance request failed");
    }

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
