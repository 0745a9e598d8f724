use crate::infra::{deserialize_optional_date, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use biosafety::compliance::ingest::RawProvider;
use biosafety::compliance::{
    compliance_router, fleet_report, local_today, AlertThreshold, CertificateCsvImporter,
    ComplianceInsights, ComplianceReport, ComplianceRepository, ComplianceService,
    DataQualityIssue, ExpiredAlertView, FacilitySummary, FleetSummary, ProviderScore,
    ScoringEngine, ScoringPolicy, SettingsStore, SnapshotImporter,
};
use biosafety::error::AppError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

/// Stateless evaluation of a posted snapshot. `certificates_csv` wins over `providers`.
#[derive(Debug, Deserialize)]
pub(crate) struct EvaluateRequest {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) alert_threshold_days: Option<u32>,
    #[serde(default)]
    pub(crate) providers: Vec<RawProvider>,
    #[serde(default)]
    pub(crate) certificates_csv: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EvaluateResponse {
    pub(crate) today: NaiveDate,
    pub(crate) alert_threshold_days: u32,
    pub(crate) data_source: SnapshotSource,
    pub(crate) facility: FacilitySummary,
    pub(crate) risk_ranking: Vec<ProviderScore>,
    pub(crate) alerts: Vec<ExpiredAlertView>,
    pub(crate) insights: ComplianceInsights,
    pub(crate) fleet: FleetSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) data_quality: Vec<DataQualityIssue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SnapshotSource {
    Json,
    Csv,
}

pub(crate) fn with_compliance_routes<R, S>(service: Arc<ComplianceService<R, S>>) -> axum::Router
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    compliance_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/compliance/evaluate",
            axum::routing::post(evaluate_endpoint),
        )
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

pub(crate) async fn evaluate_endpoint(
    Json(payload): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, AppError> {
    let EvaluateRequest {
        today,
        alert_threshold_days,
        providers,
        certificates_csv,
    } = payload;

    let today = today.unwrap_or_else(local_today);
    let threshold = alert_threshold_days
        .map(AlertThreshold::days)
        .unwrap_or_default();

    let (snapshot, data_source) = if let Some(csv) = certificates_csv {
        let reader = Cursor::new(csv.into_bytes());
        let snapshot = CertificateCsvImporter::from_reader(reader, today)?;
        (snapshot, SnapshotSource::Csv)
    } else {
        (SnapshotImporter::from_raw(providers, today), SnapshotSource::Json)
    };

    let engine = ScoringEngine::new(ScoringPolicy::standard());
    let report = ComplianceReport::evaluate(&snapshot.providers, &engine, today, threshold);
    let summary = report.summary();
    let fleet = fleet_report(&snapshot.providers, today, threshold);

    tracing::info!(
        providers = snapshot.providers.len(),
        issues = snapshot.issues.len(),
        ?data_source,
        "evaluated posted snapshot"
    );

    Ok(Json(EvaluateResponse {
        today,
        alert_threshold_days: threshold.get(),
        data_source,
        facility: summary.facility,
        risk_ranking: summary.risk_ranking,
        alerts: summary.alerts,
        insights: summary.insights,
        fleet: fleet.summary,
        data_quality: snapshot.issues,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
    }

    fn raw_providers(value: serde_json::Value) -> Vec<RawProvider> {
        serde_json::from_value(value).expect("raw providers")
    }

    #[tokio::test]
    async fn evaluate_endpoint_scores_posted_snapshot() {
        let providers = raw_providers(json!([
            {
                "id": 1,
                "name": "Gás-Tech Manutenção Ltda",
                "cnpj": "12.345.678/0001-90",
                "employees": [{
                    "id": "e1",
                    "name": "Roberto Silva",
                    "documents": [
                        { "id": "d1", "type": "NR-33", "issueDate": "2023-01-01", "expiryDate": "2024-01-01" },
                        { "id": "d2", "type": "NR-35", "expiryDate": "2025-02-15" },
                        { "id": "d3", "type": "ASO", "expiryDate": "" }
                    ]
                }]
            }
        ]));
        let request = EvaluateRequest {
            today: Some(today()),
            alert_threshold_days: Some(30),
            providers,
            certificates_csv: None,
        };

        let Json(body) = evaluate_endpoint(Json(request))
            .await
            .expect("evaluation succeeds");

        assert_eq!(body.data_source, SnapshotSource::Json);
        assert_eq!(body.facility.provider_count, 1);
        assert_eq!(body.facility.blocked_provider_count, 1);
        assert!(body.risk_ranking[0].is_blocked);
        assert!(body.alerts.iter().any(|alert| alert.doc_type == "NR-33"));
        assert_eq!(body.data_quality.len(), 1);
    }

    #[tokio::test]
    async fn evaluate_endpoint_prefers_certificate_sheet() {
        let csv = "Provider,CNPJ,Employee,CPF,Role,Type,Issue Date,Expiry Date\n\
Logística Verde,98.765.432/0001-21,Ana Paula Oliveira,111.222.333-44,Operadora,NR-11,2024-01-10,2025-01-10\n";
        let request = EvaluateRequest {
            today: Some(today()),
            alert_threshold_days: None,
            providers: Vec::new(),
            certificates_csv: Some(csv.to_string()),
        };

        let Json(body) = evaluate_endpoint(Json(request))
            .await
            .expect("evaluation succeeds");

        assert_eq!(body.data_source, SnapshotSource::Csv);
        assert_eq!(body.alert_threshold_days, 30);
        assert_eq!(body.facility.total_employees, 1);
        assert!(body.data_quality.is_empty());
    }

    #[tokio::test]
    async fn evaluate_endpoint_rejects_malformed_sheet() {
        let request = EvaluateRequest {
            today: Some(today()),
            alert_threshold_days: None,
            providers: Vec::new(),
            certificates_csv: Some("Provider,CNPJ\nonly,two\n".to_string()),
        };

        let error = evaluate_endpoint(Json(request))
            .await
            .expect_err("missing columns");

        assert!(matches!(error, AppError::Import(_)));
    }
}
