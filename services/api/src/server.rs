use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryComplianceRepository, InMemorySettingsStore, TemplateNarrator};
use crate::routes::with_compliance_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use biosafety::compliance::{AlertThreshold, ComplianceService, ScoringPolicy};
use biosafety::config::AppConfig;
use biosafety::error::AppError;
use biosafety::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(days) = args.alert_days.take() {
        config.compliance.alert_threshold = AlertThreshold::days(days);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryComplianceRepository::default());
    let settings = Arc::new(InMemorySettingsStore::new(
        config.compliance.alert_threshold,
    ));
    let compliance_service = Arc::new(ComplianceService::new(
        repository,
        settings,
        Arc::new(TemplateNarrator),
        ScoringPolicy::standard(),
    ));

    let app = with_compliance_routes(compliance_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        alert_threshold = %config.compliance.alert_threshold,
        "biosafety compliance service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
