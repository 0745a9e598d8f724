use crate::infra::{InMemoryComplianceRepository, InMemorySettingsStore, TemplateNarrator};
use biosafety::compliance::{
    fleet_report, local_today, AlertThreshold, CertificateCsvImporter, ComplianceReport,
    ComplianceReportSummary, ComplianceService, ComplianceServiceError, DataQualityIssue,
    DocumentOwner, FleetReport, ImportedSnapshot, NewDocument, NewEmployee, NewProvider,
    NewTrainingType, NewVehicle, RegistrationStatus, ScoringEngine, ScoringPolicy,
    SnapshotImporter,
};
use biosafety::error::AppError;
use chrono::NaiveDate;
use clap::{ArgGroup, Args};
use std::path::PathBuf;
use std::sync::Arc;

type DemoService = ComplianceService<InMemoryComplianceRepository, InMemorySettingsStore>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the evaluation date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Alert window in days for certificates about to expire.
    #[arg(long = "alert-days")]
    pub(crate) alert_days: Option<u32>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["snapshot", "csv"])))]
pub(crate) struct ReportArgs {
    /// JSON array of provider records
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
    /// Certificate sheet with one row per certificate
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Evaluation date for the report (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Alert window in days (defaults to 30)
    #[arg(long = "alert-days")]
    pub(crate) alert_days: Option<u32>,
    /// List every expired certificate, not only the critical ones
    #[arg(long)]
    pub(crate) list_alerts: bool,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        snapshot,
        csv,
        today,
        alert_days,
        list_alerts,
    } = args;

    let today = today.unwrap_or_else(local_today);
    let threshold = alert_days.map(AlertThreshold::days).unwrap_or_default();

    let imported = load_snapshot(snapshot, csv, today)?;
    let engine = ScoringEngine::new(ScoringPolicy::standard());
    let report = ComplianceReport::evaluate(&imported.providers, &engine, today, threshold);
    let fleet = fleet_report(&imported.providers, today, threshold);

    render_report(&report.summary(), &fleet, &imported.issues, list_alerts);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, alert_days } = args;

    let today = today.unwrap_or_else(local_today);
    let threshold = alert_days.map(AlertThreshold::days).unwrap_or_default();

    let service = ComplianceService::new(
        Arc::new(InMemoryComplianceRepository::default()),
        Arc::new(InMemorySettingsStore::new(threshold)),
        Arc::new(TemplateNarrator),
        ScoringPolicy::standard(),
    );
    seed_demo_facility(&service)?;

    println!("BioSafety compliance demo");
    println!("Training taxonomy:");
    for view in service.training_types()? {
        println!("  - {}", view.path);
    }

    let summary = service.report(today)?;
    let fleet = service.fleet(today)?;
    render_report(&summary, &fleet, &[], true);

    println!("\nNarratives");
    for provider in service.providers()? {
        let view = service.provider_narrative(&provider.id, today)?;
        println!("\n[{}]\n{}", provider.name, view.narrative);
        for employee in &provider.employees {
            let view = service.employee_narrative(&employee.id, today)?;
            println!("\n[{} / {}]\n{}", provider.name, employee.name, view.narrative);
        }
    }

    Ok(())
}

fn load_snapshot(
    snapshot: Option<PathBuf>,
    csv: Option<PathBuf>,
    today: NaiveDate,
) -> Result<ImportedSnapshot, AppError> {
    let imported = match (snapshot, csv) {
        (_, Some(path)) => CertificateCsvImporter::from_path(path, today)?,
        (Some(path), None) => SnapshotImporter::from_path(path, today)?,
        (None, None) => ImportedSnapshot::default(),
    };
    Ok(imported)
}

// Seed dates are literals; an out-of-range one would show up as 1970-01-01.
fn date((year, month, day): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn certificate(
    doc_type: &str,
    issued: (i32, u32, u32),
    expires: (i32, u32, u32),
) -> NewDocument {
    NewDocument {
        doc_type: doc_type.to_string(),
        issue_date: Some(date(issued)),
        expiry_date: date(expires),
        description: None,
        file_url: None,
    }
}

/// Two contractors with a mix of lapsed, expiring and missing certificates.
pub(crate) fn seed_demo_facility(service: &DemoService) -> Result<(), ComplianceServiceError> {
    let mut nr10 = None;
    for name in ["NR-10", "NR-11", "NR-20", "NR-33", "NR-35", "ASO", "CRLV"] {
        let created = service.add_training_type(NewTrainingType {
            name: name.to_string(),
            parent_id: None,
        })?;
        if name == "NR-10" {
            nr10 = Some(created.id);
        }
    }
    service.add_training_type(NewTrainingType {
        name: "SEP".to_string(),
        parent_id: nr10,
    })?;

    let gas_tech = service.add_provider(NewProvider {
        name: "Gás-Tech Manutenção Ltda".to_string(),
        cnpj: "12.345.678/0001-90".to_string(),
        contact_email: "contato@gastech.com".to_string(),
        status: RegistrationStatus::Active,
    })?;
    let roberto = service.add_employee(
        &gas_tech.id,
        NewEmployee {
            name: "Roberto Silva".to_string(),
            cpf: "123.456.789-00".to_string(),
            role: "Soldador Especialista".to_string(),
        },
    )?;
    let owner = DocumentOwner::Employee(roberto.id);
    service.add_document(&owner, certificate("NR-33", (2023, 1, 1), (2024, 1, 1)))?;
    service.add_document(&owner, certificate("NR-35", (2024, 2, 15), (2025, 2, 15)))?;
    service.add_document(&owner, certificate("ASO", (2023, 11, 20), (2024, 5, 20)))?;
    service.add_document(
        &owner,
        certificate("NR-10 › SEP", (2024, 3, 1), (2026, 3, 1)),
    )?;

    let logistica = service.add_provider(NewProvider {
        name: "Logística Verde Transportes".to_string(),
        cnpj: "98.765.432/0001-21".to_string(),
        contact_email: "rh@logverde.com.br".to_string(),
        status: RegistrationStatus::Pending,
    })?;
    let ana = service.add_employee(
        &logistica.id,
        NewEmployee {
            name: "Ana Paula Oliveira".to_string(),
            cpf: "987.654.321-00".to_string(),
            role: "Operadora de Máquinas".to_string(),
        },
    )?;
    service.add_document(
        &DocumentOwner::Employee(ana.id),
        certificate("NR-11", (2024, 1, 10), (2025, 1, 10)),
    )?;

    let truck = service.add_vehicle(
        &logistica.id,
        NewVehicle {
            plate: "abc1d23".to_string(),
            model: "Volvo FH 540".to_string(),
            kind: "Caminhão".to_string(),
            status: RegistrationStatus::Active,
        },
    )?;
    service.add_document(
        &DocumentOwner::Vehicle(truck.id),
        certificate("CRLV", (2024, 1, 2), (2024, 12, 31)),
    )?;

    Ok(())
}

pub(crate) fn render_report(
    summary: &ComplianceReportSummary,
    fleet: &FleetReport,
    issues: &[DataQualityIssue],
    list_alerts: bool,
) {
    let facility = &summary.facility;
    println!(
        "\nFacility compliance as of {} (alert window {} days)",
        summary.today, summary.alert_threshold_days
    );
    println!(
        "- {} provider(s), {} employee(s), average score {:.1}",
        facility.provider_count, facility.total_employees, facility.average_score
    );
    println!(
        "- {} expired | {} expiring | {} blocked provider(s) | {} critical alert(s)",
        facility.total_expired,
        facility.total_expiring,
        facility.blocked_provider_count,
        facility.critical_alerts_count
    );
    if facility.estimated_blocked_hours > 0.0 {
        println!(
            "- ~{:.1} labor hours/day held at the gate",
            facility.estimated_blocked_hours
        );
    }

    println!("\nRisk ranking:");
    for score in &summary.risk_ranking {
        println!(
            "  - {} | score {} | {} | {} employee(s)",
            score.provider_name,
            score.score,
            score.authorization_label(),
            score.employee_count
        );
        if let Some(reasons) = score.block_summary() {
            println!("      blocked: {reasons}");
        }
    }

    let shown: Vec<_> = summary
        .alerts
        .iter()
        .filter(|alert| list_alerts || alert.critical)
        .collect();
    if shown.is_empty() {
        println!("\nNo expired certificates.");
    } else {
        println!("\nExpired certificates:");
        for alert in shown {
            println!(
                "  - {} ({}) | {} expired {} ({} days overdue){}",
                alert.employee_name,
                alert.provider_name,
                alert.doc_type,
                alert.expiry_date,
                alert.days_overdue,
                if alert.critical { " [critical]" } else { "" }
            );
        }
    }

    println!("\nInsights: {}", summary.insights.risk_level.label());
    for observation in &summary.insights.observations {
        println!("  * {observation}");
    }
    for action in &summary.insights.recommended_actions {
        println!("  > {action}");
    }

    if fleet.summary.vehicle_count > 0 {
        println!(
            "\nFleet: {} vehicle(s), {} with expired documents, {} expiring",
            fleet.summary.vehicle_count,
            fleet.summary.vehicles_with_expired,
            fleet.summary.total_expiring
        );
        for vehicle in &fleet.vehicles {
            println!(
                "  - {} {} ({}) | {} expired | {} expiring",
                vehicle.plate,
                vehicle.model,
                vehicle.provider_name,
                vehicle.expired,
                vehicle.expiring
            );
        }
    }

    if !issues.is_empty() {
        println!("\nData quality ({} issue(s)):", issues.len());
        for issue in issues {
            println!("  - {}: {}", issue.record, issue.kind);
        }
    }
}
