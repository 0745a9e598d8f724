use biosafety::compliance::{
    expired_alerts, latest_per_type, resolve_status, AlertThreshold, ComplianceReport, Document,
    DocumentId, DocumentStatus, Employee, EmployeeId, Provider, ProviderId, RegistrationStatus,
    ScoringEngine, ScoringPolicy,
};
use chrono::NaiveDate;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn certificate(id: &str, doc_type: &str, expiry_date: NaiveDate) -> Document {
    Document {
        id: DocumentId(id.to_string()),
        doc_type: doc_type.to_string(),
        issue_date: None,
        expiry_date,
        description: None,
        file_url: None,
    }
}

fn single_employee_provider(documents: Vec<Document>) -> Provider {
    Provider {
        id: ProviderId("gas-tech".to_string()),
        name: "Gás-Tech Manutenção Ltda".to_string(),
        cnpj: "12.345.678/0001-90".to_string(),
        contact_email: "contato@gastech.com".to_string(),
        status: RegistrationStatus::Active,
        employees: vec![Employee {
            id: EmployeeId("roberto".to_string()),
            name: "Roberto Silva".to_string(),
            cpf: "123.456.789-00".to_string(),
            role: "Soldador".to_string(),
            documents,
        }],
        vehicles: Vec::new(),
    }
}

#[test]
fn threshold_window_is_inclusive_on_both_ends() {
    let today = date(2024, 6, 1);
    let threshold = AlertThreshold::days(30);

    let cases = [
        (date(2024, 6, 15), DocumentStatus::Expiring),
        (date(2024, 6, 1), DocumentStatus::Expiring),
        (date(2024, 5, 31), DocumentStatus::Expired),
        (date(2024, 7, 1), DocumentStatus::Expiring),
        (date(2024, 7, 2), DocumentStatus::Valid),
        (date(2024, 7, 5), DocumentStatus::Valid),
    ];

    for (expiry, expected) in cases {
        assert_eq!(
            resolve_status(expiry, today, threshold),
            expected,
            "expiry {expiry} should resolve to {expected:?}"
        );
    }
}

#[test]
fn latest_per_type_is_idempotent() {
    let documents = vec![
        certificate("aso-2023", "ASO", date(2023, 5, 20)),
        certificate("aso-2025", "ASO", date(2025, 5, 20)),
        certificate("nr35", "NR-35", date(2024, 9, 1)),
    ];

    let first: Vec<Document> = latest_per_type(&documents).into_values().cloned().collect();
    let second: Vec<Document> = latest_per_type(&first).into_values().cloned().collect();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert!(first.iter().any(|document| document.id.0 == "aso-2025"));
}

#[test]
fn expired_nr33_alone_blocks_the_provider() {
    let today = date(2024, 6, 1);
    let threshold = AlertThreshold::default();
    let valid = date(2025, 1, 1);
    let provider = single_employee_provider(vec![
        certificate("nr33", "NR-33", date(2024, 3, 1)),
        certificate("nr35", "NR-35", valid),
        certificate("nr10", "NR-10", valid),
        certificate("nr20", "NR-20", valid),
        certificate("aso", "ASO", valid),
    ]);
    let providers = vec![provider];

    let engine = ScoringEngine::new(ScoringPolicy::standard());
    let report = ComplianceReport::evaluate(&providers, &engine, today, threshold);

    assert_eq!(report.provider_scores[0].score, 80);
    assert!(report.provider_scores[0].is_blocked);
    assert_eq!(report.facility.critical_alerts_count, 1);
    assert_eq!(report.facility.blocked_provider_count, 1);
    assert_eq!(report.facility.average_score, 80.0);

    let alerts = expired_alerts(&providers, engine.policy(), today, threshold);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].document.id.0, "nr33");
    assert_eq!(alerts[0].employee.name, "Roberto Silva");
}

#[test]
fn threshold_changes_never_touch_scores() {
    let today = date(2024, 6, 1);
    let provider = single_employee_provider(vec![certificate("aso", "ASO", date(2024, 6, 20))]);
    let engine = ScoringEngine::default();

    let narrow = engine.score_provider(&provider, today, AlertThreshold::days(5));
    let wide = engine.score_provider(&provider, today, AlertThreshold::days(180));

    assert_eq!(narrow.score, wide.score);
    assert_eq!(narrow.score, 80);
}

#[test]
fn report_summary_serializes_for_presentation() {
    let today = date(2024, 6, 1);
    let providers = vec![single_employee_provider(Vec::new())];
    let report = ComplianceReport::evaluate(
        &providers,
        &ScoringEngine::default(),
        today,
        AlertThreshold::default(),
    );

    let value = serde_json::to_value(report.summary()).expect("serializable");

    assert_eq!(value["alert_threshold_days"], 30);
    assert_eq!(value["facility"]["total_employees"], 1);
    assert_eq!(value["risk_ranking"][0]["score"], 75);
    assert_eq!(value["risk_ranking"][0]["components"][0]["finding"], "missing");
    assert!(value["alerts"].as_array().expect("alerts").is_empty());
}
