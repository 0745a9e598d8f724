use chrono::NaiveDate;

use super::super::dedup::latest_per_type;
use super::super::domain::{AlertThreshold, DocumentStatus, Provider};
use super::config::ScoringPolicy;
use super::{ScoreComponent, ScoreFinding};

pub(crate) struct ScoreSignals {
    pub total_penalty: u32,
    pub critical_alerts: usize,
    pub expired_critical_types: Vec<String>,
}

/// Walk every employee/critical-type pair of the provider. Penalties add up
/// across employees.
pub(crate) fn score_employees(
    provider: &Provider,
    policy: &ScoringPolicy,
    today: NaiveDate,
    threshold: AlertThreshold,
) -> (Vec<ScoreComponent>, ScoreSignals) {
    let mut components = Vec::new();
    let mut total_penalty: u32 = 0;
    let mut critical_alerts = 0;
    let mut expired_critical_types: Vec<String> = Vec::new();

    for employee in &provider.employees {
        let latest = latest_per_type(&employee.documents);

        for critical in &policy.critical_types {
            match latest.get(critical.name.as_str()) {
                None => {
                    components.push(ScoreComponent {
                        employee_id: employee.id.clone(),
                        employee_name: employee.name.clone(),
                        doc_type: critical.name.clone(),
                        finding: ScoreFinding::Missing,
                        penalty: policy.missing_penalty,
                        notes: format!("{} has no {} on file", employee.name, critical.name),
                    });
                    total_penalty = total_penalty.saturating_add(policy.missing_penalty);
                }
                Some(document) => {
                    if document.status(today, threshold) != DocumentStatus::Expired {
                        continue;
                    }

                    components.push(ScoreComponent {
                        employee_id: employee.id.clone(),
                        employee_name: employee.name.clone(),
                        doc_type: critical.name.clone(),
                        finding: ScoreFinding::Expired,
                        penalty: critical.expired_penalty,
                        notes: format!(
                            "{} for {} expired on {}",
                            critical.name, employee.name, document.expiry_date
                        ),
                    });
                    total_penalty = total_penalty.saturating_add(critical.expired_penalty);
                    critical_alerts += 1;
                    if !expired_critical_types.contains(&critical.name) {
                        expired_critical_types.push(critical.name.clone());
                    }
                }
            }
        }
    }

    let signals = ScoreSignals {
        total_penalty,
        critical_alerts,
        expired_critical_types,
    };

    (components, signals)
}
