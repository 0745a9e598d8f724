use std::collections::BTreeMap;

use super::super::domain::AlertThreshold;
use super::super::scoring::{ProviderScore, ScoreFinding};
use super::views::{ComplianceInsights, ExpiredAlertView, FacilitySummary, RiskLevel};

pub(crate) fn generate_insights(
    facility: &FacilitySummary,
    ranking: &[ProviderScore],
    alerts: &[ExpiredAlertView],
    threshold: AlertThreshold,
) -> ComplianceInsights {
    let blocked = facility.blocked_provider_count;
    let majority_blocked = facility.provider_count > 0 && blocked * 2 >= facility.provider_count;

    let risk_level = if blocked == 0
        && facility.critical_alerts_count == 0
        && facility.average_score >= 90.0
    {
        RiskLevel::Compliant
    } else if majority_blocked || facility.average_score < 60.0 {
        RiskLevel::Critical
    } else {
        RiskLevel::Attention
    };

    let mut observations = Vec::new();
    if facility.provider_count > 0 {
        observations.push(format!(
            "{} of {} provider(s) blocked, average score {:.0}%",
            blocked, facility.provider_count, facility.average_score
        ));
    }

    if let Some(worst) = ranking.first().filter(|score| score.score < 100) {
        observations.push(format!(
            "{} carries the highest risk with score {}",
            worst.provider_name, worst.score
        ));
    }

    let mut expired_by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for alert in alerts {
        *expired_by_type.entry(alert.doc_type.as_str()).or_default() += 1;
    }
    if let Some((doc_type, count)) = expired_by_type
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
    {
        observations.push(format!(
            "{doc_type} accounts for {count} expired certificate(s)"
        ));
    }

    if facility.total_expiring > 0 {
        observations.push(format!(
            "{} certificate(s) expire within the {}-day alert window",
            facility.total_expiring,
            threshold.get()
        ));
    }

    if facility.estimated_blocked_hours > 0.0 {
        observations.push(format!(
            "Estimated {:.1} productive hours lost per day to blocked personnel",
            facility.estimated_blocked_hours
        ));
    }

    if observations.is_empty() {
        observations.push("No providers registered; nothing to evaluate".to_string());
    }

    let mut recommended_actions: Vec<String> = ranking
        .iter()
        .filter(|score| score.is_blocked)
        .take(3)
        .map(|score| {
            format!(
                "Notify {} and suspend site access ({})",
                score.provider_name,
                score.block_summary().unwrap_or_default()
            )
        })
        .collect();

    let providers_with_gaps = ranking
        .iter()
        .filter(|score| {
            score
                .components
                .iter()
                .any(|component| component.finding == ScoreFinding::Missing)
        })
        .count();
    if providers_with_gaps > 0 {
        recommended_actions.push(format!(
            "Request missing critical certificates from {providers_with_gaps} provider(s)"
        ));
    }

    if facility.total_expiring > 0 {
        recommended_actions.push(format!(
            "Schedule renewals for {} certificate(s) before they lapse",
            facility.total_expiring
        ));
    }

    ComplianceInsights {
        risk_level,
        observations,
        recommended_actions,
    }
}
