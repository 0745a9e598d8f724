use chrono::NaiveDate;

use super::super::dedup::{is_superseded, latest_per_type};
use super::super::domain::{AlertThreshold, Document, DocumentStatus, Employee, Provider};
use super::super::scoring::{ProviderScore, ScoringEngine};
use super::alerts::expired_alerts;
use super::views::{
    ComplianceReportSummary, DocumentView, EmployeeCardView, ExpiredAlertView, FacilitySummary,
};

const SHIFT_HOURS: f64 = 8.8;
const PRODUCTIVITY_FACTOR: f64 = 0.85;

/// One evaluation pass over a snapshot of providers.
#[derive(Debug)]
pub struct ComplianceReport {
    pub today: NaiveDate,
    pub threshold: AlertThreshold,
    pub provider_scores: Vec<ProviderScore>,
    pub facility: FacilitySummary,
    pub alerts: Vec<ExpiredAlertView>,
}

impl ComplianceReport {
    pub fn evaluate(
        providers: &[Provider],
        engine: &ScoringEngine,
        today: NaiveDate,
        threshold: AlertThreshold,
    ) -> Self {
        let provider_scores: Vec<ProviderScore> = providers
            .iter()
            .map(|provider| engine.score_provider(provider, today, threshold))
            .collect();

        let facility = facility_summary(providers, &provider_scores, today, threshold);

        let alerts = expired_alerts(providers, engine.policy(), today, threshold)
            .iter()
            .map(|alert| alert.to_view(today))
            .collect();

        tracing::debug!(
            providers = facility.provider_count,
            blocked = facility.blocked_provider_count,
            average_score = facility.average_score,
            %threshold,
            "compliance pass complete"
        );

        Self {
            today,
            threshold,
            provider_scores,
            facility,
            alerts,
        }
    }

    /// Providers ordered from highest to lowest risk: ascending score, then name.
    pub fn risk_ranking(&self) -> Vec<ProviderScore> {
        let mut ranking = self.provider_scores.clone();
        ranking.sort_by(|a, b| {
            a.score
                .cmp(&b.score)
                .then_with(|| a.provider_name.cmp(&b.provider_name))
        });
        ranking
    }

    pub fn summary(&self) -> ComplianceReportSummary {
        let risk_ranking = self.risk_ranking();
        let insights = super::generate_insights(
            &self.facility,
            &risk_ranking,
            &self.alerts,
            self.threshold,
        );

        ComplianceReportSummary {
            today: self.today,
            alert_threshold_days: self.threshold.get(),
            facility: self.facility.clone(),
            risk_ranking,
            alerts: self.alerts.clone(),
            insights,
        }
    }
}

/// Facility-wide rollup. Expired and expiring counts only consider the latest
/// certificate per type, matching what the scores and alerts see.
pub fn facility_summary(
    providers: &[Provider],
    scores: &[ProviderScore],
    today: NaiveDate,
    threshold: AlertThreshold,
) -> FacilitySummary {
    let mut total_employees = 0;
    let mut total_expired = 0;
    let mut total_expiring = 0;

    for employee in providers.iter().flat_map(|provider| &provider.employees) {
        total_employees += 1;
        let (expired, expiring) = count_statuses(employee, today, threshold);
        total_expired += expired;
        total_expiring += expiring;
    }

    let provider_count = scores.len();
    let average_score = if provider_count == 0 {
        100.0
    } else {
        scores
            .iter()
            .map(|score| f64::from(score.score))
            .sum::<f64>()
            / provider_count as f64
    };

    let blocked: Vec<&ProviderScore> = scores.iter().filter(|score| score.is_blocked).collect();
    let blocked_employees: usize = blocked.iter().map(|score| score.employee_count).sum();

    FacilitySummary {
        provider_count,
        total_employees,
        total_expired,
        total_expiring,
        average_score,
        blocked_provider_count: blocked.len(),
        critical_alerts_count: scores.iter().map(|score| score.critical_alerts_count).sum(),
        estimated_blocked_hours: blocked_employees as f64 * SHIFT_HOURS * PRODUCTIVITY_FACTOR,
    }
}

fn count_statuses(
    employee: &Employee,
    today: NaiveDate,
    threshold: AlertThreshold,
) -> (usize, usize) {
    latest_per_type(&employee.documents)
        .values()
        .fold((0, 0), |(expired, expiring), document| {
            match document.status(today, threshold) {
                DocumentStatus::Expired => (expired + 1, expiring),
                DocumentStatus::Expiring => (expired, expiring + 1),
                DocumentStatus::Valid => (expired, expiring),
            }
        })
}

/// Resolve a list of certificates for display, flagging superseded reissues.
pub fn document_views(
    documents: &[Document],
    today: NaiveDate,
    threshold: AlertThreshold,
) -> Vec<DocumentView> {
    let latest = latest_per_type(documents);
    let mut views: Vec<DocumentView> = documents
        .iter()
        .map(|document| {
            let status = document.status(today, threshold);
            DocumentView {
                id: document.id.clone(),
                doc_type: document.doc_type.clone(),
                issue_date: document.issue_date,
                expiry_date: document.expiry_date,
                status,
                status_label: status.label(),
                days_until_expiry: document.days_until_expiry(today),
                superseded: is_superseded(document, &latest),
                description: document.description.clone(),
            }
        })
        .collect();

    views.sort_by(|a, b| {
        a.doc_type
            .cmp(&b.doc_type)
            .then_with(|| b.expiry_date.cmp(&a.expiry_date))
    });
    views
}

pub fn employee_card(
    provider: &Provider,
    employee: &Employee,
    today: NaiveDate,
    threshold: AlertThreshold,
) -> EmployeeCardView {
    let (expired, expiring) = count_statuses(employee, today, threshold);

    EmployeeCardView {
        provider_id: provider.id.clone(),
        provider_name: provider.name.clone(),
        employee_id: employee.id.clone(),
        name: employee.name.clone(),
        role: employee.role.clone(),
        documents: document_views(&employee.documents, today, threshold),
        expired,
        expiring,
    }
}
