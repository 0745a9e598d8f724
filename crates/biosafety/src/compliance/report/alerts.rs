use chrono::NaiveDate;

use super::super::dedup::latest_per_type;
use super::super::domain::{AlertThreshold, Document, DocumentStatus, Employee, Provider};
use super::super::scoring::ScoringPolicy;
use super::views::ExpiredAlertView;

/// Expired certificate that is still the latest of its type for the employee.
#[derive(Debug, Clone, Copy)]
pub struct ExpiredDocumentAlert<'a> {
    pub provider: &'a Provider,
    pub employee: &'a Employee,
    pub document: &'a Document,
    pub critical: bool,
}

impl ExpiredDocumentAlert<'_> {
    pub fn to_view(&self, today: NaiveDate) -> ExpiredAlertView {
        ExpiredAlertView {
            provider_id: self.provider.id.clone(),
            provider_name: self.provider.name.clone(),
            employee_id: self.employee.id.clone(),
            employee_name: self.employee.name.clone(),
            document_id: self.document.id.clone(),
            doc_type: self.document.doc_type.clone(),
            expiry_date: self.document.expiry_date,
            days_overdue: -self.document.days_until_expiry(today),
            critical: self.critical,
        }
    }
}

/// Collect one alert per expired latest-per-type certificate.
///
/// Superseded certificates are never evaluated, so an old expired ASO with a
/// valid reissue on file stays silent.
pub fn expired_alerts<'a>(
    providers: &'a [Provider],
    policy: &ScoringPolicy,
    today: NaiveDate,
    threshold: AlertThreshold,
) -> Vec<ExpiredDocumentAlert<'a>> {
    let mut alerts = Vec::new();

    for provider in providers {
        for employee in &provider.employees {
            for document in latest_per_type(&employee.documents).into_values() {
                if document.status(today, threshold) != DocumentStatus::Expired {
                    continue;
                }
                alerts.push(ExpiredDocumentAlert {
                    provider,
                    employee,
                    document,
                    critical: policy.is_critical(&document.doc_type),
                });
            }
        }
    }

    alerts
}
