use super::super::domain::{
    DocumentId, DocumentStatus, EmployeeId, ProviderId, RegistrationStatus, VehicleId,
};
use super::super::scoring::ProviderScore;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentView {
    pub id: DocumentId,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
    pub status: DocumentStatus,
    pub status_label: &'static str,
    pub days_until_expiry: i64,
    pub superseded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeCardView {
    pub provider_id: ProviderId,
    pub provider_name: String,
    pub employee_id: EmployeeId,
    pub name: String,
    pub role: String,
    pub documents: Vec<DocumentView>,
    pub expired: usize,
    pub expiring: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpiredAlertView {
    pub provider_id: ProviderId,
    pub provider_name: String,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub document_id: DocumentId,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub expiry_date: NaiveDate,
    pub days_overdue: i64,
    pub critical: bool,
}

/// Facility-wide totals. `total_expired` and `total_expiring` count one
/// certificate per employee and type, the most recent by expiry date. A
/// superseded certificate that has lapsed is not counted, so these totals can
/// be lower than a raw per-document tally of the same snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilitySummary {
    pub provider_count: usize,
    pub total_employees: usize,
    pub total_expired: usize,
    pub total_expiring: usize,
    pub average_score: f64,
    pub blocked_provider_count: usize,
    pub critical_alerts_count: usize,
    pub estimated_blocked_hours: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleStatusView {
    pub vehicle_id: VehicleId,
    pub plate: String,
    pub model: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub registration: RegistrationStatus,
    pub provider_id: ProviderId,
    pub provider_name: String,
    pub documents: Vec<DocumentView>,
    pub expired: usize,
    pub expiring: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    pub vehicle_count: usize,
    pub vehicles_with_expired: usize,
    pub total_expired: usize,
    pub total_expiring: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FleetReport {
    pub today: NaiveDate,
    pub alert_threshold_days: u32,
    pub summary: FleetSummary,
    pub vehicles: Vec<VehicleStatusView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Compliant,
    Attention,
    Critical,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Compliant => "Compliant",
            Self::Attention => "Attention",
            Self::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceInsights {
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommended_actions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReportSummary {
    pub today: NaiveDate,
    pub alert_threshold_days: u32,
    pub facility: FacilitySummary,
    pub risk_ranking: Vec<ProviderScore>,
    pub alerts: Vec<ExpiredAlertView>,
    pub insights: ComplianceInsights,
}
