use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    AlertThreshold, Document, DocumentId, DocumentOwner, DocumentStatus, Employee, EmployeeId,
    NewDocument, NewEmployee, NewProvider, NewVehicle, Provider, ProviderId, Vehicle, VehicleId,
};
use super::taxonomy::{NewTrainingType, TrainingType, TrainingTypeId};

/// Persistence boundary for providers and everything they own.
///
/// Implementations assign identifiers. Deleting an owner removes what it owns.
pub trait ComplianceRepository: Send + Sync {
    fn providers(&self) -> Result<Vec<Provider>, RepositoryError>;
    fn insert_provider(&self, provider: NewProvider) -> Result<Provider, RepositoryError>;
    fn delete_provider(&self, id: &ProviderId) -> Result<(), RepositoryError>;

    fn insert_employee(
        &self,
        provider: &ProviderId,
        employee: NewEmployee,
    ) -> Result<Employee, RepositoryError>;
    fn delete_employee(&self, id: &EmployeeId) -> Result<(), RepositoryError>;

    fn insert_vehicle(
        &self,
        provider: &ProviderId,
        vehicle: NewVehicle,
    ) -> Result<Vehicle, RepositoryError>;
    fn delete_vehicle(&self, id: &VehicleId) -> Result<(), RepositoryError>;

    fn insert_document(
        &self,
        owner: &DocumentOwner,
        document: NewDocument,
    ) -> Result<Document, RepositoryError>;
    fn delete_document(&self, id: &DocumentId) -> Result<(), RepositoryError>;

    /// Flat parent-pointer records. An empty list means no taxonomy was configured.
    fn training_types(&self) -> Result<Vec<TrainingType>, RepositoryError>;
    fn insert_training_type(
        &self,
        training_type: NewTrainingType,
    ) -> Result<TrainingType, RepositoryError>;
    fn delete_training_type(&self, id: &TrainingTypeId) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Facility-wide settings. Only the alert window today.
pub trait SettingsStore: Send + Sync {
    fn alert_threshold(&self) -> Result<AlertThreshold, SettingsError>;
    fn set_alert_threshold(&self, threshold: AlertThreshold) -> Result<(), SettingsError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings store unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook turning a certificate brief into prose (an LLM, a template, ...).
pub trait ComplianceNarrator: Send + Sync {
    fn narrate(&self, brief: &NarrativeBrief) -> Result<String, NarrativeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("narrator unavailable: {0}")]
    Unavailable(String),
    #[error("narrator rejected the brief: {0}")]
    Rejected(String),
}

/// What the narrator is asked to describe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NarrativeSubject {
    Employee {
        name: String,
        role: String,
        provider_name: String,
    },
    Provider {
        name: String,
        score: u8,
        is_blocked: bool,
        employee_count: usize,
    },
}

/// Latest certificate of one type, already resolved against the evaluation date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub expiry_date: NaiveDate,
    pub status: DocumentStatus,
    pub days_until_expiry: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeBrief {
    pub subject: NarrativeSubject,
    pub today: NaiveDate,
    pub alert_threshold_days: u32,
    pub certificates: Vec<CertificateLine>,
}

impl NarrativeBrief {
    /// One line per certificate, e.g. `NR-35 (Expiring, 12 days)`.
    pub fn certificate_digest(&self) -> String {
        self.certificates
            .iter()
            .map(|line| {
                let entry = format!(
                    "{} ({}, {} days)",
                    line.doc_type,
                    line.status.label(),
                    line.days_until_expiry
                );
                match &line.holder {
                    Some(holder) => format!("{holder}: {entry}"),
                    None => entry,
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Narrative returned to callers. `fallback` is set when the narrator failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarrativeView {
    pub subject_id: String,
    pub narrative: String,
    pub fallback: bool,
}
