//! Contractor compliance engine.
//!
//! Certificates are resolved against an explicit evaluation date and alert
//! window, reduced to the latest certificate per type, and rolled up into
//! provider scores, expired alerts and facility metrics. Nothing derived is
//! ever stored; every pass starts from a fresh snapshot.

pub mod dedup;
pub mod domain;
pub mod ingest;
pub mod report;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod status;
pub mod taxonomy;

#[cfg(test)]
mod tests;

pub use dedup::{is_superseded, latest_per_type};
pub use domain::{
    AlertThreshold, Document, DocumentId, DocumentOwner, DocumentStatus, Employee, EmployeeId,
    NewDocument, NewEmployee, NewProvider, NewVehicle, Provider, ProviderId, RegistrationStatus,
    Vehicle, VehicleId,
};
pub use ingest::{
    CertificateCsvImporter, DataQualityIssue, ImportError, ImportedSnapshot, IssueKind,
    SnapshotImporter,
};
pub use report::views::{
    ComplianceInsights, ComplianceReportSummary, DocumentView, EmployeeCardView, ExpiredAlertView,
    FacilitySummary, FleetReport, FleetSummary, RiskLevel, VehicleStatusView,
};
pub use report::{
    document_views, employee_card, expired_alerts, facility_summary, fleet_report,
    ComplianceReport, ExpiredDocumentAlert,
};
pub use repository::{
    CertificateLine, ComplianceNarrator, ComplianceRepository, NarrativeBrief, NarrativeError,
    NarrativeSubject, NarrativeView, RepositoryError, SettingsError, SettingsStore,
};
pub use router::compliance_router;
pub use scoring::{
    BlockReason, CriticalType, ProviderScore, ScoreComponent, ScoreFinding, ScoringEngine,
    ScoringPolicy,
};
pub use service::{ComplianceService, ComplianceServiceError};
pub use status::{local_today, resolve_status};
pub use taxonomy::{
    NewTrainingType, TaxonomyError, TrainingTaxonomy, TrainingType, TrainingTypeId,
    TrainingTypeView,
};
