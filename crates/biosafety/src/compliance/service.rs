use std::sync::Arc;

use chrono::NaiveDate;

use super::dedup::latest_per_type;
use super::domain::{
    AlertThreshold, Document, DocumentId, DocumentOwner, Employee, EmployeeId, NewDocument,
    NewEmployee, NewProvider, NewVehicle, Provider, ProviderId, Vehicle, VehicleId,
};
use super::ingest::normalize_label;
use super::report::views::{
    ComplianceReportSummary, EmployeeCardView, ExpiredAlertView, FleetReport,
};
use super::report::{employee_card, expired_alerts, fleet_report, ComplianceReport};
use super::repository::{
    CertificateLine, ComplianceNarrator, ComplianceRepository, NarrativeBrief, NarrativeSubject,
    NarrativeView, RepositoryError, SettingsError, SettingsStore,
};
use super::scoring::{ScoringEngine, ScoringPolicy};
use super::taxonomy::{
    NewTrainingType, TaxonomyError, TrainingTaxonomy, TrainingType, TrainingTypeId,
    TrainingTypeView,
};

const EMPLOYEE_NARRATIVE_FALLBACK: &str =
    "Employee analysis unavailable. Check network connectivity or the narrator credentials.";
const PROVIDER_NARRATIVE_FALLBACK: &str =
    "Provider capability mapping unavailable. Check that the narrative service is reachable.";

/// Service composing the repository, settings store, narrator and scoring engine.
///
/// Every read fetches a fresh snapshot and threshold; nothing derived is cached.
pub struct ComplianceService<R, S> {
    repository: Arc<R>,
    settings: Arc<S>,
    narrator: Arc<dyn ComplianceNarrator>,
    engine: Arc<ScoringEngine>,
}

impl<R, S> ComplianceService<R, S>
where
    R: ComplianceRepository + 'static,
    S: SettingsStore + 'static,
{
    pub fn new(
        repository: Arc<R>,
        settings: Arc<S>,
        narrator: Arc<dyn ComplianceNarrator>,
        policy: ScoringPolicy,
    ) -> Self {
        Self {
            repository,
            settings,
            narrator,
            engine: Arc::new(ScoringEngine::new(policy)),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn alert_threshold(&self) -> Result<AlertThreshold, ComplianceServiceError> {
        Ok(self.settings.alert_threshold()?)
    }

    pub fn set_alert_threshold(
        &self,
        threshold: AlertThreshold,
    ) -> Result<AlertThreshold, ComplianceServiceError> {
        self.settings.set_alert_threshold(threshold)?;
        tracing::info!(%threshold, "alert threshold updated");
        Ok(threshold)
    }

    pub fn providers(&self) -> Result<Vec<Provider>, ComplianceServiceError> {
        Ok(self.repository.providers()?)
    }

    /// Full evaluation pass: facility rollup, risk ranking, alerts and insights.
    pub fn report(
        &self,
        today: NaiveDate,
    ) -> Result<ComplianceReportSummary, ComplianceServiceError> {
        let providers = self.repository.providers()?;
        let threshold = self.settings.alert_threshold()?;
        let report = ComplianceReport::evaluate(&providers, &self.engine, today, threshold);
        Ok(report.summary())
    }

    pub fn alerts(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<ExpiredAlertView>, ComplianceServiceError> {
        let providers = self.repository.providers()?;
        let threshold = self.settings.alert_threshold()?;
        Ok(expired_alerts(&providers, self.engine.policy(), today, threshold)
            .iter()
            .map(|alert| alert.to_view(today))
            .collect())
    }

    pub fn fleet(&self, today: NaiveDate) -> Result<FleetReport, ComplianceServiceError> {
        let providers = self.repository.providers()?;
        let threshold = self.settings.alert_threshold()?;
        Ok(fleet_report(&providers, today, threshold))
    }

    pub fn employee_card(
        &self,
        employee_id: &EmployeeId,
        today: NaiveDate,
    ) -> Result<EmployeeCardView, ComplianceServiceError> {
        let providers = self.repository.providers()?;
        let threshold = self.settings.alert_threshold()?;
        let (provider, employee) =
            locate_employee(&providers, employee_id).ok_or(RepositoryError::NotFound)?;
        Ok(employee_card(provider, employee, today, threshold))
    }

    /// Ask the narrator about one employee's latest certificates. Narrator
    /// failures degrade to a fixed message instead of an error.
    pub fn employee_narrative(
        &self,
        employee_id: &EmployeeId,
        today: NaiveDate,
    ) -> Result<NarrativeView, ComplianceServiceError> {
        let providers = self.repository.providers()?;
        let threshold = self.settings.alert_threshold()?;
        let (provider, employee) =
            locate_employee(&providers, employee_id).ok_or(RepositoryError::NotFound)?;

        let brief = NarrativeBrief {
            subject: NarrativeSubject::Employee {
                name: employee.name.clone(),
                role: employee.role.clone(),
                provider_name: provider.name.clone(),
            },
            today,
            alert_threshold_days: threshold.get(),
            certificates: certificate_lines(employee, None, today, threshold),
        };

        Ok(self.narrate(&employee_id.0, &brief, EMPLOYEE_NARRATIVE_FALLBACK))
    }

    pub fn provider_narrative(
        &self,
        provider_id: &ProviderId,
        today: NaiveDate,
    ) -> Result<NarrativeView, ComplianceServiceError> {
        let providers = self.repository.providers()?;
        let threshold = self.settings.alert_threshold()?;
        let provider = providers
            .iter()
            .find(|provider| &provider.id == provider_id)
            .ok_or(RepositoryError::NotFound)?;
        let score = self.engine.score_provider(provider, today, threshold);

        let brief = NarrativeBrief {
            subject: NarrativeSubject::Provider {
                name: provider.name.clone(),
                score: score.score,
                is_blocked: score.is_blocked,
                employee_count: score.employee_count,
            },
            today,
            alert_threshold_days: threshold.get(),
            certificates: provider
                .employees
                .iter()
                .flat_map(|employee| {
                    certificate_lines(employee, Some(&employee.name), today, threshold)
                })
                .collect(),
        };

        Ok(self.narrate(&provider_id.0, &brief, PROVIDER_NARRATIVE_FALLBACK))
    }

    fn narrate(
        &self,
        subject_id: &str,
        brief: &NarrativeBrief,
        fallback: &str,
    ) -> NarrativeView {
        match self.narrator.narrate(brief) {
            Ok(narrative) => NarrativeView {
                subject_id: subject_id.to_string(),
                narrative,
                fallback: false,
            },
            Err(error) => {
                tracing::warn!(subject = subject_id, %error, "narrator failed; returning fallback");
                NarrativeView {
                    subject_id: subject_id.to_string(),
                    narrative: fallback.to_string(),
                    fallback: true,
                }
            }
        }
    }

    /// Stored taxonomy, or the standard flat list when none is configured.
    pub fn taxonomy(&self) -> Result<TrainingTaxonomy, ComplianceServiceError> {
        let nodes = self.repository.training_types()?;
        if nodes.is_empty() {
            return Ok(TrainingTaxonomy::standard());
        }
        Ok(TrainingTaxonomy::from_nodes(nodes)?)
    }

    pub fn training_types(&self) -> Result<Vec<TrainingTypeView>, ComplianceServiceError> {
        Ok(self.taxonomy()?.views())
    }

    pub fn add_training_type(
        &self,
        mut training_type: NewTrainingType,
    ) -> Result<TrainingType, ComplianceServiceError> {
        training_type.name = normalize_label(&training_type.name);
        require("name", &training_type.name)?;

        if let Some(parent) = &training_type.parent_id {
            let stored = self.repository.training_types()?;
            if !stored.iter().any(|node| &node.id == parent) {
                return Err(ComplianceServiceError::UnknownTrainingType(parent.clone()));
            }
        }

        Ok(self.repository.insert_training_type(training_type)?)
    }

    /// Refuses to remove a node that still has children.
    pub fn remove_training_type(&self, id: &TrainingTypeId) -> Result<(), ComplianceServiceError> {
        let stored = self.repository.training_types()?;
        let taxonomy = TrainingTaxonomy::from_nodes(stored)?;
        if taxonomy.has_children(id) {
            return Err(ComplianceServiceError::TrainingTypeHasChildren(id.clone()));
        }
        Ok(self.repository.delete_training_type(id)?)
    }

    pub fn add_provider(
        &self,
        mut provider: NewProvider,
    ) -> Result<Provider, ComplianceServiceError> {
        provider.name = provider.name.trim().to_string();
        provider.cnpj = provider.cnpj.trim().to_string();
        require("name", &provider.name)?;
        require("cnpj", &provider.cnpj)?;
        Ok(self.repository.insert_provider(provider)?)
    }

    pub fn remove_provider(&self, id: &ProviderId) -> Result<(), ComplianceServiceError> {
        Ok(self.repository.delete_provider(id)?)
    }

    pub fn add_employee(
        &self,
        provider: &ProviderId,
        mut employee: NewEmployee,
    ) -> Result<Employee, ComplianceServiceError> {
        employee.name = employee.name.trim().to_string();
        require("name", &employee.name)?;
        Ok(self.repository.insert_employee(provider, employee)?)
    }

    pub fn remove_employee(&self, id: &EmployeeId) -> Result<(), ComplianceServiceError> {
        Ok(self.repository.delete_employee(id)?)
    }

    pub fn add_vehicle(
        &self,
        provider: &ProviderId,
        mut vehicle: NewVehicle,
    ) -> Result<Vehicle, ComplianceServiceError> {
        vehicle.plate = vehicle.plate.trim().to_ascii_uppercase();
        require("plate", &vehicle.plate)?;
        Ok(self.repository.insert_vehicle(provider, vehicle)?)
    }

    pub fn remove_vehicle(&self, id: &VehicleId) -> Result<(), ComplianceServiceError> {
        Ok(self.repository.delete_vehicle(id)?)
    }

    /// Record a certificate. The type must be a taxonomy label and the issue
    /// date, when given, must not fall after the expiry date.
    pub fn add_document(
        &self,
        owner: &DocumentOwner,
        mut document: NewDocument,
    ) -> Result<Document, ComplianceServiceError> {
        document.doc_type = normalize_label(&document.doc_type);
        require("type", &document.doc_type)?;

        if !self.taxonomy()?.contains_label(&document.doc_type) {
            return Err(ComplianceServiceError::UnknownDocumentType(document.doc_type));
        }

        if let Some(issue_date) = document.issue_date {
            if issue_date > document.expiry_date {
                return Err(ComplianceServiceError::InvalidDateRange {
                    issue_date,
                    expiry_date: document.expiry_date,
                });
            }
        }

        Ok(self.repository.insert_document(owner, document)?)
    }

    pub fn remove_document(&self, id: &DocumentId) -> Result<(), ComplianceServiceError> {
        Ok(self.repository.delete_document(id)?)
    }
}

fn locate_employee<'a>(
    providers: &'a [Provider],
    employee_id: &EmployeeId,
) -> Option<(&'a Provider, &'a Employee)> {
    providers.iter().find_map(|provider| {
        provider
            .find_employee(employee_id)
            .map(|employee| (provider, employee))
    })
}

fn certificate_lines(
    employee: &Employee,
    holder: Option<&str>,
    today: NaiveDate,
    threshold: AlertThreshold,
) -> Vec<CertificateLine> {
    latest_per_type(&employee.documents)
        .into_values()
        .map(|document| CertificateLine {
            holder: holder.map(str::to_string),
            doc_type: document.doc_type.clone(),
            expiry_date: document.expiry_date,
            status: document.status(today, threshold),
            days_until_expiry: document.days_until_expiry(today),
        })
        .collect()
}

fn require(field: &'static str, value: &str) -> Result<(), ComplianceServiceError> {
    if value.trim().is_empty() {
        return Err(ComplianceServiceError::MissingField(field));
    }
    Ok(())
}

/// Error raised by the compliance service.
#[derive(Debug, thiserror::Error)]
pub enum ComplianceServiceError {
    #[error("field `{0}` must not be blank")]
    MissingField(&'static str),
    #[error("document type `{0}` is not part of the training taxonomy")]
    UnknownDocumentType(String),
    #[error("issue date {issue_date} is after expiry date {expiry_date}")]
    InvalidDateRange {
        issue_date: NaiveDate,
        expiry_date: NaiveDate,
    },
    #[error("training type {0:?} does not exist")]
    UnknownTrainingType(TrainingTypeId),
    #[error("training type {0:?} still has child types")]
    TrainingTypeHasChildren(TrainingTypeId),
    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl ComplianceServiceError {
    /// Caller-side input problems, as opposed to collaborator failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::UnknownDocumentType(_)
                | Self::InvalidDateRange { .. }
                | Self::UnknownTrainingType(_)
        )
    }
}
