use biosafety::compliance::{
    AlertThreshold, ComplianceNarrator, ComplianceRepository, Document, DocumentId, DocumentOwner,
    DocumentStatus, Employee, EmployeeId, NarrativeBrief, NarrativeError, NarrativeSubject,
    NewDocument, NewEmployee, NewProvider, NewTrainingType, NewVehicle, Provider, ProviderId,
    RepositoryError, SettingsError, SettingsStore, TrainingType, TrainingTypeId, Vehicle,
    VehicleId,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct Records {
    providers: Vec<Provider>,
    training_types: Vec<TrainingType>,
}

/// Process-local repository. Ids are sequential per record kind prefix.
#[derive(Default, Clone)]
pub(crate) struct InMemoryComplianceRepository {
    records: Arc<Mutex<Records>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryComplianceRepository {
    fn next_id(&self, prefix: &str) -> String {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{id:06}")
    }

    fn documents_of<'a>(
        providers: &'a mut [Provider],
        owner: &DocumentOwner,
    ) -> Option<&'a mut Vec<Document>> {
        providers.iter_mut().find_map(|provider| match owner {
            DocumentOwner::Employee(id) => provider
                .employees
                .iter_mut()
                .find(|employee| &employee.id == id)
                .map(|employee| &mut employee.documents),
            DocumentOwner::Vehicle(id) => provider
                .vehicles
                .iter_mut()
                .find(|vehicle| &vehicle.id == id)
                .map(|vehicle| &mut vehicle.documents),
        })
    }
}

impl ComplianceRepository for InMemoryComplianceRepository {
    fn providers(&self) -> Result<Vec<Provider>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.providers.clone())
    }

    fn insert_provider(&self, provider: NewProvider) -> Result<Provider, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard
            .providers
            .iter()
            .any(|existing| existing.cnpj == provider.cnpj)
        {
            return Err(RepositoryError::Conflict);
        }

        let created = Provider {
            id: ProviderId(self.next_id("provider")),
            name: provider.name,
            cnpj: provider.cnpj,
            contact_email: provider.contact_email,
            status: provider.status,
            employees: Vec::new(),
            vehicles: Vec::new(),
        };
        guard.providers.push(created.clone());
        Ok(created)
    }

    fn delete_provider(&self, id: &ProviderId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let before = guard.providers.len();
        guard.providers.retain(|provider| &provider.id != id);
        if guard.providers.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn insert_employee(
        &self,
        provider: &ProviderId,
        employee: NewEmployee,
    ) -> Result<Employee, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let owner = guard
            .providers
            .iter_mut()
            .find(|candidate| &candidate.id == provider)
            .ok_or(RepositoryError::NotFound)?;
        if owner
            .employees
            .iter()
            .any(|existing| !employee.cpf.is_empty() && existing.cpf == employee.cpf)
        {
            return Err(RepositoryError::Conflict);
        }

        let created = Employee {
            id: EmployeeId(self.next_id("employee")),
            name: employee.name,
            cpf: employee.cpf,
            role: employee.role,
            documents: Vec::new(),
        };
        owner.employees.push(created.clone());
        Ok(created)
    }

    fn delete_employee(&self, id: &EmployeeId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        for provider in guard.providers.iter_mut() {
            if let Some(position) = provider.employees.iter().position(|e| &e.id == id) {
                provider.employees.remove(position);
                return Ok(());
            }
        }
        Err(RepositoryError::NotFound)
    }

    fn insert_vehicle(
        &self,
        provider: &ProviderId,
        vehicle: NewVehicle,
    ) -> Result<Vehicle, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard
            .providers
            .iter()
            .flat_map(|candidate| &candidate.vehicles)
            .any(|existing| existing.plate == vehicle.plate)
        {
            return Err(RepositoryError::Conflict);
        }
        let owner = guard
            .providers
            .iter_mut()
            .find(|candidate| &candidate.id == provider)
            .ok_or(RepositoryError::NotFound)?;

        let created = Vehicle {
            id: VehicleId(self.next_id("vehicle")),
            plate: vehicle.plate,
            model: vehicle.model,
            kind: vehicle.kind,
            status: vehicle.status,
            documents: Vec::new(),
        };
        owner.vehicles.push(created.clone());
        Ok(created)
    }

    fn delete_vehicle(&self, id: &VehicleId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        for provider in guard.providers.iter_mut() {
            if let Some(position) = provider.vehicles.iter().position(|v| &v.id == id) {
                provider.vehicles.remove(position);
                return Ok(());
            }
        }
        Err(RepositoryError::NotFound)
    }

    fn insert_document(
        &self,
        owner: &DocumentOwner,
        document: NewDocument,
    ) -> Result<Document, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let documents =
            Self::documents_of(&mut guard.providers, owner).ok_or(RepositoryError::NotFound)?;

        let created = Document {
            id: DocumentId(self.next_id("document")),
            doc_type: document.doc_type,
            issue_date: document.issue_date,
            expiry_date: document.expiry_date,
            description: document.description,
            file_url: document.file_url,
        };
        documents.push(created.clone());
        Ok(created)
    }

    fn delete_document(&self, id: &DocumentId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        for provider in guard.providers.iter_mut() {
            let holders = provider
                .employees
                .iter_mut()
                .map(|employee| &mut employee.documents)
                .chain(provider.vehicles.iter_mut().map(|v| &mut v.documents));
            for documents in holders {
                if let Some(position) = documents.iter().position(|d| &d.id == id) {
                    documents.remove(position);
                    return Ok(());
                }
            }
        }
        Err(RepositoryError::NotFound)
    }

    fn training_types(&self) -> Result<Vec<TrainingType>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.training_types.clone())
    }

    fn insert_training_type(
        &self,
        training_type: NewTrainingType,
    ) -> Result<TrainingType, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.training_types.iter().any(|existing| {
            existing.name == training_type.name && existing.parent_id == training_type.parent_id
        }) {
            return Err(RepositoryError::Conflict);
        }

        let created = TrainingType {
            id: TrainingTypeId(self.next_id("training")),
            name: training_type.name,
            parent_id: training_type.parent_id,
        };
        guard.training_types.push(created.clone());
        Ok(created)
    }

    fn delete_training_type(&self, id: &TrainingTypeId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let before = guard.training_types.len();
        guard.training_types.retain(|node| &node.id != id);
        if guard.training_types.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Settings held in memory, seeded from `APP_ALERT_THRESHOLD_DAYS`.
pub(crate) struct InMemorySettingsStore {
    threshold: Mutex<AlertThreshold>,
}

impl InMemorySettingsStore {
    pub(crate) fn new(initial: AlertThreshold) -> Self {
        Self {
            threshold: Mutex::new(initial),
        }
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn alert_threshold(&self) -> Result<AlertThreshold, SettingsError> {
        Ok(*self.threshold.lock().expect("settings mutex poisoned"))
    }

    fn set_alert_threshold(&self, threshold: AlertThreshold) -> Result<(), SettingsError> {
        *self.threshold.lock().expect("settings mutex poisoned") = threshold;
        Ok(())
    }
}

/// Offline narrator assembling a bold-topic briefing from the certificate brief.
#[derive(Default)]
pub(crate) struct TemplateNarrator;

impl ComplianceNarrator for TemplateNarrator {
    fn narrate(&self, brief: &NarrativeBrief) -> Result<String, NarrativeError> {
        let lines_with = |status: DocumentStatus| -> Vec<String> {
            brief
                .certificates
                .iter()
                .filter(|line| line.status == status)
                .map(|line| match &line.holder {
                    Some(holder) => format!("{} ({holder})", line.doc_type),
                    None => line.doc_type.clone(),
                })
                .collect()
        };
        let valid = lines_with(DocumentStatus::Valid);
        let expiring = lines_with(DocumentStatus::Expiring);
        let expired = lines_with(DocumentStatus::Expired);

        let mut sections = Vec::new();
        match &brief.subject {
            NarrativeSubject::Employee {
                name,
                role,
                provider_name,
            } => {
                sections.push(format!("**SUBJECT:** {name}, {role} at {provider_name}"));
                sections.push(format!("**AUTHORIZED ACTIVITIES:** {}", or_none(&valid)));
                sections.push(format!("**IMPEDIMENTS:** {}", or_none(&expired)));
            }
            NarrativeSubject::Provider {
                name,
                score,
                is_blocked,
                employee_count,
            } => {
                let standing = if *is_blocked { "blocked" } else { "authorized" };
                sections.push(format!(
                    "**PROVIDER:** {name}, {employee_count} employee(s), score {score} ({standing})"
                ));
                sections.push(format!("**MAPPED CERTIFICATIONS:** {}", or_none(&valid)));
                sections.push(format!("**LAPSED:** {}", or_none(&expired)));
            }
        }
        sections.push(format!(
            "**RENEW WITHIN {} DAYS:** {}",
            brief.alert_threshold_days,
            or_none(&expiring)
        ));

        Ok(sections.join("\n"))
    }
}

fn or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
