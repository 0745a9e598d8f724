use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::compliance::domain::{
    AlertThreshold, Document, DocumentId, DocumentOwner, Employee, EmployeeId, NewDocument,
    NewEmployee, NewProvider, NewVehicle, Provider, ProviderId, RegistrationStatus, Vehicle,
    VehicleId,
};
use crate::compliance::repository::{
    ComplianceNarrator, ComplianceRepository, NarrativeBrief, NarrativeError, RepositoryError,
    SettingsError, SettingsStore,
};
use crate::compliance::taxonomy::{NewTrainingType, TrainingType, TrainingTypeId};
use crate::compliance::{compliance_router, ComplianceService, ScoringPolicy};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn today() -> NaiveDate {
    date(2024, 6, 1)
}

pub(super) fn document(id: &str, doc_type: &str, expiry_date: NaiveDate) -> Document {
    Document {
        id: DocumentId(id.to_string()),
        doc_type: doc_type.to_string(),
        issue_date: None,
        expiry_date,
        description: None,
        file_url: None,
    }
}

/// One document per critical type, all expiring on `expiry_date`.
pub(super) fn critical_set(prefix: &str, expiry_date: NaiveDate) -> Vec<Document> {
    ["NR-33", "NR-35", "NR-10", "NR-20", "ASO"]
        .iter()
        .map(|doc_type| document(&format!("{prefix}-{doc_type}"), doc_type, expiry_date))
        .collect()
}

pub(super) fn employee(id: &str, name: &str, documents: Vec<Document>) -> Employee {
    Employee {
        id: EmployeeId(id.to_string()),
        name: name.to_string(),
        cpf: format!("000.000.000-{id}"),
        role: "Técnico".to_string(),
        documents,
    }
}

pub(super) fn provider(id: &str, name: &str, employees: Vec<Employee>) -> Provider {
    Provider {
        id: ProviderId(id.to_string()),
        name: name.to_string(),
        cnpj: format!("00.000.000/0001-{id}"),
        contact_email: format!("{id}@example.com"),
        status: RegistrationStatus::Active,
        employees,
        vehicles: Vec::new(),
    }
}

pub(super) fn vehicle(id: &str, plate: &str, documents: Vec<Document>) -> Vehicle {
    Vehicle {
        id: VehicleId(id.to_string()),
        plate: plate.to_string(),
        model: "Volvo FH".to_string(),
        kind: "Caminhão".to_string(),
        status: RegistrationStatus::Active,
        documents,
    }
}

/// Gás-Tech with one fully valid employee and one with an expired NR-33,
/// plus a compliant second provider with a truck.
pub(super) fn facility() -> Vec<Provider> {
    let valid_until = date(2025, 6, 1);

    let mut roberto_documents = critical_set("roberto", valid_until);
    roberto_documents[0].expiry_date = date(2024, 1, 1);

    let mut verde = provider(
        "p2",
        "Logística Verde",
        vec![employee("e3", "Ana Paula", critical_set("ana", valid_until))],
    );
    verde.vehicles.push(vehicle(
        "v1",
        "ABC1D23",
        vec![
            document("crlv-old", "CRLV", date(2023, 12, 31)),
            document("crlv-new", "CRLV", date(2024, 6, 20)),
        ],
    ));

    vec![
        provider(
            "p1",
            "Gás-Tech",
            vec![
                employee("e1", "Roberto Silva", roberto_documents),
                employee("e2", "Carla Souza", critical_set("carla", valid_until)),
            ],
        ),
        verde,
    ]
}

#[derive(Default)]
struct MemoryState {
    providers: Vec<Provider>,
    training_types: Vec<TrainingType>,
    sequence: u64,
}

impl MemoryState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!("{prefix}-{:04}", self.sequence)
    }
}

#[derive(Clone, Default)]
pub(super) struct MemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRepository {
    pub(super) fn with_providers(providers: Vec<Provider>) -> Self {
        let repository = Self::default();
        repository.state.lock().expect("lock").providers = providers;
        repository
    }

    pub(super) fn with_training_types(self, training_types: Vec<TrainingType>) -> Self {
        self.state.lock().expect("lock").training_types = training_types;
        self
    }
}

impl ComplianceRepository for MemoryRepository {
    fn providers(&self) -> Result<Vec<Provider>, RepositoryError> {
        Ok(self.state.lock().expect("lock").providers.clone())
    }

    fn insert_provider(&self, provider: NewProvider) -> Result<Provider, RepositoryError> {
        let mut state = self.state.lock().expect("lock");
        if state.providers.iter().any(|existing| existing.cnpj == provider.cnpj) {
            return Err(RepositoryError::Conflict);
        }
        let created = Provider {
            id: ProviderId(state.next_id("prov")),
            name: provider.name,
            cnpj: provider.cnpj,
            contact_email: provider.contact_email,
            status: provider.status,
            employees: Vec::new(),
            vehicles: Vec::new(),
        };
        state.providers.push(created.clone());
        Ok(created)
    }

    fn delete_provider(&self, id: &ProviderId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("lock");
        let before = state.providers.len();
        state.providers.retain(|provider| &provider.id != id);
        if state.providers.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn insert_employee(
        &self,
        provider: &ProviderId,
        employee: NewEmployee,
    ) -> Result<Employee, RepositoryError> {
        let mut state = self.state.lock().expect("lock");
        let id = EmployeeId(state.next_id("emp"));
        let owner = state
            .providers
            .iter_mut()
            .find(|candidate| &candidate.id == provider)
            .ok_or(RepositoryError::NotFound)?;
        let created = Employee {
            id,
            name: employee.name,
            cpf: employee.cpf,
            role: employee.role,
            documents: Vec::new(),
        };
        owner.employees.push(created.clone());
        Ok(created)
    }

    fn delete_employee(&self, id: &EmployeeId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("lock");
        for provider in &mut state.providers {
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
        let mut state = self.state.lock().expect("lock");
        let id = VehicleId(state.next_id("veh"));
        let owner = state
            .providers
            .iter_mut()
            .find(|candidate| &candidate.id == provider)
            .ok_or(RepositoryError::NotFound)?;
        let created = Vehicle {
            id,
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
        let mut state = self.state.lock().expect("lock");
        for provider in &mut state.providers {
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
        let mut state = self.state.lock().expect("lock");
        let created = Document {
            id: DocumentId(state.next_id("doc")),
            doc_type: document.doc_type,
            issue_date: document.issue_date,
            expiry_date: document.expiry_date,
            description: document.description,
            file_url: document.file_url,
        };

        let documents = state
            .providers
            .iter_mut()
            .find_map(|provider| match owner {
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
            .ok_or(RepositoryError::NotFound)?;
        documents.push(created.clone());
        Ok(created)
    }

    fn delete_document(&self, id: &DocumentId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("lock");
        for provider in &mut state.providers {
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
        Ok(self.state.lock().expect("lock").training_types.clone())
    }

    fn insert_training_type(
        &self,
        training_type: NewTrainingType,
    ) -> Result<TrainingType, RepositoryError> {
        let mut state = self.state.lock().expect("lock");
        let created = TrainingType {
            id: TrainingTypeId(state.next_id("tt")),
            name: training_type.name,
            parent_id: training_type.parent_id,
        };
        state.training_types.push(created.clone());
        Ok(created)
    }

    fn delete_training_type(&self, id: &TrainingTypeId) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().expect("lock");
        let before = state.training_types.len();
        state.training_types.retain(|node| &node.id != id);
        if state.training_types.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl UnavailableRepository {
    fn down<T>() -> Result<T, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl ComplianceRepository for UnavailableRepository {
    fn providers(&self) -> Result<Vec<Provider>, RepositoryError> {
        Self::down()
    }
    fn insert_provider(&self, _: NewProvider) -> Result<Provider, RepositoryError> {
        Self::down()
    }
    fn delete_provider(&self, _: &ProviderId) -> Result<(), RepositoryError> {
        Self::down()
    }
    fn insert_employee(&self, _: &ProviderId, _: NewEmployee) -> Result<Employee, RepositoryError> {
        Self::down()
    }
    fn delete_employee(&self, _: &EmployeeId) -> Result<(), RepositoryError> {
        Self::down()
    }
    fn insert_vehicle(&self, _: &ProviderId, _: NewVehicle) -> Result<Vehicle, RepositoryError> {
        Self::down()
    }
    fn delete_vehicle(&self, _: &VehicleId) -> Result<(), RepositoryError> {
        Self::down()
    }
    fn insert_document(
        &self,
        _: &DocumentOwner,
        _: NewDocument,
    ) -> Result<Document, RepositoryError> {
        Self::down()
    }
    fn delete_document(&self, _: &DocumentId) -> Result<(), RepositoryError> {
        Self::down()
    }
    fn training_types(&self) -> Result<Vec<TrainingType>, RepositoryError> {
        Self::down()
    }
    fn insert_training_type(&self, _: NewTrainingType) -> Result<TrainingType, RepositoryError> {
        Self::down()
    }
    fn delete_training_type(&self, _: &TrainingTypeId) -> Result<(), RepositoryError> {
        Self::down()
    }
}

#[derive(Default)]
pub(super) struct MemorySettings {
    threshold: Mutex<Option<AlertThreshold>>,
}

impl MemorySettings {
    pub(super) fn with_days(days: u32) -> Self {
        Self {
            threshold: Mutex::new(Some(AlertThreshold::days(days))),
        }
    }
}

impl SettingsStore for MemorySettings {
    fn alert_threshold(&self) -> Result<AlertThreshold, SettingsError> {
        Ok(self.threshold.lock().expect("lock").unwrap_or_default())
    }

    fn set_alert_threshold(&self, threshold: AlertThreshold) -> Result<(), SettingsError> {
        *self.threshold.lock().expect("lock") = Some(threshold);
        Ok(())
    }
}

/// Records every brief and echoes the certificate digest.
#[derive(Default)]
pub(super) struct RecordingNarrator {
    pub(super) briefs: Mutex<Vec<NarrativeBrief>>,
}

impl ComplianceNarrator for RecordingNarrator {
    fn narrate(&self, brief: &NarrativeBrief) -> Result<String, NarrativeError> {
        self.briefs.lock().expect("lock").push(brief.clone());
        Ok(format!("analysis: {}", brief.certificate_digest()))
    }
}

pub(super) struct FailingNarrator;

impl ComplianceNarrator for FailingNarrator {
    fn narrate(&self, _: &NarrativeBrief) -> Result<String, NarrativeError> {
        Err(NarrativeError::Unavailable("quota exhausted".to_string()))
    }
}

pub(super) type MemoryService = ComplianceService<MemoryRepository, MemorySettings>;

pub(super) fn build_service(providers: Vec<Provider>) -> (Arc<MemoryService>, MemoryRepository) {
    let repository = MemoryRepository::with_providers(providers);
    let service = Arc::new(ComplianceService::new(
        Arc::new(repository.clone()),
        Arc::new(MemorySettings::with_days(AlertThreshold::DEFAULT_DAYS)),
        Arc::new(RecordingNarrator::default()),
        ScoringPolicy::standard(),
    ));
    (service, repository)
}

pub(super) fn router_with_service(service: Arc<MemoryService>) -> axum::Router {
    compliance_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub(super) async fn assert_status_with_error(response: Response, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    let body = read_json_body(response).await;
    assert!(body.get("error").is_some(), "missing error field: {body}");
    body
}
