use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for contracting companies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub String);

/// Identifier wrapper for contractor personnel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

/// Identifier wrapper for fleet vehicles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub String);

/// Identifier wrapper for certificate records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

/// A certificate record. Its status is never stored; see [`Document::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

impl Document {
    pub fn status(&self, today: NaiveDate, threshold: AlertThreshold) -> DocumentStatus {
        super::status::resolve_status(self.expiry_date, today, threshold)
    }

    /// Whole days until expiry; negative once the document has lapsed.
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }
}

/// Contractor personnel member owned by exactly one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub cpf: String,
    pub role: String,
    #[serde(default)]
    pub documents: Vec<Document>,
}

/// Fleet vehicle owned by exactly one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub plate: String,
    pub model: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: RegistrationStatus,
    #[serde(default)]
    pub documents: Vec<Document>,
}

/// Contracting company with its personnel and fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    pub cnpj: String,
    pub contact_email: String,
    pub status: RegistrationStatus,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
}

impl Provider {
    pub fn find_employee(&self, id: &EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|employee| &employee.id == id)
    }
}

/// Registration state recorded by operators. Independent from the derived
/// blocked flag computed by the scoring engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    #[default]
    Active,
    Blocked,
    Pending,
}

impl RegistrationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RegistrationStatus::Active => "active",
            RegistrationStatus::Blocked => "blocked",
            RegistrationStatus::Pending => "pending",
        }
    }
}

/// Derived expiration state of a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Valid,
    Expiring,
    Expired,
}

impl DocumentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentStatus::Valid => "Valid",
            DocumentStatus::Expiring => "Expiring",
            DocumentStatus::Expired => "Expired",
        }
    }
}

/// Facility-wide alert window in days. Any value is accepted here; range
/// checks belong to the settings surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertThreshold(u32);

impl AlertThreshold {
    pub const DEFAULT_DAYS: u32 = 30;

    pub const fn days(days: u32) -> Self {
        Self(days)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for AlertThreshold {
    fn default() -> Self {
        Self(Self::DEFAULT_DAYS)
    }
}

impl std::fmt::Display for AlertThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d", self.0)
    }
}

/// Owner of a certificate when it is recorded through the repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentOwner {
    Employee(EmployeeId),
    Vehicle(VehicleId),
}

/// Intake payload for a new provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProvider {
    pub name: String,
    pub cnpj: String,
    pub contact_email: String,
    #[serde(default)]
    pub status: RegistrationStatus,
}

/// Intake payload for a new employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    pub cpf: String,
    pub role: String,
}

/// Intake payload for a new vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub plate: String,
    pub model: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: RegistrationStatus,
}

/// Intake payload for a new certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
}
