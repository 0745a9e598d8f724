use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::super::domain::{
    Document, DocumentId, Employee, EmployeeId, Provider, ProviderId, RegistrationStatus, Vehicle,
    VehicleId,
};
use super::normalizer::{normalize_label, parse_calendar_date};
use super::{DataQualityIssue, IssueKind};

/// Identifier as emitted by the persistence layer: text or a serial number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(value) => value.trim().to_string(),
            RawId::Number(value) => value.to_string(),
        }
    }
}

/// Loosely typed provider record. Field names are accepted in snake_case or camelCase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawProvider {
    pub id: RawId,
    pub name: String,
    #[serde(default)]
    pub cnpj: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(
        default,
        rename = "contactEmail",
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_email_camel: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub employees: Option<Vec<RawEmployee>>,
    #[serde(default)]
    pub vehicles: Option<Vec<RawVehicle>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEmployee {
    pub id: RawId,
    pub name: String,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub documents: Option<Vec<RawDocument>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawVehicle {
    pub id: RawId,
    pub plate: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "vehicle_documents")]
    pub documents: Option<Vec<RawDocument>>,
}

/// Loose certificate record. Both casings may appear on the same record; the
/// snake_case value wins unless it is blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: RawId,
    #[serde(rename = "type", default)]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub issue_date: Option<String>,
    #[serde(
        default,
        rename = "issueDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub issue_date_camel: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(
        default,
        rename = "expiryDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry_date_camel: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(
        default,
        rename = "fileUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_url_camel: Option<String>,
}

fn either_casing(snake: Option<String>, camel: Option<String>) -> Option<String> {
    snake.filter(|value| !value.trim().is_empty()).or(camel)
}

/// Stands in for a certificate recorded without a type. Never critical.
pub const UNKNOWN_DOCUMENT_TYPE: &str = "UNKNOWN";

/// Maps raw records into strict domain types, collecting data-quality issues
/// instead of failing.
pub(crate) struct SnapshotNormalizer {
    today: NaiveDate,
    issues: Vec<DataQualityIssue>,
}

impl SnapshotNormalizer {
    pub(crate) fn new(today: NaiveDate) -> Self {
        Self {
            today,
            issues: Vec::new(),
        }
    }

    pub(crate) fn into_issues(self) -> Vec<DataQualityIssue> {
        self.issues
    }

    pub(crate) fn provider(&mut self, raw: RawProvider) -> Provider {
        let id = raw.id.into_string();
        let status = self.registration_status(&id, raw.status.as_deref());

        Provider {
            id: ProviderId(id),
            name: raw.name.trim().to_string(),
            cnpj: raw.cnpj.unwrap_or_default().trim().to_string(),
            contact_email: either_casing(raw.contact_email, raw.contact_email_camel)
                .unwrap_or_default()
                .trim()
                .to_string(),
            status,
            employees: raw
                .employees
                .unwrap_or_default()
                .into_iter()
                .map(|employee| self.employee(employee))
                .collect(),
            vehicles: raw
                .vehicles
                .unwrap_or_default()
                .into_iter()
                .map(|vehicle| self.vehicle(vehicle))
                .collect(),
        }
    }

    fn employee(&mut self, raw: RawEmployee) -> Employee {
        Employee {
            id: EmployeeId(raw.id.into_string()),
            name: raw.name.trim().to_string(),
            cpf: raw.cpf.unwrap_or_default().trim().to_string(),
            role: raw.role.unwrap_or_default().trim().to_string(),
            documents: self.documents(raw.documents),
        }
    }

    fn vehicle(&mut self, raw: RawVehicle) -> Vehicle {
        let id = raw.id.into_string();
        let status = self.registration_status(&id, raw.status.as_deref());

        Vehicle {
            id: VehicleId(id),
            plate: raw.plate.trim().to_ascii_uppercase(),
            model: raw.model.unwrap_or_default().trim().to_string(),
            kind: raw.kind.unwrap_or_default().trim().to_string(),
            status,
            documents: self.documents(raw.documents),
        }
    }

    fn documents(&mut self, raw: Option<Vec<RawDocument>>) -> Vec<Document> {
        raw.unwrap_or_default()
            .into_iter()
            .map(|document| self.document(document))
            .collect()
    }

    fn document(&mut self, raw: RawDocument) -> Document {
        let id = raw.id.into_string();

        let doc_type = match raw.doc_type.as_deref().map(normalize_label) {
            Some(label) if !label.is_empty() => label,
            _ => {
                self.flag(&id, IssueKind::MissingType);
                UNKNOWN_DOCUMENT_TYPE.to_string()
            }
        };

        let expiry_raw = either_casing(raw.expiry_date, raw.expiry_date_camel);
        let expiry_date = match expiry_raw.as_deref().map(str::trim) {
            None | Some("") => {
                self.flag(&id, IssueKind::MissingExpiryDate);
                self.today
            }
            Some(value) => match parse_calendar_date(value) {
                Some(date) => date,
                None => {
                    self.flag(
                        &id,
                        IssueKind::MalformedExpiryDate {
                            raw: value.to_string(),
                        },
                    );
                    self.today
                }
            },
        };

        let issue_raw = either_casing(raw.issue_date, raw.issue_date_camel);
        let issue_date = match issue_raw.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => {
                let parsed = parse_calendar_date(value);
                if parsed.is_none() {
                    self.flag(
                        &id,
                        IssueKind::MalformedIssueDate {
                            raw: value.to_string(),
                        },
                    );
                }
                parsed
            }
        };

        Document {
            id: DocumentId(id),
            doc_type,
            issue_date,
            expiry_date,
            description: raw.description.filter(|value| !value.trim().is_empty()),
            file_url: either_casing(raw.file_url, raw.file_url_camel)
                .filter(|value| !value.trim().is_empty()),
        }
    }

    fn registration_status(&mut self, record: &str, raw: Option<&str>) -> RegistrationStatus {
        match raw.map(|value| value.trim().to_ascii_uppercase()) {
            None => RegistrationStatus::Active,
            Some(value) => match value.as_str() {
                "" | "ACTIVE" => RegistrationStatus::Active,
                "BLOCKED" => RegistrationStatus::Blocked,
                "PENDING" => RegistrationStatus::Pending,
                _ => {
                    self.flag(record, IssueKind::UnknownStatus { raw: value.clone() });
                    RegistrationStatus::Pending
                }
            },
        }
    }

    fn flag(&mut self, record: &str, kind: IssueKind) {
        let issue = DataQualityIssue {
            record: record.to_string(),
            kind,
        };
        tracing::warn!(
            record = %issue.record,
            issue = %issue.kind,
            "data quality issue at ingestion"
        );
        self.issues.push(issue);
    }
}
