//! Ingestion boundary: loosely typed collaborator records in, strict domain
//! types out. Defaulting happens here once, and every substitution is reported
//! as a [`DataQualityIssue`].

mod normalizer;
mod parser;
mod snapshot;

pub use snapshot::{
    RawDocument, RawEmployee, RawId, RawProvider, RawVehicle, UNKNOWN_DOCUMENT_TYPE,
};

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use super::domain::Provider;
pub(crate) use normalizer::normalize_label;

use normalizer::digits_only;
use snapshot::SnapshotNormalizer;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read snapshot: {}", err),
            ImportError::Json(err) => write!(f, "invalid snapshot JSON: {}", err),
            ImportError::Csv(err) => write!(f, "invalid certificate CSV data: {}", err),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Json(err) => Some(err),
            ImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Defect found while mapping a record. The record is still imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataQualityIssue {
    pub record: String,
    pub kind: IssueKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum IssueKind {
    /// No expiry date on file; the evaluation date was substituted.
    MissingExpiryDate,
    /// Unparseable expiry date; the evaluation date was substituted.
    MalformedExpiryDate { raw: String },
    MalformedIssueDate { raw: String },
    /// Certificate without a type; recorded under the unknown-type label.
    MissingType,
    UnknownStatus { raw: String },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::MissingExpiryDate => write!(f, "missing expiry date"),
            IssueKind::MalformedExpiryDate { raw } => write!(f, "malformed expiry date '{raw}'"),
            IssueKind::MalformedIssueDate { raw } => write!(f, "malformed issue date '{raw}'"),
            IssueKind::MissingType => write!(f, "missing certificate type"),
            IssueKind::UnknownStatus { raw } => write!(f, "unknown registration status '{raw}'"),
        }
    }
}

/// Strict snapshot plus everything that had to be defaulted to build it.
#[derive(Debug, Clone, Default)]
pub struct ImportedSnapshot {
    pub providers: Vec<Provider>,
    pub issues: Vec<DataQualityIssue>,
}

pub struct SnapshotImporter;

impl SnapshotImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        today: NaiveDate,
    ) -> Result<ImportedSnapshot, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(file, today)
    }

    /// Read a JSON array of provider records.
    pub fn from_json_reader<R: Read>(
        reader: R,
        today: NaiveDate,
    ) -> Result<ImportedSnapshot, ImportError> {
        let raw: Vec<RawProvider> = serde_json::from_reader(reader)?;
        Ok(Self::from_raw(raw, today))
    }

    /// `today` stands in for missing or unreadable expiry dates.
    pub fn from_raw(raw: Vec<RawProvider>, today: NaiveDate) -> ImportedSnapshot {
        let mut normalizer = SnapshotNormalizer::new(today);
        let providers = raw
            .into_iter()
            .map(|provider| normalizer.provider(provider))
            .collect();

        ImportedSnapshot {
            providers,
            issues: normalizer.into_issues(),
        }
    }
}

/// Bulk import of certificate sheets with one row per certificate.
pub struct CertificateCsvImporter;

impl CertificateCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        today: NaiveDate,
    ) -> Result<ImportedSnapshot, ImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, today)
    }

    /// Providers are keyed by CNPJ and employees by CPF, in first-seen order.
    pub fn from_reader<R: Read>(
        reader: R,
        today: NaiveDate,
    ) -> Result<ImportedSnapshot, ImportError> {
        let mut providers: Vec<RawProvider> = Vec::new();
        let mut provider_index: HashMap<String, usize> = HashMap::new();
        let mut employee_index: HashMap<(usize, String), usize> = HashMap::new();

        for (line, row) in parser::parse_rows(reader)?.into_iter().enumerate() {
            let provider_key = match digits_only(&row.cnpj) {
                digits if digits.is_empty() => row.provider.trim().to_string(),
                digits => digits,
            };

            let provider_position = *provider_index
                .entry(provider_key.clone())
                .or_insert_with(|| {
                    providers.push(RawProvider {
                        id: RawId::Text(provider_key.clone()),
                        name: row.provider.clone(),
                        cnpj: Some(row.cnpj.clone()),
                        contact_email: row.contact_email.clone(),
                        contact_email_camel: None,
                        status: None,
                        employees: Some(Vec::new()),
                        vehicles: None,
                    });
                    providers.len() - 1
                });

            let employee_key = match digits_only(&row.cpf) {
                digits if digits.is_empty() => row.employee.trim().to_string(),
                digits => digits,
            };
            let employees = providers[provider_position]
                .employees
                .get_or_insert_with(Vec::new);
            let employee_position = *employee_index
                .entry((provider_position, employee_key.clone()))
                .or_insert_with(|| {
                    employees.push(RawEmployee {
                        id: RawId::Text(employee_key.clone()),
                        name: row.employee.clone(),
                        cpf: Some(row.cpf.clone()),
                        role: Some(row.role.clone()),
                        documents: Some(Vec::new()),
                    });
                    employees.len() - 1
                });

            employees[employee_position]
                .documents
                .get_or_insert_with(Vec::new)
                .push(RawDocument {
                    id: RawId::Text(format!("row-{}", line + 1)),
                    doc_type: Some(row.doc_type),
                    issue_date: row.issue_date,
                    issue_date_camel: None,
                    expiry_date: row.expiry_date,
                    expiry_date_camel: None,
                    description: None,
                    file_url: None,
                    file_url_camel: None,
                });
        }

        Ok(SnapshotImporter::from_raw(providers, today))
    }
}
