use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One certificate line of a bulk import sheet.
#[derive(Debug, Deserialize)]
pub(crate) struct CertificateRow {
    #[serde(rename = "Provider")]
    pub(crate) provider: String,
    #[serde(rename = "CNPJ")]
    pub(crate) cnpj: String,
    #[serde(
        rename = "Contact Email",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) contact_email: Option<String>,
    #[serde(rename = "Employee")]
    pub(crate) employee: String,
    #[serde(rename = "CPF")]
    pub(crate) cpf: String,
    #[serde(rename = "Role", default)]
    pub(crate) role: String,
    #[serde(rename = "Type")]
    pub(crate) doc_type: String,
    #[serde(
        rename = "Issue Date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) issue_date: Option<String>,
    #[serde(
        rename = "Expiry Date",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    pub(crate) expiry_date: Option<String>,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<CertificateRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<CertificateRow>() {
        rows.push(record?);
    }

    Ok(rows)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
