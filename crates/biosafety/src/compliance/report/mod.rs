mod alerts;
mod fleet;
mod insights;
mod summary;
pub mod views;

pub use alerts::{expired_alerts, ExpiredDocumentAlert};
pub use fleet::fleet_report;
pub use summary::{document_views, employee_card, facility_summary, ComplianceReport};

pub(crate) use insights::generate_insights;
