use chrono::NaiveDate;

use super::super::dedup::latest_per_type;
use super::super::domain::{AlertThreshold, DocumentStatus, Provider};
use super::summary::document_views;
use super::views::{FleetReport, FleetSummary, VehicleStatusView};

/// Status board for every vehicle. Vehicles carry no score; counts use the
/// latest certificate per type only.
pub fn fleet_report(
    providers: &[Provider],
    today: NaiveDate,
    threshold: AlertThreshold,
) -> FleetReport {
    let mut summary = FleetSummary::default();
    let mut vehicles = Vec::new();

    for provider in providers {
        for vehicle in &provider.vehicles {
            let mut expired = 0;
            let mut expiring = 0;
            for document in latest_per_type(&vehicle.documents).values() {
                match document.status(today, threshold) {
                    DocumentStatus::Expired => expired += 1,
                    DocumentStatus::Expiring => expiring += 1,
                    DocumentStatus::Valid => {}
                }
            }

            summary.vehicle_count += 1;
            summary.total_expired += expired;
            summary.total_expiring += expiring;
            if expired > 0 {
                summary.vehicles_with_expired += 1;
            }

            vehicles.push(VehicleStatusView {
                vehicle_id: vehicle.id.clone(),
                plate: vehicle.plate.clone(),
                model: vehicle.model.clone(),
                kind: vehicle.kind.clone(),
                registration: vehicle.status,
                provider_id: provider.id.clone(),
                provider_name: provider.name.clone(),
                documents: document_views(&vehicle.documents, today, threshold),
                expired,
                expiring,
            });
        }
    }

    vehicles.sort_by(|a, b| a.plate.cmp(&b.plate));

    FleetReport {
        today,
        alert_threshold_days: threshold.get(),
        summary,
        vehicles,
    }
}
