use chrono::{Local, NaiveDate};

use super::domain::{AlertThreshold, DocumentStatus};

/// Resolve the status of a certificate expiring on `expiry_date` as seen on `today`.
///
/// A certificate expiring today is still `Expiring`; it only becomes `Expired`
/// the day after. The alert window is inclusive on both ends.
pub fn resolve_status(
    expiry_date: NaiveDate,
    today: NaiveDate,
    threshold: AlertThreshold,
) -> DocumentStatus {
    let diff_days = (expiry_date - today).num_days();

    if diff_days < 0 {
        DocumentStatus::Expired
    } else if diff_days <= i64::from(threshold.get()) {
        DocumentStatus::Expiring
    } else {
        DocumentStatus::Valid
    }
}

/// Current calendar date in the facility's local timezone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn window_boundaries_follow_inclusive_policy() {
        let today = date(2024, 6, 1);
        let threshold = AlertThreshold::days(30);

        assert_eq!(
            resolve_status(date(2024, 6, 15), today, threshold),
            DocumentStatus::Expiring
        );
        assert_eq!(
            resolve_status(date(2024, 6, 1), today, threshold),
            DocumentStatus::Expiring
        );
        assert_eq!(
            resolve_status(date(2024, 5, 31), today, threshold),
            DocumentStatus::Expired
        );
        assert_eq!(
            resolve_status(date(2024, 7, 5), today, threshold),
            DocumentStatus::Valid
        );
    }

    #[test]
    fn threshold_edge_is_expiring_and_next_day_is_valid() {
        let today = date(2024, 2, 20);
        for days in [0_u32, 5, 30, 180] {
            let threshold = AlertThreshold::days(days);
            let edge = today + chrono::Duration::days(i64::from(days));
            assert_eq!(
                resolve_status(edge, today, threshold),
                DocumentStatus::Expiring
            );
            assert_eq!(
                resolve_status(edge + chrono::Duration::days(1), today, threshold),
                DocumentStatus::Valid
            );
        }
    }

    #[test]
    fn zero_threshold_only_flags_same_day() {
        let today = date(2024, 12, 31);
        let threshold = AlertThreshold::days(0);
        assert_eq!(
            resolve_status(today, today, threshold),
            DocumentStatus::Expiring
        );
        assert_eq!(
            resolve_status(date(2025, 1, 1), today, threshold),
            DocumentStatus::Valid
        );
        assert_eq!(
            resolve_status(date(2024, 12, 30), today, threshold),
            DocumentStatus::Expired
        );
    }
}
