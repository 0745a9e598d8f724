use std::collections::BTreeMap;

use super::domain::Document;

/// Collapse certificates to the latest-expiring one per type.
///
/// When two certificates of a type share an expiry date the one seen last wins,
/// so the result is deterministic for a given input order.
pub fn latest_per_type<'a, I>(documents: I) -> BTreeMap<&'a str, &'a Document>
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut latest: BTreeMap<&'a str, &'a Document> = BTreeMap::new();

    for document in documents {
        let replace = match latest.get(document.doc_type.as_str()) {
            Some(current) => document.expiry_date >= current.expiry_date,
            None => true,
        };
        if replace {
            latest.insert(document.doc_type.as_str(), document);
        }
    }

    latest
}

/// True when `document` lost to a later certificate of the same type.
pub fn is_superseded(document: &Document, latest: &BTreeMap<&str, &Document>) -> bool {
    latest
        .get(document.doc_type.as_str())
        .map(|winner| winner.id != document.id)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::domain::DocumentId;
    use chrono::NaiveDate;

    fn doc(id: &str, doc_type: &str, expiry: (i32, u32, u32)) -> Document {
        Document {
            id: DocumentId(id.to_string()),
            doc_type: doc_type.to_string(),
            issue_date: None,
            expiry_date: NaiveDate::from_ymd_opt(expiry.0, expiry.1, expiry.2).expect("valid"),
            description: None,
            file_url: None,
        }
    }

    #[test]
    fn keeps_max_expiry_regardless_of_order() {
        let documents = vec![
            doc("a", "ASO", (2025, 5, 20)),
            doc("b", "ASO", (2023, 5, 20)),
            doc("c", "NR-35", (2024, 1, 1)),
            doc("d", "ASO", (2024, 11, 2)),
        ];

        let latest = latest_per_type(&documents);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest["ASO"].id.0, "a");
        assert_eq!(latest["NR-35"].id.0, "c");
    }

    #[test]
    fn equal_expiry_prefers_later_entry() {
        let documents = vec![
            doc("first", "NR-10", (2025, 3, 1)),
            doc("second", "NR-10", (2025, 3, 1)),
        ];

        let latest = latest_per_type(&documents);
        assert_eq!(latest["NR-10"].id.0, "second");
    }

    #[test]
    fn reapplying_to_output_is_stable() {
        let documents = vec![
            doc("a", "NR-33", (2022, 1, 1)),
            doc("b", "NR-33", (2026, 1, 1)),
            doc("c", "NR-20", (2024, 7, 7)),
        ];

        let once = latest_per_type(&documents);
        let twice = latest_per_type(once.values().copied());
        assert_eq!(once, twice);
    }

    #[test]
    fn superseded_flags_only_losers() {
        let documents = vec![
            doc("old", "ASO", (2023, 5, 20)),
            doc("new", "ASO", (2025, 5, 20)),
        ];
        let latest = latest_per_type(&documents);

        assert!(is_superseded(&documents[0], &latest));
        assert!(!is_superseded(&documents[1], &latest));
    }

    #[test]
    fn empty_input_yields_empty_map() {
        let documents: Vec<Document> = Vec::new();
        assert!(latest_per_type(&documents).is_empty());
    }
}
