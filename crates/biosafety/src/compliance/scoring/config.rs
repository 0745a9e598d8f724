use serde::{Deserialize, Serialize};

/// Safety-critical certificate type and the penalty charged when it lapses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalType {
    pub name: String,
    pub expired_penalty: u32,
}

impl CriticalType {
    fn new(name: &str, expired_penalty: u32) -> Self {
        Self {
            name: name.to_string(),
            expired_penalty,
        }
    }
}

/// Rubric describing the critical certificate set and scoring dials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub critical_types: Vec<CriticalType>,
    pub missing_penalty: u32,
    pub minimum_authorized_score: u32,
}

impl ScoringPolicy {
    pub const STARTING_SCORE: u32 = 100;

    /// NR-33, NR-35, NR-10 and NR-20 cost 20 points when expired, ASO costs 15;
    /// a missing critical certificate costs 5; below 60 the provider is blocked.
    pub fn standard() -> Self {
        Self {
            critical_types: vec![
                CriticalType::new("NR-33", 20),
                CriticalType::new("NR-35", 20),
                CriticalType::new("NR-10", 20),
                CriticalType::new("NR-20", 20),
                CriticalType::new("ASO", 15),
            ],
            missing_penalty: 5,
            minimum_authorized_score: 60,
        }
    }

    pub fn is_critical(&self, doc_type: &str) -> bool {
        self.critical_types
            .iter()
            .any(|critical| critical.name == doc_type)
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
