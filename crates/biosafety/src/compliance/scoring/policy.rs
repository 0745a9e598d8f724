use serde::{Deserialize, Serialize};

use super::config::ScoringPolicy;
use super::rules::ScoreSignals;

/// Why a provider lost its authorization to operate on site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockReason {
    ExpiredCriticalDocument { doc_types: Vec<String> },
    ScoreBelowMinimum { score: u8, minimum: u32 },
}

impl BlockReason {
    pub fn summary(&self) -> String {
        match self {
            BlockReason::ExpiredCriticalDocument { doc_types } => {
                format!("expired critical certificate(s): {}", doc_types.join(", "))
            }
            BlockReason::ScoreBelowMinimum { score, minimum } => {
                format!("score {score} below minimum {minimum}")
            }
        }
    }
}

pub(crate) fn decide_blocking(
    score: u8,
    policy: &ScoringPolicy,
    signals: &ScoreSignals,
) -> Vec<BlockReason> {
    let mut reasons = Vec::new();

    if !signals.expired_critical_types.is_empty() {
        reasons.push(BlockReason::ExpiredCriticalDocument {
            doc_types: signals.expired_critical_types.clone(),
        });
    }

    if u32::from(score) < policy.minimum_authorized_score {
        reasons.push(BlockReason::ScoreBelowMinimum {
            score,
            minimum: policy.minimum_authorized_score,
        });
    }

    reasons
}
