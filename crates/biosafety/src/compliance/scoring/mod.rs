mod config;
mod policy;
mod rules;

pub use config::{CriticalType, ScoringPolicy};
pub use policy::BlockReason;

use chrono::NaiveDate;
use policy::decide_blocking;
use serde::{Deserialize, Serialize};

use super::domain::{AlertThreshold, EmployeeId, Provider, ProviderId};

/// Stateless scorer applying a [`ScoringPolicy`] to one provider at a time.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    policy: ScoringPolicy,
}

impl ScoringEngine {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Score a provider from its employees' latest certificate per type.
    pub fn score_provider(
        &self,
        provider: &Provider,
        today: NaiveDate,
        threshold: AlertThreshold,
    ) -> ProviderScore {
        let (components, signals) =
            rules::score_employees(provider, &self.policy, today, threshold);

        let remaining = ScoringPolicy::STARTING_SCORE.saturating_sub(signals.total_penalty);
        let score = remaining.min(100) as u8;
        let block_reasons = decide_blocking(score, &self.policy, &signals);

        tracing::debug!(
            provider = %provider.id.0,
            score,
            blocked = !block_reasons.is_empty(),
            critical_alerts = signals.critical_alerts,
            "scored provider"
        );

        ProviderScore {
            provider_id: provider.id.clone(),
            provider_name: provider.name.clone(),
            score,
            is_blocked: !block_reasons.is_empty(),
            critical_alerts_count: signals.critical_alerts,
            employee_count: provider.employees.len(),
            components,
            block_reasons,
        }
    }
}

/// Whether a penalty came from an absent or a lapsed certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFinding {
    Missing,
    Expired,
}

/// Discrete deduction, kept so a score can be audited line by line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub doc_type: String,
    pub finding: ScoreFinding,
    pub penalty: u32,
    pub notes: String,
}

/// Derived compliance view of a provider. Recomputed on every pass, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderScore {
    pub provider_id: ProviderId,
    pub provider_name: String,
    pub score: u8,
    pub is_blocked: bool,
    pub critical_alerts_count: usize,
    pub employee_count: usize,
    pub components: Vec<ScoreComponent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_reasons: Vec<BlockReason>,
}

impl ProviderScore {
    pub fn authorization_label(&self) -> &'static str {
        if self.is_blocked {
            "blocked"
        } else {
            "authorized"
        }
    }

    pub fn block_summary(&self) -> Option<String> {
        if self.block_reasons.is_empty() {
            return None;
        }
        Some(
            self.block_reasons
                .iter()
                .map(BlockReason::summary)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
