// Persisted memory document: weights, outcome history, feedback history,
// per-user reputation and cumulative rule performance. Field names are
// camelCase on disk so existing memory files keep loading.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::memory::weights::RuleWeights;
use crate::types::{FeedbackType, Outcome, RiskFactors};

pub const MEMORY_VERSION: u32 = 1;

pub(crate) fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One realized trade outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeRecord {
    pub token_address: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_gain: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_golden_dog: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_factors: Option<RiskFactors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_weight: Option<f64>,
    pub timestamp: String,
}

/// One piece of user feedback, stored with the weight it was applied at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFeedback {
    pub token_address: String,
    pub feedback_type: FeedbackType,
    pub user_id: String,
    pub channel: String,
    pub user_reputation: f64,
    pub feedback_weight: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReputation {
    pub user_id: String,
    pub reputation: f64,
    pub feedback_count: u32,
    pub last_seen_at: String,
}

/// Cumulative accuracy for one rule or factor id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulePerformance {
    pub rule_id: String,
    pub correct: f64,
    pub total: f64,
    pub accuracy: f64,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryState {
    pub version: u32,
    pub updated_at: String,
    pub weights: RuleWeights,
    #[serde(default)]
    pub outcomes: Vec<OutcomeRecord>,
    #[serde(default)]
    pub feedbacks: Vec<UserFeedback>,
    #[serde(default)]
    pub user_reputations: Vec<UserReputation>,
    #[serde(default)]
    pub rule_performance: Vec<RulePerformance>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            version: MEMORY_VERSION,
            updated_at: now_iso(),
            weights: RuleWeights::default(),
            outcomes: Vec::new(),
            feedbacks: Vec::new(),
            user_reputations: Vec::new(),
            rule_performance: Vec::new(),
        }
    }
}

/// Insert or refresh one user's reputation entry. Returns a new list;
/// the stored count reflects feedback seen so far including this one.
pub fn upsert_user_reputation(
    list: &[UserReputation],
    user_id: &str,
    reputation: f64,
) -> Vec<UserReputation> {
    let mut next: Vec<UserReputation> = list.to_vec();
    match next.iter_mut().find(|entry| entry.user_id == user_id) {
        Some(entry) => {
            entry.reputation = reputation;
            entry.feedback_count += 1;
            entry.last_seen_at = now_iso();
        }
        None => {
            next.push(UserReputation {
                user_id: user_id.to_string(),
                reputation,
                feedback_count: 1,
                last_seen_at: now_iso(),
            });
        }
    }
    next
}
