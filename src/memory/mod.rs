//! Adaptive memory: the learning half of the scorer.
//!
//! Wraps the persisted memory document behind one lock so every
//! read-modify-write cycle (outcome recording, feedback application) is
//! serialized. All arithmetic lives in the pure submodules; this engine only
//! sequences load, mutate and save.

pub mod performance;
pub mod state;
pub mod store;
pub mod weights;

use anyhow::{Context, Result};
use std::sync::Mutex;
use tracing::info;

use crate::types::{FeedbackType, Outcome, RiskFactors, TokenRiskAnalysis};

pub use performance::{PerformanceWindow, GOLDEN_DOG_RULE_ID};
pub use state::{MemoryState, OutcomeRecord, RulePerformance, UserFeedback, UserReputation};
pub use store::{FileStore, MemoryStore};
pub use weights::RuleWeights;

use state::{now_iso, upsert_user_reputation};

/// Reputation assumed for users we have no score for yet.
pub const DEFAULT_REPUTATION: f64 = 30.0;

/// A realized outcome to be folded into memory.
#[derive(Debug, Clone)]
pub struct NewOutcome {
    pub token_address: String,
    pub outcome: Outcome,
    pub max_gain: Option<f64>,
    pub max_loss: Option<f64>,
    /// Whether the token had been called a golden dog. Unknown means the
    /// outcome is stored but the decision rule is not graded.
    pub is_golden_dog: Option<bool>,
    pub risk_factors: Option<RiskFactors>,
    pub confidence_weight: Option<f64>,
}

/// User feedback on a golden dog call.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub token_address: String,
    pub feedback_type: FeedbackType,
    pub user_id: String,
    pub channel: String,
    /// Caller-supplied reputation override in [0, 100].
    pub user_reputation: Option<f64>,
}

pub struct AdaptiveMemory {
    store: Mutex<Box<dyn MemoryStore>>,
}

impl AdaptiveMemory {
    pub fn new(store: Box<dyn MemoryStore>) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    fn snapshot(&self) -> MemoryState {
        let store = self.store.lock().unwrap();
        store.load().unwrap_or_default()
    }

    pub fn current_weights(&self) -> RuleWeights {
        self.snapshot().weights
    }

    /// Golden dog score under the currently learned weights.
    pub fn estimate_score(
        &self,
        risk_score: f64,
        is_golden_dog: bool,
        risk_factors: Option<&RiskFactors>,
    ) -> f64 {
        let state = self.snapshot();
        weights::estimate_score(&state.weights, risk_score, is_golden_dog, risk_factors)
    }

    /// Fill in the learned score on an analysis that does not carry one yet.
    pub fn ensure_golden_dog_score(&self, analysis: &mut TokenRiskAnalysis) {
        if analysis.golden_dog_score.is_some() {
            return;
        }
        let score = self.estimate_score(
            analysis.risk_score,
            analysis.is_golden_dog,
            Some(&analysis.risk_factors),
        );
        analysis.golden_dog_score = Some(score);
    }

    /// Record a realized outcome: append it to history, move the weights and
    /// grade the golden dog rule. Returns the new weights and cumulative rule
    /// performance.
    pub fn record_outcome(
        &self,
        input: NewOutcome,
    ) -> Result<(RuleWeights, Vec<RulePerformance>)> {
        let store = self.store.lock().unwrap();
        let mut state = store.load().unwrap_or_default();

        state.outcomes.push(OutcomeRecord {
            token_address: input.token_address.clone(),
            outcome: input.outcome,
            max_gain: input.max_gain,
            max_loss: input.max_loss,
            is_golden_dog: input.is_golden_dog,
            risk_factors: input.risk_factors,
            confidence_weight: input.confidence_weight,
            timestamp: now_iso(),
        });
        state.weights = weights::update_weights(
            &state.weights,
            input.outcome,
            input.is_golden_dog.unwrap_or(false),
        );
        state.rule_performance = performance::update_rule_performance_on_outcome(
            &state.rule_performance,
            GOLDEN_DOG_RULE_ID,
            input.outcome,
            input.is_golden_dog,
        );
        state.updated_at = now_iso();
        store
            .save(&state)
            .context("record-outcome: failed to persist memory")?;

        info!(
            "📊 Outcome recorded: {} {} (golden_dog={:?})",
            input.token_address,
            input.outcome.as_str(),
            input.is_golden_dog
        );
        Ok((state.weights, state.rule_performance))
    }

    /// Record user feedback: refresh the user's reputation, dampen the
    /// feedback by how often they have spoken, then move the weights.
    /// Returns the new weights and the stored feedback record.
    pub fn record_feedback(&self, input: NewFeedback) -> Result<(RuleWeights, UserFeedback)> {
        let store = self.store.lock().unwrap();
        let mut state = store.load().unwrap_or_default();

        let reputation = input
            .user_reputation
            .map(|r| r.clamp(0.0, 100.0))
            .unwrap_or(DEFAULT_REPUTATION);
        let base_weight = reputation / 100.0;

        state.user_reputations =
            upsert_user_reputation(&state.user_reputations, &input.user_id, reputation);
        let feedback_count = state
            .user_reputations
            .iter()
            .find(|entry| entry.user_id == input.user_id)
            .map(|entry| entry.feedback_count)
            .unwrap_or(1);
        let weight = weights::decay_feedback_weight(base_weight, feedback_count, reputation);

        state.weights = weights::apply_feedback(&state.weights, input.feedback_type, weight);

        let feedback = UserFeedback {
            token_address: input.token_address,
            feedback_type: input.feedback_type,
            user_id: input.user_id,
            channel: input.channel,
            user_reputation: reputation,
            feedback_weight: weight,
            timestamp: now_iso(),
        };
        state.feedbacks.push(feedback.clone());
        state.updated_at = now_iso();
        store
            .save(&state)
            .context("record-feedback: failed to persist memory")?;

        info!(
            "👥 Feedback recorded: {} {} from {} (weight {:.3})",
            feedback.token_address,
            feedback.feedback_type.as_str(),
            feedback.user_id,
            feedback.feedback_weight
        );
        Ok((state.weights, feedback))
    }

    /// Rolling 7d / 30d / all-time accuracy windows.
    pub fn performance_report(&self) -> Vec<PerformanceWindow> {
        let state = self.snapshot();
        performance::build_performance_windows(&state)
    }
}
