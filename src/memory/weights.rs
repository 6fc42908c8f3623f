//! Learned rule weights and the update rules that move them.
//!
//! Every mutation is a pure function from old weights to new weights so the
//! engine can serialize them behind one lock and tests can drive arbitrary
//! sequences. Each weight moves in small steps and stays inside a fixed
//! band regardless of the outcome or feedback stream.

use serde::{Deserialize, Serialize};

use crate::types::{FeedbackType, Outcome, RiskFactors};

/// Bias bounds. Outcome learning keeps the bias in [4, 25]; feedback can
/// drag it down to 2.
const BIAS_MAX: f64 = 25.0;

/// Adjustable scoring weights, persisted with the rest of the memory state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleWeights {
    /// Multiplier applied to the deterministic risk score.
    pub base_multiplier: f64,
    /// Bonus for tokens flagged golden dog (half of it is charged as a
    /// malus when the flag is off).
    pub golden_dog_bias: f64,
    /// Penalty per HIGH risk factor.
    pub high_penalty: f64,
    /// Penalty per MEDIUM risk factor.
    pub medium_penalty: f64,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            base_multiplier: 1.0,
            golden_dog_bias: 12.0,
            high_penalty: 15.0,
            medium_penalty: 6.0,
        }
    }
}

/// Golden dog score estimate under the given weights, clamped to [0, 100].
pub fn estimate_score(
    weights: &RuleWeights,
    risk_score: f64,
    is_golden_dog: bool,
    risk_factors: Option<&RiskFactors>,
) -> f64 {
    let (high, medium) = match risk_factors {
        Some(factors) => (factors.count_high(), factors.count_medium()),
        None => (0, 0),
    };
    let bias = if is_golden_dog {
        weights.golden_dog_bias
    } else {
        -(weights.golden_dog_bias / 2.0).round()
    };
    let raw = risk_score * weights.base_multiplier + bias
        - weights.high_penalty * high as f64
        - weights.medium_penalty * medium as f64;
    raw.round().clamp(0.0, 100.0)
}

/// Move the weights after a realized outcome. Only golden dog calls teach:
/// a MOON confirms the call, a RUG or a FLAT says it was too eager. Non
/// golden tokens that moon deliberately change nothing, so missed winners
/// never loosen the risk penalties.
pub fn update_weights(weights: &RuleWeights, outcome: Outcome, is_golden_dog: bool) -> RuleWeights {
    let mut next = *weights;
    match outcome {
        Outcome::Moon if is_golden_dog => {
            next.golden_dog_bias = (next.golden_dog_bias + 1.0).min(BIAS_MAX);
            next.high_penalty = (next.high_penalty - 0.5).max(8.0);
            next.medium_penalty = (next.medium_penalty - 0.25).max(4.0);
        }
        Outcome::Rug if is_golden_dog => {
            next.golden_dog_bias = (next.golden_dog_bias - 2.0).max(4.0);
            next.high_penalty = (next.high_penalty + 1.0).min(25.0);
            next.medium_penalty = (next.medium_penalty + 0.5).min(12.0);
        }
        Outcome::Flat if is_golden_dog => {
            next.golden_dog_bias = (next.golden_dog_bias - 0.5).max(6.0);
        }
        _ => {}
    }
    next
}

/// Move the weights after user feedback, scaled by the (already decayed)
/// feedback weight in [0, 1].
pub fn apply_feedback(
    weights: &RuleWeights,
    feedback_type: FeedbackType,
    weight: f64,
) -> RuleWeights {
    let w = weight.clamp(0.0, 1.0);
    let mut next = *weights;
    match feedback_type {
        FeedbackType::ConfirmGolden => {
            next.golden_dog_bias = (next.golden_dog_bias + 1.2 * w).min(BIAS_MAX);
        }
        FeedbackType::DenyGolden => {
            next.golden_dog_bias = (next.golden_dog_bias - 1.5 * w).max(4.0);
            next.medium_penalty = (next.medium_penalty + 0.4 * w).min(12.0);
        }
        FeedbackType::ReportRug => {
            next.golden_dog_bias = (next.golden_dog_bias - 2.0 * w).max(2.0);
            next.high_penalty = (next.high_penalty + 0.8 * w).min(25.0);
            next.medium_penalty = (next.medium_penalty + 0.5 * w).min(12.0);
        }
    }
    next
}

/// Dampen a feedback weight by how often the user has spoken and how
/// trusted they are. A prolific user's hundredth report moves the weights
/// far less than their first; reputation scales the result between 70% and
/// 100%. Output is pinned to [0.05, 1].
pub fn decay_feedback_weight(
    base_weight: f64,
    user_feedback_count: u32,
    user_reputation: f64,
) -> f64 {
    let clamped_base = base_weight.clamp(0.0, 1.0);
    let count = user_feedback_count.max(1) as f64;
    let count_decay = 1.0 / (1.0 + count.log10());
    let reputation_boost = 0.7 + user_reputation.clamp(0.0, 100.0) / 100.0 * 0.3;
    (clamped_base * count_decay * reputation_boost).clamp(0.05, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FactorLevel;
    use proptest::prelude::*;

    fn full_factors(
        honeypot: FactorLevel,
        tax: FactorLevel,
        owner: FactorLevel,
        concentration: FactorLevel,
    ) -> RiskFactors {
        RiskFactors {
            honeypot_risk: Some(honeypot),
            tax_risk: Some(tax),
            owner_risk: Some(owner),
            concentration_risk: Some(concentration),
        }
    }

    #[test]
    fn test_default_weights_match_initial_state() {
        let w = RuleWeights::default();
        assert_eq!(w.base_multiplier, 1.0);
        assert_eq!(w.golden_dog_bias, 12.0);
        assert_eq!(w.high_penalty, 15.0);
        assert_eq!(w.medium_penalty, 6.0);
    }

    #[test]
    fn test_estimate_applies_bias_and_penalties() {
        let w = RuleWeights::default();
        // 60 + 12 - 15 - 6 = 51
        let factors = full_factors(
            FactorLevel::High,
            FactorLevel::Medium,
            FactorLevel::Low,
            FactorLevel::Low,
        );
        assert_eq!(estimate_score(&w, 60.0, true, Some(&factors)), 51.0);
        // Non golden: 60 - round(12 / 2) = 54, no factors given
        assert_eq!(estimate_score(&w, 60.0, false, None), 54.0);
    }

    #[test]
    fn test_estimate_clamps_both_ends() {
        let w = RuleWeights::default();
        let worst = full_factors(
            FactorLevel::High,
            FactorLevel::High,
            FactorLevel::High,
            FactorLevel::High,
        );
        assert_eq!(estimate_score(&w, 0.0, false, Some(&worst)), 0.0);
        let clean = full_factors(
            FactorLevel::Low,
            FactorLevel::Low,
            FactorLevel::Low,
            FactorLevel::Low,
        );
        assert_eq!(estimate_score(&w, 100.0, true, Some(&clean)), 100.0);
    }

    #[test]
    fn test_estimate_stays_in_range_for_every_factor_combination() {
        let levels = [FactorLevel::Low, FactorLevel::Medium, FactorLevel::High];
        let w = RuleWeights::default();
        for honeypot in levels {
            for tax in levels {
                for owner in levels {
                    for concentration in levels {
                        let factors = full_factors(honeypot, tax, owner, concentration);
                        for golden in [true, false] {
                            for risk_score in [0.0, 35.0, 80.0, 100.0] {
                                let score =
                                    estimate_score(&w, risk_score, golden, Some(&factors));
                                assert!((0.0..=100.0).contains(&score));
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_estimate_never_rises_when_a_factor_worsens() {
        let w = RuleWeights::default();
        let base = full_factors(
            FactorLevel::Low,
            FactorLevel::Low,
            FactorLevel::Low,
            FactorLevel::Low,
        );
        let one_medium = full_factors(
            FactorLevel::Low,
            FactorLevel::Medium,
            FactorLevel::Low,
            FactorLevel::Low,
        );
        let one_high = full_factors(
            FactorLevel::Low,
            FactorLevel::High,
            FactorLevel::Low,
            FactorLevel::Low,
        );
        for risk_score in [0.0, 30.0, 60.0, 100.0] {
            let clean = estimate_score(&w, risk_score, true, Some(&base));
            let medium = estimate_score(&w, risk_score, true, Some(&one_medium));
            let high = estimate_score(&w, risk_score, true, Some(&one_high));
            assert!(medium <= clean);
            assert!(high <= medium);
        }
    }

    #[test]
    fn test_moon_on_golden_dog_loosens_weights() {
        let w = update_weights(&RuleWeights::default(), Outcome::Moon, true);
        assert_eq!(w.golden_dog_bias, 13.0);
        assert_eq!(w.high_penalty, 14.5);
        assert_eq!(w.medium_penalty, 5.75);
        assert_eq!(w.base_multiplier, 1.0);
    }

    #[test]
    fn test_rug_on_golden_dog_tightens_weights() {
        let w = update_weights(&RuleWeights::default(), Outcome::Rug, true);
        assert_eq!(w.golden_dog_bias, 10.0);
        assert_eq!(w.high_penalty, 16.0);
        assert_eq!(w.medium_penalty, 6.5);
    }

    #[test]
    fn test_flat_on_golden_dog_only_trims_bias() {
        let w = update_weights(&RuleWeights::default(), Outcome::Flat, true);
        assert_eq!(w.golden_dog_bias, 11.5);
        assert_eq!(w.high_penalty, 15.0);
        assert_eq!(w.medium_penalty, 6.0);
    }

    #[test]
    fn test_non_golden_outcomes_change_nothing() {
        let defaults = RuleWeights::default();
        for outcome in [Outcome::Moon, Outcome::Rug, Outcome::Flat] {
            assert_eq!(update_weights(&defaults, outcome, false), defaults);
        }
    }

    #[test]
    fn test_report_rug_at_full_weight_matches_expected_steps() {
        let w = apply_feedback(&RuleWeights::default(), FeedbackType::ReportRug, 1.0);
        assert_eq!(w.golden_dog_bias, 10.0);
        assert_eq!(w.high_penalty, 15.8);
        assert_eq!(w.medium_penalty, 6.5);
    }

    #[test]
    fn test_feedback_weight_scales_the_step() {
        let half = apply_feedback(&RuleWeights::default(), FeedbackType::ConfirmGolden, 0.5);
        assert_eq!(half.golden_dog_bias, 12.6);
        // Out-of-range weights are clamped before use
        let over = apply_feedback(&RuleWeights::default(), FeedbackType::ConfirmGolden, 7.0);
        assert_eq!(over.golden_dog_bias, 13.2);
        let zero = apply_feedback(&RuleWeights::default(), FeedbackType::DenyGolden, 0.0);
        assert_eq!(zero, RuleWeights::default());
    }

    #[test]
    fn test_decay_keeps_first_report_of_trusted_user_strong() {
        let w = decay_feedback_weight(1.0, 1, 100.0);
        assert!((w - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_decay_has_a_floor() {
        let w = decay_feedback_weight(0.0, 1000, 0.0);
        assert_eq!(w, 0.05);
    }

    proptest! {
        #[test]
        fn test_weights_stay_bounded_for_any_outcome_sequence(
            seq in prop::collection::vec((0u8..3, any::<bool>()), 0..200)
        ) {
            let mut w = RuleWeights::default();
            for (code, golden) in seq {
                let outcome = match code {
                    0 => Outcome::Moon,
                    1 => Outcome::Rug,
                    _ => Outcome::Flat,
                };
                w = update_weights(&w, outcome, golden);
                prop_assert!(w.golden_dog_bias >= 4.0 && w.golden_dog_bias <= 25.0);
                prop_assert!(w.high_penalty >= 8.0 && w.high_penalty <= 25.0);
                prop_assert!(w.medium_penalty >= 4.0 && w.medium_penalty <= 12.0);
                prop_assert_eq!(w.base_multiplier, 1.0);
            }
        }

        #[test]
        fn test_weights_stay_bounded_for_any_feedback_sequence(
            seq in prop::collection::vec((0u8..3, 0.0f64..=1.0), 0..200)
        ) {
            let mut w = RuleWeights::default();
            for (code, weight) in seq {
                let feedback = match code {
                    0 => FeedbackType::ConfirmGolden,
                    1 => FeedbackType::DenyGolden,
                    _ => FeedbackType::ReportRug,
                };
                w = apply_feedback(&w, feedback, weight);
                prop_assert!(w.golden_dog_bias >= 2.0 && w.golden_dog_bias <= 25.0);
                prop_assert!(w.high_penalty >= 8.0 && w.high_penalty <= 25.0);
                prop_assert!(w.medium_penalty >= 4.0 && w.medium_penalty <= 12.0);
            }
        }

        #[test]
        fn test_estimate_is_always_clamped(
            risk_score in -500.0f64..500.0,
            golden in any::<bool>(),
            bias in 2.0f64..=25.0,
            high in 8.0f64..=25.0,
            medium in 4.0f64..=12.0,
        ) {
            let w = RuleWeights {
                base_multiplier: 1.0,
                golden_dog_bias: bias,
                high_penalty: high,
                medium_penalty: medium,
            };
            let score = estimate_score(&w, risk_score, golden, None);
            prop_assert!((0.0..=100.0).contains(&score));
        }

        #[test]
        fn test_decay_is_bounded_and_monotone(
            base in 0.0f64..=1.0,
            count in 1u32..10_000,
            reputation in 0.0f64..=100.0,
        ) {
            let w = decay_feedback_weight(base, count, reputation);
            prop_assert!((0.05..=1.0).contains(&w));

            // More prior feedback never increases influence
            let repeat = decay_feedback_weight(base, count + 1, reputation);
            prop_assert!(repeat <= w + 1e-12);

            // Better reputation never decreases influence
            let trusted = decay_feedback_weight(base, count, (reputation + 5.0).min(100.0));
            prop_assert!(trusted + 1e-12 >= w);
        }
    }
}
