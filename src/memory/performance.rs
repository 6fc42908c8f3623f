//! Accuracy bookkeeping for the golden dog rule and the individual risk
//! factors.
//!
//! The golden dog decision is scored strictly: a golden call is correct only
//! on MOON, a pass is correct only on RUG, and FLAT teaches nothing. Factor
//! grading is coarse (HIGH or MEDIUM should precede a RUG, LOW should
//! precede a MOON) and weighted by the reporter's confidence.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::memory::state::{now_iso, MemoryState, OutcomeRecord, RulePerformance};
use crate::types::{FactorLevel, Outcome, RiskFactors};

/// Rule id under which the overall golden dog call is tracked.
pub const GOLDEN_DOG_RULE_ID: &str = "golden_dog_decision";

/// Fold one graded result into the list, copy-on-write.
fn record_result(
    list: &[RulePerformance],
    rule_id: &str,
    correct: bool,
    weight: f64,
) -> Vec<RulePerformance> {
    let mut next = list.to_vec();
    match next.iter_mut().find(|entry| entry.rule_id == rule_id) {
        Some(entry) => {
            entry.total += weight;
            if correct {
                entry.correct += weight;
            }
            entry.accuracy = if entry.total > 0.0 {
                entry.correct / entry.total
            } else {
                0.0
            };
            entry.updated_at = now_iso();
        }
        None => {
            next.push(RulePerformance {
                rule_id: rule_id.to_string(),
                correct: if correct { weight } else { 0.0 },
                total: weight,
                accuracy: if correct { 1.0 } else { 0.0 },
                updated_at: now_iso(),
            });
        }
    }
    next
}

/// Grade the golden dog call against a realized outcome. Outcomes recorded
/// without the original call (is_golden_dog unknown) and FLAT outcomes are
/// not graded.
pub fn update_rule_performance_on_outcome(
    list: &[RulePerformance],
    rule_id: &str,
    outcome: Outcome,
    is_golden_dog: Option<bool>,
) -> Vec<RulePerformance> {
    let golden = match is_golden_dog {
        Some(golden) => golden,
        None => return list.to_vec(),
    };
    if outcome == Outcome::Flat {
        return list.to_vec();
    }
    let correct =
        (golden && outcome == Outcome::Moon) || (!golden && outcome == Outcome::Rug);
    record_result(list, rule_id, correct, 1.0)
}

/// A factor predicted correctly when it was alarmed before a RUG or calm
/// before a MOON. FLAT grades nothing.
fn factor_prediction_correct(level: Option<FactorLevel>, outcome: Outcome) -> Option<bool> {
    let level = level?;
    match outcome {
        Outcome::Flat => None,
        Outcome::Rug => Some(matches!(level, FactorLevel::High | FactorLevel::Medium)),
        Outcome::Moon => Some(level == FactorLevel::Low),
    }
}

/// Grade each known factor against the outcome, each contribution scaled by
/// the outcome's confidence weight clamped to [0.1, 1].
pub fn update_factor_performance_on_outcome(
    list: &[RulePerformance],
    outcome: Outcome,
    risk_factors: Option<&RiskFactors>,
    confidence_weight: Option<f64>,
) -> Vec<RulePerformance> {
    if outcome == Outcome::Flat {
        return list.to_vec();
    }
    let factors = match risk_factors {
        Some(factors) => factors,
        None => return list.to_vec(),
    };
    let weight = confidence_weight.unwrap_or(1.0).clamp(0.1, 1.0);
    let mut next = list.to_vec();
    for (rule_id, level) in factors.named_levels() {
        if let Some(correct) = factor_prediction_correct(level, outcome) {
            next = record_result(&next, rule_id, correct, weight);
        }
    }
    next
}

/// One rolling accuracy window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceWindow {
    pub window: String,
    pub by_rule: Vec<RulePerformance>,
}

/// Recompute rule and factor accuracy over the last 7 days, the last 30
/// days and the full history. Records with unparsable timestamps are
/// skipped.
pub fn build_performance_windows(state: &MemoryState) -> Vec<PerformanceWindow> {
    let now = Utc::now();
    vec![
        build_window(&state.outcomes, now, Some(7), "7d"),
        build_window(&state.outcomes, now, Some(30), "30d"),
        build_window(&state.outcomes, now, None, "all"),
    ]
}

fn build_window(
    outcomes: &[OutcomeRecord],
    now: DateTime<Utc>,
    days: Option<i64>,
    label: &str,
) -> PerformanceWindow {
    let cutoff = days.map(|d| now - Duration::days(d));
    let mut by_rule: Vec<RulePerformance> = Vec::new();
    for record in outcomes {
        let ts = match DateTime::parse_from_rfc3339(&record.timestamp) {
            Ok(ts) => ts.with_timezone(&Utc),
            Err(_) => continue,
        };
        if let Some(cutoff) = cutoff {
            if ts < cutoff {
                continue;
            }
        }
        by_rule = update_rule_performance_on_outcome(
            &by_rule,
            GOLDEN_DOG_RULE_ID,
            record.outcome,
            record.is_golden_dog,
        );
        by_rule = update_factor_performance_on_outcome(
            &by_rule,
            record.outcome,
            record.risk_factors.as_ref(),
            record.confidence_weight,
        );
    }
    PerformanceWindow {
        window: label.to_string(),
        by_rule,
    }
}
