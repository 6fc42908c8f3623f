//! Deterministic token risk classifier.
//!
//! Pure function over one token record: four factor levels (honeypot, tax,
//! owner, concentration), an aggregate 0-100 score, a SAFE/WARNING/DANGER
//! band and the golden dog gate. Same input always yields the same verdict;
//! anything learned lives in the adaptive memory, not here.

use serde_json::Value;

use crate::coerce::{read, to_bool, to_number};
use crate::types::{FactorLevel, PendingToken, RiskBand, RiskFactors, TokenRiskAnalysis};

const BASE_SCORE: f64 = 80.0;
const HIGH_FACTOR_PENALTY: f64 = 30.0;
const MEDIUM_FACTOR_PENALTY: f64 = 12.0;

/// Momentum gate for the golden dog call: h1 price pump above this percent.
const MOMENTUM_MIN_PRICE_CHANGE_H1: f64 = 10.0;
/// Minimum pool liquidity in USD for a golden dog.
const MOMENTUM_MIN_LIQUIDITY_USD: f64 = 5_000.0;

/// Classify one token. Missing or malformed vendor fields degrade to their
/// neutral value (false / 0) instead of failing the analysis.
pub fn classify(token: &PendingToken) -> TokenRiskAnalysis {
    let goplus = token.goplus.as_ref();
    let dex = token.dexscreener.as_ref();
    let holders = token.holder_distribution.as_ref();

    let buy_tax = normalize_tax(to_number(read(goplus, &["buy_tax"])));
    let sell_tax = normalize_tax(to_number(read(goplus, &["sell_tax"])));

    let price_change_h1 = to_number(read(dex, &["priceChange", "h1"]));
    let buys_h1 = to_number(read(dex, &["txns", "h1", "buys"]));
    let sells_h1 = to_number(read(dex, &["txns", "h1", "sells"]));
    let liquidity_usd = to_number(read(dex, &["liquidity", "usd"]));

    let top10_share = to_number(read(holders, &["top10Share"]));

    let factors = RiskFactors {
        honeypot_risk: Some(honeypot_risk(goplus)),
        tax_risk: Some(tax_risk(buy_tax, sell_tax)),
        owner_risk: Some(owner_risk(goplus)),
        concentration_risk: Some(concentration_risk(top10_share, buys_h1, sells_h1)),
    };

    let risk_score = score_factors(&factors);
    let risk_level = band_for_score(risk_score);

    let momentum_good = price_change_h1 > MOMENTUM_MIN_PRICE_CHANGE_H1
        && buys_h1 >= sells_h1
        && liquidity_usd >= MOMENTUM_MIN_LIQUIDITY_USD;
    let is_golden_dog = risk_level != RiskBand::Danger
        && factors.honeypot_risk != Some(FactorLevel::High)
        && momentum_good;

    let reasoning = format!(
        "GoPlus honeypot={}, buyTax={}, sellTax={}. \
         DEX h1 priceChange={}, txns buys/sells={}/{}, liquidityUsd={}. {}",
        raw_field(read(goplus, &["is_honeypot"])),
        raw_field(read(goplus, &["buy_tax"])),
        raw_field(read(goplus, &["sell_tax"])),
        price_change_h1,
        buys_h1,
        sells_h1,
        liquidity_usd,
        holder_summary(holders, top10_share),
    );

    let recommendation = if is_golden_dog {
        "Momentum and risk profile are acceptable for a small, controlled position.".to_string()
    } else {
        "Do not auto-buy yet; wait for stronger momentum or better ownership/risk signals."
            .to_string()
    };

    TokenRiskAnalysis {
        risk_score,
        risk_level,
        is_golden_dog,
        risk_factors: factors,
        reasoning,
        recommendation,
        golden_dog_score: None,
    }
}

/// Taxes arrive either as fractions (0.05) or percents (5). Values above 1
/// are treated as percents.
fn normalize_tax(value: f64) -> f64 {
    if value <= 1.0 {
        value
    } else {
        value / 100.0
    }
}

fn tax_risk(buy_tax: f64, sell_tax: f64) -> FactorLevel {
    let worst = buy_tax.max(sell_tax);
    if worst >= 0.15 {
        FactorLevel::High
    } else if worst >= 0.08 {
        FactorLevel::Medium
    } else {
        FactorLevel::Low
    }
}

fn owner_risk(goplus: Option<&Value>) -> FactorLevel {
    if to_bool(read(goplus, &["is_mintable"]))
        || to_bool(read(goplus, &["can_take_back_ownership"]))
    {
        FactorLevel::High
    } else if to_bool(read(goplus, &["is_proxy"])) {
        FactorLevel::Medium
    } else {
        FactorLevel::Low
    }
}

fn concentration_risk(top10_share: f64, buys_h1: f64, sells_h1: f64) -> FactorLevel {
    if top10_share >= 0.8 {
        FactorLevel::High
    } else if top10_share >= 0.6 {
        FactorLevel::Medium
    } else if sells_h1 > buys_h1 * 2.0 && sells_h1 >= 20.0 {
        // Heavy sell pressure stands in for concentration when holder data is thin
        FactorLevel::Medium
    } else {
        FactorLevel::Low
    }
}

fn honeypot_risk(goplus: Option<&Value>) -> FactorLevel {
    if to_bool(read(goplus, &["is_honeypot"])) {
        FactorLevel::High
    } else {
        FactorLevel::Low
    }
}

fn score_factors(factors: &RiskFactors) -> f64 {
    let mut score = BASE_SCORE;
    for (_, level) in factors.named_levels() {
        match level {
            Some(FactorLevel::High) => score -= HIGH_FACTOR_PENALTY,
            Some(FactorLevel::Medium) => score -= MEDIUM_FACTOR_PENALTY,
            _ => {}
        }
    }
    score.clamp(0.0, 100.0)
}

fn band_for_score(score: f64) -> RiskBand {
    if score >= 70.0 {
        RiskBand::Safe
    } else if score >= 45.0 {
        RiskBand::Warning
    } else {
        RiskBand::Danger
    }
}

/// Raw field rendering for the reasoning line. Shows the vendor value as
/// delivered so a reader can spot coercion surprises; absent fields show as
/// "unknown".
fn raw_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "unknown".to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn holder_summary(holders: Option<&Value>, top10_share: f64) -> String {
    match holders {
        Some(Value::Object(_)) | Some(Value::Array(_)) => {
            format!("Holder top10Share={}", top10_share)
        }
        _ => "Holder distribution unavailable".to_string(),
    }
}
