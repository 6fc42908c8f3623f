// Shared types for token analysis, outcomes and feedback

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseEnumError {
    #[error("unknown outcome '{0}', expected MOON, RUG or FLAT")]
    Outcome(String),
    #[error("unknown feedback type '{0}', expected CONFIRM_GOLDEN, DENY_GOLDEN or REPORT_RUG")]
    FeedbackType(String),
    #[error("unknown risk level '{0}', expected LOW, MEDIUM or HIGH")]
    FactorLevel(String),
}

/// Per-factor risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FactorLevel {
    Low,
    Medium,
    High,
}

impl FactorLevel {
    pub fn as_str(&self) -> &str {
        match self {
            FactorLevel::Low => "LOW",
            FactorLevel::Medium => "MEDIUM",
            FactorLevel::High => "HIGH",
        }
    }
}

impl FromStr for FactorLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Ok(FactorLevel::Low),
            "MEDIUM" => Ok(FactorLevel::Medium),
            "HIGH" => Ok(FactorLevel::High),
            _ => Err(ParseEnumError::FactorLevel(s.to_string())),
        }
    }
}

/// Overall verdict band derived from the aggregate risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskBand {
    Safe,
    Warning,
    Danger,
}

impl RiskBand {
    pub fn as_str(&self) -> &str {
        match self {
            RiskBand::Safe => "SAFE",
            RiskBand::Warning => "WARNING",
            RiskBand::Danger => "DANGER",
        }
    }
}

/// Realized trade outcome reported back after a position resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Moon,
    Rug,
    Flat,
}

impl Outcome {
    pub fn as_str(&self) -> &str {
        match self {
            Outcome::Moon => "MOON",
            Outcome::Rug => "RUG",
            Outcome::Flat => "FLAT",
        }
    }
}

impl FromStr for Outcome {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MOON" => Ok(Outcome::Moon),
            "RUG" => Ok(Outcome::Rug),
            "FLAT" => Ok(Outcome::Flat),
            _ => Err(ParseEnumError::Outcome(s.to_string())),
        }
    }
}

/// User judgement on a golden dog call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackType {
    ConfirmGolden,
    DenyGolden,
    ReportRug,
}

impl FeedbackType {
    pub fn as_str(&self) -> &str {
        match self {
            FeedbackType::ConfirmGolden => "CONFIRM_GOLDEN",
            FeedbackType::DenyGolden => "DENY_GOLDEN",
            FeedbackType::ReportRug => "REPORT_RUG",
        }
    }
}

impl FromStr for FeedbackType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CONFIRM_GOLDEN" => Ok(FeedbackType::ConfirmGolden),
            "DENY_GOLDEN" => Ok(FeedbackType::DenyGolden),
            "REPORT_RUG" => Ok(FeedbackType::ReportRug),
            _ => Err(ParseEnumError::FeedbackType(s.to_string())),
        }
    }
}

/// Per-dimension risk breakdown. Individual levels may be absent when an
/// analysis arrives from an external source with partial coverage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honeypot_risk: Option<FactorLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_risk: Option<FactorLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_risk: Option<FactorLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concentration_risk: Option<FactorLevel>,
}

impl RiskFactors {
    pub fn count_high(&self) -> u32 {
        self.named_levels()
            .iter()
            .filter(|(_, level)| *level == Some(FactorLevel::High))
            .count() as u32
    }

    pub fn count_medium(&self) -> u32 {
        self.named_levels()
            .iter()
            .filter(|(_, level)| *level == Some(FactorLevel::Medium))
            .count() as u32
    }

    /// Factor levels paired with the rule ids used for accuracy tracking.
    pub fn named_levels(&self) -> [(&'static str, Option<FactorLevel>); 4] {
        [
            ("factor_honeypot", self.honeypot_risk),
            ("factor_tax", self.tax_risk),
            ("factor_owner", self.owner_risk),
            ("factor_concentration", self.concentration_risk),
        ]
    }
}

/// Full analysis verdict for one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRiskAnalysis {
    pub risk_score: f64,
    pub risk_level: RiskBand,
    pub is_golden_dog: bool,
    pub risk_factors: RiskFactors,
    pub reasoning: String,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub golden_dog_score: Option<f64>,
}

/// Token record as served by the backend. Vendor payloads (GoPlus,
/// DexScreener, holder distribution) stay untyped because upstream scanners
/// emit booleans as strings, numbers as strings, and omit fields freely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PendingToken {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liquidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pair_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goplus: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dexscreener: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_distribution: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enums_serialize_to_wire_names() {
        assert_eq!(
            serde_json::to_string(&Outcome::Moon).unwrap(),
            "\"MOON\""
        );
        assert_eq!(
            serde_json::to_string(&FeedbackType::ConfirmGolden).unwrap(),
            "\"CONFIRM_GOLDEN\""
        );
        assert_eq!(serde_json::to_string(&RiskBand::Safe).unwrap(), "\"SAFE\"");
        assert_eq!(
            serde_json::to_string(&FactorLevel::Medium).unwrap(),
            "\"MEDIUM\""
        );
    }

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!("moon".parse::<Outcome>().unwrap(), Outcome::Moon);
        assert_eq!(" RUG ".parse::<Outcome>().unwrap(), Outcome::Rug);
        assert_eq!(
            "report_rug".parse::<FeedbackType>().unwrap(),
            FeedbackType::ReportRug
        );
        assert_eq!("high".parse::<FactorLevel>().unwrap(), FactorLevel::High);
    }

    #[test]
    fn test_enum_parsing_rejects_unknown_values() {
        let err = "LAMBO".parse::<Outcome>().unwrap_err();
        assert!(err.to_string().contains("MOON"));
        let err = "UPVOTE".parse::<FeedbackType>().unwrap_err();
        assert!(err.to_string().contains("CONFIRM_GOLDEN"));
    }

    #[test]
    fn test_risk_factors_count_levels() {
        let factors = RiskFactors {
            honeypot_risk: Some(FactorLevel::High),
            tax_risk: Some(FactorLevel::Medium),
            owner_risk: Some(FactorLevel::Medium),
            concentration_risk: None,
        };
        assert_eq!(factors.count_high(), 1);
        assert_eq!(factors.count_medium(), 2);
    }

    #[test]
    fn test_analysis_uses_camel_case_fields() {
        let analysis = TokenRiskAnalysis {
            risk_score: 50.0,
            risk_level: RiskBand::Warning,
            is_golden_dog: true,
            risk_factors: RiskFactors {
                honeypot_risk: Some(FactorLevel::Low),
                tax_risk: Some(FactorLevel::High),
                owner_risk: Some(FactorLevel::Low),
                concentration_risk: Some(FactorLevel::Low),
            },
            reasoning: "test".to_string(),
            recommendation: "test".to_string(),
            golden_dog_score: None,
        };
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["riskScore"], 50.0);
        assert_eq!(json["riskLevel"], "WARNING");
        assert_eq!(json["isGoldenDog"], true);
        assert_eq!(json["riskFactors"]["taxRisk"], "HIGH");
        // Absent optional score must not serialize as null
        assert!(json.get("goldenDogScore").is_none());
    }

    #[test]
    fn test_pending_token_tolerates_unknown_and_missing_fields() {
        let raw = serde_json::json!({
            "address": "0xabc",
            "symbol": "DOG",
            "goplus": {"is_honeypot": "0"},
            "someFutureField": {"nested": true}
        });
        let token: PendingToken = serde_json::from_value(raw).unwrap();
        assert_eq!(token.address, "0xabc");
        assert_eq!(token.symbol.as_deref(), Some("DOG"));
        assert!(token.dexscreener.is_none());
        assert!(token.extra.contains_key("someFutureField"));
    }
}
