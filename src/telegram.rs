//! Telegram notifications for golden dog hits.
//!
//! Disabled unless the notify channel is "telegram" (or "tg") and both a
//! bot token and chat id are present. Delivery failures are the caller's
//! problem to log; a dead bot must never stall the scan loop.

use anyhow::{bail, Result};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::config::NotifyConfig;

pub struct TelegramNotifier {
    client: Client,
    bot_token: String,
    chat_id: String,
    enabled: bool,
}

impl TelegramNotifier {
    pub fn from_config(config: &NotifyConfig) -> Self {
        let channel = config.channel.trim().to_lowercase();
        let chat_id = normalize_chat_id(&config.chat_id);
        let enabled = (channel == "telegram" || channel == "tg")
            && !config.bot_token.is_empty()
            && !chat_id.is_empty();

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            bot_token: config.bot_token.clone(),
            chat_id,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Send a plain text message. No-op when the notifier is disabled.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        if !self.enabled {
            debug!("Telegram notifications disabled, skipping message");
            return Ok(());
        }

        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let payload = json!({
            "chat_id": self.chat_id,
            "text": text,
            "disable_web_page_preview": true,
        });

        let response = self.client.post(&url).json(&payload).send().await?;
        if !response.status().is_success() {
            let error_text = response.text().await?;
            bail!("Telegram API error: {}", error_text);
        }
        Ok(())
    }

    pub async fn notify_golden_dog(
        &self,
        token_address: &str,
        token_symbol: Option<&str>,
        golden_dog_score: Option<f64>,
        risk_score: Option<f64>,
        decision: Option<&str>,
    ) -> Result<()> {
        let message = golden_dog_message(
            token_address,
            token_symbol,
            golden_dog_score,
            risk_score,
            decision,
        );
        self.send_message(&message).await
    }
}

/// Chat ids may arrive prefixed with the channel name ("telegram:123").
fn normalize_chat_id(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = trimmed
        .strip_prefix("telegram:")
        .or_else(|| trimmed.strip_prefix("tg:"))
        .unwrap_or(trimmed);
    stripped.trim().to_string()
}

fn golden_dog_message(
    token_address: &str,
    token_symbol: Option<&str>,
    golden_dog_score: Option<f64>,
    risk_score: Option<f64>,
    decision: Option<&str>,
) -> String {
    let mut lines = vec!["🐕 Golden Dog detected".to_string()];
    match token_symbol {
        Some(symbol) if !symbol.is_empty() => lines.push(format!("Token: {}", symbol)),
        _ => lines.push("Token: (unknown)".to_string()),
    }
    lines.push(format!("Address: {}", token_address));
    match golden_dog_score {
        Some(score) => lines.push(format!("GoldenDogScore: {:.2}", score)),
        None => lines.push("GoldenDogScore: (unknown)".to_string()),
    }
    match risk_score {
        Some(score) => lines.push(format!("RiskScore: {:.2}", score)),
        None => lines.push("RiskScore: (unknown)".to_string()),
    }
    match decision {
        Some(reason) if !reason.is_empty() => lines.push(format!("Decision: {}", reason)),
        _ => lines.push("Decision: (none)".to_string()),
    }
    lines.join("\n")
}
