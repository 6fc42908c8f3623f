//! Backend API client.
//!
//! Fetches pending tokens and submits analyses. When an HMAC secret is
//! configured every request carries X-Timestamp / X-Nonce / X-Signature
//! headers over "METHOD\npath\ntimestamp\nnonce\nbody" (path includes the
//! query string, body is empty for GET).

use anyhow::{bail, Context, Result};
use hmac::{Hmac, Mac};
use reqwest::{Client, Method};
use serde_json::Value;
use sha2::Sha256;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::types::{PendingToken, TokenRiskAnalysis};

type HmacSha256 = Hmac<Sha256>;

pub struct ServerClient {
    client: Client,
    base_url: String,
    api_key: String,
    user_id: String,
    hmac_secret: String,
}

impl ServerClient {
    pub fn new(config: &ServerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            user_id: config.user_id.clone(),
            hmac_secret: config.hmac_secret.clone(),
        }
    }

    /// Pending tokens for analysis, newest first as served by the backend.
    /// The limit has a floor of 1.
    pub async fn fetch_pending_tokens(&self, limit: u32) -> Result<Vec<PendingToken>> {
        let limit = limit.max(1);
        let payload = self
            .request_json(Method::GET, &format!("/api/tokens/pending?limit={}", limit), None)
            .await?;
        Ok(normalize_token_list(payload))
    }

    /// Submit one finished analysis for a token.
    pub async fn submit_analysis(
        &self,
        token_address: &str,
        analysis: &TokenRiskAnalysis,
    ) -> Result<Value> {
        let body = serde_json::to_value(analysis).context("Failed to serialize analysis")?;
        self.request_json(Method::POST, &analysis_path(token_address), Some(&body))
            .await
    }

    async fn request_json(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let body_text = match body {
            Some(value) => serde_json::to_string(value).context("Failed to serialize body")?,
            None => String::new(),
        };

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header("Content-Type", "application/json");
        if !self.api_key.is_empty() {
            request = request.header("X-API-Key", &self.api_key);
        }
        if !self.user_id.is_empty() {
            request = request.header("X-User-Id", &self.user_id);
        }
        if !self.hmac_secret.is_empty() {
            let timestamp = chrono::Utc::now().timestamp().to_string();
            let nonce = Uuid::new_v4().to_string();
            let signature = sign_payload(
                &self.hmac_secret,
                method.as_str(),
                path,
                &timestamp,
                &nonce,
                &body_text,
            );
            request = request
                .header("X-Timestamp", timestamp)
                .header("X-Nonce", nonce)
                .header("X-Signature", signature);
        }
        if body.is_some() {
            request = request.body(body_text);
        }

        debug!("{} {}", method, url);
        let response = request
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .context("Failed to read response body")?;
        if !status.is_success() {
            bail!(
                "Server API {} {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("error"),
                text
            );
        }
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).with_context(|| format!("Invalid JSON from {}", url))
    }
}

/// Analysis submission path. The address lands in a path segment, so it is
/// percent-encoded; the signature covers the encoded form.
fn analysis_path(token_address: &str) -> String {
    format!("/api/tokens/{}/analysis", urlencoding::encode(token_address))
}

fn sign_payload(
    secret: &str,
    method: &str,
    path: &str,
    timestamp: &str,
    nonce: &str,
    body: &str,
) -> String {
    let payload = format!("{}\n{}\n{}\n{}\n{}", method, path, timestamp, nonce, body);
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// The backend answers either with a bare array or a {"data": [...]}
/// envelope. Records without a usable address are dropped.
fn normalize_token_list(payload: Value) -> Vec<PendingToken> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<PendingToken>(item).ok())
        .filter(|token| !token.address.trim().is_empty())
        .collect()
}
