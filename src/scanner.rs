//! Scan loop: periodically pulls pending tokens from the backend, runs the
//! classifier, attaches the learned golden dog score, submits the analysis
//! and raises a Telegram alert for golden dogs. One bad token never stops
//! the rest of the batch.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::classifier;
use crate::config::ScannerConfig;
use crate::memory::AdaptiveMemory;
use crate::server_api::ServerClient;
use crate::telegram::TelegramNotifier;
use crate::types::PendingToken;

pub fn spawn_scanner(
    client: Arc<ServerClient>,
    memory: Arc<AdaptiveMemory>,
    notifier: Arc<TelegramNotifier>,
    config: ScannerConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "🔎 Scanner: Started (interval={}s, limit={})",
            config.interval_secs, config.fetch_limit
        );
        let mut interval = tokio::time::interval(Duration::from_secs(config.interval_secs.max(1)));
        loop {
            interval.tick().await;
            if let Err(e) = run_scan_cycle(&client, &memory, &notifier, &config).await {
                warn!("⚠️  Scan cycle failed: {}", e);
            }
        }
    })
}

async fn run_scan_cycle(
    client: &ServerClient,
    memory: &AdaptiveMemory,
    notifier: &TelegramNotifier,
    config: &ScannerConfig,
) -> Result<()> {
    let tokens = client.fetch_pending_tokens(config.fetch_limit).await?;
    if tokens.is_empty() {
        debug!("No pending tokens this cycle");
        return Ok(());
    }
    info!("📥 Fetched {} pending tokens", tokens.len());

    for token in &tokens {
        if let Err(e) = process_token(client, memory, notifier, token).await {
            warn!("Failed to process {}: {}", token.address, e);
        }
    }
    Ok(())
}

async fn process_token(
    client: &ServerClient,
    memory: &AdaptiveMemory,
    notifier: &TelegramNotifier,
    token: &PendingToken,
) -> Result<()> {
    let mut analysis = classifier::classify(token);
    memory.ensure_golden_dog_score(&mut analysis);
    client.submit_analysis(&token.address, &analysis).await?;

    if analysis.is_golden_dog {
        info!(
            "🎯 GOLDEN DOG: {} | score {:.0} | risk {:.0} ({})",
            token.address,
            analysis.golden_dog_score.unwrap_or(0.0),
            analysis.risk_score,
            analysis.risk_level.as_str()
        );
        // Alert failures are logged, never fatal
        if let Err(e) = notifier
            .notify_golden_dog(
                &token.address,
                token.symbol.as_deref(),
                analysis.golden_dog_score,
                Some(analysis.risk_score),
                Some(&analysis.recommendation),
            )
            .await
        {
            warn!("Telegram alert failed for {}: {}", token.address, e);
        }
    } else {
        debug!(
            "Token {} classified {} (score {:.0})",
            token.address,
            analysis.risk_level.as_str(),
            analysis.risk_score
        );
    }
    Ok(())
}
