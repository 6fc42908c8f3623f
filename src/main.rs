// Golden Dog CLI
// Scan daemon plus one-shot commands for analysis, score estimation and
// memory updates. All command output is pretty JSON on stdout; logs go to
// stderr so output stays pipeable.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use golden_dog::classifier;
use golden_dog::config::Config;
use golden_dog::memory::{weights, AdaptiveMemory, FileStore, NewFeedback, NewOutcome};
use golden_dog::scanner;
use golden_dog::server_api::ServerClient;
use golden_dog::telegram::TelegramNotifier;
use golden_dog::types::{FeedbackType, Outcome, PendingToken, RiskFactors};

#[derive(Parser)]
#[command(
    name = "golden-dog",
    version,
    about = "Meme-token risk scoring with feedback-learned golden dog weights"
)]
struct Cli {
    /// Config file (default: config.toml, then config.example.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scan loop: fetch pending tokens, classify, submit, alert
    Scan,
    /// Classify one token record given as inline JSON or @file
    Analyze {
        #[arg(long)]
        token: String,
    },
    /// Estimate the golden dog score under the current learned weights
    Estimate {
        #[arg(long)]
        risk_score: f64,
        /// Treat the token as a golden dog call
        #[arg(long)]
        golden_dog: bool,
        /// Factor levels as honeypot,tax,owner,concentration (e.g. low,high,low,low)
        #[arg(long)]
        factors: Option<String>,
    },
    /// Record a realized outcome and update the learned weights
    RecordOutcome {
        #[arg(long)]
        token_address: String,
        /// MOON, RUG or FLAT
        #[arg(long)]
        outcome: String,
        #[arg(long)]
        max_gain: Option<f64>,
        #[arg(long)]
        max_loss: Option<f64>,
        /// Whether the token had been called a golden dog (true/false)
        #[arg(long)]
        golden_dog: Option<bool>,
        /// Factor levels as honeypot,tax,owner,concentration
        #[arg(long)]
        factors: Option<String>,
        /// Outcome confidence in [0.1, 1]
        #[arg(long)]
        confidence: Option<f64>,
    },
    /// Record user feedback on a golden dog call
    RecordFeedback {
        #[arg(long)]
        token_address: String,
        /// CONFIRM_GOLDEN, DENY_GOLDEN or REPORT_RUG
        #[arg(long)]
        feedback_type: String,
        #[arg(long)]
        user_id: String,
        #[arg(long, default_value = "CLI")]
        channel: String,
        /// Reporter reputation in [0, 100]; defaults to 30 for unknown users
        #[arg(long)]
        reputation: Option<f64>,
    },
    /// Print rolling 7d / 30d / all-time rule and factor accuracy
    Report,
    /// Print the current learned weights
    ShowWeights,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default()?,
    };
    init_logging(&config);

    let memory = AdaptiveMemory::new(Box::new(FileStore::new(config.memory_path())));

    match cli.command {
        Command::Scan => run_scan(config, memory).await?,
        Command::Analyze { token } => {
            let token = read_token_arg(&token)?;
            let mut analysis = classifier::classify(&token);
            memory.ensure_golden_dog_score(&mut analysis);
            print_json(&analysis)?;
        }
        Command::Estimate {
            risk_score,
            golden_dog,
            factors,
        } => {
            let factors = factors.as_deref().map(parse_factors).transpose()?;
            let current = memory.current_weights();
            let score =
                weights::estimate_score(&current, risk_score, golden_dog, factors.as_ref());
            print_json(&serde_json::json!({ "score": score, "weights": current }))?;
        }
        Command::RecordOutcome {
            token_address,
            outcome,
            max_gain,
            max_loss,
            golden_dog,
            factors,
            confidence,
        } => {
            let outcome: Outcome = outcome.parse()?;
            let factors = factors.as_deref().map(parse_factors).transpose()?;
            let (weights, rule_performance) = memory.record_outcome(NewOutcome {
                token_address,
                outcome,
                max_gain,
                max_loss,
                is_golden_dog: golden_dog,
                risk_factors: factors,
                confidence_weight: confidence,
            })?;
            print_json(&serde_json::json!({
                "ok": true,
                "weights": weights,
                "rulePerformance": rule_performance,
            }))?;
        }
        Command::RecordFeedback {
            token_address,
            feedback_type,
            user_id,
            channel,
            reputation,
        } => {
            let feedback_type: FeedbackType = feedback_type.parse()?;
            let (weights, feedback) = memory.record_feedback(NewFeedback {
                token_address,
                feedback_type,
                user_id,
                channel,
                user_reputation: reputation,
            })?;
            print_json(&serde_json::json!({
                "ok": true,
                "weights": weights,
                "feedback": feedback,
            }))?;
        }
        Command::Report => print_json(&memory.performance_report())?,
        Command::ShowWeights => print_json(&memory.current_weights())?,
    }
    Ok(())
}

async fn run_scan(config: Config, memory: AdaptiveMemory) -> Result<()> {
    config.validate()?;

    info!("🚀 Golden Dog Scanner Starting...");
    info!("   Server: {}", config.server.base_url);
    info!("   Memory: {:?}", config.memory_path());

    let client = Arc::new(ServerClient::new(&config.server));
    let notifier = Arc::new(TelegramNotifier::from_config(&config.notify));
    if notifier.is_enabled() {
        info!("✅ Telegram alerts enabled");
    } else {
        info!("ℹ️  Telegram alerts disabled");
    }

    let memory = Arc::new(memory);
    let handle = scanner::spawn_scanner(client, memory, notifier, config.scanner.clone());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("👋 Shutdown signal received, stopping scanner");
    handle.abort();
    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.monitoring.log_level.clone()));

    if config.monitoring.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .init();
    }
}

/// Token JSON from the command line, either inline or @path to a file.
fn read_token_arg(arg: &str) -> Result<PendingToken> {
    let raw = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read token file: {}", path))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&raw).context("Failed to parse token JSON")
}

/// Four comma-separated levels in honeypot, tax, owner, concentration order.
fn parse_factors(spec: &str) -> Result<RiskFactors> {
    let parts: Vec<&str> = spec.split(',').map(|part| part.trim()).collect();
    if parts.len() != 4 {
        bail!("--factors expects four comma-separated levels: honeypot,tax,owner,concentration");
    }
    Ok(RiskFactors {
        honeypot_risk: Some(parts[0].parse()?),
        tax_risk: Some(parts[1].parse()?),
        owner_risk: Some(parts[2].parse()?),
        concentration_risk: Some(parts[3].parse()?),
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to render output")?
    );
    Ok(())
}
