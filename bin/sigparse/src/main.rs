mod report;

use std::path::Path;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::Config;
use grammar::{GrammarRegistry, ProviderFileConfig};
use risk::{RiskFileConfig, RiskSettings, RiskSizer};

use report::Request;

/// Reads one JSON request per line from stdin and writes one JSON report
/// per line to stdout:
///
/// ```text
/// {"tag": "BFP", "text": "...", "price": 0.0283}
/// ```
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    // Logs go to stderr so stdout stays pure JSON.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // ── Config ───────────────────────────────────────────────────────────────
    let cfg = Config::from_env().context("reading environment")?;
    let (registry, mut risk_settings) = load_providers(&cfg.provider_config_path)?;
    if let Some(base_risk) = cfg.base_risk {
        risk_settings.base_risk = base_risk;
    }
    let sizer = RiskSizer::new(risk_settings);
    info!(
        providers = registry.len(),
        base_risk = risk_settings.base_risk,
        "sigparse ready"
    );

    // ── Request loop ─────────────────────────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let request: Request = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                warn!(err = %e, "Skipping malformed request");
                continue;
            }
        };
        let report = report::handle(&registry, &sizer, request);
        let mut out = serde_json::to_vec(&report)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    info!("Input closed. Exiting.");
    Ok(())
}

/// Registry and sizing settings from the provider file, or the built-in
/// defaults when there is no file.
fn load_providers(path: &str) -> anyhow::Result<(GrammarRegistry, RiskSettings)> {
    if !Path::new(path).exists() {
        info!(path, "No provider file, using built-in defaults");
        return Ok((GrammarRegistry::builtin(), RiskSettings::default()));
    }
    let providers =
        ProviderFileConfig::load(path).with_context(|| format!("loading providers from {path}"))?;
    let risk = RiskFileConfig::load(path).with_context(|| format!("loading risk from {path}"))?;
    let registry = GrammarRegistry::from_config(&providers)?;
    info!(path, overrides = providers.providers.len(), "Loaded provider file");
    Ok((registry, risk.risk))
}
