use std::time::Instant;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use handball_engine::batch::{self, BatchConfig};
use handball_engine::metrics::BatchMetrics;

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Handball batch runner v{}", env!("CARGO_PKG_VERSION"));

    let config = BatchConfig::load_or_default();
    config
        .match_config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid match configuration")?;
    info!(
        "Configuration loaded: seed={}, samples={}, steps={}, round={}",
        config.seed, config.samples, config.steps, config.round
    );

    let metrics = BatchMetrics::new();
    let started = Instant::now();
    let results = batch::run_batch(&config, &metrics).context("plan generation failed")?;
    info!(
        "Simulated {} scenarios in {:.2}s",
        results.len(),
        started.elapsed().as_secs_f64()
    );

    let summaries = batch::summarize(&results);
    let json = matches!(std::env::var("BATCH_FORMAT").as_deref(), Ok("json"));

    if json {
        let report = serde_json::json!({
            "behaviors": summaries,
            "metrics": metrics.to_json(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{:<16} {:>6} {:>6} {:>11} {:>14} {:>8} {:>7} {:>6}",
            "behavior", "runs", "goal", "intercepted", "attempt_failed", "no_goal", "timeout", "error"
        );
        for s in &summaries {
            println!(
                "{:<16} {:>6} {:>6} {:>11} {:>14} {:>8} {:>7} {:>6}",
                s.behavior.name(),
                s.runs,
                s.goals,
                s.intercepted,
                s.attempt_failed,
                s.no_goal,
                s.timeouts,
                s.errors
            );
        }
        println!();
        print!("{}", metrics.to_text());
    }

    let broken: usize = summaries.iter().map(|s| s.timeouts + s.errors).sum();
    if broken > 0 {
        warn!("{} scenarios timed out or errored", broken);
    }

    Ok(())
}
