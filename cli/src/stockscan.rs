//! # stockscan
//!
//! Command-line access to the StockScan Pro backends. Each catalogue call is a
//! subcommand, `ajax`/`rest`/`api` reach the raw calls, and `smoke` runs the
//! direct API status checks with a pass/fail exit code.
//!
//! Configuration precedence: flags, then environment (`.env` included), then
//! the JSON files under `--config-dir`.

use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use lib_stockscan::{init_logging, BackendAdapter, BackendConfig, LoggerOptions, SmokeReport};
use serde_json::Value;

#[path = "./libcommands.rs"]
mod libcommands;
use libcommands::*;

#[tokio::main]
async fn main() -> ExitCode {
    // load .env files before anything else
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let logger_options = LoggerOptions {
        level: cli.log_level.clone(),
        console: true,
        log_dir: cli.log_dir.clone(),
    };
    // Held until exit so the file writer flushes.
    let _guard = init_logging("stockscan", &logger_options).context("Failed to initialize logging")?;

    let config = resolve_config(&cli)?;
    tracing::debug!(%config, "Backend configuration resolved");
    let adapter = BackendAdapter::from_config(&config).context("Failed to create backend adapter")?;

    let minify = cli.minify;
    let outcome = execute(&adapter, cli.command, default_client_name).await?;
    match outcome {
        Outcome::Value(value) => {
            println!("{}", render(&value, minify)?);
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Smoke(report) => {
            print_smoke_report(&report, minify)?;
            Ok(if report.all_passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

/// Files under `--config-dir` first, then `--base-url` and `--session-cookie`
/// (which clap already fills from the environment).
fn resolve_config(cli: &Cli) -> Result<BackendConfig> {
    let mut config = match &cli.config_dir {
        Some(dir) => BackendConfig::load_from_dir(dir)
            .with_context(|| format!("Failed to load configuration from {}", dir.display()))?,
        None => BackendConfig::default(),
    };

    if let Some(url) = &cli.base_url {
        let session_cookie = config.session_cookie.take();
        config = BackendConfig::new(url.as_str());
        config.session_cookie = session_cookie;
    }
    if let Some(cookie) = &cli.session_cookie {
        config = config.with_session_cookie(cookie.as_str());
    }

    config.validate()?;
    if config.backend_url.is_empty() {
        bail!("No backend URL: pass --base-url, set STOCKSCAN_BACKEND_URL, or add BackendUrl to the configuration files");
    }
    Ok(config)
}

fn default_client_name() -> String {
    format!("test_client_{}", chrono::Local::now().format("%H%M%S"))
}

fn render(value: &Value, minify: bool) -> Result<String> {
    let rendered = if minify {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(rendered)
}

fn print_smoke_report(report: &SmokeReport, minify: bool) -> Result<()> {
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(body) => {
                println!("✅ {} passed", outcome.name);
                println!("{}", render(body, minify)?);
            }
            Err(e) => println!("❌ {} failed: {}", outcome.name, e),
        }
    }
    // Reported only; a creation without an id still counts as passed.
    if report.created_id.is_none() {
        println!("❌ Status check creation failed");
    }
    if let Some(count) = report.listed_status_checks() {
        println!("✅ Retrieved {} status checks", count);
    }

    println!();
    println!("📊 Backend Tests Summary:");
    println!("{}", report);
    if report.all_passed() {
        println!("🎉 All backend tests passed!");
    } else {
        println!("⚠️  Some backend tests failed");
    }
    Ok(())
}
