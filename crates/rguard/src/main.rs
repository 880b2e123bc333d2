#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use releaseguard_core::config::{ConfigLayer, EngineConfig, WORKSPACE_CONFIG_PATH};
use releaseguard_core::errors::SourceError;
use releaseguard_core::signal::{self, Signal};
use releaseguard_core::traits::SignalSource;
use releaseguard_core::types::Decision;
use releaseguard_engine::decision::DecisionEngine;

/// Exit status when the decision is BLOCK.
const EXIT_BLOCKED: u8 = 2;

const DEFAULT_RELEASE_ID: &str = "local";

#[derive(Parser)]
#[command(
    name = "rguard",
    version,
    about = "Release-candidate gate: APPROVE, WARN or BLOCK from quality signals."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Evaluate a signal file and print the decision as JSON.
    Evaluate {
        /// Path to signals .json (or "-" / omit for stdin).
        #[arg(default_value = "-")]
        file: String,

        /// Release identifier (overrides the file's release_id).
        #[arg(long)]
        release: Option<String>,

        /// Append the result to this ledger.
        #[arg(long)]
        ledger: Option<String>,

        /// Risk score at which WARN starts.
        #[arg(long)]
        approve_threshold: Option<f64>,

        /// Risk score at which BLOCK starts.
        #[arg(long)]
        warn_threshold: Option<f64>,

        /// Refuse to evaluate a release with no signals at all.
        #[arg(long)]
        require_signals: bool,
    },

    /// Print the hard gate table in evaluation order.
    Gates {
        /// Output JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the signal catalog.
    Catalog {
        /// Output JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show signals, latest recorded evaluation and a summary for a release.
    Report {
        /// Path to signals .json.
        file: String,

        /// Ledger holding recorded evaluations.
        #[arg(long)]
        ledger: String,

        /// Release identifier (overrides the file's release_id).
        #[arg(long)]
        release: Option<String>,
    },

    /// Inspect an evaluation ledger.
    Ledger {
        /// Path to ledger .jsonl.
        path: String,

        /// Verify the hash chain.
        #[arg(long)]
        verify: bool,
    },

    /// Write workspace defaults (.releaseguard/config.json).
    Init,
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Cmd::Evaluate {
            file,
            release,
            ledger,
            approve_threshold,
            warn_threshold,
            require_signals,
        } => cmd_evaluate(
            &file,
            release,
            ledger.as_deref(),
            ConfigLayer {
                approve_threshold,
                warn_threshold,
            },
            require_signals,
        ),

        Cmd::Gates { json } => cmd_gates(json).map(|()| ExitCode::SUCCESS),

        Cmd::Catalog { json } => cmd_catalog(json).map(|()| ExitCode::SUCCESS),

        Cmd::Report {
            file,
            ledger,
            release,
        } => cmd_report(&file, &ledger, release).map(|()| ExitCode::SUCCESS),

        Cmd::Ledger { path, verify } => cmd_ledger(&path, verify).map(|()| ExitCode::SUCCESS),

        Cmd::Init => cmd_init().map(|()| ExitCode::SUCCESS),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("RELEASEGUARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

// ── Signal input ────────────────────────────────────────────────

/// Signals of a single release read from one file.
struct FileSignals {
    release_id: String,
    signals: Vec<Signal>,
}

impl FileSignals {
    fn load(file: &str, release: Option<String>) -> Result<Self> {
        let parsed = if file == "-" {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            signal::parse_signal_file(&buf, "stdin")?
        } else {
            signal::load_signal_file(file)?
        };
        let (file_release, signals) = parsed.into_parts();
        let release_id = release
            .or(file_release)
            .unwrap_or_else(|| DEFAULT_RELEASE_ID.to_string());
        Ok(Self {
            release_id,
            signals,
        })
    }
}

impl SignalSource for FileSignals {
    fn release_signals(&self, release_id: &str) -> Result<Vec<Signal>, SourceError> {
        if release_id != self.release_id {
            return Err(SourceError::ReleaseNotFound(release_id.to_string()));
        }
        Ok(self.signals.clone())
    }
}

fn resolve_config(cli: ConfigLayer) -> Result<EngineConfig> {
    let config = ConfigLayer::load_file(WORKSPACE_CONFIG_PATH)?
        .merge(ConfigLayer::from_env()?)
        .merge(cli)
        .resolve()?;
    tracing::debug!(
        approve = config.approve_threshold(),
        warn = config.warn_threshold(),
        "thresholds resolved"
    );
    Ok(config)
}

// ── Commands ────────────────────────────────────────────────────

fn cmd_evaluate(
    file: &str,
    release: Option<String>,
    ledger: Option<&str>,
    thresholds: ConfigLayer,
    require_signals: bool,
) -> Result<ExitCode> {
    let config = resolve_config(thresholds)?;
    let source = FileSignals::load(file, release)?;
    if require_signals && source.signals.is_empty() {
        bail!(
            "no signals found for release {}; ingest signals before evaluating",
            source.release_id
        );
    }

    let engine = DecisionEngine::new(config);
    let result = engine.evaluate_release(&source, &source.release_id)?;

    if let Some(path) = ledger {
        let hash =
            releaseguard_engine::ledger::append_evaluation(path, &source.release_id, &result)?;
        eprintln!("  recorded in {path} ({hash})");
    }

    let mut out = serde_json::to_value(&result)?;
    if let Some(obj) = out.as_object_mut() {
        obj.insert(
            "release_id".into(),
            serde_json::Value::String(source.release_id.clone()),
        );
    }
    println!("{}", serde_json::to_string_pretty(&out)?);

    eprintln!(
        "  {} (risk {:.2}) {}",
        result.decision,
        result.risk_score,
        result
            .rationale
            .last()
            .map(|r| r.message())
            .unwrap_or_default()
    );

    Ok(match result.decision {
        Decision::Block => ExitCode::from(EXIT_BLOCKED),
        Decision::Approve | Decision::Warn => ExitCode::SUCCESS,
    })
}

fn cmd_gates(json_out: bool) -> Result<()> {
    let table = releaseguard_engine::gates::GATE_TABLE;
    if json_out {
        println!("{}", serde_json::to_string_pretty(table)?);
        return Ok(());
    }
    println!(
        "{:<22}  {:<28}  {:<3}  {:>9}  {:<8}",
        "GATE", "SIGNAL", "CMP", "THRESHOLD", "SEVERITY"
    );
    for rule in table {
        println!(
            "{:<22}  {:<28}  {:<3}  {:>9}  {:<8}",
            rule.id,
            rule.signal_key().to_string(),
            rule.direction.comparator(),
            rule.threshold,
            rule.severity.to_string()
        );
    }
    Ok(())
}

fn cmd_catalog(json_out: bool) -> Result<()> {
    let entries = releaseguard_core::catalog::entries();
    if json_out {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }
    println!(
        "{:<28}  {:<6}  {:<17}  {:>6}  {:>6}  {:>6}",
        "SIGNAL", "UNIT", "DIRECTION", "WEIGHT", "IDEAL", "SPAN"
    );
    for e in entries {
        let direction = serde_json::to_value(e.direction)?;
        let unit = serde_json::to_value(e.unit)?;
        println!(
            "{:<28}  {:<6}  {:<17}  {:>6}  {:>6}  {:>6}",
            format!("{}/{}", e.signal_type, e.name),
            unit.as_str().unwrap_or("-"),
            direction.as_str().unwrap_or("-"),
            e.weight,
            e.ideal,
            e.span
        );
    }
    Ok(())
}

fn cmd_report(file: &str, ledger: &str, release: Option<String>) -> Result<()> {
    let source = FileSignals::load(file, release)?;
    let latest = releaseguard_engine::ledger::latest_for_release(ledger, &source.release_id)?;

    let signal_types: BTreeSet<String> = source
        .signals
        .iter()
        .map(|s| s.signal_type.to_string())
        .collect();
    let mut summary = serde_json::json!({
        "total_signals": source.signals.len(),
        "signal_types": signal_types,
    });
    if let Some(entry) = &latest {
        summary["decision"] = entry["decision"].clone();
        summary["risk_score"] = entry["risk_score"].clone();
    } else {
        eprintln!("  no recorded evaluation for {}", source.release_id);
    }

    let report = serde_json::json!({
        "release_id": source.release_id,
        "signals": source.signals,
        "evaluation": latest,
        "summary": summary,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_ledger(path: &str, verify: bool) -> Result<()> {
    if !verify {
        bail!("specify --verify");
    }
    if !std::path::Path::new(path).exists() {
        eprintln!("  no ledger found at {path}");
        return Ok(());
    }
    let count = releaseguard_engine::ledger::verify_chain(path)?;
    eprintln!("  ledger chain valid ({count} entries)");
    Ok(())
}

fn cmd_init() -> Result<()> {
    if std::path::Path::new(WORKSPACE_CONFIG_PATH).exists() {
        bail!("{WORKSPACE_CONFIG_PATH} already exists");
    }
    std::fs::create_dir_all(".releaseguard")?;
    let defaults = EngineConfig::default();
    let layer = ConfigLayer {
        approve_threshold: Some(defaults.approve_threshold()),
        warn_threshold: Some(defaults.warn_threshold()),
    };
    let json = serde_json::to_string_pretty(&layer)?;
    std::fs::write(WORKSPACE_CONFIG_PATH, &json)?;
    eprintln!("created {WORKSPACE_CONFIG_PATH}");
    Ok(())
}
