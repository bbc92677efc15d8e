//! DuoFlow - autonomous trigger-bus orchestrator for code analysis.
//!
//! A CLI tool that coordinates a roster of LLM analysis agents over an
//! event bus: a submitted code sample enqueues a typed trigger,
//! subscribed agents fan out concurrently, and their findings derive
//! follow-up triggers until the workflow settles.
//!
//! Exit codes:
//!   0 - Success (no findings above threshold, or no --fail-on set)
//!   1 - Runtime error (connection, config, input failure, etc.)
//!   2 - Findings found at or above --fail-on threshold

mod analysis;
mod bus;
mod cli;
mod config;
mod models;
mod registry;
mod report;
mod risk;

use analysis::{AnalysisProvider, FindingExtractor, OllamaAnalyst, OllamaConfig};
use anyhow::{Context, Result};
use bus::events::BusEvent;
use bus::{BusConfig, TriggerBus};
use chrono::Utc;
use cli::{Args, OutputFormat, SeverityLevel};
use config::Config;
use models::{AgentStatus, FindingSummary, LogEntry, LogLevel, RiskPoint, Severity};
use registry::AgentRegistry;
use report::{AgentOutcome, RunMetadata, RunReport};
use risk::RiskHistory;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("DuoFlow v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the workflow
    match run_workflow(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Workflow failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .duoflow.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".duoflow.toml");

    if path.exists() {
        eprintln!("⚠️  .duoflow.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .duoflow.toml")?;

    println!("✅ Created .duoflow.toml with default settings.");
    println!("   Edit it to customize model, endpoint, and bus limits.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete workflow. Returns exit code (0 or 2).
async fn run_workflow(args: Args) -> Result<i32> {
    let start_time = Instant::now();
    let analysis_date = Utc::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Build the agent registry
    let registry = AgentRegistry::new(registry::default_agents())?;

    // Handle --dry-run: print the roster and exit
    if args.dry_run {
        return handle_dry_run(&registry);
    }

    // Read the code sample under analysis
    let input_path = args.input.as_ref().expect("validated");
    let source = std::fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read input file: {}", input_path.display()))?;

    println!("🤖 Initializing analysis adapters...");
    println!("   Model: {}", config.model.name);
    println!("   Ollama: {}", config.model.ollama_url);
    println!("   Timeout: {}s per call", config.model.timeout_seconds);
    println!("   Agents: {}", registry.len());

    let analyst = OllamaAnalyst::new(OllamaConfig {
        base_url: config.model.ollama_url.clone(),
        model_name: config.model.name.clone(),
        temperature: config.model.temperature,
        timeout_seconds: config.model.timeout_seconds,
    })
    .context("Failed to initialize the Ollama adapter")?;

    let analyst = Arc::new(analyst);
    let provider: Arc<dyn AnalysisProvider> = analyst.clone();
    let extractor: Arc<dyn FindingExtractor> = analyst;

    // Collector task: consumes bus notifications into the workflow
    // timeline and the risk time series.
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let collector = tokio::spawn(collect_events(event_rx));

    let mut trigger_bus = TriggerBus::new(
        registry.clone(),
        provider,
        extractor,
        BusConfig {
            max_triggers: config.bus.max_triggers,
        },
    )
    .with_event_channel(event_tx);

    println!("\n🔬 Waking the trigger bus...");
    println!("   Agents react to signals and chain follow-up signals;");
    println!("   the run ends when the queue settles.\n");

    trigger_bus.start_run(source);
    let summary = trigger_bus.drain().await;

    if !summary.settled {
        warn!("Run stopped by the trigger bound before the queue settled");
    }

    // Dropping the bus closes the event channel and lets the collector finish.
    drop(trigger_bus);
    let (timeline, risk_history) = collector.await.context("Event collector task failed")?;

    // Build the report
    println!("\n📝 Generating report...");

    let duration = start_time.elapsed().as_secs_f64();
    let finding_summary = FindingSummary::from_findings(&summary.findings);

    let agents: Vec<AgentOutcome> = registry
        .agents()
        .iter()
        .map(|agent| AgentOutcome {
            name: agent.name.clone(),
            role: agent.role,
            status: *summary
                .statuses
                .get(&agent.id)
                .unwrap_or(&AgentStatus::Idle),
        })
        .collect();
    let agents_failed = agents
        .iter()
        .filter(|a| a.status == AgentStatus::Failed)
        .count();

    let run_report = RunReport {
        metadata: RunMetadata {
            model_used: config.model.name.clone(),
            analysis_date,
            duration_seconds: duration,
            triggers_consumed: summary.triggers_consumed,
            agents_total: registry.len(),
            agents_failed,
        },
        summary: finding_summary.clone(),
        findings: summary.findings.clone(),
        agents,
        risk_history: if config.report.include_risk_history {
            risk_history.points().to_vec()
        } else {
            Vec::<RiskPoint>::new()
        },
        timeline: if config.report.include_timeline {
            timeline
        } else {
            Vec::new()
        },
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&run_report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&run_report),
    };

    std::fs::write(&args.output, &output)
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;

    // Print summary
    println!("\n📊 Run Summary:");
    println!("   Triggers consumed: {}", summary.triggers_consumed);
    println!("   Total findings: {}", finding_summary.total);
    println!(
        "   - 🔴 High: {} | 🟡 Medium: {} | 🟢 Low: {} | 🔵 Info: {}",
        finding_summary.high, finding_summary.medium, finding_summary.low, finding_summary.info
    );
    println!("   Risk score: {} / 100", risk_history.current_score());
    if agents_failed > 0 {
        println!("   ⚠️  Agents failed: {}", agents_failed);
    }
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Workflow settled! Report saved to: {}",
        args.output.display()
    );

    // Check --fail-on threshold
    if let Some(fail_level) = args.fail_on {
        let threshold = level_to_severity(fail_level);
        let has_findings_above = summary.findings.iter().any(|f| f.severity >= threshold);

        if has_findings_above {
            eprintln!(
                "\n⛔ Findings found at or above {:?} severity. Failing (exit code 2).",
                fail_level
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Consume bus notifications until the channel closes, building the
/// workflow timeline and the risk time series.
async fn collect_events(
    mut rx: mpsc::UnboundedReceiver<BusEvent>,
) -> (Vec<LogEntry>, RiskHistory) {
    let mut timeline = Vec::new();
    let mut risk = RiskHistory::new();

    while let Some(event) = rx.recv().await {
        match event {
            BusEvent::Log {
                agent,
                message,
                level,
            } => {
                match level {
                    LogLevel::Error => warn!("[{}] {}", agent, message),
                    LogLevel::Warning => warn!("[{}] {}", agent, message),
                    _ => info!("[{}] {}", agent, message),
                }
                timeline.push(LogEntry {
                    timestamp: Utc::now(),
                    agent,
                    message,
                    level,
                });
            }
            BusEvent::FindingsAppended(findings) => {
                risk.observe(&findings);
            }
            BusEvent::AgentStatusChanged { agent_id, status } => {
                debug!("Agent {} -> {}", agent_id, status);
            }
            BusEvent::TriggerEnqueued(_) | BusEvent::TriggerConsumed(_) => {}
        }
    }

    (timeline, risk)
}

/// Handle --dry-run: print the agent roster and subscription matrix.
fn handle_dry_run(registry: &AgentRegistry) -> Result<i32> {
    println!("\n🔍 Dry run: agent roster (no LLM calls)...\n");

    for agent in registry.agents() {
        let subscriptions: Vec<String> = agent
            .subscriptions
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("   🤖 {} [{}]", agent.name, agent.role);
        println!("      Listens to: {}", subscriptions.join(", "));
    }

    println!("\n   Total: {} agents", registry.len());
    println!("\n✅ Dry run complete. No LLM calls were made.");
    Ok(0)
}

/// Convert a CLI severity level to a model severity for comparison.
fn level_to_severity(level: SeverityLevel) -> Severity {
    match level {
        SeverityLevel::Info => Severity::Info,
        SeverityLevel::Low => Severity::Low,
        SeverityLevel::Medium => Severity::Medium,
        SeverityLevel::High => Severity::High,
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .duoflow.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
