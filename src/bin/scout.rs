/// Scout CLI - maintenance commands over agent trend memory
///
/// Usage:
///   scout agents                            - List agents with a trend store
///   scout recent --agent <id> [-n <n>]      - Show an agent's newest trends
///   scout consolidate [--days <d>]          - Merge all agents over a window
///   scout export --output <path> [--days]   - Write the consolidated report
///   scout clear --agent <id> [--all]        - Empty an agent's memory
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use scout_edge::memory::trends_path;
use scout_edge::{AgentMemory, ConsolidatedReport, JsonValue, ScoutConfig, TrendMemoryManager, TrendRecord, TrendStore};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Scout - trend memory for collection agents
///
/// Inspect, consolidate and export the trend stores written by agents.
#[derive(Parser)]
#[command(name = "scout")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Memory directory (default: $DATA_DIR/memory, or ./data/memory)
    #[arg(short, long, global = true)]
    memory_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every agent that has a trend store
    Agents,

    /// Show an agent's most recent trends
    ///
    /// Example:
    ///   scout recent --agent research_agent -n 5
    Recent {
        /// Agent id
        #[arg(short, long)]
        agent: String,

        /// Number of records to show
        #[arg(short, default_value_t = 10)]
        n: usize,
    },

    /// Merge all agents' trends from the last few days
    Consolidate {
        /// Lookback window in days (default: from configuration)
        #[arg(short, long)]
        days: Option<u32>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Consolidate and write the report to a JSON file
    ///
    /// Example:
    ///   scout export --output weekly.json --days 7
    Export {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Lookback window in days (default: from configuration)
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Clear an agent's trends, chat history and session data
    Clear {
        /// Agent id
        #[arg(short, long)]
        agent: String,

        /// Also drop user preferences
        #[arg(long)]
        all: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();
}

fn load_config(cli: &Cli) -> Result<ScoutConfig> {
    let config = match &cli.config {
        Some(path) => ScoutConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ScoutConfig::from_env(),
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn field_str<'a>(record: &'a TrendRecord, key: &str) -> Option<&'a str> {
    record.get(key).and_then(JsonValue::as_str)
}

/// One-line rendering of a trend record
fn print_record(record: &TrendRecord) {
    let timestamp = record.timestamp().unwrap_or("-");
    let title = ["title", "full_name", "name"]
        .iter()
        .find_map(|key| field_str(record, key))
        .unwrap_or("(untitled)");

    let mut line = format!("  {} {}", timestamp.bright_black(), title.bright_white());
    if let Some(source) = field_str(record, "source") {
        line.push_str(&format!(" [{}]", source.cyan()));
    }
    if let Some(agent) = record.agent_id() {
        line.push_str(&format!(" {}", agent.yellow()));
    }
    println!("{line}");
}

fn print_report(report: &ConsolidatedReport) {
    println!("{}", "Consolidated Trends".bold().cyan());
    println!();
    println!("  Date:     {}", report.consolidated_date);
    println!("  Window:   {} days", report.lookback_days);
    println!("  Agents:   {}", report.agent_count);
    println!("  Trends:   {}", report.trend_count);

    for skipped in &report.skipped_agents {
        println!("  {} {} ({})", "skipped".yellow(), skipped.agent_id, skipped.reason.bright_black());
    }

    if !report.trends.is_empty() {
        println!();
        for record in &report.trends {
            print_record(record);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let memory_dir = cli.memory_dir.clone().unwrap_or_else(|| config.memory_dir());
    let manager = TrendMemoryManager::new(&memory_dir);

    match cli.command {
        Commands::Agents => {
            let agents = manager
                .discover_agents()
                .with_context(|| format!("Failed to scan {}", memory_dir.display()))?;

            if agents.is_empty() {
                println!("{}", "No agents found".yellow());
                return Ok(());
            }
            println!("{}", "Agents:".bold());
            for agent in &agents {
                println!("  {} {}", "*".cyan(), agent);
            }
            println!();
            println!("  {} total", agents.len());
            Ok(())
        }

        Commands::Recent { agent, n } => {
            if !trends_path(&memory_dir, &agent).is_file() {
                bail!("No trend store for agent '{}' in {}", agent, memory_dir.display());
            }
            let store = TrendStore::open(&memory_dir, &agent).context("Failed to open trend store")?;
            let recent = store.get_recent(n);

            if recent.is_empty() {
                println!("{}", "No trends recorded".yellow());
                return Ok(());
            }
            println!("{} {}", "Recent trends for".bold(), agent.cyan().bold());
            println!();
            for record in &recent {
                print_record(record);
            }
            println!();
            println!("  {} of {} records", recent.len(), store.len());
            Ok(())
        }

        Commands::Consolidate { days, json } => {
            let days = days.unwrap_or(config.default_lookback_days);
            let report = manager.consolidate(days);

            if json {
                let text = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
                println!("{text}");
            } else {
                print_report(&report);
            }

            if let Some(error) = &report.error {
                bail!("Consolidation failed: {}", error);
            }
            Ok(())
        }

        Commands::Export { output, days } => {
            let days = days.unwrap_or(config.default_lookback_days);
            manager
                .export(&output, days)
                .with_context(|| format!("Failed to export to {}", output.display()))?;

            println!("{}", "OK".green().bold());
            println!("  Exported: {}", output.display().to_string().cyan());
            Ok(())
        }

        Commands::Clear { agent, all } => {
            if !trends_path(&memory_dir, &agent).is_file() {
                bail!("No trend store for agent '{}' in {}", agent, memory_dir.display());
            }
            let mut memory = AgentMemory::open(&memory_dir, &agent).context("Failed to open agent memory")?;
            memory
                .clear_memory(!all)
                .with_context(|| format!("Failed to clear memory of '{}'", agent))?;

            println!("{}", "OK".green().bold());
            println!(
                "  Cleared: {}{}",
                agent.cyan(),
                if all { " (including preferences)" } else { "" }
            );
            Ok(())
        }
    }
}
