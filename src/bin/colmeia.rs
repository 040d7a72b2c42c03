//! Colmeia command-line interface
//!
//! Operational tooling around the allocation engine:
//! - Candidate-order listing (what the floor will fill next)
//! - Dry-run batch suggestions against a given occupancy
//! - Feed-file dry runs
//! - Config file management
//!
//! # Examples
//!
//! ```bash
//! # Show the first 20 candidate slots
//! colmeia topology --limit 20
//!
//! # Where would the next 5 parts land, with E1 and F1 taken?
//! colmeia suggest -n 5 --occupied E1,F1
//!
//! # Dry-run a feed file with slot E1 deactivated
//! colmeia feed parts.json --inactive E1
//!
//! # Write the standard layout to a config file
//! colmeia config init colmeia.toml
//! ```

use clap::{Args, Parser, Subcommand};
use colmeia::warehouse::{allocate_next, assign_batch, OccupancySet, SlotFilter, SlotId};
use colmeia::{EngineConfig, FeedItem, RackTopology};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Colmeia - Warehouse slot allocation engine
#[derive(Parser, Debug)]
#[command(name = "colmeia")]
#[command(version = colmeia::VERSION)]
#[command(about = "Colmeia - Warehouse slot allocation engine", long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Config file path (TOML); the standard layout is used when absent
    #[arg(long, global = true, env = "COLMEIA_CONFIG")]
    config: Option<PathBuf>,

    /// Log directory path
    #[arg(long, global = true, default_value = "logs", env = "COLMEIA_LOG_DIR")]
    log_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the candidate order of the configured topology
    Topology(TopologyArgs),

    /// Dry-run a batch of slot assignments
    Suggest(SuggestArgs),

    /// Dry-run slot suggestions for a feed file
    Feed(FeedArgs),

    /// Config file management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show version
    Version,
}

#[derive(Args, Debug)]
struct TopologyArgs {
    /// Show only the first N candidates
    #[arg(short, long)]
    limit: Option<usize>,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct SuggestArgs {
    /// Number of parts to place
    #[arg(short = 'n', long, default_value = "1")]
    count: usize,

    /// Slots already taken (comma-separated, e.g. E1,F1)
    #[arg(long, value_delimiter = ',')]
    occupied: Vec<String>,

    /// Slots to treat as inactive (comma-separated)
    #[arg(long, value_delimiter = ',')]
    inactive: Vec<String>,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct FeedArgs {
    /// JSON file with an array of feed items
    input: PathBuf,

    /// Slots already taken (comma-separated)
    #[arg(long, value_delimiter = ',')]
    occupied: Vec<String>,

    /// Slots to treat as inactive (comma-separated)
    #[arg(long, value_delimiter = ',')]
    inactive: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write the standard layout to a new config file
    Init {
        /// Output path
        path: PathBuf,
    },

    /// Show the resolved configuration
    Show,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli)?;

    let config = EngineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Topology(args) => topology_command(&config, args),
        Commands::Suggest(args) => suggest_command(&config, args),
        Commands::Feed(args) => feed_command(&config, args),
        Commands::Config { command } => config_command(&config, command),
        Commands::Version => {
            println!("Colmeia {}", colmeia::VERSION);
            Ok(())
        }
    }
}

/// Setup logging with rolling files and console output
fn setup_logging(cli: &Cli) -> anyhow::Result<()> {
    std::fs::create_dir_all(&cli.log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &cli.log_dir, "colmeia.log");

    let log_level = cli
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!cli.no_color),
        )
        .with(fmt::layer().with_writer(file_appender).with_ansi(false))
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    Ok(())
}

fn topology_command(config: &EngineConfig, args: TopologyArgs) -> anyhow::Result<()> {
    let topology = config.topology()?;
    let limit = args.limit.unwrap_or(usize::MAX);

    if args.json {
        let candidates: Vec<serde_json::Value> = topology
            .candidate_order()
            .take(limit)
            .map(|c| {
                serde_json::json!({
                    "slot": c.slot.to_string(),
                    "rack": c.rack_name,
                    "label": c.label,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    println!(
        "Topology: {} rack(s), {} slot(s)",
        topology.racks().len(),
        topology.slot_count()
    );
    println!("───────────────────────────────");
    for candidate in topology.candidate_order().take(limit) {
        println!(
            "  {:>6}  {}  ({})",
            candidate.slot.to_string(),
            candidate.rack_name,
            candidate.label
        );
    }
    Ok(())
}

fn suggest_command(config: &EngineConfig, args: SuggestArgs) -> anyhow::Result<()> {
    let topology = config.topology()?;
    let mut occupied: OccupancySet = parse_slots(&args.occupied)?.into_iter().collect();
    let filter = build_filter(&topology, &args.inactive)?;

    info!(count = args.count, "dry-run batch assignment");
    let assignments = assign_batch(&topology, &mut occupied, &filter, args.count);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&assignments)?);
        return Ok(());
    }

    println!("Suggested slots ({})", assignments.len());
    println!("───────────────────────────────");
    for (i, assignment) in assignments.iter().enumerate() {
        let marker = if assignment.exhausted { "⚠" } else { "•" };
        println!(
            "  {} {:>3}  {:>6}  {}",
            marker,
            i + 1,
            assignment.slot.to_string(),
            assignment.rack_label
        );
    }
    if assignments.iter().any(|a| a.exhausted) {
        warn!("rack capacity exhausted, fallback slots returned");
        println!("⚠  No free slot was available for the flagged rows");
    }
    Ok(())
}

fn feed_command(config: &EngineConfig, args: FeedArgs) -> anyhow::Result<()> {
    let topology = config.topology()?;
    let text = std::fs::read_to_string(&args.input)?;
    let feed: Vec<FeedItem> = serde_json::from_str(&text)?;

    let mut occupied: OccupancySet = parse_slots(&args.occupied)?.into_iter().collect();
    let filter = build_filter(&topology, &args.inactive)?;

    println!("Feed dry-run: {} item(s)", feed.len());
    println!("───────────────────────────────");
    let mut exhausted = false;
    for item in &feed {
        let assignment = allocate_next(&topology, &occupied, &filter);
        occupied.insert(assignment.slot);
        exhausted |= assignment.exhausted;
        let marker = if assignment.exhausted { "⚠" } else { "•" };
        println!(
            "  {} {:>10}  {:<14} → {:>6}  {}",
            marker, item.op, item.part, assignment.slot.to_string(), assignment.rack_label
        );
    }
    if exhausted {
        println!("⚠  No free slot was available for the flagged rows");
    }
    Ok(())
}

fn config_command(config: &EngineConfig, command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Init { path } => {
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            std::fs::write(&path, EngineConfig::default().to_toml()?)?;
            println!("✅ Config written to {}", path.display());
            Ok(())
        }
        ConfigCommands::Show => {
            println!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn parse_slots(raw: &[String]) -> anyhow::Result<Vec<SlotId>> {
    raw.iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().parse::<SlotId>().map_err(Into::into))
        .collect()
}

/// Filter admitting every topology slot except the listed ones
fn build_filter(topology: &RackTopology, inactive: &[String]) -> anyhow::Result<SlotFilter> {
    if inactive.is_empty() {
        return Ok(SlotFilter::All);
    }
    let inactive: Vec<SlotId> = parse_slots(inactive)?;
    Ok(topology
        .candidate_order()
        .map(|c| c.slot)
        .filter(|slot| !inactive.contains(slot))
        .collect())
}
