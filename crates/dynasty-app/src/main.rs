// Dynasty dashboard entry point.
//
// Startup sequence:
// 1. Parse the command line
// 2. Initialize tracing under <config-dir>/logs (stdout is reserved for reports)
// 3. Load config, copying defaults on first run
// 4. Load the league export and run the requested command
// 5. Print the report in the requested format

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use dynasty_app::app::{Dashboard, RunOptions};
use dynasty_app::cache::ResultCache;
use dynasty_app::config;
use dynasty_app::report::{self, OutputFormat};

/// Used when neither `DYNASTY_LOG` nor `RUST_LOG` is set.
const DEFAULT_LOG_FILTER: &str = "dynasty=info,dynasty_app=info,dynasty_core=info,dynasty_sleeper=info,warn";

#[derive(Parser)]
#[command(name = "dynasty")]
#[command(about = "Playoff, seeding and draft-slot odds for a fantasy league")]
#[command(version)]
struct Cli {
    /// Directory holding config/ and defaults/
    #[arg(long, global = true, default_value = ".")]
    config_dir: PathBuf,

    /// Report format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Always recompute instead of reading cached results
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Platform-reported standings
    Standings {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Playoff, #1 seed and division odds
    Predict {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Per-team draft pick-slot odds
    DraftOdds {
        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args)]
struct RunArgs {
    /// League export directory (league.json, rosters.json, users.json, matchups/)
    #[arg(long)]
    league_dir: Option<PathBuf>,

    /// Monte Carlo trials, overriding engine.toml
    #[arg(long)]
    trials: Option<u32>,

    /// Random seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

impl From<RunArgs> for RunOptions {
    fn from(args: RunArgs) -> Self {
        RunOptions {
            league_dir: args.league_dir,
            trials: args.trials,
            seed: args.seed,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.config_dir)?;
    info!("dynasty starting up in {}", cli.config_dir.display());

    let config = config::load_config(&cli.config_dir).context("failed to load configuration")?;
    info!("config loaded: league={}", config.league.name);

    let cache = if cli.no_cache {
        ResultCache::disabled()
    } else {
        ResultCache::from_config(&config.cache)
    };
    let dashboard = Dashboard::new(config, cache);

    let output = match cli.command {
        Commands::Standings { run } => {
            let data = dashboard.load_league(&run.into())?;
            report::render(&dashboard.standings(&data), cli.format)?
        }
        Commands::Predict { run } => {
            let options = RunOptions::from(run);
            let data = dashboard.load_league(&options)?;
            let predictions = dashboard.predict(&data, &options)?;
            report::render(&predictions, cli.format)?
        }
        Commands::DraftOdds { run } => {
            let options = RunOptions::from(run);
            let data = dashboard.load_league(&options)?;
            let odds = dashboard.draft_odds(&data, &options)?;
            report::render(&odds, cli.format)?
        }
    };

    print!("{output}");
    info!("dynasty finished");
    Ok(())
}

/// Log to `<config-dir>/logs/dynasty.log`, appending across runs so a
/// dashboard refresh loop keeps its history. `DYNASTY_LOG` takes precedence
/// over `RUST_LOG`.
fn init_tracing(config_dir: &Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_path = config::log_file_path(config_dir);
    if let Some(log_dir) = log_path.parent() {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("failed to create {}", log_dir.display()))?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let filter = EnvFilter::try_from_env("DYNASTY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
