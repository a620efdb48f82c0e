//! # Swarp-route CLI
//!
//! Command-line interface for the swarp-route library.
//! Loads a game's configuration and prints every save-warp route that reaches
//! the requested destination.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{error, warn};
use swarp_route::report;
use swarp_route::{
    Destination, GameConfig, RoutingContext, Search, SearchOptions, DEFAULT_MAX_ROUTE_LEN,
};

mod cli;

/// Exit code used when the run is interrupted with Ctrl-C
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Command-line interface for swarp-route
#[derive(Parser)]
#[command(name = "swarp-route")]
#[command(about = "Save-warp route finder for GoldSrc and Source games")]
#[command(long_about = "Searches for save-warp routes that reach a position in a destination map:
  swarp-route -g hl1 -d \"c2a5 at: 1024, -512, 36\"
  swarp-route -g hl2 -d \"d1_canals_05 at: 10.5, 20.0, -64.0\" -m 20 -t 4

Reads config_<game>.json from the config directory (default: current directory).
Solutions are printed to stdout as they are found; diagnostics go to stderr.")]
#[command(version = env!("SWARP_ROUTE_VERSION"))]
struct Cli {
    /// Game identifier; selects config_<game>.json
    #[arg(short, long)]
    game: String,

    /// Destination as "<map> at: x, y, z"
    #[arg(short, long)]
    dest: String,

    /// Maximum number of transitions in a route
    #[arg(short, long, default_value_t = DEFAULT_MAX_ROUTE_LEN)]
    maxlen: usize,

    /// Worker threads (default: number of CPUs)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Directory holding the configuration and data files
    #[arg(short, long, default_value = ".")]
    config_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    if cli.verbose {
        eprintln!("🧭 Swarp-route v{} starting...", env!("SWARP_ROUTE_VERSION"));
    }

    let threads = resolve_threads(cli.threads);

    let config = GameConfig::load(&cli.config_dir, &cli.game)
        .with_context(|| format!("failed to load configuration for game '{}'", cli.game))?;
    let destination = Destination::parse(&cli.dest)?;
    let ctx = RoutingContext::load(&config, destination, cli.maxlen)
        .context("failed to prepare routing data")?;

    print!("{}", report::format_raw_warps(ctx.warp_table()));
    print!("{}", report::format_warps(ctx.warp_table()));
    print!("{}", report::format_swarp_config(ctx.banned()));
    print!("{}", report::format_banner(&ctx, threads));

    ctrlc::set_handler(|| {
        eprintln!("\n⚠️  Interrupted");
        std::process::exit(INTERRUPTED_EXIT_CODE);
    })
    .context("failed to install Ctrl-C handler")?;

    let progress = Arc::new(cli::ProgressManager::new("🔍 Searching"));
    let options = SearchOptions {
        threads,
        progress: Some(Arc::new({
            let progress = Arc::clone(&progress);
            move |route_len| progress.depth_reached(route_len)
        })),
    };

    let summary = Search::new(&ctx, options).run(|solution| {
        progress.print_block(&report::format_solution(&ctx, solution));
    });
    progress.finish("✅ Search finished");
    if progress.write_failed() {
        bail!("some solutions could not be written to stdout");
    }

    if summary.solutions == 0 {
        warn!("No routes found within {} transitions", ctx.max_route_len());
    }
    println!("{}", report::format_summary(&summary));

    Ok(())
}

/// Worker count from the command line, falling back to the CPU count
fn resolve_threads(requested: Option<usize>) -> usize {
    match requested {
        Some(0) | None => num_cpus::get(),
        Some(n) => n,
    }
}
